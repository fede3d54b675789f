//! Use cases: the orchestration between authenticated requests and the
//! repositories. Each use case receives its collaborators at construction and
//! holds no per-request state.

use std::sync::Arc;

use serde::Deserialize;

use crate::models::{CommentRecord, EntityError};
use crate::repo::{CommentRepo, Repo, RepoError, UserRepo};

mod comment;
mod like;
mod reply;
mod thread;

pub use comment::{CommentUseCase, CommentUseCaseDeps};
pub use like::{LikeToggle, LikeUseCase, LikeUseCaseDeps};
pub use reply::{ReplyUseCase, ReplyUseCaseDeps};
pub use thread::{ThreadUseCase, ThreadUseCaseDeps};

#[derive(thiserror::Error, Debug)]
pub enum UseCaseError {
    #[error("{0}")] NotFound(String),
    /// The requester is not the owner of the resource.
    #[error("{0}")] Unauthorized(String),
    #[error(transparent)] Validation(#[from] EntityError),
    /// The authenticated username does not resolve to a user id.
    #[error("{0}")] UnknownUser(String),
    #[error("internal error: {0}")] Internal(String),
}

impl From<RepoError> for UseCaseError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => UseCaseError::NotFound(msg),
            RepoError::Internal(msg) => UseCaseError::Internal(msg),
        }
    }
}

pub type UseCaseResult<T> = Result<T, UseCaseError>;

/// Path of a comment, e.g. `/threads/{threadId}/comments/{commentId}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentTarget {
    pub thread_id: String,
    pub comment_id: String,
}

/// Path of a reply, e.g. `/threads/{threadId}/comments/{commentId}/replies/{replyId}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyTarget {
    pub thread_id: String,
    pub comment_id: String,
    pub reply_id: String,
}

async fn resolve_owner(users: &dyn UserRepo, username: &str) -> UseCaseResult<String> {
    users.get_id_by_username(username).await.map_err(|e| match e {
        RepoError::NotFound(_) => UseCaseError::UnknownUser(format!("user {username} is not registered")),
        other => other.into(),
    })
}

/// Fetches a comment and checks it hangs under `thread_id`.
async fn comment_in_thread(comments: &dyn CommentRepo, thread_id: &str, comment_id: &str) -> UseCaseResult<CommentRecord> {
    let comment = comments.get_comment_by_id(comment_id).await?;
    if comment.thread_id != thread_id {
        return Err(UseCaseError::NotFound(format!("comment {comment_id} not found in thread {thread_id}")));
    }
    Ok(comment)
}

/// All four use cases over one shared backend.
#[derive(Clone)]
pub struct UseCases {
    pub threads: Arc<ThreadUseCase>,
    pub comments: Arc<CommentUseCase>,
    pub replies: Arc<ReplyUseCase>,
    pub likes: Arc<LikeUseCase>,
}

impl UseCases {
    pub fn new<R>(repo: R) -> Self
    where
        R: Repo + Clone + 'static,
    {
        let shared = Arc::new(repo);
        Self {
            threads: Arc::new(ThreadUseCase::new(ThreadUseCaseDeps {
                thread_repo: shared.clone(),
                user_repo: shared.clone(),
                comment_repo: shared.clone(),
                reply_repo: shared.clone(),
                like_repo: shared.clone(),
            })),
            comments: Arc::new(CommentUseCase::new(CommentUseCaseDeps {
                comment_repo: shared.clone(),
                thread_repo: shared.clone(),
                user_repo: shared.clone(),
            })),
            replies: Arc::new(ReplyUseCase::new(ReplyUseCaseDeps {
                reply_repo: shared.clone(),
                comment_repo: shared.clone(),
                thread_repo: shared.clone(),
                user_repo: shared.clone(),
            })),
            likes: Arc::new(LikeUseCase::new(LikeUseCaseDeps {
                like_repo: shared.clone(),
                comment_repo: shared.clone(),
                thread_repo: shared.clone(),
                user_repo: shared,
            })),
        }
    }
}
