use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};

use super::{comment_in_thread, resolve_owner, CommentTarget, UseCaseError, UseCaseResult};
use crate::models::{AddedComment, NewComment};
use crate::repo::{CommentRepo, ThreadRepo, UserRepo};

pub struct CommentUseCaseDeps {
    pub comment_repo: Arc<dyn CommentRepo>,
    pub thread_repo: Arc<dyn ThreadRepo>,
    pub user_repo: Arc<dyn UserRepo>,
}

pub struct CommentUseCase {
    comments: Arc<dyn CommentRepo>,
    threads: Arc<dyn ThreadRepo>,
    users: Arc<dyn UserRepo>,
}

impl CommentUseCase {
    pub fn new(deps: CommentUseCaseDeps) -> Self {
        Self { comments: deps.comment_repo, threads: deps.thread_repo, users: deps.user_repo }
    }

    #[instrument(skip(self, payload))]
    pub async fn add_comment(&self, thread_id: &str, payload: &Value, username: &str) -> UseCaseResult<AddedComment> {
        let owner = resolve_owner(&*self.users, username).await?;
        self.threads.verify_available_thread_id(thread_id).await?;

        let new = NewComment::from_payload(payload, thread_id, &owner)?;
        let added = self.comments.add_comment(new).await?;
        info!(comment_id = %added.id, "comment created");
        Ok(added)
    }

    /// Soft-deletes a comment. Existence of the thread and the comment is
    /// checked before ownership.
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, target: &CommentTarget, username: &str) -> UseCaseResult<()> {
        let owner = resolve_owner(&*self.users, username).await?;
        self.threads.verify_available_thread_id(&target.thread_id).await?;

        let comment = comment_in_thread(&*self.comments, &target.thread_id, &target.comment_id).await?;
        if comment.owner != owner {
            warn!(comment_id = %comment.id, "delete refused: requester is not the owner");
            return Err(UseCaseError::Unauthorized("you are not allowed to delete this comment".into()));
        }

        self.comments.delete_comment(&target.comment_id).await?;
        info!(comment_id = %comment.id, "comment soft-deleted");
        Ok(())
    }
}
