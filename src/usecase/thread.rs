use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use super::{resolve_owner, UseCaseError, UseCaseResult};
use crate::models::*;
use crate::repo::{CommentRepo, LikeRepo, ReplyRepo, RepoError, ThreadRepo, UserRepo};

pub struct ThreadUseCaseDeps {
    pub thread_repo: Arc<dyn ThreadRepo>,
    pub user_repo: Arc<dyn UserRepo>,
    pub comment_repo: Arc<dyn CommentRepo>,
    pub reply_repo: Arc<dyn ReplyRepo>,
    pub like_repo: Arc<dyn LikeRepo>,
}

pub struct ThreadUseCase {
    threads: Arc<dyn ThreadRepo>,
    users: Arc<dyn UserRepo>,
    comments: Arc<dyn CommentRepo>,
    replies: Arc<dyn ReplyRepo>,
    likes: Arc<dyn LikeRepo>,
}

impl ThreadUseCase {
    pub fn new(deps: ThreadUseCaseDeps) -> Self {
        Self {
            threads: deps.thread_repo,
            users: deps.user_repo,
            comments: deps.comment_repo,
            replies: deps.reply_repo,
            likes: deps.like_repo,
        }
    }

    #[instrument(skip(self, payload))]
    pub async fn add_thread(&self, payload: &Value, username: &str) -> UseCaseResult<AddedThread> {
        let owner = resolve_owner(&*self.users, username).await?;
        let new = NewThread::from_payload(payload, &owner)?;
        let added = self.threads.add_thread(new).await?;
        info!(thread_id = %added.id, owner = %added.owner, "thread created");
        Ok(added)
    }

    /// Public read: the thread with its comments, replies and like counts.
    ///
    /// A missing thread is `NotFound`; any other repository failure, here or
    /// in the follow-up lookups, surfaces as `Internal`.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, thread_id: &str) -> UseCaseResult<ThreadDetail> {
        let thread = self.threads.get_thread_by_id(thread_id).await.map_err(|e| match e {
            RepoError::NotFound(_) => UseCaseError::NotFound(format!("thread {thread_id} not found")),
            other => other.into(),
        })?;
        let comments = self.comments.get_comments_by_thread_id(thread_id).await?;
        let replies = self.replies.get_replies_by_thread_id(thread_id).await?;
        let like_counts = self.likes.get_like_counts_by_thread_id(thread_id).await?;

        Ok(assemble(thread, comments, replies, like_counts))
    }
}

fn assemble(
    thread: ThreadRecord,
    comments: Vec<CommentRow>,
    replies: Vec<ReplyRow>,
    like_counts: Vec<LikeCount>,
) -> ThreadDetail {
    let likes: HashMap<String, i64> = like_counts
        .into_iter()
        .map(|l| (l.comment_id, l.like_count))
        .collect();

    let mut replies_by_comment: HashMap<String, Vec<ReplyDetail>> = HashMap::new();
    for r in replies {
        let content = if r.is_deleted { DELETED_REPLY_CONTENT.to_owned() } else { r.content };
        replies_by_comment.entry(r.comment_id).or_default().push(ReplyDetail {
            id: r.id,
            content,
            date: r.date,
            username: r.username,
        });
    }

    let comments = comments
        .into_iter()
        .map(|c| CommentDetail {
            like_count: likes.get(&c.id).copied().unwrap_or(0),
            replies: replies_by_comment.remove(&c.id).unwrap_or_default(),
            content: if c.is_deleted { DELETED_COMMENT_CONTENT.to_owned() } else { c.content },
            id: c.id,
            username: c.username,
            date: c.date,
        })
        .collect();

    ThreadDetail {
        id: thread.id,
        title: thread.title,
        body: thread.body,
        date: thread.date,
        username: thread.username,
        comments,
    }
}
