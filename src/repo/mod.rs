use async_trait::async_trait;
use uuid::Uuid;

use crate::models::*;

#[cfg(feature = "inmem-store")]
pub mod inmem;
pub mod pg;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("{0}")] NotFound(String),
    #[error("internal error: {0}")] Internal(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".into()),
            other => RepoError::Internal(other.to_string()),
        }
    }
}

impl From<EntityError> for RepoError {
    fn from(e: EntityError) -> Self {
        RepoError::Internal(format!("invalid row: {e}"))
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// `<prefix>-<uuid>`, e.g. `thread-6f1c...`.
pub(crate) fn generate_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_id_by_username(&self, username: &str) -> RepoResult<String>;
}

#[async_trait]
pub trait ThreadRepo: Send + Sync {
    async fn add_thread(&self, new: NewThread) -> RepoResult<AddedThread>;
    async fn get_thread_by_id(&self, id: &str) -> RepoResult<ThreadRecord>;
    async fn verify_available_thread_id(&self, id: &str) -> RepoResult<()>;
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn add_comment(&self, new: NewComment) -> RepoResult<AddedComment>;
    async fn get_comment_by_id(&self, id: &str) -> RepoResult<CommentRecord>;
    /// Comments of a thread, oldest first.
    async fn get_comments_by_thread_id(&self, thread_id: &str) -> RepoResult<Vec<CommentRow>>;
    async fn verify_available_comment_id(&self, id: &str) -> RepoResult<()>;
    /// Soft delete: flips `is_deleted`, the row is kept.
    async fn delete_comment(&self, id: &str) -> RepoResult<CommentRecord>;
}

#[async_trait]
pub trait ReplyRepo: Send + Sync {
    async fn add_reply(&self, new: NewReply) -> RepoResult<AddedReply>;
    async fn get_reply_by_id(&self, id: &str) -> RepoResult<ReplyRecord>;
    /// Replies to every comment of a thread, oldest first.
    async fn get_replies_by_thread_id(&self, thread_id: &str) -> RepoResult<Vec<ReplyRow>>;
    async fn verify_available_reply_id(&self, id: &str) -> RepoResult<()>;
    /// Soft delete: flips `is_deleted`, the row is kept.
    async fn delete_reply(&self, id: &str) -> RepoResult<ReplyRecord>;
}

#[async_trait]
pub trait LikeRepo: Send + Sync {
    async fn add_like(&self, new: NewLike) -> RepoResult<AddedLike>;
    async fn get_like_by_comment_and_owner(&self, comment_id: &str, owner: &str) -> RepoResult<Option<LikeRecord>>;
    /// One entry per comment of the thread that has at least one like.
    async fn get_like_counts_by_thread_id(&self, thread_id: &str) -> RepoResult<Vec<LikeCount>>;
    /// Hard delete.
    async fn delete_like(&self, id: &str) -> RepoResult<LikeRecord>;
}

pub trait Repo: UserRepo + ThreadRepo + CommentRepo + ReplyRepo + LikeRepo {}

impl<T> Repo for T where T: UserRepo + ThreadRepo + CommentRepo + ReplyRepo + LikeRepo {}
