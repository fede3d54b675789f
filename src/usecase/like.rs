use std::sync::Arc;

use tracing::{info, instrument};

use super::{comment_in_thread, resolve_owner, CommentTarget, UseCaseResult};
use crate::models::{AddedLike, LikeRecord, NewLike};
use crate::repo::{CommentRepo, LikeRepo, ThreadRepo, UserRepo};

pub struct LikeUseCaseDeps {
    pub like_repo: Arc<dyn LikeRepo>,
    pub comment_repo: Arc<dyn CommentRepo>,
    pub thread_repo: Arc<dyn ThreadRepo>,
    pub user_repo: Arc<dyn UserRepo>,
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeToggle {
    Liked(AddedLike),
    Unliked(LikeRecord),
}

pub struct LikeUseCase {
    likes: Arc<dyn LikeRepo>,
    comments: Arc<dyn CommentRepo>,
    threads: Arc<dyn ThreadRepo>,
    users: Arc<dyn UserRepo>,
}

impl LikeUseCase {
    pub fn new(deps: LikeUseCaseDeps) -> Self {
        Self {
            likes: deps.like_repo,
            comments: deps.comment_repo,
            threads: deps.thread_repo,
            users: deps.user_repo,
        }
    }

    /// Likes the comment, or removes the requester's like if one exists.
    ///
    /// Check-then-act without locking: two concurrent toggles by the same
    /// user may both see "no like" and insert twice.
    #[instrument(skip(self))]
    pub async fn like_or_unlike(&self, target: &CommentTarget, username: &str) -> UseCaseResult<LikeToggle> {
        let owner = resolve_owner(&*self.users, username).await?;
        self.threads.verify_available_thread_id(&target.thread_id).await?;
        comment_in_thread(&*self.comments, &target.thread_id, &target.comment_id).await?;

        match self.likes.get_like_by_comment_and_owner(&target.comment_id, &owner).await? {
            Some(existing) => {
                let removed = self.likes.delete_like(&existing.id).await?;
                info!(like_id = %removed.id, "comment unliked");
                Ok(LikeToggle::Unliked(removed))
            }
            None => {
                let new = NewLike::new(&target.comment_id, &owner)?;
                let added = self.likes.add_like(new).await?;
                info!(like_id = %added.id, "comment liked");
                Ok(LikeToggle::Liked(added))
            }
        }
    }
}
