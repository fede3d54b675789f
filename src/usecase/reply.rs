use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};

use super::{comment_in_thread, resolve_owner, CommentTarget, ReplyTarget, UseCaseError, UseCaseResult};
use crate::models::{AddedReply, NewReply};
use crate::repo::{CommentRepo, ReplyRepo, ThreadRepo, UserRepo};

pub struct ReplyUseCaseDeps {
    pub reply_repo: Arc<dyn ReplyRepo>,
    pub comment_repo: Arc<dyn CommentRepo>,
    pub thread_repo: Arc<dyn ThreadRepo>,
    pub user_repo: Arc<dyn UserRepo>,
}

pub struct ReplyUseCase {
    replies: Arc<dyn ReplyRepo>,
    comments: Arc<dyn CommentRepo>,
    threads: Arc<dyn ThreadRepo>,
    users: Arc<dyn UserRepo>,
}

impl ReplyUseCase {
    pub fn new(deps: ReplyUseCaseDeps) -> Self {
        Self {
            replies: deps.reply_repo,
            comments: deps.comment_repo,
            threads: deps.thread_repo,
            users: deps.user_repo,
        }
    }

    #[instrument(skip(self, payload))]
    pub async fn add_reply(&self, target: &CommentTarget, payload: &Value, username: &str) -> UseCaseResult<AddedReply> {
        let owner = resolve_owner(&*self.users, username).await?;
        self.threads.verify_available_thread_id(&target.thread_id).await?;
        comment_in_thread(&*self.comments, &target.thread_id, &target.comment_id).await?;

        let new = NewReply::from_payload(payload, &target.comment_id, &owner)?;
        let added = self.replies.add_reply(new).await?;
        info!(reply_id = %added.id, "reply created");
        Ok(added)
    }

    #[instrument(skip(self))]
    pub async fn delete_reply(&self, target: &ReplyTarget, username: &str) -> UseCaseResult<()> {
        let owner = resolve_owner(&*self.users, username).await?;
        self.threads.verify_available_thread_id(&target.thread_id).await?;
        comment_in_thread(&*self.comments, &target.thread_id, &target.comment_id).await?;
        self.replies.verify_available_reply_id(&target.reply_id).await?;

        let reply = self.replies.get_reply_by_id(&target.reply_id).await?;
        if reply.comment_id != target.comment_id {
            return Err(UseCaseError::NotFound(format!(
                "reply {} not found under comment {}",
                target.reply_id, target.comment_id
            )));
        }
        if reply.owner != owner {
            warn!(reply_id = %reply.id, "delete refused: requester is not the owner");
            return Err(UseCaseError::Unauthorized("you are not allowed to delete this reply".into()));
        }

        self.replies.delete_reply(&target.reply_id).await?;
        info!(reply_id = %reply.id, "reply soft-deleted");
        Ok(())
    }
}

#[cfg(all(test, feature = "inmem-store"))]
mod tests {
    use serde_json::json;

    use crate::models::AddedComment;
    use crate::repo::ReplyRepo;
    use crate::usecase::fixtures::*;
    use crate::usecase::{CommentTarget, ReplyTarget, UseCaseError, UseCases};

    async fn comment(uc: &UseCases) -> CommentTarget {
        let t = uc.threads.add_thread(&json!({ "title": "Title", "body": "Body" }), OWNER).await.unwrap();
        let c: AddedComment = uc.comments.add_comment(&t.id, &json!({ "content": "c" }), OWNER).await.unwrap();
        CommentTarget { thread_id: t.id, comment_id: c.id }
    }

    fn reply_target(c: &CommentTarget, reply_id: &str) -> ReplyTarget {
        ReplyTarget {
            thread_id: c.thread_id.clone(),
            comment_id: c.comment_id.clone(),
            reply_id: reply_id.to_owned(),
        }
    }

    #[tokio::test]
    async fn add_reply_owner_comes_from_username() {
        let (_, uc) = seeded();
        let c = comment(&uc).await;
        let added = uc
            .replies
            .add_reply(&c, &json!({ "content": "a reply", "owner": OWNER_ID }), OTHER)
            .await
            .unwrap();
        assert!(added.id.starts_with("reply-"));
        assert_eq!(added.content, "a reply");
        assert_eq!(added.owner, OTHER_ID);
    }

    #[tokio::test]
    async fn add_reply_checks_thread_then_comment() {
        let (_, uc) = seeded();
        let c = comment(&uc).await;

        let no_thread = CommentTarget { thread_id: "thread-404".into(), comment_id: c.comment_id.clone() };
        let err = uc.replies.add_reply(&no_thread, &json!({ "content": "r" }), OWNER).await.unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound(_)));

        let no_comment = CommentTarget { thread_id: c.thread_id.clone(), comment_id: "comment-404".into() };
        let err = uc.replies.add_reply(&no_comment, &json!({ "content": "r" }), OWNER).await.unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn add_reply_validates_payload() {
        let (_, uc) = seeded();
        let c = comment(&uc).await;
        let err = uc.replies.add_reply(&c, &json!({ "content": ["x"] }), OWNER).await.unwrap_err();
        assert_eq!(err.to_string(), "NEW_REPLY.NOT_MEET_DATA_TYPE_SPECIFICATION");
    }

    #[tokio::test]
    async fn owner_can_soft_delete_reply() {
        let (repo, uc) = seeded();
        let c = comment(&uc).await;
        let r = uc.replies.add_reply(&c, &json!({ "content": "r" }), OTHER).await.unwrap();

        uc.replies.delete_reply(&reply_target(&c, &r.id), OTHER).await.unwrap();
        assert!(repo.get_reply_by_id(&r.id).await.unwrap().is_deleted);
    }

    #[tokio::test]
    async fn non_owner_delete_is_unauthorized() {
        let (repo, uc) = seeded();
        let c = comment(&uc).await;
        let r = uc.replies.add_reply(&c, &json!({ "content": "r" }), OTHER).await.unwrap();

        // thread and comment owner is still not the reply owner
        let err = uc.replies.delete_reply(&reply_target(&c, &r.id), OWNER).await.unwrap_err();
        assert!(matches!(err, UseCaseError::Unauthorized(_)));
        assert!(!repo.get_reply_by_id(&r.id).await.unwrap().is_deleted);
    }

    #[tokio::test]
    async fn delete_missing_reply_is_not_found() {
        let (_, uc) = seeded();
        let c = comment(&uc).await;
        let err = uc.replies.delete_reply(&reply_target(&c, "reply-404"), OWNER).await.unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_under_missing_thread_or_comment_is_not_found_before_ownership() {
        let (repo, uc) = seeded();
        let c = comment(&uc).await;
        let r = uc.replies.add_reply(&c, &json!({ "content": "r" }), OWNER).await.unwrap();

        // requester is not the owner, the missing parent still wins
        let no_thread = ReplyTarget {
            thread_id: "thread-404".into(),
            comment_id: c.comment_id.clone(),
            reply_id: r.id.clone(),
        };
        let err = uc.replies.delete_reply(&no_thread, OTHER).await.unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound(_)));

        let no_comment = ReplyTarget {
            thread_id: c.thread_id.clone(),
            comment_id: "comment-404".into(),
            reply_id: r.id.clone(),
        };
        let err = uc.replies.delete_reply(&no_comment, OTHER).await.unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound(_)));

        assert!(!repo.get_reply_by_id(&r.id).await.unwrap().is_deleted);
    }

    #[tokio::test]
    async fn reply_under_another_comment_is_not_found() {
        let (_, uc) = seeded();
        let c1 = comment(&uc).await;
        let r = uc.replies.add_reply(&c1, &json!({ "content": "r" }), OWNER).await.unwrap();
        let c2 = uc.comments.add_comment(&c1.thread_id, &json!({ "content": "c2" }), OWNER).await.unwrap();

        let target = ReplyTarget {
            thread_id: c1.thread_id.clone(),
            comment_id: c2.id,
            reply_id: r.id,
        };
        let err = uc.replies.delete_reply(&target, OWNER).await.unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound(_)));
    }
}
