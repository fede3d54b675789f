use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Placeholder shown instead of the content of a soft-deleted comment.
pub const DELETED_COMMENT_CONTENT: &str = "**komentar telah dihapus**";
/// Placeholder shown instead of the content of a soft-deleted reply.
pub const DELETED_REPLY_CONTENT: &str = "**balasan telah dihapus**";

// ---------------------------------------------------------------------------
// Entity validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    NewThread,
    AddedThread,
    NewComment,
    AddedComment,
    NewReply,
    AddedReply,
    NewLike,
    AddedLike,
}

impl Entity {
    fn code(self) -> &'static str {
        match self {
            Entity::NewThread => "NEW_THREAD",
            Entity::AddedThread => "ADDED_THREAD",
            Entity::NewComment => "NEW_COMMENT",
            Entity::AddedComment => "ADDED_COMMENT",
            Entity::NewReply => "NEW_REPLY",
            Entity::AddedReply => "ADDED_REPLY",
            Entity::NewLike => "NEW_LIKE",
            Entity::AddedLike => "ADDED_LIKE",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Entity::NewThread | Entity::AddedThread => "thread",
            Entity::NewComment | Entity::AddedComment => "comment",
            Entity::NewReply | Entity::AddedReply => "reply",
            Entity::NewLike | Entity::AddedLike => "like",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityErrorKind {
    NotContainNeededProperty,
    NotMeetDataTypeSpecification,
}

impl EntityErrorKind {
    fn code(self) -> &'static str {
        match self {
            EntityErrorKind::NotContainNeededProperty => "NOT_CONTAIN_NEEDED_PROPERTY",
            EntityErrorKind::NotMeetDataTypeSpecification => "NOT_MEET_DATA_TYPE_SPECIFICATION",
        }
    }
}

/// Raised by entity constructors. Displays as `<ENTITY>.<KIND>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityError {
    pub entity: Entity,
    pub kind: EntityErrorKind,
}

impl EntityError {
    fn missing(entity: Entity) -> Self {
        Self { entity, kind: EntityErrorKind::NotContainNeededProperty }
    }

    fn mistyped(entity: Entity) -> Self {
        Self { entity, kind: EntityErrorKind::NotMeetDataTypeSpecification }
    }

    /// Client-facing description, used in the `message` of 400 responses.
    pub fn message(&self) -> String {
        match self.kind {
            EntityErrorKind::NotContainNeededProperty => format!(
                "cannot build {}: a required property is missing",
                self.entity.noun()
            ),
            EntityErrorKind::NotMeetDataTypeSpecification => format!(
                "cannot build {}: a property does not have the expected data type",
                self.entity.noun()
            ),
        }
    }
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity.code(), self.kind.code())
    }
}

impl std::error::Error for EntityError {}

/// Mirrors JSON falsiness: null, false, 0 and "" count as absent.
fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn present<'a>(entity: Entity, payload: &'a Value, key: &str) -> Result<&'a Value, EntityError> {
    match payload.get(key) {
        Some(v) if !is_falsy(v) => Ok(v),
        _ => Err(EntityError::missing(entity)),
    }
}

fn string(entity: Entity, v: &Value) -> Result<String, EntityError> {
    v.as_str().map(str::to_owned).ok_or(EntityError::mistyped(entity))
}

fn require_non_empty(entity: Entity, values: &[&str]) -> Result<(), EntityError> {
    if values.iter().any(|v| v.is_empty()) {
        return Err(EntityError::missing(entity));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Threads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewThread {
    pub title: String,
    pub body: String,
    pub owner: String,
}

impl NewThread {
    /// Builds a thread from the client payload (`title`, `body`) and the
    /// owner id resolved server-side.
    pub fn from_payload(payload: &Value, owner: &str) -> Result<Self, EntityError> {
        let e = Entity::NewThread;
        let title = present(e, payload, "title")?;
        let body = present(e, payload, "body")?;
        require_non_empty(e, &[owner])?;
        Ok(Self { title: string(e, title)?, body: string(e, body)?, owner: owner.to_owned() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddedThread {
    pub id: String,
    pub title: String,
    pub owner: String,
}

impl AddedThread {
    pub fn new(id: String, title: String, owner: String) -> Result<Self, EntityError> {
        require_non_empty(Entity::AddedThread, &[&id, &title, &owner])?;
        Ok(Self { id, title, owner })
    }
}

/// Thread row joined with its owner's username.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ThreadRecord {
    pub id: String,
    pub title: String,
    pub body: String,
    pub date: DateTime<Utc>,
    pub owner: String,
    pub username: String,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    pub thread_id: String,
    pub content: String,
    pub owner: String,
}

impl NewComment {
    pub fn from_payload(payload: &Value, thread_id: &str, owner: &str) -> Result<Self, EntityError> {
        let e = Entity::NewComment;
        let content = present(e, payload, "content")?;
        require_non_empty(e, &[thread_id, owner])?;
        Ok(Self {
            thread_id: thread_id.to_owned(),
            content: string(e, content)?,
            owner: owner.to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddedComment {
    pub id: String,
    pub content: String,
    pub owner: String,
}

impl AddedComment {
    pub fn new(id: String, content: String, owner: String) -> Result<Self, EntityError> {
        require_non_empty(Entity::AddedComment, &[&id, &content, &owner])?;
        Ok(Self { id, content, owner })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: String,
    pub owner: String,
    pub thread_id: String,
    pub content: String,
    pub is_deleted: bool, // soft delete marker
    pub date: DateTime<Utc>,
}

/// Comment row joined with the commenter's username, as listed per thread.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentRow {
    pub id: String,
    pub owner: String,
    pub thread_id: String,
    pub content: String,
    pub is_deleted: bool,
    pub date: DateTime<Utc>,
    pub username: String,
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReply {
    pub comment_id: String,
    pub content: String,
    pub owner: String,
}

impl NewReply {
    pub fn from_payload(payload: &Value, comment_id: &str, owner: &str) -> Result<Self, EntityError> {
        let e = Entity::NewReply;
        let content = present(e, payload, "content")?;
        require_non_empty(e, &[comment_id, owner])?;
        Ok(Self {
            comment_id: comment_id.to_owned(),
            content: string(e, content)?,
            owner: owner.to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddedReply {
    pub id: String,
    pub content: String,
    pub owner: String,
}

impl AddedReply {
    pub fn new(id: String, content: String, owner: String) -> Result<Self, EntityError> {
        require_non_empty(Entity::AddedReply, &[&id, &content, &owner])?;
        Ok(Self { id, content, owner })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReplyRecord {
    pub id: String,
    pub owner: String,
    pub comment_id: String,
    pub content: String,
    pub is_deleted: bool, // soft delete marker
    pub date: DateTime<Utc>,
}

/// Reply row joined with its parent comment's thread and the author's username.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReplyRow {
    pub id: String,
    pub owner: String,
    pub comment_id: String,
    pub thread_id: String,
    pub content: String,
    pub is_deleted: bool,
    pub date: DateTime<Utc>,
    pub username: String,
}

// ---------------------------------------------------------------------------
// Likes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLike {
    pub comment_id: String,
    pub owner: String,
}

impl NewLike {
    pub fn new(comment_id: &str, owner: &str) -> Result<Self, EntityError> {
        require_non_empty(Entity::NewLike, &[comment_id, owner])?;
        Ok(Self { comment_id: comment_id.to_owned(), owner: owner.to_owned() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedLike {
    pub id: String,
    pub owner: String,
    pub comment_id: String,
}

impl AddedLike {
    pub fn new(id: String, owner: String, comment_id: String) -> Result<Self, EntityError> {
        require_non_empty(Entity::AddedLike, &[&id, &owner])?;
        Ok(Self { id, owner, comment_id })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LikeRecord {
    pub id: String,
    pub owner: String,
    pub comment_id: String,
}

/// Aggregated number of likes for one comment of a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LikeCount {
    pub comment_id: String,
    pub like_count: i64,
}

// ---------------------------------------------------------------------------
// Read model returned by GET /threads/{threadId}
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThreadDetail {
    pub id: String,
    pub title: String,
    pub body: String,
    pub date: DateTime<Utc>,
    pub username: String,
    pub comments: Vec<CommentDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentDetail {
    pub id: String,
    pub username: String,
    pub date: DateTime<Utc>,
    pub content: String,
    pub like_count: i64,
    pub replies: Vec<ReplyDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReplyDetail {
    pub id: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_thread_requires_title_body_and_owner() {
        let err = NewThread::from_payload(&json!({ "title": "abc" }), "user-123").unwrap_err();
        assert_eq!(err.to_string(), "NEW_THREAD.NOT_CONTAIN_NEEDED_PROPERTY");

        let err = NewThread::from_payload(&json!({ "title": "abc", "body": "def" }), "").unwrap_err();
        assert_eq!(err.kind, EntityErrorKind::NotContainNeededProperty);
    }

    #[test]
    fn new_thread_rejects_non_string_fields() {
        let err = NewThread::from_payload(&json!({ "title": 123, "body": true }), "user-123").unwrap_err();
        assert_eq!(err.to_string(), "NEW_THREAD.NOT_MEET_DATA_TYPE_SPECIFICATION");
    }

    #[test]
    fn presence_is_checked_before_type() {
        // title mistyped, body missing: presence wins
        let err = NewThread::from_payload(&json!({ "title": ["x"] }), "user-123").unwrap_err();
        assert_eq!(err.kind, EntityErrorKind::NotContainNeededProperty);
    }

    #[test]
    fn falsy_values_count_as_missing() {
        for content in [json!(""), json!(0), json!(false), json!(null)] {
            let err = NewComment::from_payload(&json!({ "content": content }), "thread-123", "user-123")
                .unwrap_err();
            assert_eq!(err.to_string(), "NEW_COMMENT.NOT_CONTAIN_NEEDED_PROPERTY");
        }
    }

    #[test]
    fn non_object_payload_is_missing_properties() {
        let err = NewReply::from_payload(&json!("content"), "comment-123", "user-123").unwrap_err();
        assert_eq!(err.to_string(), "NEW_REPLY.NOT_CONTAIN_NEEDED_PROPERTY");
    }

    #[test]
    fn new_comment_keeps_server_side_ids() {
        let c = NewComment::from_payload(
            &json!({ "content": "hello", "owner": "user-evil", "threadId": "thread-evil" }),
            "thread-123",
            "user-123",
        )
        .unwrap();
        assert_eq!(c, NewComment {
            thread_id: "thread-123".into(),
            content: "hello".into(),
            owner: "user-123".into(),
        });
    }

    #[test]
    fn new_reply_rejects_non_string_content() {
        let err = NewReply::from_payload(&json!({ "content": 42 }), "comment-123", "user-123").unwrap_err();
        assert_eq!(err.to_string(), "NEW_REPLY.NOT_MEET_DATA_TYPE_SPECIFICATION");
    }

    #[test]
    fn added_entities_require_every_field() {
        assert!(AddedThread::new("thread-1".into(), "t".into(), "user-1".into()).is_ok());
        assert_eq!(
            AddedThread::new("".into(), "t".into(), "user-1".into()).unwrap_err().to_string(),
            "ADDED_THREAD.NOT_CONTAIN_NEEDED_PROPERTY"
        );
        assert!(AddedComment::new("comment-1".into(), "".into(), "user-1".into()).is_err());
        assert!(AddedReply::new("reply-1".into(), "c".into(), "".into()).is_err());
        assert_eq!(
            AddedLike::new("like-1".into(), "".into(), "comment-1".into()).unwrap_err().to_string(),
            "ADDED_LIKE.NOT_CONTAIN_NEEDED_PROPERTY"
        );
    }

    #[test]
    fn new_like_requires_comment_and_owner() {
        assert!(NewLike::new("comment-1", "user-1").is_ok());
        assert_eq!(
            NewLike::new("", "user-1").unwrap_err().to_string(),
            "NEW_LIKE.NOT_CONTAIN_NEEDED_PROPERTY"
        );
    }

    #[test]
    fn comment_detail_serializes_like_count_in_camel_case() {
        let detail = CommentDetail {
            id: "comment-1".into(),
            username: "dicoding".into(),
            date: Utc::now(),
            content: "hi".into(),
            like_count: 0,
            replies: vec![],
        };
        let v = serde_json::to_value(&detail).unwrap();
        assert_eq!(v["likeCount"], 0);
        assert!(v.get("like_count").is_none());
    }
}
