use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::*;

#[derive(Clone)]
pub struct PgRepo { pool: Pool<Postgres> }

impl PgRepo {
    pub fn new(pool: Pool<Postgres>) -> Self { Self { pool } }

    pub fn pool(&self) -> &Pool<Postgres> { &self.pool }
}

#[async_trait]
impl UserRepo for PgRepo {
    async fn get_id_by_username(&self, username: &str) -> RepoResult<String> {
        let id: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool).await?;
        id.map(|(id,)| id).ok_or_else(|| RepoError::NotFound(format!("user {username} not found")))
    }
}

#[async_trait]
impl ThreadRepo for PgRepo {
    async fn add_thread(&self, new: NewThread) -> RepoResult<AddedThread> {
        let (id, title, owner): (String, String, String) = sqlx::query_as(
            "INSERT INTO threads (id, title, body, owner, date) VALUES ($1,$2,$3,$4,now()) RETURNING id, title, owner"
        )
            .bind(generate_id("thread"))
            .bind(&new.title)
            .bind(&new.body)
            .bind(&new.owner)
            .fetch_one(&self.pool).await?;
        Ok(AddedThread::new(id, title, owner)?)
    }

    async fn get_thread_by_id(&self, id: &str) -> RepoResult<ThreadRecord> {
        sqlx::query_as::<_, ThreadRecord>(r#"
            SELECT t.id, t.title, t.body, t.date, t.owner, u.username
            FROM threads t
            JOIN users u ON t.owner = u.id
            WHERE t.id = $1
        "#)
            .bind(id)
            .fetch_optional(&self.pool).await?
            .ok_or_else(|| RepoError::NotFound(format!("thread {id} not found")))
    }

    async fn verify_available_thread_id(&self, id: &str) -> RepoResult<()> {
        sqlx::query("SELECT id FROM threads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool).await?
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("thread {id} not found")))
    }
}

#[async_trait]
impl CommentRepo for PgRepo {
    async fn add_comment(&self, new: NewComment) -> RepoResult<AddedComment> {
        let (id, content, owner): (String, String, String) = sqlx::query_as(
            "INSERT INTO comments (id, owner, thread_id, content, is_deleted, date) VALUES ($1,$2,$3,$4,false,now()) RETURNING id, content, owner"
        )
            .bind(generate_id("comment"))
            .bind(&new.owner)
            .bind(&new.thread_id)
            .bind(&new.content)
            .fetch_one(&self.pool).await?;
        Ok(AddedComment::new(id, content, owner)?)
    }

    async fn get_comment_by_id(&self, id: &str) -> RepoResult<CommentRecord> {
        sqlx::query_as::<_, CommentRecord>(
            "SELECT id, owner, thread_id, content, is_deleted, date FROM comments WHERE id = $1"
        )
            .bind(id)
            .fetch_optional(&self.pool).await?
            .ok_or_else(|| RepoError::NotFound(format!("comment {id} not found")))
    }

    async fn get_comments_by_thread_id(&self, thread_id: &str) -> RepoResult<Vec<CommentRow>> {
        let recs = sqlx::query_as::<_, CommentRow>(r#"
            SELECT c.id, c.owner, c.thread_id, c.content, c.is_deleted, c.date, u.username
            FROM comments c
            JOIN users u ON c.owner = u.id
            WHERE c.thread_id = $1
            ORDER BY c.date ASC
        "#)
            .bind(thread_id)
            .fetch_all(&self.pool).await?;
        Ok(recs)
    }

    async fn verify_available_comment_id(&self, id: &str) -> RepoResult<()> {
        sqlx::query("SELECT id FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool).await?
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("comment {id} not found")))
    }

    async fn delete_comment(&self, id: &str) -> RepoResult<CommentRecord> {
        sqlx::query_as::<_, CommentRecord>(
            "UPDATE comments SET is_deleted = true WHERE id = $1 RETURNING id, owner, thread_id, content, is_deleted, date"
        )
            .bind(id)
            .fetch_optional(&self.pool).await?
            .ok_or_else(|| RepoError::NotFound(format!("comment {id} not found")))
    }
}

#[async_trait]
impl ReplyRepo for PgRepo {
    async fn add_reply(&self, new: NewReply) -> RepoResult<AddedReply> {
        let (id, content, owner): (String, String, String) = sqlx::query_as(
            "INSERT INTO replies (id, owner, comment_id, content, is_deleted, date) VALUES ($1,$2,$3,$4,false,now()) RETURNING id, content, owner"
        )
            .bind(generate_id("reply"))
            .bind(&new.owner)
            .bind(&new.comment_id)
            .bind(&new.content)
            .fetch_one(&self.pool).await?;
        Ok(AddedReply::new(id, content, owner)?)
    }

    async fn get_reply_by_id(&self, id: &str) -> RepoResult<ReplyRecord> {
        sqlx::query_as::<_, ReplyRecord>(
            "SELECT id, owner, comment_id, content, is_deleted, date FROM replies WHERE id = $1"
        )
            .bind(id)
            .fetch_optional(&self.pool).await?
            .ok_or_else(|| RepoError::NotFound(format!("reply {id} not found")))
    }

    async fn get_replies_by_thread_id(&self, thread_id: &str) -> RepoResult<Vec<ReplyRow>> {
        let recs = sqlx::query_as::<_, ReplyRow>(r#"
            SELECT r.id, r.owner, r.comment_id, c.thread_id, r.content, r.is_deleted, r.date, u.username
            FROM replies r
            JOIN users u ON r.owner = u.id
            JOIN comments c ON r.comment_id = c.id
            WHERE c.thread_id = $1
            ORDER BY r.date ASC
        "#)
            .bind(thread_id)
            .fetch_all(&self.pool).await?;
        Ok(recs)
    }

    async fn verify_available_reply_id(&self, id: &str) -> RepoResult<()> {
        sqlx::query("SELECT id FROM replies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool).await?
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("reply {id} not found")))
    }

    async fn delete_reply(&self, id: &str) -> RepoResult<ReplyRecord> {
        sqlx::query_as::<_, ReplyRecord>(
            "UPDATE replies SET is_deleted = true WHERE id = $1 RETURNING id, owner, comment_id, content, is_deleted, date"
        )
            .bind(id)
            .fetch_optional(&self.pool).await?
            .ok_or_else(|| RepoError::NotFound(format!("reply {id} not found")))
    }
}

#[async_trait]
impl LikeRepo for PgRepo {
    async fn add_like(&self, new: NewLike) -> RepoResult<AddedLike> {
        let rec = sqlx::query_as::<_, LikeRecord>(
            "INSERT INTO likes (id, owner, comment_id) VALUES ($1,$2,$3) RETURNING id, owner, comment_id"
        )
            .bind(generate_id("like"))
            .bind(&new.owner)
            .bind(&new.comment_id)
            .fetch_one(&self.pool).await?;
        Ok(AddedLike::new(rec.id, rec.owner, rec.comment_id)?)
    }

    async fn get_like_by_comment_and_owner(&self, comment_id: &str, owner: &str) -> RepoResult<Option<LikeRecord>> {
        let rec = sqlx::query_as::<_, LikeRecord>(
            "SELECT id, owner, comment_id FROM likes WHERE comment_id = $1 AND owner = $2"
        )
            .bind(comment_id)
            .bind(owner)
            .fetch_optional(&self.pool).await?;
        Ok(rec)
    }

    async fn get_like_counts_by_thread_id(&self, thread_id: &str) -> RepoResult<Vec<LikeCount>> {
        let recs = sqlx::query_as::<_, LikeCount>(r#"
            SELECT l.comment_id, COUNT(l.id) AS like_count
            FROM likes l
            JOIN comments c ON l.comment_id = c.id
            WHERE c.thread_id = $1
            GROUP BY l.comment_id
        "#)
            .bind(thread_id)
            .fetch_all(&self.pool).await?;
        Ok(recs)
    }

    async fn delete_like(&self, id: &str) -> RepoResult<LikeRecord> {
        sqlx::query_as::<_, LikeRecord>(
            "DELETE FROM likes WHERE id = $1 RETURNING id, owner, comment_id"
        )
            .bind(id)
            .fetch_optional(&self.pool).await?
            .ok_or_else(|| RepoError::NotFound(format!("like {id} not found")))
    }
}
