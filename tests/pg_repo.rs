//! Runs against a real Postgres when `DATABASE_URL` is set; otherwise every
//! test returns early.

use forum_api::models::{NewComment, NewLike, NewReply, NewThread};
use forum_api::repo::pg::PgRepo;
use forum_api::repo::{CommentRepo, LikeRepo, ReplyRepo, RepoError, ThreadRepo, UserRepo};
use serde_json::json;
use serial_test::serial;
use sqlx::postgres::PgPoolOptions;

async fn repo() -> Option<PgRepo> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new().max_connections(2).connect(&url).await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    Some(PgRepo::new(pool))
}

/// Inserts a user with unique id and username, returning both.
async fn user(r: &PgRepo) -> (String, String) {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let id = format!("user-{}", &suffix[..16]);
    let username = format!("u{}", &suffix[..16]);
    sqlx::query("INSERT INTO users (id, username, fullname) VALUES ($1, $2, 'Test User')")
        .bind(&id)
        .bind(&username)
        .execute(r.pool())
        .await
        .unwrap();
    (id, username)
}

#[tokio::test]
#[serial]
async fn pg_thread_comment_reply_roundtrip() {
    let Some(r) = repo().await else { return };
    let (owner, username) = user(&r).await;
    assert_eq!(r.get_id_by_username(&username).await.unwrap(), owner);

    let added = r
        .add_thread(NewThread::from_payload(&json!({"title": "t", "body": "b"}), &owner).unwrap())
        .await
        .unwrap();
    let thread = r.get_thread_by_id(&added.id).await.unwrap();
    assert_eq!(thread.username, username);
    assert!(matches!(r.get_thread_by_id("thread-missing").await, Err(RepoError::NotFound(_))));

    let c = r
        .add_comment(NewComment::from_payload(&json!({"content": "c"}), &added.id, &owner).unwrap())
        .await
        .unwrap();
    let reply = r
        .add_reply(NewReply::from_payload(&json!({"content": "r"}), &c.id, &owner).unwrap())
        .await
        .unwrap();

    let comments = r.get_comments_by_thread_id(&added.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].username, username);
    let replies = r.get_replies_by_thread_id(&added.id).await.unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].thread_id, added.id);

    assert!(r.delete_comment(&c.id).await.unwrap().is_deleted);
    assert!(r.delete_reply(&reply.id).await.unwrap().is_deleted);
    assert!(r.get_comment_by_id(&c.id).await.unwrap().is_deleted);
    assert!(matches!(r.delete_reply("reply-missing").await, Err(RepoError::NotFound(_))));
}

#[tokio::test]
#[serial]
async fn pg_like_counts() {
    let Some(r) = repo().await else { return };
    let (owner, _) = user(&r).await;
    let (other, _) = user(&r).await;
    let added = r
        .add_thread(NewThread::from_payload(&json!({"title": "t", "body": "b"}), &owner).unwrap())
        .await
        .unwrap();
    let c = r
        .add_comment(NewComment::from_payload(&json!({"content": "c"}), &added.id, &owner).unwrap())
        .await
        .unwrap();

    r.add_like(NewLike::new(&c.id, &owner).unwrap()).await.unwrap();
    r.add_like(NewLike::new(&c.id, &other).unwrap()).await.unwrap();
    let counts = r.get_like_counts_by_thread_id(&added.id).await.unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].like_count, 2);

    let like = r.get_like_by_comment_and_owner(&c.id, &other).await.unwrap().unwrap();
    r.delete_like(&like.id).await.unwrap();
    assert!(r.get_like_by_comment_and_owner(&c.id, &other).await.unwrap().is_none());
    assert_eq!(r.get_like_counts_by_thread_id(&added.id).await.unwrap()[0].like_count, 1);
}
