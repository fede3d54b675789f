//! Process-local repository. Nothing survives a restart; used for local runs
//! without `DATABASE_URL` and as the backend of the test suites.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::*;

#[derive(Debug, Clone)]
struct StoredThread {
    id: String,
    title: String,
    body: String,
    owner: String,
    date: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: HashMap<String, String>, // user id -> username
    threads: Vec<StoredThread>,
    comments: Vec<CommentRecord>,
    replies: Vec<ReplyRecord>,
    likes: Vec<LikeRecord>,
}

impl State {
    fn username(&self, user_id: &str) -> Option<&String> {
        self.users.get(user_id)
    }
}

#[derive(Clone, Default)]
pub struct InMemRepo {
    state: Arc<RwLock<State>>,
}

impl InMemRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user. Users are provisioned outside this service, so this
    /// only exists to seed the store.
    pub fn add_user(&self, id: &str, username: &str) -> RepoResult<()> {
        let mut s = self.write()?;
        s.users.retain(|_, name| name != username);
        s.users.insert(id.to_owned(), username.to_owned());
        Ok(())
    }

    /// Store pre-populated with `(id, username)` pairs.
    pub fn with_users<'a>(users: impl IntoIterator<Item = (&'a str, &'a str)>) -> RepoResult<Self> {
        let repo = Self::new();
        for (id, username) in users {
            repo.add_user(id, username)?;
        }
        Ok(repo)
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| RepoError::Internal("state lock poisoned".into()))
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| RepoError::Internal("state lock poisoned".into()))
    }
}

#[async_trait]
impl UserRepo for InMemRepo {
    async fn get_id_by_username(&self, username: &str) -> RepoResult<String> {
        let s = self.read()?;
        s.users
            .iter()
            .find(|(_, name)| name.as_str() == username)
            .map(|(id, _)| id.clone())
            .ok_or_else(|| RepoError::NotFound(format!("user {username} not found")))
    }
}

#[async_trait]
impl ThreadRepo for InMemRepo {
    async fn add_thread(&self, new: NewThread) -> RepoResult<AddedThread> {
        let mut s = self.write()?;
        if !s.users.contains_key(&new.owner) {
            return Err(RepoError::NotFound(format!("user {} not found", new.owner)));
        }
        let thread = StoredThread {
            id: generate_id("thread"),
            title: new.title,
            body: new.body,
            owner: new.owner,
            date: Utc::now(),
        };
        s.threads.push(thread.clone());
        Ok(AddedThread::new(thread.id, thread.title, thread.owner)?)
    }

    async fn get_thread_by_id(&self, id: &str) -> RepoResult<ThreadRecord> {
        let s = self.read()?;
        let t = s
            .threads
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| RepoError::NotFound(format!("thread {id} not found")))?;
        let username = s
            .username(&t.owner)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(format!("thread {id} not found")))?;
        Ok(ThreadRecord {
            id: t.id.clone(),
            title: t.title.clone(),
            body: t.body.clone(),
            date: t.date,
            owner: t.owner.clone(),
            username,
        })
    }

    async fn verify_available_thread_id(&self, id: &str) -> RepoResult<()> {
        let s = self.read()?;
        if s.threads.iter().any(|t| t.id == id) {
            Ok(())
        } else {
            Err(RepoError::NotFound(format!("thread {id} not found")))
        }
    }
}

#[async_trait]
impl CommentRepo for InMemRepo {
    async fn add_comment(&self, new: NewComment) -> RepoResult<AddedComment> {
        let mut s = self.write()?;
        if !s.threads.iter().any(|t| t.id == new.thread_id) {
            return Err(RepoError::NotFound(format!("thread {} not found", new.thread_id)));
        }
        let comment = CommentRecord {
            id: generate_id("comment"),
            owner: new.owner,
            thread_id: new.thread_id,
            content: new.content,
            is_deleted: false,
            date: Utc::now(),
        };
        s.comments.push(comment.clone());
        Ok(AddedComment::new(comment.id, comment.content, comment.owner)?)
    }

    async fn get_comment_by_id(&self, id: &str) -> RepoResult<CommentRecord> {
        let s = self.read()?;
        s.comments
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(format!("comment {id} not found")))
    }

    async fn get_comments_by_thread_id(&self, thread_id: &str) -> RepoResult<Vec<CommentRow>> {
        let s = self.read()?;
        let mut v: Vec<_> = s
            .comments
            .iter()
            .filter(|c| c.thread_id == thread_id)
            .filter_map(|c| {
                let username = s.username(&c.owner)?.clone();
                Some(CommentRow {
                    id: c.id.clone(),
                    owner: c.owner.clone(),
                    thread_id: c.thread_id.clone(),
                    content: c.content.clone(),
                    is_deleted: c.is_deleted,
                    date: c.date,
                    username,
                })
            })
            .collect();
        v.sort_by(|a, b| a.date.cmp(&b.date)); // ascending
        Ok(v)
    }

    async fn verify_available_comment_id(&self, id: &str) -> RepoResult<()> {
        let s = self.read()?;
        if s.comments.iter().any(|c| c.id == id) {
            Ok(())
        } else {
            Err(RepoError::NotFound(format!("comment {id} not found")))
        }
    }

    async fn delete_comment(&self, id: &str) -> RepoResult<CommentRecord> {
        let mut s = self.write()?;
        let c = s
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RepoError::NotFound(format!("comment {id} not found")))?;
        c.is_deleted = true;
        Ok(c.clone())
    }
}

#[async_trait]
impl ReplyRepo for InMemRepo {
    async fn add_reply(&self, new: NewReply) -> RepoResult<AddedReply> {
        let mut s = self.write()?;
        if !s.comments.iter().any(|c| c.id == new.comment_id) {
            return Err(RepoError::NotFound(format!("comment {} not found", new.comment_id)));
        }
        let reply = ReplyRecord {
            id: generate_id("reply"),
            owner: new.owner,
            comment_id: new.comment_id,
            content: new.content,
            is_deleted: false,
            date: Utc::now(),
        };
        s.replies.push(reply.clone());
        Ok(AddedReply::new(reply.id, reply.content, reply.owner)?)
    }

    async fn get_reply_by_id(&self, id: &str) -> RepoResult<ReplyRecord> {
        let s = self.read()?;
        s.replies
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(format!("reply {id} not found")))
    }

    async fn get_replies_by_thread_id(&self, thread_id: &str) -> RepoResult<Vec<ReplyRow>> {
        let s = self.read()?;
        let mut v: Vec<_> = s
            .replies
            .iter()
            .filter_map(|r| {
                let comment = s.comments.iter().find(|c| c.id == r.comment_id)?;
                if comment.thread_id != thread_id {
                    return None;
                }
                let username = s.username(&r.owner)?.clone();
                Some(ReplyRow {
                    id: r.id.clone(),
                    owner: r.owner.clone(),
                    comment_id: r.comment_id.clone(),
                    thread_id: comment.thread_id.clone(),
                    content: r.content.clone(),
                    is_deleted: r.is_deleted,
                    date: r.date,
                    username,
                })
            })
            .collect();
        v.sort_by(|a, b| a.date.cmp(&b.date)); // ascending
        Ok(v)
    }

    async fn verify_available_reply_id(&self, id: &str) -> RepoResult<()> {
        let s = self.read()?;
        if s.replies.iter().any(|r| r.id == id) {
            Ok(())
        } else {
            Err(RepoError::NotFound(format!("reply {id} not found")))
        }
    }

    async fn delete_reply(&self, id: &str) -> RepoResult<ReplyRecord> {
        let mut s = self.write()?;
        let r = s
            .replies
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RepoError::NotFound(format!("reply {id} not found")))?;
        r.is_deleted = true;
        Ok(r.clone())
    }
}

#[async_trait]
impl LikeRepo for InMemRepo {
    async fn add_like(&self, new: NewLike) -> RepoResult<AddedLike> {
        let mut s = self.write()?;
        if !s.comments.iter().any(|c| c.id == new.comment_id) {
            return Err(RepoError::NotFound(format!("comment {} not found", new.comment_id)));
        }
        let like = LikeRecord {
            id: generate_id("like"),
            owner: new.owner,
            comment_id: new.comment_id,
        };
        s.likes.push(like.clone());
        Ok(AddedLike::new(like.id, like.owner, like.comment_id)?)
    }

    async fn get_like_by_comment_and_owner(&self, comment_id: &str, owner: &str) -> RepoResult<Option<LikeRecord>> {
        let s = self.read()?;
        Ok(s.likes
            .iter()
            .find(|l| l.comment_id == comment_id && l.owner == owner)
            .cloned())
    }

    async fn get_like_counts_by_thread_id(&self, thread_id: &str) -> RepoResult<Vec<LikeCount>> {
        let s = self.read()?;
        let counts = s
            .comments
            .iter()
            .filter(|c| c.thread_id == thread_id)
            .filter_map(|c| {
                let like_count = s.likes.iter().filter(|l| l.comment_id == c.id).count() as i64;
                (like_count > 0).then(|| LikeCount { comment_id: c.id.clone(), like_count })
            })
            .collect();
        Ok(counts)
    }

    async fn delete_like(&self, id: &str) -> RepoResult<LikeRecord> {
        let mut s = self.write()?;
        let pos = s
            .likes
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| RepoError::NotFound(format!("like {id} not found")))?;
        Ok(s.likes.remove(pos))
    }
}
