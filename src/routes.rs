use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::usecase::{CommentTarget, ReplyTarget, UseCases};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(web::resource("/threads").route(web::post().to(post_thread)))
        .service(web::resource("/threads/{threadId}").route(web::get().to(get_thread)))
        .service(
            web::resource("/threads/{threadId}/comments")
                .route(web::post().to(post_comment)),
        )
        .service(
            web::resource("/threads/{threadId}/comments/{commentId}")
                .route(web::delete().to(delete_comment)),
        )
        .service(
            web::resource("/threads/{threadId}/comments/{commentId}/replies")
                .route(web::post().to(post_reply)),
        )
        .service(
            web::resource("/threads/{threadId}/comments/{commentId}/replies/{replyId}")
                .route(web::delete().to(delete_reply)),
        )
        .service(
            web::resource("/threads/{threadId}/comments/{commentId}/likes")
                .route(web::put().to(put_like)),
        );
}

/// Malformed JSON bodies get the same failure envelope as other 400s.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

#[derive(Clone)]
pub struct AppState { pub use_cases: UseCases }

/// Success envelope: `{"status":"success","data":...}`.
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Success<T> {
    pub fn with(data: T) -> Self { Self { status: "success", data: Some(data) } }
}

fn success() -> Success<Value> { Success { status: "success", data: None } }

/// Request body of `POST /threads`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ThreadPayload { pub title: String, pub body: String }

/// Request body of comment and reply creation.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContentPayload { pub content: String }

#[utoipa::path(
    post,
    path = "/threads",
    request_body = ThreadPayload,
    responses(
        (status = 201, description = "Thread created", body = crate::models::AddedThread),
        (status = 400, description = "Payload misses a property or has a wrong type"),
        (status = 401, description = "Missing or invalid access token")
    )
)]
pub async fn post_thread(auth: Auth, data: web::Data<AppState>, payload: web::Json<Value>) -> Result<HttpResponse, ApiError> {
    let added_thread = data.use_cases.threads.add_thread(&payload, auth.username()).await?;
    Ok(HttpResponse::Created().json(Success::with(json!({ "addedThread": added_thread }))))
}

#[utoipa::path(
    get,
    path = "/threads/{threadId}",
    params(("threadId" = String, Path, description = "Thread id")),
    responses(
        (status = 200, description = "Thread with comments, replies and like counts", body = crate::models::ThreadDetail),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn get_thread(data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let thread = data.use_cases.threads.get_by_id(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Success::with(json!({ "thread": thread }))))
}

#[utoipa::path(
    post,
    path = "/threads/{threadId}/comments",
    params(("threadId" = String, Path, description = "Thread id")),
    request_body = ContentPayload,
    responses(
        (status = 201, description = "Comment created", body = crate::models::AddedComment),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn post_comment(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let added_comment = data.use_cases.comments.add_comment(&path.into_inner(), &payload, auth.username()).await?;
    Ok(HttpResponse::Created().json(Success::with(json!({ "addedComment": added_comment }))))
}

#[utoipa::path(
    delete,
    path = "/threads/{threadId}/comments/{commentId}",
    params(
        ("threadId" = String, Path, description = "Thread id"),
        ("commentId" = String, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment soft-deleted"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 403, description = "Requester does not own the comment"),
        (status = 404, description = "Thread or comment not found")
    )
)]
pub async fn delete_comment(auth: Auth, data: web::Data<AppState>, path: web::Path<CommentTarget>) -> Result<HttpResponse, ApiError> {
    data.use_cases.comments.delete_comment(&path, auth.username()).await?;
    Ok(HttpResponse::Ok().json(success()))
}

#[utoipa::path(
    post,
    path = "/threads/{threadId}/comments/{commentId}/replies",
    params(
        ("threadId" = String, Path, description = "Thread id"),
        ("commentId" = String, Path, description = "Comment id")
    ),
    request_body = ContentPayload,
    responses(
        (status = 201, description = "Reply created", body = crate::models::AddedReply),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Thread or comment not found")
    )
)]
pub async fn post_reply(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<CommentTarget>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let added_reply = data.use_cases.replies.add_reply(&path, &payload, auth.username()).await?;
    Ok(HttpResponse::Created().json(Success::with(json!({ "addedReply": added_reply }))))
}

#[utoipa::path(
    delete,
    path = "/threads/{threadId}/comments/{commentId}/replies/{replyId}",
    params(
        ("threadId" = String, Path, description = "Thread id"),
        ("commentId" = String, Path, description = "Comment id"),
        ("replyId" = String, Path, description = "Reply id")
    ),
    responses(
        (status = 200, description = "Reply soft-deleted"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 403, description = "Requester does not own the reply"),
        (status = 404, description = "Thread, comment or reply not found")
    )
)]
pub async fn delete_reply(auth: Auth, data: web::Data<AppState>, path: web::Path<ReplyTarget>) -> Result<HttpResponse, ApiError> {
    data.use_cases.replies.delete_reply(&path, auth.username()).await?;
    Ok(HttpResponse::Ok().json(success()))
}

#[utoipa::path(
    put,
    path = "/threads/{threadId}/comments/{commentId}/likes",
    params(
        ("threadId" = String, Path, description = "Thread id"),
        ("commentId" = String, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Like toggled"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Thread or comment not found")
    )
)]
pub async fn put_like(auth: Auth, data: web::Data<AppState>, path: web::Path<CommentTarget>) -> Result<HttpResponse, ApiError> {
    data.use_cases.likes.like_or_unlike(&path, auth.username()).await?;
    Ok(HttpResponse::Ok().json(success()))
}
