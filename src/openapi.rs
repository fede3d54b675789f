use crate::models::{AddedComment, AddedReply, AddedThread, CommentDetail, ReplyDetail, ThreadDetail};
use crate::routes::{ContentPayload, ThreadPayload};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::post_thread,
        crate::routes::get_thread,
        crate::routes::post_comment,
        crate::routes::delete_comment,
        crate::routes::post_reply,
        crate::routes::delete_reply,
        crate::routes::put_like,
    ),
    components(schemas(
        ThreadPayload, ContentPayload,
        AddedThread, AddedComment, AddedReply,
        ThreadDetail, CommentDetail, ReplyDetail
    )),
    tags(
        (name = "threads", description = "Thread operations"),
        (name = "comments", description = "Comment operations"),
        (name = "replies", description = "Reply operations"),
        (name = "likes", description = "Comment likes"),
    )
)]
pub struct ApiDoc;
