use serde::{Deserialize, Serialize};

use crate::error::RpcStatus;

/// A post as seen by clients. `id` is the 24-char hex form of the store id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GetPostsRequest {}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadPostRequest {
    pub post_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub post: Post,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeletePostRequest {
    pub post_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePostResponse {
    pub post_id: String,
}

#[tarpc::service]
pub trait PostService {
    /// Every stored post, in store order
    async fn get_posts(req: GetPostsRequest) -> Result<Vec<Post>, RpcStatus>;
    /// Fetch one post by id
    async fn read_post(req: ReadPostRequest) -> Result<Post, RpcStatus>;
    /// Overwrite owner, title and body of an existing post
    async fn update_post(req: UpdatePostRequest) -> Result<Post, RpcStatus>;
    /// Remove a post, echoing its id
    async fn delete_post(req: DeletePostRequest) -> Result<DeletePostResponse, RpcStatus>;
}
