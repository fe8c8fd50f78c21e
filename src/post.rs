use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::shared_types::Post;

/// A post as stored in the collection.
///
/// Field names on disk are `_id`, `user_id`, `title` and `body`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostItem {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "user_id")]
    pub owner_id: String,
    pub title: String,
    pub body: String,
}

impl PostItem {
    /// Replace every mutable field; the id is left alone.
    pub fn overwrite(&mut self, owner_id: String, title: String, body: String) {
        self.owner_id = owner_id;
        self.title = title;
        self.body = body;
    }
}

impl From<PostItem> for Post {
    fn from(item: PostItem) -> Self {
        Post {
            id: item.id.to_hex(),
            owner_id: item.owner_id,
            title: item.title,
            body: item.body,
        }
    }
}

/// Parse a client supplied id into the store's id format.
pub fn parse_post_id(raw: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(raw).map_err(|_| ServiceError::bad_id())
}
