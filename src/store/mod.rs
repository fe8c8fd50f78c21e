//! Storage seam for posts.
//!
//! The directory only ever talks to a [`PostStore`]; the production backend is
//! MongoDB ([`mongo::MongoPostStore`]) and tests run against
//! [`memory::MemoryPostStore`].

use async_trait::async_trait;
use futures::stream::BoxStream;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::post::PostItem;

pub mod memory;
pub mod mongo;

/// Lazily decoded records of a full collection scan. Dropping it releases the
/// underlying cursor.
pub type PostCursor = BoxStream<'static, Result<PostItem, StoreError>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Query(String),
    #[error("cannot decode post from store: {0}")]
    Decode(String),
    #[error("store write failed: {0}")]
    Write(String),
}

/// Filter based primitives of the backing document store, keyed by `_id`.
#[async_trait]
pub trait PostStore: Send + Sync + 'static {
    /// Unfiltered scan in store order.
    async fn find_all(&self) -> Result<PostCursor, StoreError>;
    async fn find_one(&self, id: ObjectId) -> Result<Option<PostItem>, StoreError>;
    /// Replace the whole record matching `id`. No upsert.
    async fn replace_one(&self, id: ObjectId, post: &PostItem) -> Result<(), StoreError>;
    /// Returns how many records were removed.
    async fn delete_one(&self, id: ObjectId) -> Result<u64, StoreError>;
}
