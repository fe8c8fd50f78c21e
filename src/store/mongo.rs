use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::{Client, Collection};
use tracing::{debug, info};

use super::{PostCursor, PostStore, StoreError};
use crate::config::DatabaseConfig;
use crate::post::PostItem;

/// [`PostStore`] over a MongoDB collection.
#[derive(Clone)]
pub struct MongoPostStore {
    collection: Collection<PostItem>,
}

impl MongoPostStore {
    pub fn new(collection: Collection<PostItem>) -> Self {
        Self { collection }
    }

    /// Connect, ping the database and open the posts collection.
    ///
    /// The client is handed back so the caller can shut it down.
    pub async fn connect(cfg: &DatabaseConfig) -> Result<(Client, Self), MongoError> {
        let client = Client::with_uri_str(&cfg.url).await?;
        let db = client.database(&cfg.name);
        db.run_command(doc! { "ping": 1 }).await?;
        info!(database = %cfg.name, collection = %cfg.collection, "connected to MongoDB");
        let collection = db.collection::<PostItem>(&cfg.collection);
        Ok((client, Self::new(collection)))
    }
}

fn by_id(id: ObjectId) -> Document {
    doc! { "_id": id }
}

fn read_error(err: MongoError) -> StoreError {
    match *err.kind {
        ErrorKind::BsonDeserialization(_) => StoreError::Decode(err.to_string()),
        _ => StoreError::Query(err.to_string()),
    }
}

#[async_trait]
impl PostStore for MongoPostStore {
    async fn find_all(&self) -> Result<PostCursor, StoreError> {
        let cursor = self.collection.find(doc! {}).await.map_err(read_error)?;
        debug!("opened posts cursor");
        Ok(cursor.map_err(read_error).boxed())
    }

    async fn find_one(&self, id: ObjectId) -> Result<Option<PostItem>, StoreError> {
        self.collection.find_one(by_id(id)).await.map_err(read_error)
    }

    async fn replace_one(&self, id: ObjectId, post: &PostItem) -> Result<(), StoreError> {
        let result = self
            .collection
            .replace_one(by_id(id), post)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        debug!(%id, matched = result.matched_count, "replaced post");
        Ok(())
    }

    async fn delete_one(&self, id: ObjectId) -> Result<u64, StoreError> {
        let result = self
            .collection
            .delete_one(by_id(id))
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use mongodb::bson;

    use super::*;

    #[test]
    fn filter_matches_on_id_only() {
        let id = ObjectId::new();
        let filter = by_id(id);
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.get_object_id("_id").unwrap(), id);
    }

    #[test]
    fn malformed_documents_are_decode_errors() {
        let de_err = bson::from_document::<PostItem>(doc! { "title": 1 }).unwrap_err();
        let err = read_error(MongoError::from(de_err));
        assert!(matches!(err, StoreError::Decode(_)), "{err:?}");
    }

    #[test]
    fn other_failures_are_query_errors() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer");
        let err = read_error(MongoError::from(io_err));
        assert!(matches!(err, StoreError::Query(_)), "{err:?}");
    }
}
