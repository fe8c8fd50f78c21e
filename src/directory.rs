use std::sync::Arc;

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use tracing::{info, instrument, warn};

use crate::error::ServiceError;
use crate::post::parse_post_id;
use crate::shared_types::Post;
use crate::store::{PostCursor, PostStore};

/// Finite, non-restartable sequence produced by [`PostDirectory::stream_all`].
/// An `Err` item is always the last one.
pub type PostStream = BoxStream<'static, Result<Post, ServiceError>>;

enum Scan<S> {
    Start(Arc<S>),
    Open(PostCursor),
    Done,
}

/// CRUD operations over a post store. Holds no per-call state.
pub struct PostDirectory<S> {
    store: Arc<S>,
}

impl<S> Clone for PostDirectory<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<S: PostStore> PostDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Every post in store order.
    ///
    /// The scan cursor is opened on first poll and dropped as soon as the
    /// stream is exhausted, fails, or is itself dropped.
    pub fn stream_all(&self) -> PostStream {
        info!("get posts request");
        stream::unfold(Scan::Start(Arc::clone(&self.store)), |state| async move {
            match state {
                Scan::Start(store) => match store.find_all().await {
                    Ok(cursor) => next_post::<S>(cursor).await,
                    Err(err) => {
                        warn!(error = %err, "cannot open posts cursor");
                        Some((Err(err.into()), Scan::Done))
                    }
                },
                Scan::Open(cursor) => next_post::<S>(cursor).await,
                Scan::Done => None,
            }
        })
        .boxed()
    }

    #[instrument(skip(self))]
    pub async fn read_one(&self, id: &str) -> Result<Post, ServiceError> {
        info!("read post request");
        let oid = parse_post_id(id)?;
        let item = self
            .store
            .find_one(oid)
            .await
            .map_err(|err| {
                warn!(error = %err, "post lookup failed");
                ServiceError::from(err)
            })?
            .ok_or_else(|| ServiceError::missing(id))?;
        Ok(item.into())
    }

    /// Read the post, overwrite its mutable fields and write the whole record
    /// back. There is no isolation between the read and the write: a
    /// concurrent writer in between is silently overwritten.
    #[instrument(skip(self, owner_id, title, body))]
    pub async fn update_post(
        &self,
        id: &str,
        owner_id: String,
        title: String,
        body: String,
    ) -> Result<Post, ServiceError> {
        info!("update post request");
        let oid = parse_post_id(id)?;
        let mut item = self
            .store
            .find_one(oid)
            .await
            .map_err(|err| {
                warn!(error = %err, "post lookup failed");
                ServiceError::from(err)
            })?
            .ok_or_else(|| ServiceError::missing(id))?;

        item.overwrite(owner_id, title, body);
        self.store.replace_one(oid, &item).await.map_err(|err| {
            warn!(error = %err, "cannot update post");
            ServiceError::from(err)
        })?;
        Ok(item.into())
    }

    /// Remove a post and echo back the id it was asked for.
    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: &str) -> Result<String, ServiceError> {
        info!("delete post request");
        let oid = parse_post_id(id)?;
        let deleted = self.store.delete_one(oid).await.map_err(|err| {
            warn!(error = %err, "cannot delete post");
            ServiceError::from(err)
        })?;
        if deleted == 0 {
            return Err(ServiceError::missing(id));
        }
        Ok(id.to_string())
    }
}

async fn next_post<S>(mut cursor: PostCursor) -> Option<(Result<Post, ServiceError>, Scan<S>)> {
    match cursor.next().await {
        Some(Ok(item)) => Some((Ok(item.into()), Scan::Open(cursor))),
        Some(Err(err)) => {
            warn!(error = %err, "aborting posts stream");
            Some((Err(err.into()), Scan::Done))
        }
        None => None,
    }
}
