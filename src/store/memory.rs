use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures::{stream, StreamExt};
use mongodb::bson::oid::ObjectId;

use super::{PostCursor, PostStore, StoreError};
use crate::post::PostItem;

/// In-process [`PostStore`] for tests and local runs.
///
/// Besides holding posts it counts every store call, tracks how many scan
/// cursors are still open, and can be told to fail scans, reads or writes.
#[derive(Default)]
pub struct MemoryPostStore {
    posts: Mutex<BTreeMap<ObjectId, PostItem>>,
    calls: AtomicUsize,
    open_cursors: Arc<AtomicUsize>,
    fail_scan_after: Mutex<Option<usize>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// Decrements the open cursor count when the scan stream is dropped.
struct CursorGuard(Arc<AtomicUsize>);

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new post under a freshly assigned id.
    pub fn insert(&self, owner_id: &str, title: &str, body: &str) -> PostItem {
        let item = PostItem {
            id: ObjectId::new(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        };
        self.posts().insert(item.id, item.clone());
        item
    }

    pub fn get(&self, id: ObjectId) -> Option<PostItem> {
        self.posts().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.posts().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of trait calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Make scans yield `n` posts and then a decode error.
    pub fn fail_scan_after(&self, n: usize) {
        *self
            .fail_scan_after
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(n);
    }

    /// Make `find_one` return a query error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn posts(&self) -> MutexGuard<'_, BTreeMap<ObjectId, PostItem>> {
        self.posts.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write("store is read-only".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn find_all(&self) -> Result<PostCursor, StoreError> {
        self.record_call();
        let mut items: Vec<Result<PostItem, StoreError>> =
            self.posts().values().cloned().map(Ok).collect();
        let fail_after = *self
            .fail_scan_after
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(n) = fail_after {
            items.truncate(n);
            items.push(Err(StoreError::Decode("malformed document".into())));
        }

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        let guard = CursorGuard(self.open_cursors.clone());
        let cursor = stream::iter(items).map(move |item| {
            let _held = &guard;
            item
        });
        Ok(cursor.boxed())
    }

    async fn find_one(&self, id: ObjectId) -> Result<Option<PostItem>, StoreError> {
        self.record_call();
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Query("connection reset".into()));
        }
        Ok(self.get(id))
    }

    async fn replace_one(&self, id: ObjectId, post: &PostItem) -> Result<(), StoreError> {
        self.record_call();
        self.check_writable()?;
        if let Some(slot) = self.posts().get_mut(&id) {
            *slot = post.clone();
        }
        Ok(())
    }

    async fn delete_one(&self, id: ObjectId) -> Result<u64, StoreError> {
        self.record_call();
        self.check_writable()?;
        Ok(self.posts().remove(&id).map_or(0, |_| 1))
    }
}
