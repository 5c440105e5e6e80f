//! Record store abstraction and the invalidatable cache wrapper.
//!
//! The external sheet is the single source of truth. Everything in-process
//! is a projection: [`CachedRecords`] keeps the last normalized fetch and
//! throws it away after every successful write, and also on transient
//! store failures, so the next interaction always starts from a clean
//! fetch.

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::record::{self, ComplaintRecord};

/// Backend holding the complaint table. Two operations only: the intake
/// flow never updates or deletes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every row of the table as text, header row first.
    async fn fetch_all(&self) -> Result<Vec<Vec<String>>>;

    /// Append exactly one row in canonical column order.
    async fn append_one(&self, row: Vec<String>) -> Result<()>;
}

/// Caching wrapper around a [`RecordStore`].
///
/// Fetches and normalizes lazily; serves the cached record set until it is
/// invalidated. Queries clone the record set out rather than holding the
/// lock across rendering.
pub struct CachedRecords {
    store: Box<dyn RecordStore>,
    cache: Mutex<Option<Vec<ComplaintRecord>>>,
}

impl CachedRecords {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(None),
        }
    }

    /// The current record set, fetching and normalizing on a cache miss.
    pub async fn records(&self) -> Result<Vec<ComplaintRecord>> {
        let mut cache = self.cache.lock().await;
        if let Some(records) = cache.as_ref() {
            debug!("serving {} records from cache", records.len());
            return Ok(records.clone());
        }

        let rows = self.store.fetch_all().await.inspect_err(|e| {
            if e.clears_cache() {
                warn!("transient store failure during fetch: {e}");
            }
        })?;
        let records = record::normalize(&rows)?;
        info!("fetched and normalized {} records", records.len());
        *cache = Some(records.clone());
        Ok(records)
    }

    /// Append one validated record and invalidate the cache so the next
    /// read re-fetches. On a transient failure the cache is cleared too,
    /// before the error is surfaced.
    pub async fn append(&self, record: &ComplaintRecord) -> Result<()> {
        match self.store.append_one(record.to_row()).await {
            Ok(()) => {
                info!("appended record by '{}'", record.author);
                self.invalidate().await;
                Ok(())
            }
            Err(e) => {
                if e.clears_cache() {
                    warn!("transient store failure during append, clearing cache");
                    self.invalidate().await;
                }
                Err(e)
            }
        }
    }

    /// Drop the cached record set.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::query;
    use crate::record::HEADER;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};

    /// In-memory store that counts fetches, for cache behavior tests.
    /// Clones share state so a test can inspect the store it boxed away.
    #[derive(Clone)]
    struct MemStore {
        rows: Arc<StdMutex<Vec<Vec<String>>>>,
        fetches: Arc<AtomicUsize>,
        fail_append: bool,
    }

    impl MemStore {
        fn new(rows: Vec<Vec<String>>) -> Self {
            Self {
                rows: Arc::new(StdMutex::new(rows)),
                fetches: Arc::new(AtomicUsize::new(0)),
                fail_append: false,
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecordStore for MemStore {
        async fn fetch_all(&self) -> Result<Vec<Vec<String>>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn append_one(&self, row: Vec<String>) -> Result<()> {
            if self.fail_append {
                return Err(AppError::remote_transient("quota exceeded"));
            }
            self.rows.lock().unwrap().push(row);
            Ok(())
        }
    }

    fn seed_rows() -> Vec<Vec<String>> {
        let header: Vec<String> = HEADER.iter().map(|s| s.to_string()).collect();
        let mk = |author: &str, date: &str| {
            vec![
                author.to_string(),
                "text".to_string(),
                "37.5".to_string(),
                "126.9".to_string(),
                date.to_string(),
                String::new(),
                String::new(),
            ]
        };
        vec![header, mk("first", "2024-01-01"), mk("third", "2024-01-05")]
    }

    #[tokio::test]
    async fn cache_serves_repeat_reads_without_refetching() {
        let store = MemStore::new(seed_rows());
        let repo = CachedRecords::new(Box::new(store.clone()));
        repo.records().await.unwrap();
        repo.records().await.unwrap();
        assert_eq!(store.fetch_count(), 1);

        repo.invalidate().await;
        let records = repo.records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(store.fetch_count(), 2);
    }

    #[tokio::test]
    async fn append_invalidates_and_new_record_sorts_into_place() {
        let store = MemStore::new(seed_rows());
        let repo = CachedRecords::new(Box::new(store.clone()));
        let before = repo.records().await.unwrap();
        assert_eq!(before.len(), 2);

        let rows = vec![
            HEADER.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            vec![
                "middle".into(),
                "between the two".into(),
                "37.6".into(),
                "127.0".into(),
                "2024-01-03".into(),
                String::new(),
                String::new(),
            ],
        ];
        let new_record = record::normalize(&rows).unwrap().remove(0);
        repo.append(&new_record).await.unwrap();

        // The append invalidated the cache, so this read refetches.
        let after = repo.records().await.unwrap();
        assert_eq!(store.fetch_count(), 2);
        assert_eq!(after.len(), 3);
        let ordered = query::chronological(&after);
        let authors: Vec<&str> = ordered.iter().map(|e| e.record.author.as_str()).collect();
        assert_eq!(authors, vec!["first", "middle", "third"]);
    }

    #[tokio::test]
    async fn transient_append_failure_clears_the_cache() {
        let mut store = MemStore::new(seed_rows());
        store.fail_append = true;
        let repo = CachedRecords::new(Box::new(store.clone()));
        repo.records().await.unwrap();
        assert_eq!(store.fetch_count(), 1);

        let submission = crate::validate::NewSubmission {
            author: "Kim".into(),
            content: "x".into(),
            date: "2024-01-02".into(),
            category: None,
            attachment: None,
        };
        let point = crate::record::GeoPoint::new(37.5, 126.9).unwrap();
        let err = repo.append(&submission.into_record(point)).await.unwrap_err();
        assert!(err.clears_cache());

        // Cache was dropped, so this read goes back to the store.
        let records = repo.records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(store.fetch_count(), 2);
    }
}
