use std::sync::Arc;
use std::time::Duration;
use moka::sync::Cache;
use uuid::Uuid;
use super::file_processor::ProcessedUpload;

/// Processed uploads kept around so a later request can download them.
#[derive(Clone)]
pub struct ReportCache {
    inner: Cache<Uuid, Arc<ProcessedUpload>>,
}

impl ReportCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn insert(&self, upload: ProcessedUpload) -> (Uuid, Arc<ProcessedUpload>) {
        let id = Uuid::new_v4();
        let upload = Arc::new(upload);
        self.inner.insert(id, upload.clone());
        tracing::debug!("Cached report {} ({} entries)", id, self.inner.entry_count());
        (id, upload)
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<ProcessedUpload>> {
        self.inner.get(id)
    }
}
