use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::errors::StoreError;
use crate::model::CredentialRecord;
use crate::origin::{host_key, normalize_origin};

/// Persistent credential storage. Encryption and unlocking live behind this boundary.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Candidate records for `origin`. Callers still filter with [`crate::find_matching`].
    async fn fetch_by_origin(&self, origin: &str) -> Result<Vec<CredentialRecord>, StoreError>;

    /// Insert or replace the record keyed by `(origin, username)`.
    async fn save(&self, record: CredentialRecord) -> Result<(), StoreError>;
}

const UNINDEXED: &str = "";

/// Host-bucketed in-memory store.
///
/// Records whose origin cannot be parsed land in a shared bucket that is returned with
/// every fetch, the same way an unindexed backend would hand them back.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    buckets: DashMap<String, Vec<CredentialRecord>>,
    failure: Mutex<Option<StoreError>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = CredentialRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.upsert(record);
        }
        store
    }

    /// Make every subsequent call fail with `err` until cleared with `None`.
    pub fn set_failure(&self, err: Option<StoreError>) {
        *self.failure.lock() = err;
    }

    pub fn records(&self) -> Vec<CredentialRecord> {
        let mut all: Vec<CredentialRecord> = self
            .buckets
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| (&a.origin, &a.username).cmp(&(&b.origin, &b.username)));
        all
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records are keyed by `(normalised origin, username)`; origins that do not
    /// normalise stay verbatim in the unindexed bucket.
    fn upsert(&self, mut record: CredentialRecord) {
        let key = match normalize_origin(&record.origin) {
            Ok(origin) => {
                record.origin = origin;
                host_key(&record.origin).unwrap_or_else(|| UNINDEXED.to_string())
            }
            Err(err) => {
                debug!(target: "credential-store", %err, "keeping record unindexed");
                UNINDEXED.to_string()
            }
        };
        let mut bucket = self.buckets.entry(key).or_default();
        if let Some(existing) = bucket
            .iter_mut()
            .find(|r| r.origin == record.origin && r.username == record.username)
        {
            *existing = record;
        } else {
            bucket.push(record);
        }
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        match self.failure.lock().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn fetch_by_origin(&self, origin: &str) -> Result<Vec<CredentialRecord>, StoreError> {
        self.check_failure()?;
        let mut out = Vec::new();
        if let Some(key) = host_key(origin) {
            if let Some(bucket) = self.buckets.get(&key) {
                out.extend(bucket.value().iter().cloned());
            }
        }
        if let Some(unindexed) = self.buckets.get(UNINDEXED) {
            out.extend(unindexed.value().iter().cloned());
        }
        debug!(target: "credential-store", candidates = out.len(), "fetched candidates");
        Ok(out)
    }

    async fn save(&self, record: CredentialRecord) -> Result<(), StoreError> {
        self.check_failure()?;
        self.upsert(record);
        Ok(())
    }
}
