use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::time;

use crate::domain::entities::document::{ClaimId, DocumentRecord, PolicyId, UserId};
use crate::domain::repositories::document_repository::{
    DocumentRepository, DocumentRepositoryError, DocumentRepositoryResult,
};

/// How long to wait for the record lock
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// On-disk shape of `documents.json`
#[derive(Serialize, Deserialize, Debug, Default)]
struct RecordStore {
    version: u32,
    documents: Vec<DocumentRecord>,
}

/// Document records kept in memory and mirrored to a single JSON file.
///
/// Every mutation rewrites the file through a temporary file and a rename,
/// and is rolled back in memory when the write fails.
pub struct DocumentJsonRepository {
    /// `None` keeps everything in memory
    store_path: Option<PathBuf>,
    store: RwLock<RecordStore>,
    save_mutex: Mutex<()>,
}

impl DocumentJsonRepository {
    /// Opens (or creates) the record file
    pub async fn new(store_path: PathBuf) -> DocumentRepositoryResult<Self> {
        let store = Self::load_store(&store_path).await?;

        Ok(Self {
            store_path: Some(store_path),
            store: RwLock::new(store),
            save_mutex: Mutex::new(()),
        })
    }

    /// Repository without a backing file
    pub fn new_in_memory() -> Self {
        Self {
            store_path: None,
            store: RwLock::new(RecordStore::default()),
            save_mutex: Mutex::new(()),
        }
    }

    /// Loads records from disk; a corrupt file is backed up and replaced by an empty store
    async fn load_store(store_path: &Path) -> DocumentRepositoryResult<RecordStore> {
        if fs::try_exists(store_path).await? {
            let content = time::timeout(LOCK_TIMEOUT, fs::read_to_string(store_path))
                .await
                .map_err(|_| {
                    DocumentRepositoryError::Timeout(format!("Timeout reading records from {}", store_path.display()))
                })??;

            match serde_json::from_str::<RecordStore>(&content) {
                Ok(store) => {
                    tracing::info!(
                        "Loaded {} document records (version: {})",
                        store.documents.len(),
                        store.version
                    );
                    return Ok(store);
                }
                Err(e) => {
                    tracing::error!("Error parsing document records: {}", e);
                    let backup_path = store_path.with_extension("json.bak");
                    match fs::copy(store_path, &backup_path).await {
                        Ok(_) => tracing::info!("Backed up corrupted records to {}", backup_path.display()),
                        Err(copy_err) => tracing::error!("Failed to backup corrupted records file: {}", copy_err),
                    }
                }
            }
        } else {
            tracing::info!("No existing records at {}, starting empty", store_path.display());
        }

        if let Some(parent) = store_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let store = RecordStore {
            version: 1,
            documents: Vec::new(),
        };
        Self::write_file(store_path, &store).await?;
        Ok(store)
    }

    async fn write_file(store_path: &Path, store: &RecordStore) -> DocumentRepositoryResult<()> {
        let json = serde_json::to_string_pretty(store)?;

        // Write to a temporary file first, then rename over the original
        let temp_path = store_path.with_extension("json.tmp");
        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, store_path).await?;
        Ok(())
    }

    async fn persist(&self) -> DocumentRepositoryResult<()> {
        let Some(store_path) = &self.store_path else {
            return Ok(());
        };

        let store = self.read_store().await?;
        Self::write_file(store_path, &store).await?;
        tracing::debug!("Saved {} document records to {}", store.documents.len(), store_path.display());
        Ok(())
    }

    async fn lock_save(&self) -> DocumentRepositoryResult<MutexGuard<'_, ()>> {
        time::timeout(LOCK_TIMEOUT, self.save_mutex.lock())
            .await
            .map_err(|_| DocumentRepositoryError::Timeout("Timeout acquiring save lock for records".to_string()))
    }

    async fn read_store(&self) -> DocumentRepositoryResult<RwLockReadGuard<'_, RecordStore>> {
        time::timeout(LOCK_TIMEOUT, self.store.read())
            .await
            .map_err(|_| DocumentRepositoryError::Timeout("Timeout acquiring read lock for records".to_string()))
    }

    async fn write_store(&self) -> DocumentRepositoryResult<RwLockWriteGuard<'_, RecordStore>> {
        time::timeout(LOCK_TIMEOUT, self.store.write())
            .await
            .map_err(|_| DocumentRepositoryError::Timeout("Timeout acquiring write lock for records".to_string()))
    }

    async fn find<F>(&self, predicate: F) -> DocumentRepositoryResult<Vec<DocumentRecord>>
    where
        F: Fn(&DocumentRecord) -> bool + Send,
    {
        let store = self.read_store().await?;
        let mut found: Vec<DocumentRecord> = store.documents.iter().filter(|&d| predicate(d)).cloned().collect();
        found.sort_by_key(|d| d.upload_date());
        Ok(found)
    }
}

#[async_trait]
impl DocumentRepository for DocumentJsonRepository {
    async fn save(&self, record: DocumentRecord) -> DocumentRepositoryResult<DocumentRecord> {
        let _lock = self.lock_save().await?;

        {
            let mut store = self.write_store().await?;
            if store.documents.iter().any(|d| d.id() == record.id()) {
                return Err(DocumentRepositoryError::AlreadyExists(record.id().to_string()));
            }
            store.documents.push(record.clone());
            store.version += 1;
        }

        if let Err(e) = self.persist().await {
            let mut store = self.store.write().await;
            store.documents.retain(|d| d.id() != record.id());
            return Err(e);
        }

        Ok(record)
    }

    async fn get_by_id(&self, id: &str) -> DocumentRepositoryResult<DocumentRecord> {
        let store = self.read_store().await?;
        store
            .documents
            .iter()
            .find(|d| d.id() == id)
            .cloned()
            .ok_or_else(|| DocumentRepositoryError::NotFound(id.to_string()))
    }

    async fn list_all(&self) -> DocumentRepositoryResult<Vec<DocumentRecord>> {
        self.find(|_| true).await
    }

    async fn list_by_user(&self, user_id: UserId) -> DocumentRepositoryResult<Vec<DocumentRecord>> {
        self.find(move |d| d.user_id() == user_id).await
    }

    async fn list_by_policy(&self, policy_id: PolicyId) -> DocumentRepositoryResult<Vec<DocumentRecord>> {
        self.find(move |d| d.policy_id() == Some(policy_id)).await
    }

    async fn list_by_claim(&self, claim_id: ClaimId) -> DocumentRepositoryResult<Vec<DocumentRecord>> {
        self.find(move |d| d.claim_id() == Some(claim_id)).await
    }

    async fn delete(&self, id: &str) -> DocumentRepositoryResult<DocumentRecord> {
        let _lock = self.lock_save().await?;

        let (index, removed) = {
            let mut store = self.write_store().await?;
            let index = store
                .documents
                .iter()
                .position(|d| d.id() == id)
                .ok_or_else(|| DocumentRepositoryError::NotFound(id.to_string()))?;
            store.version += 1;
            (index, store.documents.remove(index))
        };

        if let Err(e) = self.persist().await {
            let mut store = self.store.write().await;
            let index = index.min(store.documents.len());
            store.documents.insert(index, removed);
            return Err(e);
        }

        Ok(removed)
    }
}
