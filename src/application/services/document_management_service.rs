use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::document_ports::DocumentManagementUseCase;
use crate::application::ports::storage_ports::BlobStoragePort;
use crate::common::errors::DomainError;
use crate::domain::repositories::document_repository::DocumentRepository;

/// Document deletion use case
pub struct DocumentManagementService {
    blob_storage: Arc<dyn BlobStoragePort>,
    repository: Arc<dyn DocumentRepository>,
}

impl DocumentManagementService {
    pub fn new(blob_storage: Arc<dyn BlobStoragePort>, repository: Arc<dyn DocumentRepository>) -> Self {
        Self {
            blob_storage,
            repository,
        }
    }
}

#[async_trait]
impl DocumentManagementUseCase for DocumentManagementService {
    async fn delete_document(&self, id: &str) -> Result<(), DomainError> {
        let record = self.repository.get_by_id(id).await?;

        // The blob goes first; a record must never outlive a blob we failed to delete.
        let removed = self.blob_storage.delete_blob(record.document_url()).await?;
        if !removed {
            tracing::warn!("Blob already missing for document {}: {}", id, record.document_url());
        }

        self.repository.delete(id).await?;
        tracing::info!("Document deleted: {}", id);
        Ok(())
    }
}
