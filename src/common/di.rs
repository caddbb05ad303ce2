use std::sync::Arc;

use crate::application::ports::document_ports::{
    DocumentManagementUseCase, DocumentRetrievalUseCase, DocumentUploadUseCase,
};
use crate::application::ports::storage_ports::BlobStoragePort;
use crate::application::services::{DocumentManagementService, DocumentRetrievalService, DocumentUploadService};
use crate::common::config::AppConfig;
use crate::common::errors::DomainError;
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::domain::services::path_service::PathDeriver;
use crate::domain::services::structure_classifier::StructureClassifier;
use crate::infrastructure::repositories::{AzureBlobRepository, DocumentJsonRepository, LocalBlobRepository};

/// Builds and wires the application components
pub struct AppServiceFactory {
    config: AppConfig,
}

impl AppServiceFactory {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn classifier(&self) -> StructureClassifier {
        StructureClassifier::new(self.config.layout.clone())
    }

    fn path_deriver(&self) -> PathDeriver {
        PathDeriver::new(self.config.layout.clone())
    }

    /// Azure when configured, local uploads directory otherwise
    pub async fn create_blob_storage(&self) -> Result<Arc<dyn BlobStoragePort>, DomainError> {
        let storage = &self.config.storage;

        if let Some(azure) = AzureBlobRepository::from_config(storage, self.classifier()) {
            let azure = azure?;
            if let Err(e) = azure.ensure_container().await {
                tracing::warn!("Could not verify blob container '{}': {}", storage.azure_container_name, e);
            }
            tracing::info!(
                "Using Azure blob storage (container: {})",
                storage.azure_container_name
            );
            return Ok(Arc::new(azure));
        }

        tracing::warn!(
            "Azure storage not configured, storing uploads locally in {}",
            storage.uploads_dir.display()
        );
        tokio::fs::create_dir_all(&storage.uploads_dir).await?;
        Ok(Arc::new(LocalBlobRepository::new(
            storage.uploads_dir.clone(),
            &storage.public_base_url,
            self.classifier(),
        )))
    }

    pub async fn create_document_repository(&self) -> Result<Arc<dyn DocumentRepository>, DomainError> {
        let repository = DocumentJsonRepository::new(self.config.storage.records_file()).await?;
        Ok(Arc::new(repository))
    }

    /// Builds the application services
    pub fn create_application_services(
        &self,
        blob_storage: Arc<dyn BlobStoragePort>,
        repository: Arc<dyn DocumentRepository>,
    ) -> ApplicationServices {
        let upload_service = Arc::new(DocumentUploadService::new(
            self.path_deriver(),
            self.classifier(),
            blob_storage.clone(),
            repository.clone(),
            self.config.uploads.clone(),
        ));
        let retrieval_service = Arc::new(DocumentRetrievalService::new(
            self.path_deriver(),
            self.classifier(),
            repository.clone(),
        ));
        let management_service = Arc::new(DocumentManagementService::new(blob_storage, repository));

        ApplicationServices {
            upload_service,
            retrieval_service,
            management_service,
        }
    }

    pub async fn build_app_state(&self) -> Result<AppState, DomainError> {
        let blob_storage = self.create_blob_storage().await?;
        let repository = self.create_document_repository().await?;
        let applications = self.create_application_services(blob_storage, repository);

        Ok(AppState {
            config: self.config.clone(),
            applications,
        })
    }
}

/// Application use-case services
#[derive(Clone)]
pub struct ApplicationServices {
    pub upload_service: Arc<dyn DocumentUploadUseCase>,
    pub retrieval_service: Arc<dyn DocumentRetrievalUseCase>,
    pub management_service: Arc<dyn DocumentManagementUseCase>,
}

/// State shared by the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub applications: ApplicationServices,
}
