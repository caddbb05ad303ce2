use async_trait::async_trait;

use crate::application::dtos::document_dto::{
    CreateDocumentDto, DocumentDto, FolderPathDto, FolderPathQuery, StructureDto, UploadDocumentCommand,
    UploadResponseDto,
};
use crate::common::errors::DomainError;
use crate::domain::entities::document::{ClaimId, PolicyId, UserId};

/// Primary port for uploading documents
#[async_trait]
pub trait DocumentUploadUseCase: Send + Sync + 'static {
    /// Validates, stores the blob under its derived folder and records it
    async fn upload_document(&self, command: UploadDocumentCommand) -> Result<UploadResponseDto, DomainError>;

    /// Records a document whose blob is already stored
    async fn create_document(&self, dto: CreateDocumentDto) -> Result<DocumentDto, DomainError>;
}

/// Primary port for querying documents
#[async_trait]
pub trait DocumentRetrievalUseCase: Send + Sync + 'static {
    async fn get_document(&self, id: &str) -> Result<DocumentDto, DomainError>;

    async fn list_documents(&self) -> Result<Vec<DocumentDto>, DomainError>;

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<DocumentDto>, DomainError>;

    async fn list_by_policy(&self, policy_id: PolicyId) -> Result<Vec<DocumentDto>, DomainError>;

    async fn list_by_claim(&self, claim_id: ClaimId) -> Result<Vec<DocumentDto>, DomainError>;

    /// Folder a document with these routing fields would be stored under
    fn derive_folder_path(&self, query: FolderPathQuery) -> Result<FolderPathDto, DomainError>;

    /// Folder and layout inferred from a stored URL
    fn inspect_url(&self, url: &str) -> StructureDto;
}

/// Primary port for managing documents
#[async_trait]
pub trait DocumentManagementUseCase: Send + Sync + 'static {
    /// Deletes the blob and then the record
    async fn delete_document(&self, id: &str) -> Result<(), DomainError>;
}
