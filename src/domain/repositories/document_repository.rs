use async_trait::async_trait;

use crate::common::errors::{DomainError, ErrorKind};
use crate::domain::entities::document::{ClaimId, DocumentRecord, PolicyId, UserId};

/**
 * Error types for document record persistence.
 */
#[derive(Debug, thiserror::Error)]
pub enum DocumentRepositoryError {
    /// No record with the requested id
    #[error("Document not found: {0}")]
    NotFound(String),

    /// A record with the same id was already saved
    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Timeout error: {0}")]
    Timeout(String),
}

pub type DocumentRepositoryResult<T> = Result<T, DocumentRepositoryError>;

impl From<DocumentRepositoryError> for DomainError {
    fn from(err: DocumentRepositoryError) -> Self {
        match err {
            DocumentRepositoryError::NotFound(id) => DomainError::not_found("Document", id),
            DocumentRepositoryError::AlreadyExists(id) => DomainError::already_exists("Document", id),
            DocumentRepositoryError::IoError(e) => DomainError::new(
                ErrorKind::InternalError,
                "Document",
                format!("IO error: {}", e),
            )
            .with_source(e),
            DocumentRepositoryError::SerializationError(e) => DomainError::new(
                ErrorKind::InternalError,
                "Document",
                format!("Serialization error: {}", e),
            )
            .with_source(e),
            DocumentRepositoryError::Timeout(msg) => DomainError::timeout("Document", msg),
        }
    }
}

/**
 * Persistence port for document records.
 *
 * Records are created once and then only read or deleted. There is no
 * update operation: a stored URL, folder path or category never changes
 * after upload.
 *
 * Implementations must tolerate records without a category or structure
 * marker, which is how records from before the category feature look.
 */
#[async_trait]
pub trait DocumentRepository: Send + Sync + 'static {
    /// Stores a new record; fails with `AlreadyExists` on a duplicate id
    async fn save(&self, record: DocumentRecord) -> DocumentRepositoryResult<DocumentRecord>;

    async fn get_by_id(&self, id: &str) -> DocumentRepositoryResult<DocumentRecord>;

    /// All records, oldest upload first
    async fn list_all(&self) -> DocumentRepositoryResult<Vec<DocumentRecord>>;

    async fn list_by_user(&self, user_id: UserId) -> DocumentRepositoryResult<Vec<DocumentRecord>>;

    async fn list_by_policy(&self, policy_id: PolicyId) -> DocumentRepositoryResult<Vec<DocumentRecord>>;

    async fn list_by_claim(&self, claim_id: ClaimId) -> DocumentRepositoryResult<Vec<DocumentRecord>>;

    /// Removes a record and returns it
    async fn delete(&self, id: &str) -> DocumentRepositoryResult<DocumentRecord>;
}
