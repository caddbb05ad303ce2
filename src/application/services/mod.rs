pub mod document_upload_service;
pub mod document_retrieval_service;
pub mod document_management_service;

// Re-exports
pub use document_upload_service::DocumentUploadService;
pub use document_retrieval_service::DocumentRetrievalService;
pub use document_management_service::DocumentManagementService;
