pub mod document_json_repository;

// Blob storage adapters
pub mod azure_blob_repository;
pub mod local_blob_repository;

// Re-exports
pub use azure_blob_repository::AzureBlobRepository;
pub use document_json_repository::DocumentJsonRepository;
pub use local_blob_repository::LocalBlobRepository;
