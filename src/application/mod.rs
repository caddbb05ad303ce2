pub mod dtos;
pub mod ports;
pub mod services;

// Re-export the main ports
pub use ports::document_ports::{DocumentManagementUseCase, DocumentRetrievalUseCase, DocumentUploadUseCase};
pub use ports::storage_ports::BlobStoragePort;
