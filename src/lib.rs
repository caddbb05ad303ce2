// Top-level modules
pub mod common;
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod interfaces;

// Common public re-exports
pub use application::services::{DocumentManagementService, DocumentRetrievalService, DocumentUploadService};
pub use common::config::AppConfig;
pub use common::di::{AppServiceFactory, AppState};
pub use domain::entities::category::{Category, ClaimType};
pub use domain::entities::document::{DocumentRecord, DocumentType};
pub use domain::services::path_service::{FolderPath, PathDeriver};
pub use domain::services::structure_classifier::{FolderStructure, StructureClassifier};
pub use infrastructure::repositories::{AzureBlobRepository, DocumentJsonRepository, LocalBlobRepository};
