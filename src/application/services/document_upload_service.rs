use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::dtos::document_dto::{
    CreateDocumentDto, DocumentDto, UploadDocumentCommand, UploadResponseDto,
};
use crate::application::ports::document_ports::DocumentUploadUseCase;
use crate::application::ports::storage_ports::BlobStoragePort;
use crate::common::config::UploadConfig;
use crate::common::errors::DomainError;
use crate::domain::entities::category::{Category, ClaimType};
use crate::domain::entities::document::{ClaimId, DocumentRecord, DocumentType, NewDocument, PolicyId, UserId};
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::domain::services::path_service::PathDeriver;
use crate::domain::services::structure_classifier::StructureClassifier;

/// Upload and record-creation use cases
pub struct DocumentUploadService {
    path_deriver: PathDeriver,
    classifier: StructureClassifier,
    blob_storage: Arc<dyn BlobStoragePort>,
    repository: Arc<dyn DocumentRepository>,
    limits: UploadConfig,
}

impl DocumentUploadService {
    pub fn new(
        path_deriver: PathDeriver,
        classifier: StructureClassifier,
        blob_storage: Arc<dyn BlobStoragePort>,
        repository: Arc<dyn DocumentRepository>,
        limits: UploadConfig,
    ) -> Self {
        Self {
            path_deriver,
            classifier,
            blob_storage,
            repository,
            limits,
        }
    }

    /// Checks name, extension and size; returns the lowercase extension
    fn validate_file(&self, file_name: &str, size: usize) -> Result<String, DomainError> {
        if file_name.trim().is_empty() {
            return Err(DomainError::validation_error("Upload", "File name is required"));
        }
        if file_name.contains(['/', '\\']) {
            return Err(DomainError::validation_error(
                "Upload",
                format!("Invalid file name: {}", file_name),
            ));
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default();

        if !self.limits.is_allowed_extension(&extension) {
            let mut allowed = self.limits.allowed_extensions.clone();
            allowed.sort();
            tracing::error!("Invalid file extension '{}' for file: {}", extension, file_name);
            return Err(DomainError::validation_error(
                "Upload",
                format!("Invalid file type. Allowed extensions are: {}", allowed.join(", ")),
            ));
        }

        if size == 0 {
            return Err(DomainError::validation_error(
                "Upload",
                "File is empty. Please upload a valid file.",
            ));
        }

        if size > self.limits.max_file_size_bytes {
            let size_mb = size as f64 / (1024.0 * 1024.0);
            tracing::error!("File too large: {:.2} MB for file: {}", size_mb, file_name);
            return Err(DomainError::validation_error(
                "Upload",
                format!(
                    "File size ({:.2} MB) exceeds maximum allowed size ({} MB). Please upload a smaller file.",
                    size_mb,
                    self.limits.max_file_size_mb()
                ),
            ));
        }

        Ok(extension)
    }

    async fn record_upload(&self, fields: NewDocument) -> Result<DocumentRecord, DomainError> {
        let record = DocumentRecord::new(fields)?;
        Ok(self.repository.save(record).await?)
    }
}

/// Parses an optional numeric form field; blank or unparseable values count as absent
fn optional_id<T: std::str::FromStr>(raw: Option<&str>, field: &str) -> Option<T> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    match raw.parse::<T>() {
        Ok(id) => Some(id),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {}: '{}'", field, raw);
            None
        }
    }
}

/// Logs a warning when the category is not in the checklist for the claim type
fn check_category_for_claim_type(claim_type: Option<&str>, category: Option<&Category>) {
    let (Some(raw_type), Some(category)) = (claim_type, category) else {
        return;
    };

    match raw_type.parse::<ClaimType>() {
        Ok(claim_type) if claim_type.is_valid_category(category.as_str()) => {
            tracing::info!("Category '{}' is valid for claim type '{}'", category, claim_type);
        }
        Ok(claim_type) => {
            tracing::warn!(
                "Category '{}' is not in the '{}' checklist; storing it anyway",
                category,
                claim_type
            );
        }
        Err(_) => {
            tracing::warn!("Unknown claim type '{}', skipping category check", raw_type);
        }
    }
}

#[async_trait]
impl DocumentUploadUseCase for DocumentUploadService {
    async fn upload_document(&self, command: UploadDocumentCommand) -> Result<UploadResponseDto, DomainError> {
        let user_id: UserId = command
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DomainError::validation_error("Upload", "userId is required"))?
            .parse()?;

        let document_type: DocumentType = command.document_type.as_deref().unwrap_or_default().parse()?;
        tracing::info!("Upload request: documentType '{}' for userId {}", document_type, user_id);

        let policy_id: Option<PolicyId> = optional_id(command.policy_id.as_deref(), "policyId");
        let claim_id: Option<ClaimId> = optional_id(command.claim_id.as_deref(), "claimId");

        let file_name = command.file_name.clone().unwrap_or_default();
        let extension = self.validate_file(&file_name, command.content.len())?;

        let category = command.category.as_deref().and_then(Category::parse);
        if let (Some(raw), Some(normalized)) = (command.category.as_deref(), category.as_ref()) {
            tracing::debug!("Normalized category '{}' -> '{}'", raw.trim(), normalized);
        }
        check_category_for_claim_type(command.claim_type.as_deref(), category.as_ref());

        let folder = self
            .path_deriver
            .derive(Some(user_id), document_type, claim_id, category.as_ref())?;
        tracing::info!("Derived folder path '{}' (category: {:?}, claimId: {:?})", folder, category, claim_id);

        let blob_name = format!("{}{}", uuid::Uuid::new_v4(), extension);
        let content_type = command
            .content_type
            .clone()
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
            .unwrap_or_else(|| mime_guess::from_path(&file_name).first_or_octet_stream().to_string());
        let file_size = command.content.len() as u64;

        tracing::info!(
            "Uploading '{}' ({} bytes) to {} storage, folder '{}'",
            file_name,
            file_size,
            self.blob_storage.backend_name(),
            folder
        );
        let file_url = self
            .blob_storage
            .upload_blob(&folder, &blob_name, command.content, &content_type)
            .await?;

        let fields = NewDocument {
            user_id,
            policy_id,
            claim_id,
            document_type,
            category: category.filter(|_| folder.has_category()),
            file_name: Some(file_name.clone()),
            document_url: file_url.clone(),
            folder_path: Some(folder.to_string()),
            file_size,
            structure: Some(folder.structure()),
        };

        // Once the blob is written, any failure must take it back out.
        let saved = match self.record_upload(fields).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::error!("Failed to record document for {}: {}", file_url, e);
                if let Err(cleanup) = self.blob_storage.delete_blob(&file_url).await {
                    tracing::error!("Failed to remove orphaned blob {}: {}", file_url, cleanup);
                }
                return Err(e);
            }
        };

        tracing::info!("Document saved successfully. ID: {}, URL: {}", saved.id(), saved.document_url());

        Ok(UploadResponseDto {
            success: true,
            document_id: saved.id().to_string(),
            file_name,
            file_url,
            file_size,
            document_type: document_type.to_string(),
            category: saved.category().map(|c| c.to_string()),
            folder_path: folder.to_string(),
            message: "Document uploaded successfully".to_string(),
        })
    }

    async fn create_document(&self, dto: CreateDocumentDto) -> Result<DocumentDto, DomainError> {
        let document_type: DocumentType = dto.document_type.parse()?;
        let category = dto.category.as_deref().and_then(Category::parse);

        let record = DocumentRecord::new(NewDocument {
            user_id: dto.user_id,
            policy_id: dto.policy_id,
            claim_id: dto.claim_id,
            document_type,
            category,
            file_name: dto.file_name,
            document_url: dto.document_url,
            folder_path: None,
            file_size: dto.file_size.unwrap_or(0),
            structure: None,
        })?;

        let saved = self.repository.save(record).await?;
        tracing::info!("Document record created. ID: {}", saved.id());

        Ok(DocumentDto::from_record(saved, &self.classifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use bytes::Bytes;

    use crate::common::errors::ErrorKind;
    use crate::domain::repositories::document_repository::{DocumentRepositoryError, DocumentRepositoryResult};
    use crate::domain::services::path_service::FolderPath;
    use crate::domain::services::structure_classifier::FolderStructure;
    use crate::infrastructure::repositories::document_json_repository::DocumentJsonRepository;

    /// Records uploads in memory and hands out Azure-shaped URLs
    struct MockBlobStorage {
        uploads: Mutex<Vec<(String, usize, String)>>,
        deleted: Mutex<Vec<String>>,
    }

    impl MockBlobStorage {
        fn new() -> Self {
            Self {
                uploads: Mutex::new(Vec::new()),
                deleted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BlobStoragePort for MockBlobStorage {
        async fn upload_blob(
            &self,
            folder: &FolderPath,
            blob_name: &str,
            content: Bytes,
            content_type: &str,
        ) -> crate::common::errors::Result<String> {
            let blob_path = folder.blob_path(blob_name).to_string();
            self.uploads
                .lock()
                .unwrap()
                .push((blob_path.clone(), content.len(), content_type.to_string()));
            Ok(format!("https://acct.blob.core.windows.net/insurance-documents/{}", blob_path))
        }

        async fn delete_blob(&self, url: &str) -> crate::common::errors::Result<bool> {
            self.deleted.lock().unwrap().push(url.to_string());
            Ok(true)
        }

        fn backend_name(&self) -> &'static str {
            "mock"
        }
    }

    fn service(storage: Arc<MockBlobStorage>) -> (DocumentUploadService, Arc<DocumentJsonRepository>) {
        let repository = Arc::new(DocumentJsonRepository::new_in_memory());
        let service = DocumentUploadService::new(
            PathDeriver::default(),
            StructureClassifier::default(),
            storage,
            repository.clone(),
            UploadConfig::default(),
        );
        (service, repository)
    }

    fn command() -> UploadDocumentCommand {
        UploadDocumentCommand {
            user_id: Some("123".to_string()),
            document_type: Some("claim_document".to_string()),
            claim_id: Some("456".to_string()),
            category: Some("Death Certificate".to_string()),
            file_name: Some("certificate.PDF".to_string()),
            content_type: Some("application/pdf".to_string()),
            content: Bytes::from_static(b"%PDF-1.7"),
            ..UploadDocumentCommand::default()
        }
    }

    #[tokio::test]
    async fn test_upload_with_category() {
        let storage = Arc::new(MockBlobStorage::new());
        let (service, repository) = service(storage.clone());

        let response = service.upload_document(command()).await.unwrap();

        assert!(response.success);
        assert_eq!(response.folder_path, "claims/456/death-certificate");
        assert_eq!(response.category.as_deref(), Some("death-certificate"));
        assert_eq!(response.file_size, 8);
        assert!(response.file_url.contains("/claims/456/death-certificate/"));
        assert!(response.file_url.ends_with(".pdf"));

        let uploads = storage.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].2, "application/pdf");

        let stored = repository.get_by_id(&response.document_id).await.unwrap();
        assert_eq!(stored.structure(), Some(FolderStructure::Categorized));
        assert_eq!(stored.category().map(|c| c.as_str()), Some("death-certificate"));
        assert_eq!(stored.folder_path(), Some("claims/456/death-certificate"));
    }

    #[tokio::test]
    async fn test_upload_without_category_uses_legacy_folder() {
        let storage = Arc::new(MockBlobStorage::new());
        let (service, repository) = service(storage);

        let mut cmd = command();
        cmd.category = Some("   ".to_string());
        let response = service.upload_document(cmd).await.unwrap();

        assert_eq!(response.folder_path, "claims/456");
        assert_eq!(response.category, None);

        let stored = repository.get_by_id(&response.document_id).await.unwrap();
        assert_eq!(stored.structure(), Some(FolderStructure::Legacy));
        assert_eq!(stored.category(), None);
    }

    #[tokio::test]
    async fn test_upload_pending_claim() {
        let storage = Arc::new(MockBlobStorage::new());
        let (service, _) = service(storage);

        let mut cmd = command();
        cmd.claim_id = Some("not-a-number".to_string());
        cmd.category = Some("Claim Form".to_string());
        let response = service.upload_document(cmd).await.unwrap();

        assert_eq!(response.folder_path, "claims/pending/123/claim-form");
    }

    #[tokio::test]
    async fn test_user_scoped_upload_drops_category() {
        let storage = Arc::new(MockBlobStorage::new());
        let (service, repository) = service(storage);

        let mut cmd = command();
        cmd.document_type = Some("kyc_document".to_string());
        let response = service.upload_document(cmd).await.unwrap();

        assert_eq!(response.folder_path, "users/123/kyc");
        assert_eq!(response.category, None);
        let stored = repository.get_by_id(&response.document_id).await.unwrap();
        assert_eq!(stored.category(), None);
    }

    #[tokio::test]
    async fn test_upload_guesses_content_type() {
        let storage = Arc::new(MockBlobStorage::new());
        let (service, _) = service(storage.clone());

        let mut cmd = command();
        cmd.content_type = None;
        cmd.file_name = Some("scan.png".to_string());
        service.upload_document(cmd).await.unwrap();

        assert_eq!(storage.uploads.lock().unwrap()[0].2, "image/png");
    }

    #[tokio::test]
    async fn test_upload_validation_errors() {
        let storage = Arc::new(MockBlobStorage::new());
        let (service, _) = service(storage.clone());

        let cases: Vec<(UploadDocumentCommand, &str)> = vec![
            (UploadDocumentCommand { user_id: None, ..command() }, "userId is required"),
            (UploadDocumentCommand { user_id: Some("abc".into()), ..command() }, "userId must be a valid integer"),
            (UploadDocumentCommand { document_type: None, ..command() }, "cannot be empty"),
            (UploadDocumentCommand { document_type: Some("passport".into()), ..command() }, "Invalid documentType"),
            (UploadDocumentCommand { file_name: None, ..command() }, "File name is required"),
            (UploadDocumentCommand { file_name: Some("tool.exe".into()), ..command() }, "Invalid file type"),
            (UploadDocumentCommand { file_name: Some("noext".into()), ..command() }, "Invalid file type"),
            (UploadDocumentCommand { content: Bytes::new(), ..command() }, "File is empty"),
            (
                UploadDocumentCommand { content: Bytes::from(vec![0u8; 10 * 1024 * 1024 + 1]), ..command() },
                "exceeds maximum allowed size",
            ),
        ];

        for (cmd, expected) in cases {
            let err = service.upload_document(cmd).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidInput);
            assert!(err.message.contains(expected), "expected '{}' in '{}'", expected, err.message);
        }

        assert!(storage.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_name_with_path_is_rejected_before_storage() {
        let storage = Arc::new(MockBlobStorage::new());
        let (service, repository) = service(storage.clone());

        for name in ["C:\\fakepath\\scan.pdf", "../claims/9/scan.pdf"] {
            let mut cmd = command();
            cmd.file_name = Some(name.to_string());
            let err = service.upload_document(cmd).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidInput);
            assert!(err.message.contains("Invalid file name"), "message: {}", err.message);
        }

        assert!(storage.uploads.lock().unwrap().is_empty());
        assert!(repository.list_all().await.unwrap().is_empty());
    }

    /// Repository whose writes always fail
    struct BrokenRepository;

    #[async_trait]
    impl DocumentRepository for BrokenRepository {
        async fn save(&self, _: DocumentRecord) -> DocumentRepositoryResult<DocumentRecord> {
            Err(DocumentRepositoryError::Timeout("disk is busy".to_string()))
        }

        async fn get_by_id(&self, id: &str) -> DocumentRepositoryResult<DocumentRecord> {
            Err(DocumentRepositoryError::NotFound(id.to_string()))
        }

        async fn list_all(&self) -> DocumentRepositoryResult<Vec<DocumentRecord>> {
            Ok(Vec::new())
        }

        async fn list_by_user(&self, _: UserId) -> DocumentRepositoryResult<Vec<DocumentRecord>> {
            Ok(Vec::new())
        }

        async fn list_by_policy(&self, _: PolicyId) -> DocumentRepositoryResult<Vec<DocumentRecord>> {
            Ok(Vec::new())
        }

        async fn list_by_claim(&self, _: ClaimId) -> DocumentRepositoryResult<Vec<DocumentRecord>> {
            Ok(Vec::new())
        }

        async fn delete(&self, id: &str) -> DocumentRepositoryResult<DocumentRecord> {
            Err(DocumentRepositoryError::NotFound(id.to_string()))
        }
    }

    #[tokio::test]
    async fn test_blob_is_removed_when_record_cannot_be_saved() {
        let storage = Arc::new(MockBlobStorage::new());
        let service = DocumentUploadService::new(
            PathDeriver::default(),
            StructureClassifier::default(),
            storage.clone(),
            Arc::new(BrokenRepository),
            UploadConfig::default(),
        );

        let err = service.upload_document(command()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);

        let uploaded: Vec<String> = storage.uploads.lock().unwrap().iter().map(|u| u.0.clone()).collect();
        let deleted = storage.deleted.lock().unwrap().clone();
        assert_eq!(uploaded.len(), 1);
        assert_eq!(deleted.len(), 1);
        assert!(deleted[0].ends_with(&uploaded[0]));
    }

    #[tokio::test]
    async fn test_unknown_category_for_claim_type_is_still_stored() {
        let storage = Arc::new(MockBlobStorage::new());
        let (service, _) = service(storage);

        let mut cmd = command();
        cmd.claim_type = Some("car".to_string());
        let response = service.upload_document(cmd).await.unwrap();

        assert_eq!(response.category.as_deref(), Some("death-certificate"));
    }

    #[tokio::test]
    async fn test_create_document_without_marker_is_classified_from_url() {
        let storage = Arc::new(MockBlobStorage::new());
        let (service, repository) = service(storage);

        let dto = CreateDocumentDto {
            user_id: UserId(5),
            policy_id: Some(PolicyId(9)),
            claim_id: Some(ClaimId(77)),
            document_type: "claim_document".to_string(),
            document_url: "https://acct.blob.core.windows.net/c/claims/77/post-mortem/report.pdf".to_string(),
            category: Some("Post Mortem".to_string()),
            file_name: Some("report.pdf".to_string()),
            file_size: Some(2048),
        };

        let created = service.create_document(dto).await.unwrap();
        assert_eq!(created.structure, FolderStructure::Categorized);
        assert_eq!(created.category.as_deref(), Some("post-mortem"));
        assert_eq!(created.folder_path.as_deref(), Some("claims/77/post-mortem"));

        let stored = repository.get_by_id(&created.document_id).await.unwrap();
        assert_eq!(stored.structure(), None);
    }
}
