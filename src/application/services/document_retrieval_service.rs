use std::sync::Arc;

use async_trait::async_trait;

use crate::application::dtos::document_dto::{DocumentDto, FolderPathDto, FolderPathQuery, StructureDto};
use crate::application::ports::document_ports::DocumentRetrievalUseCase;
use crate::common::errors::DomainError;
use crate::domain::entities::category::Category;
use crate::domain::entities::document::{ClaimId, DocumentRecord, DocumentType, PolicyId, UserId};
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::domain::services::path_service::PathDeriver;
use crate::domain::services::structure_classifier::StructureClassifier;

/// Read-side document use cases
pub struct DocumentRetrievalService {
    path_deriver: PathDeriver,
    classifier: StructureClassifier,
    repository: Arc<dyn DocumentRepository>,
}

impl DocumentRetrievalService {
    pub fn new(
        path_deriver: PathDeriver,
        classifier: StructureClassifier,
        repository: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self {
            path_deriver,
            classifier,
            repository,
        }
    }

    fn to_dtos(&self, records: Vec<DocumentRecord>) -> Vec<DocumentDto> {
        records
            .into_iter()
            .map(|record| DocumentDto::from_record(record, &self.classifier))
            .collect()
    }
}

#[async_trait]
impl DocumentRetrievalUseCase for DocumentRetrievalService {
    async fn get_document(&self, id: &str) -> Result<DocumentDto, DomainError> {
        let record = self.repository.get_by_id(id).await?;
        Ok(DocumentDto::from_record(record, &self.classifier))
    }

    async fn list_documents(&self) -> Result<Vec<DocumentDto>, DomainError> {
        let records = self.repository.list_all().await?;
        tracing::debug!("Listing {} documents", records.len());
        Ok(self.to_dtos(records))
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<DocumentDto>, DomainError> {
        let records = self.repository.list_by_user(user_id).await?;
        tracing::debug!("Found {} documents for user {}", records.len(), user_id);
        Ok(self.to_dtos(records))
    }

    async fn list_by_policy(&self, policy_id: PolicyId) -> Result<Vec<DocumentDto>, DomainError> {
        let records = self.repository.list_by_policy(policy_id).await?;
        Ok(self.to_dtos(records))
    }

    async fn list_by_claim(&self, claim_id: ClaimId) -> Result<Vec<DocumentDto>, DomainError> {
        let records = self.repository.list_by_claim(claim_id).await?;
        tracing::debug!("Found {} documents for claim {}", records.len(), claim_id);
        Ok(self.to_dtos(records))
    }

    fn derive_folder_path(&self, query: FolderPathQuery) -> Result<FolderPathDto, DomainError> {
        let document_type: DocumentType = query.document_type.parse()?;
        let category = query.category.as_deref().and_then(Category::parse);

        let folder = self
            .path_deriver
            .derive(query.user_id, document_type, query.claim_id, category.as_ref())?;

        Ok(FolderPathDto::new(&folder, category.as_ref()))
    }

    fn inspect_url(&self, url: &str) -> StructureDto {
        let structure = self.classifier.classify(url);
        StructureDto {
            url: url.to_string(),
            folder_path: self.classifier.extract_folder(url).map(|p| p.to_string()),
            has_category_folder: self.classifier.has_category_folder(url),
            structure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::application::dtos::document_dto::DisplayCategory;
    use crate::common::errors::ErrorKind;
    use crate::domain::entities::document::NewDocument;
    use crate::domain::services::structure_classifier::FolderStructure;
    use crate::infrastructure::repositories::document_json_repository::DocumentJsonRepository;

    const BLOB: &str = "https://acct.blob.core.windows.net/insurance-documents";

    fn new_document(user: i64, claim: Option<i64>, url: &str, category: Option<&str>) -> NewDocument {
        NewDocument {
            user_id: UserId(user),
            policy_id: Some(PolicyId(10)),
            claim_id: claim.map(ClaimId),
            document_type: DocumentType::ClaimDocument,
            category: category.and_then(Category::parse),
            file_name: Some("a.pdf".to_string()),
            document_url: url.to_string(),
            folder_path: None,
            file_size: 100,
            structure: None,
        }
    }

    async fn seeded() -> DocumentRetrievalService {
        let repository = Arc::new(DocumentJsonRepository::new_in_memory());
        repository
            .save(DocumentRecord::new(new_document(1, Some(456), &format!("{BLOB}/claims/456/a.pdf"), None)).unwrap())
            .await
            .unwrap();
        repository
            .save(
                DocumentRecord::new(new_document(
                    1,
                    Some(456),
                    &format!("{BLOB}/claims/456/death-certificate/b.pdf"),
                    Some("death-certificate"),
                ))
                .unwrap(),
            )
            .await
            .unwrap();
        repository
            .save(DocumentRecord::new(new_document(2, Some(789), &format!("{BLOB}/claims/789/c.pdf"), None)).unwrap())
            .await
            .unwrap();

        DocumentRetrievalService::new(PathDeriver::default(), StructureClassifier::default(), repository)
    }

    #[tokio::test]
    async fn test_mixed_claim_listing() {
        let service = seeded().await;
        let documents = service.list_by_claim(ClaimId(456)).await.unwrap();

        assert_eq!(documents.len(), 2);
        let legacy = documents.iter().find(|d| d.category.is_none()).unwrap();
        assert_eq!(legacy.structure, FolderStructure::Legacy);
        assert_eq!(legacy.display_category, DisplayCategory::Uncategorized);

        let categorized = documents.iter().find(|d| d.category.is_some()).unwrap();
        assert_eq!(categorized.structure, FolderStructure::Categorized);
        assert_eq!(categorized.folder_path.as_deref(), Some("claims/456/death-certificate"));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let service = seeded().await;

        assert_eq!(service.list_documents().await.unwrap().len(), 3);
        assert_eq!(service.list_by_user(UserId(1)).await.unwrap().len(), 2);
        assert_eq!(service.list_by_user(UserId(3)).await.unwrap().len(), 0);
        assert_eq!(service.list_by_policy(PolicyId(10)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_get_missing_document() {
        let service = seeded().await;
        let err = service.get_document("nope").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_derive_folder_path() {
        let service = seeded().await;

        let dto = service
            .derive_folder_path(FolderPathQuery {
                user_id: Some(UserId(123)),
                document_type: "claim_document".to_string(),
                claim_id: None,
                category: Some("Claim Form".to_string()),
            })
            .unwrap();
        assert_eq!(dto.folder_path, "claims/pending/123/claim-form");
        assert_eq!(dto.category.as_deref(), Some("claim-form"));
        assert_eq!(dto.structure, FolderStructure::Categorized);

        let err = service
            .derive_folder_path(FolderPathQuery {
                user_id: None,
                document_type: "claim_document".to_string(),
                claim_id: None,
                category: None,
            })
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_inspect_url() {
        let service = seeded().await;

        let dto = service.inspect_url(&format!("{BLOB}/claims/pending/123/claim-form/x.pdf?sv=1"));
        assert!(dto.has_category_folder);
        assert_eq!(dto.folder_path.as_deref(), Some("claims/pending/123/claim-form"));

        let dto = service.inspect_url("not a url");
        assert_eq!(dto.structure, FolderStructure::Legacy);
        assert_eq!(dto.folder_path, None);
    }
}
