use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::category::{Category, ClaimType};
use crate::domain::entities::document::{ClaimId, DocumentRecord, PolicyId, UserId};
use crate::domain::services::path_service::FolderPath;
use crate::domain::services::structure_classifier::{FolderStructure, StructureClassifier};

/// Raw upload form, validated by the upload service
#[derive(Debug, Clone, Default)]
pub struct UploadDocumentCommand {
    pub user_id: Option<String>,
    pub document_type: Option<String>,
    pub policy_id: Option<String>,
    pub claim_id: Option<String>,
    pub category: Option<String>,
    pub claim_type: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub content: Bytes,
}

/// Response for a successful upload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponseDto {
    pub success: bool,
    pub document_id: String,
    pub file_name: String,
    pub file_url: String,
    pub file_size: u64,
    pub document_type: String,
    pub category: Option<String>,
    pub folder_path: String,
    pub message: String,
}

/// Body for recording an already-uploaded document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentDto {
    pub user_id: UserId,
    #[serde(default)]
    pub policy_id: Option<PolicyId>,
    #[serde(default)]
    pub claim_id: Option<ClaimId>,
    pub document_type: String,
    pub document_url: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Category as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum DisplayCategory {
    Categorized(String),
    Uncategorized,
}

impl From<Option<&Category>> for DisplayCategory {
    fn from(category: Option<&Category>) -> Self {
        match category {
            Some(category) => DisplayCategory::Categorized(category.to_string()),
            None => DisplayCategory::Uncategorized,
        }
    }
}

/// DTO for document responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDto {
    pub document_id: String,
    pub user_id: UserId,
    pub policy_id: Option<PolicyId>,
    pub claim_id: Option<ClaimId>,
    pub document_type: String,
    pub document_url: String,
    pub file_name: Option<String>,
    pub file_size: u64,
    pub upload_date: DateTime<Utc>,
    pub category: Option<String>,
    pub display_category: DisplayCategory,
    pub folder_path: Option<String>,
    pub structure: FolderStructure,
    pub has_category_folder: bool,
}

impl DocumentDto {
    /// Builds the response view of a record.
    ///
    /// The stored structure marker wins; records without one are classified
    /// from their URL. The folder path falls back to the one in the URL.
    pub fn from_record(record: DocumentRecord, classifier: &StructureClassifier) -> Self {
        let structure = record
            .structure()
            .unwrap_or_else(|| classifier.classify(record.document_url()));
        let folder_path = record
            .folder_path()
            .map(str::to_string)
            .or_else(|| classifier.extract_folder(record.document_url()).map(|p| p.to_string()));

        Self {
            document_id: record.id().to_string(),
            user_id: record.user_id(),
            policy_id: record.policy_id(),
            claim_id: record.claim_id(),
            document_type: record.document_type().to_string(),
            document_url: record.document_url().to_string(),
            file_name: record.file_name().map(str::to_string),
            file_size: record.file_size(),
            upload_date: record.upload_date(),
            category: record.category().map(|c| c.to_string()),
            display_category: DisplayCategory::from(record.category()),
            folder_path,
            structure,
            has_category_folder: structure == FolderStructure::Categorized,
        }
    }
}

/// Query for deriving a folder path without uploading
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderPathQuery {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub document_type: String,
    #[serde(default)]
    pub claim_id: Option<ClaimId>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderPathDto {
    pub folder_path: String,
    pub segments: Vec<String>,
    pub category: Option<String>,
    pub structure: FolderStructure,
}

impl FolderPathDto {
    pub fn new(folder: &FolderPath, category: Option<&Category>) -> Self {
        Self {
            folder_path: folder.to_string(),
            segments: folder.segments().to_vec(),
            category: category.filter(|_| folder.has_category()).map(|c| c.to_string()),
            structure: folder.structure(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StructureQuery {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureDto {
    pub url: String,
    pub folder_path: Option<String>,
    pub has_category_folder: bool,
    pub structure: FolderStructure,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEntryDto {
    pub id: String,
    pub display_name: Option<String>,
}

/// Category checklist for one claim type
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListDto {
    pub claim_type: ClaimType,
    pub categories: Vec<CategoryEntryDto>,
}

impl From<ClaimType> for CategoryListDto {
    fn from(claim_type: ClaimType) -> Self {
        let categories = claim_type
            .categories()
            .into_iter()
            .map(|id| CategoryEntryDto {
                id: id.to_string(),
                display_name: claim_type.display_name_for(id).map(str::to_string),
            })
            .collect();

        Self { claim_type, categories }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::document::{DocumentType, NewDocument};

    fn record(url: &str, category: Option<&str>, structure: Option<FolderStructure>) -> DocumentRecord {
        DocumentRecord::new(NewDocument {
            user_id: UserId(1),
            policy_id: None,
            claim_id: Some(ClaimId(123)),
            document_type: DocumentType::ClaimDocument,
            category: category.and_then(Category::parse),
            file_name: None,
            document_url: url.to_string(),
            folder_path: None,
            file_size: 10,
            structure,
        })
        .unwrap()
    }

    #[test]
    fn test_uncategorized_record_falls_back() {
        let classifier = StructureClassifier::default();
        let dto = DocumentDto::from_record(
            record("https://acct.blob.core.windows.net/c/claims/123/doc.pdf", None, None),
            &classifier,
        );

        assert_eq!(dto.category, None);
        assert_eq!(dto.display_category, DisplayCategory::Uncategorized);
        assert_eq!(dto.structure, FolderStructure::Legacy);
        assert!(!dto.has_category_folder);
        assert_eq!(dto.folder_path.as_deref(), Some("claims/123"));

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["displayCategory"], serde_json::json!({ "status": "uncategorized" }));
    }

    #[test]
    fn test_categorized_record_uses_category() {
        let classifier = StructureClassifier::default();
        let dto = DocumentDto::from_record(
            record(
                "https://acct.blob.core.windows.net/c/claims/123/death-certificate/doc.pdf",
                Some("death-certificate"),
                None,
            ),
            &classifier,
        );

        assert_eq!(dto.display_category, DisplayCategory::Categorized("death-certificate".to_string()));
        assert!(dto.has_category_folder);

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json["displayCategory"],
            serde_json::json!({ "status": "categorized", "value": "death-certificate" })
        );
    }

    #[test]
    fn test_stored_marker_wins_over_url() {
        let classifier = StructureClassifier::default();
        // URL that does not match the blob layout, but the record knows better.
        let dto = DocumentDto::from_record(
            record("https://cdn.example.com/x.pdf", Some("claim-form"), Some(FolderStructure::Categorized)),
            &classifier,
        );
        assert_eq!(dto.structure, FolderStructure::Categorized);
        assert_eq!(dto.folder_path, None);
    }

    #[test]
    fn test_category_list_dto() {
        let dto = CategoryListDto::from(ClaimType::Life);
        assert_eq!(dto.categories.len(), 10);
        let death = dto.categories.iter().find(|c| c.id == "death-certificate").unwrap();
        assert_eq!(death.display_name.as_deref(), Some("Death Certificate"));

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["claimType"], "life");
    }
}
