use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::errors::DomainError;
use crate::domain::entities::category::{deserialize_optional_category, Category};
use crate::domain::services::structure_classifier::FolderStructure;

macro_rules! numeric_id {
    ($name:ident, $entity:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map($name).map_err(|_| {
                    DomainError::validation_error($entity, format!("{} must be a valid integer", $entity))
                })
            }
        }
    };
}

numeric_id!(UserId, "userId");
numeric_id!(ClaimId, "claimId");
numeric_id!(PolicyId, "policyId");

/// Kinds of document the application stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    KycDocument,
    IdCard,
    PanCard,
    PolicyDocument,
    ClaimDocument,
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 6] = [
        DocumentType::KycDocument,
        DocumentType::IdCard,
        DocumentType::PanCard,
        DocumentType::PolicyDocument,
        DocumentType::ClaimDocument,
        DocumentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::KycDocument => "kyc_document",
            DocumentType::IdCard => "id_card",
            DocumentType::PanCard => "pan_card",
            DocumentType::PolicyDocument => "policy_document",
            DocumentType::ClaimDocument => "claim_document",
            DocumentType::Other => "other",
        }
    }

    /// Folder name used under `users/{userId}/`
    pub fn base_folder(&self) -> &'static str {
        match self {
            DocumentType::KycDocument => "kyc",
            DocumentType::IdCard => "id_cards",
            DocumentType::PanCard => "pan_cards",
            DocumentType::PolicyDocument => "policies",
            DocumentType::ClaimDocument => "claims",
            DocumentType::Other => "other",
        }
    }

    pub fn is_claim_scoped(&self) -> bool {
        matches!(self, DocumentType::ClaimDocument)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation_error(
                "DocumentType",
                "documentType is required and cannot be empty",
            ));
        }

        DocumentType::ALL
            .iter()
            .copied()
            .find(|doc_type| doc_type.as_str() == trimmed)
            .ok_or_else(|| {
                let mut allowed: Vec<&str> = DocumentType::ALL.iter().map(|t| t.as_str()).collect();
                allowed.sort_unstable();
                DomainError::validation_error(
                    "DocumentType",
                    format!(
                        "Invalid documentType: '{}'. Allowed types are: {}",
                        trimmed,
                        allowed.join(", ")
                    ),
                )
            })
    }
}

/// Stored metadata for one uploaded document.
///
/// Path fields are write-once: there is no setter for the URL, the folder
/// path or the category, and repositories expose no update operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    id: String,

    user_id: UserId,

    #[serde(default)]
    policy_id: Option<PolicyId>,

    #[serde(default)]
    claim_id: Option<ClaimId>,

    document_type: DocumentType,

    #[serde(default, deserialize_with = "deserialize_optional_category")]
    category: Option<Category>,

    #[serde(default)]
    file_name: Option<String>,

    document_url: String,

    /// Folder the blob was written under; absent on records created from a bare URL
    #[serde(default)]
    folder_path: Option<String>,

    #[serde(default)]
    file_size: u64,

    upload_date: DateTime<Utc>,

    /// Layout marker; records written before the marker existed have none
    #[serde(default)]
    structure: Option<FolderStructure>,
}

/// Fields needed to create a [`DocumentRecord`]
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: UserId,
    pub policy_id: Option<PolicyId>,
    pub claim_id: Option<ClaimId>,
    pub document_type: DocumentType,
    pub category: Option<Category>,
    pub file_name: Option<String>,
    pub document_url: String,
    pub folder_path: Option<String>,
    pub file_size: u64,
    pub structure: Option<FolderStructure>,
}

impl DocumentRecord {
    /// Creates a record with a fresh id and the current time as upload date
    pub fn new(fields: NewDocument) -> Result<Self, DomainError> {
        Self::with_id_and_date(uuid::Uuid::new_v4().to_string(), Utc::now(), fields)
    }

    /// Rebuilds a record with known id and upload date
    pub fn with_id_and_date(
        id: String,
        upload_date: DateTime<Utc>,
        fields: NewDocument,
    ) -> Result<Self, DomainError> {
        if fields.document_url.trim().is_empty() {
            return Err(DomainError::validation_error("Document", "documentUrl is required"));
        }
        if let Some(name) = &fields.file_name {
            if name.contains('/') || name.contains('\\') {
                return Err(DomainError::validation_error(
                    "Document",
                    format!("Invalid file name: {}", name),
                ));
            }
        }

        Ok(Self {
            id,
            user_id: fields.user_id,
            policy_id: fields.policy_id,
            claim_id: fields.claim_id,
            document_type: fields.document_type,
            category: fields.category,
            file_name: fields.file_name,
            document_url: fields.document_url,
            folder_path: fields.folder_path,
            file_size: fields.file_size,
            upload_date,
            structure: fields.structure,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn policy_id(&self) -> Option<PolicyId> {
        self.policy_id
    }

    pub fn claim_id(&self) -> Option<ClaimId> {
        self.claim_id
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    pub fn folder_path(&self) -> Option<&str> {
        self.folder_path.as_deref()
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn upload_date(&self) -> DateTime<Utc> {
        self.upload_date
    }

    pub fn structure(&self) -> Option<FolderStructure> {
        self.structure
    }
}
