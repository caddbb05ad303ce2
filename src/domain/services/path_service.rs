//! Folder layout for stored documents.
//!
//! Claim documents live under `claims/{claimId}` or, before a claim exists,
//! under `claims/pending/{userId}`. Since categories were introduced the
//! category is appended as one more segment; documents uploaded without a
//! category keep the pre-category shape. Everything else lives under
//! `users/{userId}/{baseFolder}`.

use std::fmt;

use crate::common::config::LayoutConfig;
use crate::common::errors::DomainError;
use crate::domain::entities::category::Category;
use crate::domain::entities::document::{ClaimId, DocumentType, UserId};
use crate::domain::services::structure_classifier::FolderStructure;

/// Relative storage path without a leading slash
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoragePath {
    segments: Vec<String>,
}

impl StoragePath {
    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    /// Builds a path from a `/`-separated string, dropping empty segments
    pub fn from_string(path: &str) -> Self {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        Self { segments }
    }

    pub fn join(&self, segment: &str) -> Self {
        let mut new_segments = self.segments.clone();
        new_segments.push(segment.to_string());
        Self { segments: new_segments }
    }

    /// Last segment
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            let parent_segments = self.segments[..self.segments.len() - 1].to_vec();
            Some(Self { segments: parent_segments })
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Derived folder for a document, e.g. `claims/456/death-certificate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPath {
    path: StoragePath,
    categorized: bool,
}

impl FolderPath {
    pub fn storage_path(&self) -> &StoragePath {
        &self.path
    }

    pub fn segments(&self) -> &[String] {
        self.path.segments()
    }

    /// Whether the last segment is a category
    pub fn has_category(&self) -> bool {
        self.categorized
    }

    pub fn structure(&self) -> FolderStructure {
        if self.categorized {
            FolderStructure::Categorized
        } else {
            FolderStructure::Legacy
        }
    }

    /// Full blob path for a file stored in this folder
    pub fn blob_path(&self, blob_name: &str) -> StoragePath {
        self.path.join(blob_name)
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}

/// Computes storage folders from a document's routing fields
#[derive(Debug, Clone)]
pub struct PathDeriver {
    layout: LayoutConfig,
}

impl Default for PathDeriver {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl PathDeriver {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Derives the folder for a document.
    ///
    /// The category is appended verbatim for claim documents and ignored for
    /// user-scoped ones. Fails when no root can be built: a claim document
    /// with neither claim nor user id, or a user-scoped document without a
    /// user id.
    pub fn derive(
        &self,
        user_id: Option<UserId>,
        document_type: DocumentType,
        claim_id: Option<ClaimId>,
        category: Option<&Category>,
    ) -> Result<FolderPath, DomainError> {
        let claims_root = StoragePath::root().join(&self.layout.claims_root);

        let root = match (document_type.is_claim_scoped(), claim_id, user_id) {
            (true, Some(claim_id), _) => claims_root.join(&claim_id.to_string()),
            (true, None, Some(user_id)) => claims_root
                .join(&self.layout.pending_segment)
                .join(&user_id.to_string()),
            (true, None, None) => {
                return Err(DomainError::validation_error(
                    "FolderPath",
                    "claim documents need a claimId or a userId to build a folder path",
                ));
            }
            (false, _, Some(user_id)) => {
                let path = StoragePath::root()
                    .join(&self.layout.users_root)
                    .join(&user_id.to_string())
                    .join(document_type.base_folder());
                return Ok(FolderPath { path, categorized: false });
            }
            (false, _, None) => {
                return Err(DomainError::validation_error(
                    "FolderPath",
                    format!("{} documents need a userId to build a folder path", document_type),
                ));
            }
        };

        let folder = match category {
            Some(category) => FolderPath {
                path: root.join(category.as_str()),
                categorized: true,
            },
            None => FolderPath { path: root, categorized: false },
        };

        tracing::debug!(
            "Derived folder '{}' for {} (claim: {:?}, category: {:?})",
            folder,
            document_type,
            claim_id,
            category.map(|c| c.as_str())
        );

        Ok(folder)
    }
}
