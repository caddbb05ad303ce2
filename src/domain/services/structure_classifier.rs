use serde::{Deserialize, Serialize};

use crate::common::config::LayoutConfig;
use crate::domain::services::path_service::StoragePath;

/// Folder layout a stored document follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderStructure {
    /// `claims/{claimId}/{file}` or `claims/pending/{userId}/{file}`, and all user-scoped folders
    Legacy,
    /// `claims/{claimId}/{category}/{file}` or `claims/pending/{userId}/{category}/{file}`
    Categorized,
}

/// Infers the folder layout of a stored document from its URL.
///
/// Never fails: anything it cannot make sense of is reported as legacy.
#[derive(Debug, Clone)]
pub struct StructureClassifier {
    layout: LayoutConfig,
}

impl Default for StructureClassifier {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl StructureClassifier {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Blob path of a stored file relative to its container (or to the local uploads root).
    ///
    /// Blob URLs need at least a container, one folder segment and a file name.
    pub fn blob_path(&self, url: &str) -> Option<StoragePath> {
        let url = strip_query(url);

        if let Some((_, rest)) = url.split_once(self.layout.blob_host_marker.as_str()) {
            let path = StoragePath::from_string(rest);
            if path.len() > 2 {
                let without_container = path.segments()[1..].join("/");
                return Some(StoragePath::from_string(&without_container));
            }
            return None;
        }

        if let Some((_, rest)) = url.split_once(self.layout.local_uploads_marker.as_str()) {
            let path = StoragePath::from_string(rest);
            if !path.is_empty() {
                return Some(path);
            }
        }

        None
    }

    /// Folder portion of a stored document's URL, e.g. `claims/123/death-certificate`
    pub fn extract_folder(&self, url: &str) -> Option<StoragePath> {
        self.blob_path(url)
            .and_then(|path| path.parent())
            .filter(|folder| !folder.is_empty())
    }

    /// True when the URL points into a category folder of the claims tree
    pub fn has_category_folder(&self, url: &str) -> bool {
        let Some(folder) = self.extract_folder(url) else {
            return false;
        };

        let segments = folder.segments();
        if segments.len() < 3 || segments[0] != self.layout.claims_root {
            return false;
        }

        if segments[1] == self.layout.pending_segment {
            segments.len() >= 4
        } else {
            true
        }
    }

    pub fn classify(&self, url: &str) -> FolderStructure {
        if self.has_category_folder(url) {
            FolderStructure::Categorized
        } else {
            FolderStructure::Legacy
        }
    }
}

fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}
