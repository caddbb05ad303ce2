use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use crate::application::ports::storage_ports::BlobStoragePort;
use crate::common::errors::{DomainError, ErrorContext, Result};
use crate::domain::services::path_service::{FolderPath, StoragePath};
use crate::domain::services::structure_classifier::StructureClassifier;

/// Blob storage on the local filesystem, used when Azure is not configured.
///
/// Blobs land at `{root}/{folder}/{blob}` and are served back under
/// `{public_base_url}/uploads/{folder}/{blob}`.
pub struct LocalBlobRepository {
    root: PathBuf,
    public_base_url: String,
    classifier: StructureClassifier,
}

impl LocalBlobRepository {
    pub fn new(root: PathBuf, public_base_url: &str, classifier: StructureClassifier) -> Self {
        Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            classifier,
        }
    }

    /// Resolves a storage path below the root, refusing anything that would escape it
    fn resolve(&self, path: &StoragePath) -> Result<PathBuf> {
        if path
            .segments()
            .iter()
            .any(|s| s == "." || s == ".." || s.contains('\\') || Path::new(s).is_absolute())
        {
            return Err(DomainError::validation_error(
                "BlobStorage",
                format!("Invalid blob path: {}", path),
            ));
        }

        Ok(path.segments().iter().fold(self.root.clone(), |acc, s| acc.join(s)))
    }

    fn url_for(&self, blob_path: &StoragePath) -> String {
        format!("{}/uploads/{}", self.public_base_url, blob_path)
    }

    /// Blob path of a URL this adapter handed out; other hosts and Azure URLs yield `None`
    fn own_blob_path(&self, url: &str) -> Option<StoragePath> {
        let prefix = format!("{}/uploads/", self.public_base_url);
        if !url.starts_with(&prefix) {
            return None;
        }
        self.classifier.blob_path(url)
    }
}

#[async_trait]
impl BlobStoragePort for LocalBlobRepository {
    async fn upload_blob(
        &self,
        folder: &FolderPath,
        blob_name: &str,
        content: Bytes,
        _content_type: &str,
    ) -> Result<String> {
        let blob_path = folder.blob_path(blob_name);
        let target = self.resolve(&blob_path)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create upload folder {}", parent.display()))?;
        }

        fs::write(&target, &content)
            .await
            .with_context(|| format!("Failed to write blob {}", target.display()))?;

        tracing::debug!("Stored {} bytes at {}", content.len(), target.display());
        Ok(self.url_for(&blob_path))
    }

    async fn delete_blob(&self, url: &str) -> Result<bool> {
        let Some(blob_path) = self.own_blob_path(url) else {
            tracing::warn!("URL does not point into local uploads at {}: {}", self.public_base_url, url);
            return Ok(false);
        };
        let target = self.resolve(&blob_path)?;

        match fs::remove_file(&target).await {
            Ok(()) => {
                tracing::debug!("Deleted local blob {}", target.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::internal_error(
                "BlobStorage",
                format!("Failed to delete blob {}", target.display()),
            )
            .with_source(e)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::domain::entities::category::Category;
    use crate::domain::entities::document::{ClaimId, DocumentType, UserId};
    use crate::domain::services::path_service::PathDeriver;

    fn claim_folder() -> FolderPath {
        let category = Category::parse("Claim Form").unwrap();
        PathDeriver::default()
            .derive(Some(UserId(1)), DocumentType::ClaimDocument, Some(ClaimId(42)), Some(&category))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_and_delete() {
        let temp_dir = tempdir().unwrap();
        let storage = LocalBlobRepository::new(
            temp_dir.path().to_path_buf(),
            "http://localhost:8000/",
            StructureClassifier::default(),
        );

        let url = storage
            .upload_blob(&claim_folder(), "abc.pdf", Bytes::from_static(b"data"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8000/uploads/claims/42/claim-form/abc.pdf");

        let on_disk = temp_dir.path().join("claims/42/claim-form/abc.pdf");
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), b"data");

        assert!(storage.delete_blob(&url).await.unwrap());
        assert!(!on_disk.exists());
        assert!(!storage.delete_blob(&url).await.unwrap());
    }

    #[tokio::test]
    async fn test_uploaded_url_keeps_its_layout() {
        let temp_dir = tempdir().unwrap();
        let classifier = StructureClassifier::default();
        let storage = LocalBlobRepository::new(temp_dir.path().to_path_buf(), "http://localhost:8000", classifier.clone());

        let url = storage
            .upload_blob(&claim_folder(), "abc.pdf", Bytes::from_static(b"x"), "application/pdf")
            .await
            .unwrap();
        assert!(classifier.has_category_folder(&url));
    }

    #[tokio::test]
    async fn test_foreign_url_is_not_deleted() {
        let temp_dir = tempdir().unwrap();
        let storage =
            LocalBlobRepository::new(temp_dir.path().to_path_buf(), "http://localhost:8000", StructureClassifier::default());

        assert!(!storage.delete_blob("https://example.com/a/b.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_urls_from_other_storage_leave_local_files_alone() {
        let temp_dir = tempdir().unwrap();
        let storage =
            LocalBlobRepository::new(temp_dir.path().to_path_buf(), "http://localhost:8000", StructureClassifier::default());

        let folder = StoragePath::from_string("claims/42");
        let on_disk = temp_dir.path().join("claims/42/stored.pdf");
        tokio::fs::create_dir_all(on_disk.parent().unwrap()).await.unwrap();
        tokio::fs::write(&on_disk, b"keep").await.unwrap();
        assert_eq!(storage.url_for(&folder.join("stored.pdf")), "http://localhost:8000/uploads/claims/42/stored.pdf");

        for url in [
            "https://acct.blob.core.windows.net/other-container/claims/42/stored.pdf",
            "http://other-host:9000/uploads/claims/42/stored.pdf",
            "http://localhost:8000/static/uploads/claims/42/stored.pdf",
        ] {
            assert!(!storage.delete_blob(url).await.unwrap(), "url: {url}");
        }
        assert!(on_disk.exists());

        assert!(storage
            .delete_blob("http://localhost:8000/uploads/claims/42/stored.pdf")
            .await
            .unwrap());
        assert!(!on_disk.exists());
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let storage =
            LocalBlobRepository::new(temp_dir.path().to_path_buf(), "http://localhost:8000", StructureClassifier::default());

        let result = storage.delete_blob("http://localhost:8000/uploads/../../etc/passwd").await;
        assert!(result.is_err());
    }
}
