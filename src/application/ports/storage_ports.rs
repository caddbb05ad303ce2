use async_trait::async_trait;
use bytes::Bytes;

use crate::common::errors::Result;
use crate::domain::services::path_service::FolderPath;

/// Secondary port for blob storage
#[async_trait]
pub trait BlobStoragePort: Send + Sync + 'static {
    /// Writes `content` as `{folder}/{blob_name}` and returns the public URL of the blob
    async fn upload_blob(
        &self,
        folder: &FolderPath,
        blob_name: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<String>;

    /// Deletes the blob behind a URL previously returned by `upload_blob`.
    /// Returns `false` when there was nothing to delete.
    async fn delete_blob(&self, url: &str) -> Result<bool>;

    /// Short name used in logs
    fn backend_name(&self) -> &'static str;
}
