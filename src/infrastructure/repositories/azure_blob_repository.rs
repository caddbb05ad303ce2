use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;

use crate::application::ports::storage_ports::BlobStoragePort;
use crate::common::config::StorageConfig;
use crate::common::errors::{DomainError, Result};
use crate::domain::services::path_service::{FolderPath, StoragePath};
use crate::domain::services::structure_classifier::StructureClassifier;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";
const API_VERSION_HEADER: &str = "x-ms-version";
const API_VERSION: &str = "2021-08-06";

/**
 * Azure Blob Storage through its REST API, authorised with a SAS token.
 *
 * Returned URLs never carry the token; it is appended only to outgoing
 * requests.
 */
pub struct AzureBlobRepository {
    client: reqwest::Client,
    account_name: String,
    container_name: String,
    sas_token: String,
    classifier: StructureClassifier,
}

impl AzureBlobRepository {
    pub fn new(
        account_name: String,
        container_name: String,
        sas_token: String,
        classifier: StructureClassifier,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            account_name,
            container_name,
            sas_token: sas_token.trim_start_matches('?').to_string(),
            classifier,
        })
    }

    /// Builds the adapter from configuration, or `None` when Azure is not configured
    pub fn from_config(config: &StorageConfig, classifier: StructureClassifier) -> Option<Result<Self>> {
        let account = config.azure_account_name.clone()?;
        let token = config.azure_sas_token.clone()?;
        Some(Self::new(account, config.azure_container_name.clone(), token, classifier))
    }

    fn container_url(&self) -> String {
        format!(
            "https://{}.blob.core.windows.net/{}",
            self.account_name, self.container_name
        )
    }

    fn blob_url(&self, blob_path: &StoragePath) -> String {
        format!("{}/{}", self.container_url(), blob_path)
    }

    fn signed(&self, url: &str, extra_query: Option<&str>) -> String {
        match extra_query {
            Some(query) => format!("{}?{}&{}", url, query, self.sas_token),
            None => format!("{}?{}", url, self.sas_token),
        }
    }

    /// Creates the container if needed; an existing container is fine
    pub async fn ensure_container(&self) -> Result<()> {
        let url = self.signed(&self.container_url(), Some("restype=container"));
        let response = self
            .client
            .put(url)
            .header(API_VERSION_HEADER, API_VERSION)
            .body(Bytes::new())
            .send()
            .await
            .map_err(request_error)?;

        match response.status() {
            status if status.is_success() => {
                tracing::info!("Created blob container '{}'", self.container_name);
                Ok(())
            }
            StatusCode::CONFLICT => {
                tracing::debug!("Blob container '{}' already exists", self.container_name);
                Ok(())
            }
            status => Err(status_error("create container", status)),
        }
    }

    /// Blob path of a URL that belongs to this account and container
    fn own_blob_path(&self, url: &str) -> Option<StoragePath> {
        let prefix = format!("{}/", self.container_url());
        if !url.starts_with(&prefix) {
            return None;
        }
        self.classifier.blob_path(url)
    }
}

fn request_error(err: reqwest::Error) -> DomainError {
    if err.is_timeout() {
        DomainError::timeout("BlobStorage", format!("Blob storage request timed out: {}", err))
    } else if err.is_connect() {
        DomainError::unavailable("BlobStorage", format!("Blob storage unreachable: {}", err))
    } else {
        DomainError::from(err)
    }
}

fn status_error(operation: &str, status: StatusCode) -> DomainError {
    match status {
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => DomainError::access_denied(
            "BlobStorage",
            format!("Blob storage refused to {} ({})", operation, status),
        ),
        StatusCode::SERVICE_UNAVAILABLE => DomainError::unavailable(
            "BlobStorage",
            format!("Blob storage unavailable during {}", operation),
        ),
        _ => DomainError::internal_error(
            "BlobStorage",
            format!("Blob storage failed to {} ({})", operation, status),
        ),
    }
}

#[async_trait]
impl BlobStoragePort for AzureBlobRepository {
    async fn upload_blob(
        &self,
        folder: &FolderPath,
        blob_name: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<String> {
        let blob_url = self.blob_url(&folder.blob_path(blob_name));
        let size = content.len();

        let response = self
            .client
            .put(self.signed(&blob_url, None))
            .header(BLOB_TYPE_HEADER, "BlockBlob")
            .header(API_VERSION_HEADER, API_VERSION)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            return Err(status_error("upload blob", response.status()));
        }

        tracing::info!("Uploaded {} bytes to {}", size, blob_url);
        Ok(blob_url)
    }

    async fn delete_blob(&self, url: &str) -> Result<bool> {
        let Some(blob_path) = self.own_blob_path(url) else {
            tracing::warn!("URL does not belong to container '{}': {}", self.container_name, url);
            return Ok(false);
        };

        let response = self
            .client
            .delete(self.signed(&self.blob_url(&blob_path), None))
            .header(API_VERSION_HEADER, API_VERSION)
            .send()
            .await
            .map_err(request_error)?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(status_error("delete blob", status)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "azure"
    }
}
