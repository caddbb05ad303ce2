use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: [u8; 4],
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: [127, 0, 0, 1],
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

/// Storage backends and where local data lives
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding `documents.json`
    pub data_dir: PathBuf,
    /// Root of the local blob fallback, served under `/uploads`
    pub uploads_dir: PathBuf,
    /// Base URL used to build local blob URLs
    pub public_base_url: String,
    pub azure_account_name: Option<String>,
    pub azure_container_name: String,
    /// SAS token without the leading `?`
    pub azure_sas_token: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./storage"),
            uploads_dir: PathBuf::from("./uploads"),
            public_base_url: "http://localhost:8000".to_string(),
            azure_account_name: None,
            azure_container_name: "insurance-documents".to_string(),
            azure_sas_token: None,
        }
    }
}

impl StorageConfig {
    /// Azure is used only when both the account and a SAS token are present
    pub fn azure_enabled(&self) -> bool {
        self.azure_account_name.is_some() && self.azure_sas_token.is_some()
    }

    pub fn records_file(&self) -> PathBuf {
        self.data_dir.join("documents.json")
    }
}

/// Limits applied to uploads
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size_bytes: usize,
    /// Lowercase, dot-prefixed
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 10 * 1024 * 1024, // 10 MB
            allowed_extensions: [
                ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".bmp",
                ".doc", ".docx", ".xls", ".xlsx", ".txt",
            ]
            .iter()
            .map(|ext| ext.to_string())
            .collect(),
        }
    }
}

impl UploadConfig {
    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        let extension = extension.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|allowed| *allowed == extension)
    }

    pub fn max_file_size_mb(&self) -> f64 {
        self.max_file_size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Markers describing how stored URLs and folder paths are laid out
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Host marker preceding `{container}/...` in blob URLs
    pub blob_host_marker: String,
    /// Path marker preceding the folder in local storage URLs
    pub local_uploads_marker: String,
    pub claims_root: String,
    pub pending_segment: String,
    pub users_root: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            blob_host_marker: "blob.core.windows.net/".to_string(),
            local_uploads_marker: "/uploads/".to_string(),
            claims_root: "claims".to_string(),
            pending_segment: "pending".to_string(),
            users_root: "users".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub uploads: UploadConfig,
    pub layout: LayoutConfig,
}

impl AppConfig {
    /// Builds the configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(host) = env_var("SERVER_HOST") {
            match parse_host(&host) {
                Some(octets) => config.server.host = octets,
                None => tracing::warn!("Ignoring invalid SERVER_HOST: {}", host),
            }
        }
        if let Some(port) = env_parse::<u16>("SERVER_PORT") {
            config.server.port = port;
        }

        if let Some(dir) = env_var("CLAIMDOCS_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env_var("CLAIMDOCS_UPLOADS_DIR") {
            config.storage.uploads_dir = PathBuf::from(dir);
        }
        config.storage.public_base_url = env_var("CLAIMDOCS_PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", config.server.port))
            .trim_end_matches('/')
            .to_string();

        config.storage.azure_account_name = env_var("AZURE_STORAGE_ACCOUNT_NAME");
        if let Some(container) = env_var("AZURE_STORAGE_CONTAINER_NAME") {
            config.storage.azure_container_name = container;
        }
        config.storage.azure_sas_token = env_var("AZURE_STORAGE_SAS_TOKEN")
            .map(|token| token.trim_start_matches('?').to_string());

        if let Some(max) = env_parse::<usize>("CLAIMDOCS_MAX_UPLOAD_BYTES") {
            config.uploads.max_file_size_bytes = max;
        }

        config
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env_var(key)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {}", key, raw);
            None
        }
    }
}

fn parse_host(host: &str) -> Option<[u8; 4]> {
    let addr: std::net::Ipv4Addr = host.parse().ok()?;
    Some(addr.octets())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_upload_extensions() {
        let uploads = UploadConfig::default();
        assert!(uploads.is_allowed_extension(".pdf"));
        assert!(uploads.is_allowed_extension(".PDF"));
        assert!(uploads.is_allowed_extension(".docx"));
        assert!(!uploads.is_allowed_extension(".exe"));
        assert!(!uploads.is_allowed_extension(""));
        assert_eq!(uploads.max_file_size_mb(), 10.0);
    }

    #[test]
    fn test_azure_requires_account_and_token() {
        let mut storage = StorageConfig::default();
        assert!(!storage.azure_enabled());

        storage.azure_account_name = Some("acct".to_string());
        assert!(!storage.azure_enabled());

        storage.azure_sas_token = Some("sv=2024&sig=abc".to_string());
        assert!(storage.azure_enabled());
        assert_eq!(storage.azure_container_name, "insurance-documents");
    }

    #[test]
    fn test_parse_host() {
        assert_eq!(parse_host("0.0.0.0"), Some([0, 0, 0, 0]));
        assert_eq!(parse_host("localhost"), None);
    }
}
