use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "folio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Runtime configuration: an optional TOML file overlaid with environment
/// variables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub limits: LimitsConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub public_base_url: String,
    pub secure_cookies: bool,
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            public_base_url: "http://localhost:3000".to_string(),
            secure_cookies: false,
            cors_origin: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "folio.db".to_string(),
            auth_token: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub region: String,
    pub user_pool_id: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub domain: String,
    /// HS256 secret used instead of the identity provider when set.
    pub dev_shared_secret: Option<String>,
}

impl AuthConfig {
    pub fn issuer(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }

    pub fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.issuer())
    }

    pub fn is_identity_provider_configured(&self) -> bool {
        !self.region.is_empty()
            && !self.user_pool_id.is_empty()
            && !self.client_id.is_empty()
            && !self.domain.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "local" => Ok(Self::Local),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub cdn_url: String,
    pub local_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            bucket: String::new(),
            region: "us-east-1".to_string(),
            access_key_id: None,
            secret_access_key: None,
            cdn_url: "http://localhost:3000/media".to_string(),
            local_dir: PathBuf::from("media"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    Smtp,
    Log,
}

impl FromStr for MailBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp),
            "log" => Ok(Self::Log),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub backend: MailBackend,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from: String,
    pub contact_email: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            backend: MailBackend::Log,
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from: "noreply@example.com".to_string(),
            contact_email: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub contact_requests: u32,
    pub contact_window_secs: u64,
    pub upload_requests: u32,
    pub upload_window_secs: u64,
    pub max_upload_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            contact_requests: 5,
            contact_window_secs: 15 * 60,
            upload_requests: 20,
            upload_window_secs: 60,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9898,
        }
    }
}

/// `RUST_LOG`, when set, still wins over `filter`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub file_name: String,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_name: "folio.log".to_string(),
            filter: "folio_api=info,folio_core=info,tower_http=info".to_string(),
        }
    }
}

impl Config {
    /// Load `path`, or `folio.toml` when it exists, then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Overlay deployment variables; `lookup` is `std::env::var` outside tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("PORT") {
            self.server.port = parse("PORT", &v)?;
        }
        if let Some(v) = get("PUBLIC_BASE_URL") {
            self.server.public_base_url = v;
        }
        if let Some(v) = get("SECURE_COOKIES") {
            self.server.secure_cookies = parse_bool("SECURE_COOKIES", &v)?;
        }
        if let Some(v) = get("CORS_ORIGIN") {
            self.server.cors_origin = Some(v);
        }

        if let Some(v) = get("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = get("DATABASE_AUTH_TOKEN") {
            self.database.auth_token = Some(v);
        }

        if let Some(v) = get("COGNITO_REGION") {
            self.auth.region = v;
        }
        if let Some(v) = get("COGNITO_USER_POOL_ID") {
            self.auth.user_pool_id = v;
        }
        if let Some(v) = get("COGNITO_CLIENT_ID") {
            self.auth.client_id = v;
        }
        if let Some(v) = get("COGNITO_CLIENT_SECRET") {
            self.auth.client_secret = Some(v);
        }
        if let Some(v) = get("COGNITO_DOMAIN") {
            self.auth.domain = v;
        }
        if let Some(v) = get("AUTH_DEV_SECRET") {
            self.auth.dev_shared_secret = Some(v);
        }

        if let Some(v) = get("STORAGE_BACKEND") {
            self.storage.backend = v.parse().map_err(|_| ConfigError::Invalid {
                key: "STORAGE_BACKEND",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("S3_BUCKET_NAME") {
            self.storage.bucket = v;
        }
        if let Some(v) = get("S3_REGION") {
            self.storage.region = v;
        }
        if let Some(v) = get("APP_AWS_ACCESS_KEY_ID") {
            self.storage.access_key_id = Some(v);
        }
        if let Some(v) = get("APP_AWS_SECRET_ACCESS_KEY") {
            self.storage.secret_access_key = Some(v);
        }
        if let Some(v) = get("CDN_URL") {
            self.storage.cdn_url = v;
        }

        if let Some(v) = get("MAIL_BACKEND") {
            self.mail.backend = v.parse().map_err(|_| ConfigError::Invalid {
                key: "MAIL_BACKEND",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("SMTP_HOST") {
            self.mail.smtp_host = v;
        }
        if let Some(v) = get("SMTP_PORT") {
            self.mail.smtp_port = parse("SMTP_PORT", &v)?;
        }
        if let Some(v) = get("SMTP_USERNAME") {
            self.mail.smtp_username = Some(v);
        }
        if let Some(v) = get("SMTP_PASSWORD") {
            self.mail.smtp_password = Some(v);
        }
        if let Some(v) = get("SES_FROM_EMAIL") {
            self.mail.from = v;
        }
        if let Some(v) = get("CONTACT_EMAIL") {
            self.mail.contact_email = v;
        }

        if let Some(v) = get("METRICS_ENABLED") {
            self.metrics.enabled = parse_bool("METRICS_ENABLED", &v)?;
        }
        if let Some(v) = get("METRICS_PORT") {
            self.metrics.port = parse("METRICS_PORT", &v)?;
        }

        if let Some(v) = get("LOG_DIR") {
            self.logging.directory = PathBuf::from(v);
        }
        if let Some(v) = get("LOG_FILTER") {
            self.logging.filter = v;
        }

        Ok(())
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}
