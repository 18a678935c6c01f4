//! Configuration module
//!
//! Settings are read once at startup from the process environment (with `.env` support)
//! and handed to every component explicitly.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

// Common constants
const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MEDIA_TOOL_TIMEOUT_SECS: u64 = 300;
const PRESIGN_TTL_SECS: u64 = 900;
const MAX_VIDEO_SIZE_MB: u64 = 1024;
const MAX_THUMBNAIL_SIZE_MB: u64 = 10;

/// `DATABASE_URL` value that selects the in-memory repository.
pub const MEMORY_DATABASE_URL: &str = "memory";

/// Settings shared by any HTTP-facing service
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
}

/// Upload service configuration
#[derive(Clone, Debug)]
pub struct TubelyConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Object store
    pub s3_bucket: String,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // S3-compatible providers (MinIO, LocalStack)
    pub aws_region: Option<String>,
    // Thumbnail assets
    pub assets_root: PathBuf,
    pub assets_base_url: String,
    // Media processing
    pub temp_dir: Option<PathBuf>,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub media_tool_timeout_secs: u64,
    pub presign_ttl_secs: u64,
    pub max_video_size_bytes: u64,
    pub max_thumbnail_size_bytes: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<TubelyConfig>);

impl Config {
    fn inner(&self) -> &TubelyConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = TubelyConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().base.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    /// True when `DATABASE_URL=memory` selects the in-process repository.
    pub fn uses_memory_database(&self) -> bool {
        self.inner().database_url == MEMORY_DATABASE_URL
    }

    pub fn s3_bucket(&self) -> &str {
        &self.inner().s3_bucket
    }

    /// S3 region, falling back to `AWS_REGION`.
    pub fn s3_region(&self) -> Option<&str> {
        self.inner()
            .s3_region
            .as_deref()
            .or(self.inner().aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn assets_root(&self) -> &PathBuf {
        &self.inner().assets_root
    }

    pub fn assets_base_url(&self) -> &str {
        &self.inner().assets_base_url
    }

    pub fn temp_dir(&self) -> Option<&PathBuf> {
        self.inner().temp_dir.as_ref()
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.inner().ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.inner().ffprobe_path
    }

    pub fn media_tool_timeout(&self) -> Duration {
        Duration::from_secs(self.inner().media_tool_timeout_secs)
    }

    pub fn presign_ttl(&self) -> Duration {
        Duration::from_secs(self.inner().presign_ttl_secs)
    }

    pub fn max_video_size_bytes(&self) -> u64 {
        self.inner().max_video_size_bytes
    }

    pub fn max_thumbnail_size_bytes(&self) -> u64 {
        self.inner().max_thumbnail_size_bytes
    }
}

fn is_production_name(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl TubelyConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let base = BaseConfig {
            server_port,
            environment,
            cors_origins,
            db_max_connections: parse_or(lookup("DB_MAX_CONNECTIONS"), MAX_CONNECTIONS),
            db_timeout_seconds: parse_or(lookup("DB_TIMEOUT_SECONDS"), CONNECTION_TIMEOUT_SECS),
            jwt_secret: lookup("JWT_SECRET")
                .ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
        };

        let port = base.server_port;
        Ok(TubelyConfig {
            base,
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            s3_bucket: lookup("S3_BUCKET").unwrap_or_default(),
            s3_region: lookup("S3_REGION"),
            s3_endpoint: lookup("S3_ENDPOINT"),
            aws_region: lookup("AWS_REGION"),
            assets_root: PathBuf::from(lookup("ASSETS_ROOT").unwrap_or_else(|| "./assets".into())),
            assets_base_url: lookup("ASSETS_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port))
                .trim_end_matches('/')
                .to_string(),
            temp_dir: lookup("TEMP_DIR").map(PathBuf::from),
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            media_tool_timeout_secs: parse_or(
                lookup("MEDIA_TOOL_TIMEOUT_SECS"),
                MEDIA_TOOL_TIMEOUT_SECS,
            ),
            presign_ttl_secs: parse_or(lookup("PRESIGN_TTL_SECS"), PRESIGN_TTL_SECS),
            max_video_size_bytes: parse_or(lookup("MAX_VIDEO_SIZE_MB"), MAX_VIDEO_SIZE_MB)
                * 1024
                * 1024,
            max_thumbnail_size_bytes: parse_or(
                lookup("MAX_THUMBNAIL_SIZE_MB"),
                MAX_THUMBNAIL_SIZE_MB,
            ) * 1024
                * 1024,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.database_url != MEMORY_DATABASE_URL
            && !(self.database_url.starts_with("postgres://")
                || self.database_url.starts_with("postgresql://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a PostgreSQL connection string or '{}'",
                MEMORY_DATABASE_URL
            ));
        }

        if self.s3_bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("S3_BUCKET must be set"));
        }
        if self.s3_region.is_none() && self.aws_region.is_none() {
            return Err(anyhow::anyhow!("S3_REGION or AWS_REGION must be set"));
        }

        if self.media_tool_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "MEDIA_TOOL_TIMEOUT_SECS must be greater than zero"
            ));
        }
        if self.presign_ttl_secs == 0 {
            return Err(anyhow::anyhow!("PRESIGN_TTL_SECS must be greater than zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
            ("DATABASE_URL", "memory"),
            ("S3_BUCKET", "tubely-media"),
            ("AWS_REGION", "us-east-1"),
        ]
    }

    #[test]
    fn test_defaults_apply() {
        let config = TubelyConfig::from_lookup(lookup_from(&minimal())).unwrap();
        assert_eq!(config.base.server_port, SERVER_PORT);
        assert_eq!(config.presign_ttl_secs, 900);
        assert_eq!(config.media_tool_timeout_secs, 300);
        assert_eq!(config.max_video_size_bytes, 1024 * 1024 * 1024);
        assert_eq!(config.max_thumbnail_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.ffprobe_path, "ffprobe");
        assert_eq!(config.assets_base_url, "http://localhost:8091");
        assert!(config.validate().is_ok());

        let config = Config(Box::new(config));
        assert!(config.uses_memory_database());
        assert_eq!(config.s3_region(), Some("us-east-1"));
        assert!(!config.is_production());
    }

    #[test]
    fn test_short_jwt_secret_is_rejected() {
        let mut pairs = minimal();
        pairs[0] = ("JWT_SECRET", "short");
        let config = TubelyConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let mut pairs = minimal();
        pairs.push(("ENVIRONMENT", "production"));
        assert!(TubelyConfig::from_lookup(lookup_from(&pairs)).is_err());

        pairs.push(("CORS_ORIGINS", "https://tubely.example.com"));
        let config = TubelyConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.base.cors_origins, vec!["https://tubely.example.com"]);
    }

    #[test]
    fn test_non_postgres_database_url_is_rejected() {
        let mut pairs = minimal();
        pairs[1] = ("DATABASE_URL", "mysql://localhost/tubely");
        let config = TubelyConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_bucket_is_rejected() {
        let pairs: Vec<_> = minimal()
            .into_iter()
            .filter(|(k, _)| *k != "S3_BUCKET")
            .collect();
        let config = TubelyConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert!(config.validate().is_err());
    }
}
