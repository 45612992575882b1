use clap::Parser;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ALLOWED_EXTENSIONS: &str = "png,jpg,jpeg,gif,webp,bmp,svg";
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Centralized application configuration.
/// Read once at startup and shared immutably with every request.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub bucket: String,
    pub delivery_domain: String,
    pub upload_secret: Option<String>,
    pub max_file_size_bytes: u64,
    pub allowed_extensions: Vec<String>,
    pub key_prefix: String,
    pub aws_region: String,
    pub s3_endpoint: Option<String>,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

/// Command-line + environment configuration.
///
/// Every flag falls back to its environment variable, then to the default.
#[derive(Parser, Debug)]
#[command(author, version, about = "Screenshot uploader backed by S3 and a CDN")]
pub struct Args {
    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Destination bucket
    #[arg(long, env = "S3_BUCKET", default_value = "")]
    pub bucket: String,

    /// Public hostname that serves the bucket (CDN)
    #[arg(long, env = "CLOUDFRONT_DOMAIN", default_value = "")]
    pub delivery_domain: String,

    /// Shared secret required on uploads; unset means open access
    #[arg(long, env = "UPLOAD_SECRET", hide_env_values = true)]
    pub upload_secret: Option<String>,

    /// Maximum accepted file size in megabytes
    #[arg(long, env = "MAX_FILE_SIZE_MB", default_value_t = 10)]
    pub max_file_size_mb: u64,

    /// Comma-separated list of accepted extensions
    #[arg(long, env = "ALLOWED_EXTENSIONS", default_value = DEFAULT_ALLOWED_EXTENSIONS)]
    pub allowed_extensions: String,

    /// Leading path segment of every generated object key
    #[arg(long, env = "KEY_PREFIX", default_value = "uploads")]
    pub key_prefix: String,

    /// AWS region of the bucket
    #[arg(long, env = "AWS_REGION", default_value = "ca-central-1")]
    pub aws_region: String,

    /// S3-compatible endpoint override (path-style addressing)
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    pub s3_endpoint: Option<String>,

    /// Rate-limit window for /upload in milliseconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_MS", default_value_t = 15 * 60 * 1000)]
    pub rate_limit_window_ms: u64,

    /// Requests allowed per client within one window
    #[arg(long, env = "RATE_LIMIT_MAX_REQUESTS", default_value_t = 100)]
    pub rate_limit_max_requests: u32,
}

#[derive(Debug, Error)]
#[error("invalid configuration: {}", .0.join("; "))]
pub struct ConfigError(pub Vec<String>);

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            bucket: args.bucket.trim().to_string(),
            delivery_domain: args.delivery_domain.trim().to_string(),
            upload_secret: args.upload_secret.filter(|s| !s.is_empty()),
            max_file_size_bytes: args.max_file_size_mb.saturating_mul(BYTES_PER_MB),
            allowed_extensions: parse_extension_list(&args.allowed_extensions),
            key_prefix: args.key_prefix.trim_matches('/').to_string(),
            aws_region: args.aws_region,
            s3_endpoint: args.s3_endpoint.filter(|s| !s.is_empty()),
            rate_limit: RateLimitConfig {
                window: Duration::from_millis(args.rate_limit_window_ms),
                max_requests: args.rate_limit_max_requests,
            },
        }
    }
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Self {
        Args::parse().into()
    }

    /// Collect every configuration problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.bucket.is_empty() {
            errors.push("S3_BUCKET is required".to_string());
        }
        if self.delivery_domain.is_empty() {
            errors.push("CLOUDFRONT_DOMAIN is required".to_string());
        }
        if self.allowed_extensions.is_empty() {
            errors.push("ALLOWED_EXTENSIONS must be specified".to_string());
        }
        if self.max_file_size_bytes == 0 {
            errors.push("MAX_FILE_SIZE_MB must be greater than 0".to_string());
        }
        if self.rate_limit.window.is_zero() {
            errors.push("RATE_LIMIT_WINDOW_MS must be greater than 0".to_string());
        }
        if self.rate_limit.max_requests == 0 {
            errors.push("RATE_LIMIT_MAX_REQUESTS must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError(errors))
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Ceiling in whole megabytes, as shown to clients.
    pub fn max_file_size_mb(&self) -> u64 {
        whole_megabytes(self.max_file_size_bytes)
    }
}

/// Round a byte count to the nearest whole megabyte.
pub fn whole_megabytes(bytes: u64) -> u64 {
    bytes.saturating_add(BYTES_PER_MB / 2) / BYTES_PER_MB
}

/// Normalize a comma-separated extension list: trimmed, lowercase, no leading
/// dot, no empties, no duplicates. Input order is kept.
pub fn parse_extension_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for ext in raw.split(',') {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        if !ext.is_empty() && !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}

/// Render a byte count the way people read it ("0 Bytes", "1.5 KB", "10 MB").
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        bucket: "test-bucket".into(),
        delivery_domain: "test.cloudfront.net".into(),
        upload_secret: Some("test-secret-123".into()),
        max_file_size_bytes: 10 * BYTES_PER_MB,
        allowed_extensions: parse_extension_list(DEFAULT_ALLOWED_EXTENSIONS),
        key_prefix: "uploads".into(),
        aws_region: "us-east-1".into(),
        s3_endpoint: None,
        rate_limit: RateLimitConfig {
            window: Duration::from_secs(900),
            max_requests: 100,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_list_is_normalized() {
        assert_eq!(
            parse_extension_list(" PNG, .jpg,,gif ,png"),
            vec!["png", "jpg", "gif"]
        );
        assert!(parse_extension_list(" , ,").is_empty());
    }

    #[test]
    fn valid_config_passes() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn validate_reports_every_problem() {
        let mut cfg = test_config();
        cfg.bucket.clear();
        cfg.delivery_domain.clear();
        cfg.allowed_extensions.clear();
        cfg.max_file_size_bytes = 0;

        let err = cfg.validate().unwrap_err();
        assert_eq!(err.0.len(), 4);
        assert!(err.to_string().contains("S3_BUCKET is required"));
        assert!(err.to_string().contains("MAX_FILE_SIZE_MB"));
    }

    #[test]
    fn args_map_onto_config() {
        let args = Args::try_parse_from([
            "screenshot-uploader",
            "--bucket",
            "shots",
            "--delivery-domain",
            "cdn.example.com",
            "--upload-secret",
            "",
            "--max-file-size-mb",
            "2",
            "--allowed-extensions",
            "PNG,jpg",
            "--key-prefix",
            "/team/",
        ])
        .unwrap();
        let cfg = AppConfig::from(args);

        assert_eq!(cfg.bucket, "shots");
        assert_eq!(cfg.upload_secret, None);
        assert_eq!(cfg.max_file_size_bytes, 2 * 1024 * 1024);
        assert_eq!(cfg.max_file_size_mb(), 2);
        assert_eq!(cfg.allowed_extensions, vec!["png", "jpg"]);
        assert_eq!(cfg.key_prefix, "team");
    }

    #[test]
    fn file_sizes_format_like_people_read_them() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
    }
}
