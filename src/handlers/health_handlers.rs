//! Health & service-info handlers.
//!
//! - GET /health -> liveness with process uptime
//! - GET /       -> service metadata and configured limits

use crate::state::AppState;
use axum::{Json, extract::State};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

pub const SERVICE_NAME: &str = "Screenshot Uploader";
const SERVICE_DESCRIPTION: &str = "Upload screenshots and images from any client (ShareX, scripts, \
     AI tooling) and get back a fast public CDN link.";

/// `GET /health`
///
/// Always 200. Never performs I/O; `uptime` is measured on a monotonic clock
/// so it never goes backwards within one process.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

/// `GET /`
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let cfg = &state.config;
    Json(InfoResponse {
        name: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        description: SERVICE_DESCRIPTION,
        endpoints: Endpoints {
            upload: "POST /upload",
            health: "GET /health",
        },
        use_cases: &[
            "Share screenshots with AI coding tools",
            "Host images for forums without restrictions",
            "Bypass image hosting blockers",
            "Fast global delivery via CDN",
        ],
        configuration: Configuration {
            max_file_size: format!("{}MB", cfg.max_file_size_mb()),
            allowed_extensions: cfg.allowed_extensions.clone(),
            bucket: cfg.bucket.clone(),
            domain: cfg.delivery_domain.clone(),
            secret_required: cfg.upload_secret.is_some(),
        },
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: String,
    /// Seconds since startup.
    uptime: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    name: &'static str,
    version: &'static str,
    description: &'static str,
    endpoints: Endpoints,
    use_cases: &'static [&'static str],
    configuration: Configuration,
}

#[derive(Serialize)]
struct Endpoints {
    upload: &'static str,
    health: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Configuration {
    max_file_size: String,
    allowed_extensions: Vec<String>,
    bucket: String,
    domain: String,
    secret_required: bool,
}
