//! Structured Logging Configuration
//!
//! Provides configurable logging with:
//! - JSON output for production (LOG_FORMAT=json)
//! - Human-readable output for development (default)
//!
//! # Usage
//!
//! ```rust,ignore
//! use ph_common::logging::init_logging;
//!
//! fn main() {
//!     init_logging("ph-platform-server");
//!     tracing::info!(user_id = %id, "Role changed");
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: "json" for JSON output, anything else for text (default: text)
//! - `RUST_LOG`: standard filter (default: info), e.g. `RUST_LOG=ph_platform=debug,tower_http=info`

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Initialize logging for the given service.
///
/// Safe to call more than once; later calls are ignored once a global
/// subscriber is installed.
pub fn init_logging(service_name: &str) {
    let format = LogFormat::from_env_value(&std::env::var("LOG_FORMAT").unwrap_or_default());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => init_json_logging(env_filter),
        LogFormat::Text => init_text_logging(env_filter),
    }

    tracing::debug!(service = service_name, ?format, "Logging initialized");
}

fn init_json_logging(env_filter: EnvFilter) {
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(false)
                .with_target(true)
                .flatten_event(true)
                .with_span_events(FmtSpan::CLOSE)
        )
        .try_init();
}

fn init_text_logging(env_filter: EnvFilter) {
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(true)
        )
        .try_init();
}

/// Initialize logging with the default service name.
pub fn init_default_logging() {
    init_logging("pizzahub");
}
