//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with actionable
//! help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use cmsim_config::ConfigError;
use cmsim_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to simulator at {url}")]
    #[diagnostic(
        code(cmsim::connection_failed),
        help(
            "Check that the simulator is running and reachable.\n\
             Reason: {reason}\n\
             Try: cmsim --base-url http://<host>:9527/cm-simulator/api/v1 instances list"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(cmsim::timeout),
        help("Increase timeout with --timeout or check simulator responsiveness.")
    )]
    Timeout,

    #[error("{message}")]
    #[diagnostic(code(cmsim::http))]
    Http { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(cmsim::not_found),
        help("Run: cmsim {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No instance matches '{query}'")]
    #[diagnostic(
        code(cmsim::no_match),
        help("Run: cmsim instances list --filter {query}")
    )]
    NoMatch { query: String },

    #[error("'{query}' matches {count} instances")]
    #[diagnostic(
        code(cmsim::ambiguous),
        help("Narrow the text or pass --instance <ID>. Candidates: {candidates}")
    )]
    Ambiguous {
        query: String,
        count: usize,
        candidates: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(cmsim::api_error))]
    ApiError { code: String, message: String },

    /// A panel load failed; carries the normalized panel message.
    #[error("{message}")]
    #[diagnostic(code(cmsim::load_failed), help("Retry the command; nothing was changed."))]
    LoadFailed { message: String },

    #[error("Unexpected response from simulator: {message}")]
    #[diagnostic(code(cmsim::decode))]
    Decode { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(cmsim::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' already exists")]
    #[diagnostic(
        code(cmsim::profile_exists),
        help("Use --force to overwrite it.")
    )]
    ProfileExists { name: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(cmsim::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: cmsim config init --base-url <URL>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(cmsim::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(cmsim::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Http { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::NoMatch { .. } | Self::ProfileNotFound { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Validation { .. } | Self::Ambiguous { .. } | Self::ProfileExists { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Timeout => CliError::Timeout,
            err @ (CoreError::Transport { .. } | CoreError::Http { .. }) => CliError::Http {
                message: err.to_string(),
            },
            CoreError::Upstream { code, message } => CliError::ApiError { code, message },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                resource_type: entity_type.into(),
                identifier,
                list_command: format!("{entity_type}s list"),
            },
            CoreError::Decode { message } => CliError::Decode { message },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}
