use thiserror::Error;

/// Top-level error type for the `cmsim-api` crate.
///
/// Covers every failure mode of the simulator API: transport, HTTP status,
/// envelope-level rejections and payload decoding. `cmsim-core` maps these
/// into user-facing messages.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request completed with a non-2xx HTTP status.
    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    /// TLS or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Envelope ────────────────────────────────────────────────────
    /// The `{code, msg, data, cause}` envelope reported a non-success code.
    #[error("{message}")]
    Upstream { code: String, message: String },

    /// A lookup succeeded but carried no record.
    #[error("{what} not found")]
    NotFound { what: String },

    /// The request was rejected before it was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(&'static str),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status { status } => *status == 404,
            Self::Upstream { code, .. } => code == "404",
            Self::NotFound { .. } => true,
            _ => false,
        }
    }
}
