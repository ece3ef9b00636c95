// ── Core error types ──
//
// User-facing errors from cmsim-core. Consumers never match on reqwest
// errors or raw envelopes; the `From<cmsim_api::Error>` impl folds
// transport-layer failures into these variants. `Display` is the message a
// panel shows next to its retry action.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport failures ───────────────────────────────────────────
    #[error("Cannot connect to simulator at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Network request failed: {message}")]
    Transport { message: String },

    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    // ── Upstream failures ────────────────────────────────────────────
    /// The envelope came back with a non-success code. `message` is the
    /// server's `msg`, or a per-resource fallback when it sent none.
    #[error("{message}")]
    Upstream { code: String, message: String },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("Unexpected response: {message}")]
    Decode { message: String },

    // ── Local failures ───────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<cmsim_api::Error> for CoreError {
    fn from(err: cmsim_api::Error) -> Self {
        match err {
            cmsim_api::Error::Transport(e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Transport {
                        message: e.to_string(),
                    }
                }
            }
            cmsim_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            cmsim_api::Error::Status { status } => CoreError::Http { status },
            cmsim_api::Error::Tls(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {reason}"),
            },
            cmsim_api::Error::Upstream { code, message } => CoreError::Upstream { code, message },
            cmsim_api::Error::NotFound { what } => CoreError::NotFound {
                entity_type: "resource",
                identifier: what,
            },
            cmsim_api::Error::InvalidRequest(message) => CoreError::ValidationFailed {
                message: message.into(),
            },
            cmsim_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_displays_bare_message() {
        let err = CoreError::from(cmsim_api::Error::Upstream {
            code: "500".into(),
            message: "instance offline".into(),
        });
        assert_eq!(err.to_string(), "instance offline");
    }

    #[test]
    fn status_maps_to_http() {
        let err = CoreError::from(cmsim_api::Error::Status { status: 404 });
        assert!(matches!(err, CoreError::Http { status: 404 }));
        assert_eq!(err.to_string(), "HTTP error! status: 404");
    }
}
