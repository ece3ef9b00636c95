// ── Runtime connection configuration ──
//
// Describes *how* to reach a simulator. Never touches disk: the CLI resolves
// profiles and flags into a `ClientConfig` and hands it in.

use std::time::Duration;

use cmsim_api::{SimulatorClient, TlsMode, TransportConfig};
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store. The simulator is plain HTTP in most labs, so this
    /// only matters behind a TLS-terminating proxy.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed proxy certs).
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single simulator.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `http://127.0.0.1:9527/cm-simulator/api/v1`.
    pub base_url: Url,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Parse `cmsim_api::DEFAULT_BASE_URL` into a config.
    pub fn local_default() -> Result<Self, CoreError> {
        let base_url = Url::parse(cmsim_api::DEFAULT_BASE_URL).map_err(|e| CoreError::Config {
            message: format!("invalid default base URL: {e}"),
        })?;
        Ok(Self::new(base_url))
    }

    fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }

    /// Build the HTTP client this config describes.
    pub fn connect(&self) -> Result<SimulatorClient, CoreError> {
        Ok(SimulatorClient::new(
            self.base_url.clone(),
            &self.transport(),
        )?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn local_default_points_at_simulator() {
        let config = ClientConfig::local_default().unwrap();
        assert_eq!(config.base_url.port(), Some(9527));
        assert_eq!(config.base_url.path(), "/cm-simulator/api/v1");
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn transport_carries_timeout_and_tls() {
        let mut config = ClientConfig::local_default().unwrap();
        config.timeout = Duration::from_secs(5);
        config.tls = TlsVerification::DangerAcceptInvalid;

        let transport = config.transport();
        assert_eq!(transport.timeout, Duration::from_secs(5));
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
    }
}
