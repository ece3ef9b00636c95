// HTTP transport settings for the simulator client.
//
// The simulator usually listens on plain HTTP on the local network, but a
// fronting proxy may terminate TLS with a private CA.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

/// Default request timeout, matching the CLI's `[defaults] timeout`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How to verify the server certificate when the base URL is `https`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    #[default]
    System,
    /// Trust the PEM bundle at this path in addition to the system roots.
    CustomCa(PathBuf),
    /// Skip verification entirely (self-signed proxies).
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Whole-request timeout; also caps connection setup.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}

impl TransportConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            tls: TlsMode::System,
            timeout,
        }
    }

    /// Build the `reqwest::Client` every simulator call goes through.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .user_agent(concat!("cmsim/", env!("CARGO_PKG_VERSION")));

        let builder = match &self.tls {
            TlsMode::System => builder,
            TlsMode::CustomCa(path) => builder.add_root_certificate(load_ca(path)?),
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

fn load_ca(path: &Path) -> Result<reqwest::Certificate, Error> {
    let shown = path.display();
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("failed to read CA cert {shown}: {e}")))?;
    reqwest::Certificate::from_pem(&pem)
        .map_err(|e| Error::Tls(format!("invalid CA cert {shown}: {e}")))
}
