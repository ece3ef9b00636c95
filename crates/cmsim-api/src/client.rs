// Simulator API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining and envelope unwrapping.
// The instance endpoints live in `instances.rs` as inherent methods; paged
// screens go through the raw `request` path.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::ApiResponse;
use crate::transport::TransportConfig;

/// Raw HTTP client for the simulator management API.
///
/// Every endpoint answers with the `{ code, msg, data, cause }` envelope.
/// [`request`](Self::request) hands the envelope back untouched; the typed
/// endpoint methods strip it and turn a non-`"200"` code into
/// [`Error::Upstream`].
#[derive(Debug, Clone)]
pub struct SimulatorClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SimulatorClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g.
    /// `http://127.0.0.1:9527/cm-simulator/api/v1`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The API root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join an endpoint path (`/instance/list`) onto the API root.
    ///
    /// Plain concatenation rather than `Url::join`, which would drop the
    /// last segment of a base without a trailing slash.
    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a request and return the envelope as-is, `data` left as raw JSON.
    ///
    /// A non-`"200"` code is NOT an error here; callers inspect
    /// [`ApiResponse::is_success`] themselves.
    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse<serde_json::Value>, Error> {
        let url = self.endpoint_url(path)?;
        debug!(%method, %url, "simulator request");

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await.map_err(Error::Transport)?;

        parse_envelope(resp).await
    }

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, Error> {
        let url = self.endpoint_url(path)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        unwrap_envelope(parse_envelope(resp).await?)
    }

    /// Send a POST request with JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<Option<T>, Error> {
        let url = self.endpoint_url(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        unwrap_envelope(parse_envelope(resp).await?)
    }
}

/// Parse the `{ code, msg, data, cause }` envelope out of an HTTP response.
async fn parse_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<ApiResponse<T>, Error> {
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
        });
    }

    let body = resp.text().await.map_err(Error::Transport)?;

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

/// Return `data` on success or an `Error::Upstream` if `code != "200"`.
fn unwrap_envelope<T>(envelope: ApiResponse<T>) -> Result<Option<T>, Error> {
    if envelope.is_success() {
        return Ok(envelope.data);
    }
    let message = envelope
        .message()
        .map_or_else(|| format!("code={}", envelope.code), str::to_owned);
    Err(Error::Upstream {
        code: envelope.code,
        message,
    })
}

/// Turn a missing `data` field on a successful lookup into `NotFound`.
pub(crate) fn require_data<T>(data: Option<T>, what: impl FnOnce() -> String) -> Result<T, Error> {
    data.ok_or_else(|| Error::NotFound { what: what() })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> SimulatorClient {
        SimulatorClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn endpoint_url_keeps_api_prefix() {
        let c = client("http://127.0.0.1:9527/cm-simulator/api/v1");
        assert_eq!(
            c.endpoint_url("/instance/list").unwrap().as_str(),
            "http://127.0.0.1:9527/cm-simulator/api/v1/instance/list"
        );
    }

    #[test]
    fn endpoint_url_tolerates_trailing_slash() {
        let c = client("http://sim.local:9527/api/");
        assert_eq!(
            c.endpoint_url("device/queryPage").unwrap().as_str(),
            "http://sim.local:9527/api/device/queryPage"
        );
    }

    #[test]
    fn unwrap_envelope_falls_back_to_code() {
        let env: ApiResponse<()> = ApiResponse {
            code: "503".into(),
            msg: None,
            data: None,
            cause: None,
        };
        match unwrap_envelope(env) {
            Err(Error::Upstream { code, message }) => {
                assert_eq!(code, "503");
                assert_eq!(message, "code=503");
            }
            other => panic!("expected Upstream error, got: {other:?}"),
        }
    }
}
