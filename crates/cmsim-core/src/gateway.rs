// ── Request gateway ──
//
// The single seam between browsing logic and HTTP. Callers get the raw
// envelope back and decide what a non-success code means for them.

use std::future::Future;

use cmsim_api::{ApiResponse, Method, SimulatorClient};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CoreError;

/// Sends one request and resolves with the `{ code, msg, data, cause }`
/// envelope.
///
/// Transport failures (connection, timeout, non-2xx status, unparseable
/// body) are `Err`; an envelope with `code != "200"` is `Ok`.
pub trait Gateway: Send + Sync + 'static {
    fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> impl Future<Output = Result<ApiResponse<Value>, cmsim_api::Error>> + Send;
}

impl Gateway for SimulatorClient {
    fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> impl Future<Output = Result<ApiResponse<Value>, cmsim_api::Error>> + Send {
        async move { self.request(method, path, body.as_ref()).await }
    }
}

/// Call through the gateway and decode `data` on success.
///
/// A non-success envelope becomes [`CoreError::Upstream`] carrying the server
/// message, or `fallback` when the server sent none. A successful envelope
/// with `data: null` decodes to `T::default()`.
pub(crate) async fn call_decoded<G, T>(
    gateway: &G,
    method: Method,
    path: &str,
    body: Option<Value>,
    fallback: impl FnOnce() -> String,
) -> Result<T, CoreError>
where
    G: Gateway + ?Sized,
    T: DeserializeOwned + Default,
{
    let envelope = gateway.call(method, path, body).await?;

    if !envelope.is_success() {
        let message = envelope.message().map_or_else(fallback, str::to_owned);
        return Err(CoreError::Upstream {
            code: envelope.code,
            message,
        });
    }

    let data = envelope.data.unwrap_or(Value::Null);
    let decoded: Option<T> = serde_json::from_value(data).map_err(|e| CoreError::Decode {
        message: e.to_string(),
    })?;
    Ok(decoded.unwrap_or_default())
}
