// Simulator API request/response types
//
// Every endpoint wraps its payload in the `ApiResponse<T>` envelope. Fields
// use `#[serde(default)]` liberally because the backend omits nullable
// columns instead of sending `null` on some endpoints.

use serde::{Deserialize, Deserializer, Serialize};

/// Envelope code that marks a successful call.
pub const SUCCESS_CODE: &str = "200";

// ── Response Envelope ────────────────────────────────────────────────

/// Standard simulator API response envelope.
///
/// ```json
/// { "code": "200", "msg": "success", "data": ..., "cause": null }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(deserialize_with = "string_or_number")]
    pub code: String,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub cause: Option<String>,
}

impl<T> ApiResponse<T> {
    /// `code == "200"`.
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// The server message, ignoring blank strings.
    pub fn message(&self) -> Option<&str> {
        self.msg.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }
}

/// Some backend builds serialize `code` as a JSON number.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(i64),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Text(s) => s,
        Code::Number(n) => n.to_string(),
    })
}

// ── Pagination ───────────────────────────────────────────────────────

/// One server-side page: `{ total, list }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            total: 0,
            list: Vec::new(),
        }
    }
}

/// Page query for the `*/queryPage` endpoints.
///
/// The owner constraint is keyed by whatever field the endpoint expects
/// (`instanceId` for boards and stations). It is omitted from the body
/// entirely when `None`; the backend reads an absent field as "all".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page_num: u32,
    pub page_size: u32,
    pub owner: Option<OwnerFilter>,
}

/// `field = id` constraint on a page query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerFilter {
    pub field: &'static str,
    pub id: i64,
}

impl PageQuery {
    pub fn new(page_num: u32, page_size: u32) -> Self {
        Self {
            page_num,
            page_size,
            owner: None,
        }
    }

    pub fn for_owner(mut self, field: &'static str, id: i64) -> Self {
        self.owner = Some(OwnerFilter { field, id });
        self
    }
}

impl From<PageQuery> for serde_json::Value {
    fn from(query: PageQuery) -> Self {
        let mut body = serde_json::Map::new();
        body.insert("pageNum".into(), query.page_num.into());
        body.insert("pageSize".into(), query.page_size.into());
        if let Some(owner) = query.owner {
            body.insert(owner.field.into(), owner.id.into());
        }
        Self::Object(body)
    }
}

// ── Instance ─────────────────────────────────────────────────────────

/// A simulator instance, from `instance/list` or `instance/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: i64,
    #[serde(default)]
    pub http_port: Option<u16>,
    /// Nullable on older rows; treated as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub http_ip: String,
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body for `instance/add` and `instance/edit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub http_port: u16,
    pub http_ip: String,
    pub enable: bool,
    pub remark: Option<String>,
}

impl Default for InstanceDraft {
    fn default() -> Self {
        Self {
            id: None,
            http_port: 80,
            http_ip: String::new(),
            enable: true,
            remark: None,
        }
    }
}

impl From<&Instance> for InstanceDraft {
    fn from(instance: &Instance) -> Self {
        Self {
            id: Some(instance.id),
            http_port: instance.http_port.unwrap_or(80),
            http_ip: instance.http_ip.clone(),
            enable: instance.enable,
            remark: instance.remark.clone(),
        }
    }
}

// ── Device ───────────────────────────────────────────────────────────

/// Board operational state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum DeviceState {
    #[serde(rename = "ON_LINE")]
    #[strum(serialize = "online")]
    Online,
    #[serde(rename = "OFF_LINE")]
    #[strum(serialize = "offline")]
    Offline,
    #[serde(rename = "MAINTENANCE")]
    #[strum(serialize = "maintenance")]
    Maintenance,
    #[serde(other)]
    #[strum(serialize = "unknown")]
    Unknown,
}

/// A master-station board attached to an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    pub instance_id: i64,
    /// Board number on the simulated chassis.
    #[serde(default)]
    pub device: i64,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub state: Option<DeviceState>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

impl Device {
    pub fn state_or_unknown(&self) -> DeviceState {
        self.state.unwrap_or(DeviceState::Unknown)
    }
}

// ── Station ──────────────────────────────────────────────────────────

/// A remote terminal station (`rcstInfo`) attached to an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: i64,
    pub instance_id: i64,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub terminal_no: Option<i64>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub modem_lon: f64,
    #[serde(default)]
    pub modem_lon_dir: i32,
    #[serde(default)]
    pub modem_lat: f64,
    #[serde(default)]
    pub modem_lat_dir: i32,
    #[serde(default)]
    pub sate_lon: f64,
    #[serde(default)]
    pub sate_lon_dir: i32,
    #[serde(default)]
    pub sate_lat: f64,
    #[serde(default)]
    pub sate_lat_dir: i32,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_query_omits_absent_owner() {
        let body = serde_json::Value::from(PageQuery::new(1, 10));
        assert_eq!(body, json!({ "pageNum": 1, "pageSize": 10 }));
    }

    #[test]
    fn page_query_keeps_owner_zero() {
        let body = serde_json::Value::from(PageQuery::new(2, 10).for_owner("instanceId", 0));
        assert_eq!(
            body,
            json!({ "pageNum": 2, "pageSize": 10, "instanceId": 0 })
        );
    }

    #[test]
    fn envelope_accepts_numeric_code() {
        let env: ApiResponse<serde_json::Value> =
            serde_json::from_value(json!({ "code": 200, "msg": "ok", "data": [] })).unwrap();
        assert!(env.is_success());
    }

    #[test]
    fn envelope_blank_message_is_none() {
        let env: ApiResponse<serde_json::Value> =
            serde_json::from_value(json!({ "code": "500", "msg": "  ", "data": null })).unwrap();
        assert!(!env.is_success());
        assert!(env.message().is_none());
        assert!(env.data.is_none());
    }

    #[test]
    fn device_state_parses_known_and_unknown() {
        let d: Device = serde_json::from_value(json!({
            "id": 1, "instanceId": 7, "device": 3, "state": "ON_LINE"
        }))
        .unwrap();
        assert_eq!(d.state, Some(DeviceState::Online));

        let d: Device = serde_json::from_value(json!({
            "id": 2, "instanceId": 7, "device": 4, "state": "REBOOTING"
        }))
        .unwrap();
        assert_eq!(d.state_or_unknown(), DeviceState::Unknown);
        assert_eq!(d.state_or_unknown().to_string(), "unknown");
    }

    #[test]
    fn instance_null_ip_is_empty() {
        let i: Instance =
            serde_json::from_value(json!({ "id": 5, "httpIp": null, "enable": true })).unwrap();
        assert_eq!(i.http_ip, "");
        assert!(i.http_port.is_none());
    }

    #[test]
    fn draft_from_instance_defaults_port() {
        let i: Instance = serde_json::from_value(json!({
            "id": 9, "httpIp": "10.0.0.9", "enable": false, "remark": "lab"
        }))
        .unwrap();
        let draft = InstanceDraft::from(&i);
        assert_eq!(draft.id, Some(9));
        assert_eq!(draft.http_port, 80);
        assert!(!draft.enable);
    }
}
