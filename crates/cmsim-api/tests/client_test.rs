#![allow(clippy::unwrap_used)]
// Integration tests for `SimulatorClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cmsim_api::{
    Device, DeviceState, Error, Instance, InstanceDraft, Method, Page, PageQuery, SimulatorClient,
    Station,
};

// ── Helpers ─────────────────────────────────────────────────────────

const API_ROOT: &str = "/cm-simulator/api/v1";

async fn setup() -> (MockServer, SimulatorClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}{API_ROOT}", server.uri())).unwrap();
    let client = SimulatorClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn api_path(suffix: &str) -> String {
    format!("{API_ROOT}{suffix}")
}

fn ok(data: serde_json::Value) -> serde_json::Value {
    json!({ "code": "200", "msg": "success", "data": data, "cause": null })
}

// ── Instance tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_instance_list_decodes_from_raw_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("/instance/list")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!([
            { "id": 1, "httpPort": 8080, "httpIp": "10.0.0.1", "enable": true,
              "remark": null, "createTime": "2025-03-01 10:00:00", "updateTime": null },
            { "id": 2, "httpPort": null, "httpIp": "10.0.0.2", "enable": false,
              "remark": "spare", "createTime": "2025-03-02 10:00:00", "updateTime": null }
        ]))))
        .mount(&server)
        .await;

    let envelope = client
        .request(Method::GET, "/instance/list", None)
        .await
        .unwrap();
    assert!(envelope.is_success());
    let instances: Vec<Instance> = serde_json::from_value(envelope.data.unwrap()).unwrap();

    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].http_ip, "10.0.0.1");
    assert_eq!(instances[0].http_port, Some(8080));
    assert!(!instances[1].enable);
    assert_eq!(instances[1].remark.as_deref(), Some("spare"));
}

#[tokio::test]
async fn test_get_instance() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("/instance/42")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
            "id": 42, "httpPort": 80, "httpIp": "192.168.1.42", "enable": true
        }))))
        .mount(&server)
        .await;

    let instance = client.get_instance(42).await.unwrap();
    assert_eq!(instance.id, 42);
    assert_eq!(instance.http_ip, "192.168.1.42");
}

#[tokio::test]
async fn test_get_instance_without_data_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("/instance/7")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!(null))))
        .mount(&server)
        .await;

    let err = client.get_instance(7).await.unwrap_err();
    assert!(err.is_not_found(), "expected not found, got: {err:?}");
    assert_eq!(err.to_string(), "instance 7 not found");
}

#[tokio::test]
async fn test_add_instance_drops_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("/instance/add")))
        .and(body_json(json!({
            "httpPort": 9000, "httpIp": "10.1.1.1", "enable": true, "remark": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!(null))))
        .expect(1)
        .mount(&server)
        .await;

    let draft = InstanceDraft {
        id: Some(99),
        http_port: 9000,
        http_ip: "10.1.1.1".into(),
        ..InstanceDraft::default()
    };
    let created = client.add_instance(&draft).await.unwrap();
    assert!(created.is_none());
}

#[tokio::test]
async fn test_edit_instance_requires_id() {
    let (_server, client) = setup().await;

    let result = client.edit_instance(&InstanceDraft::default()).await;
    assert!(
        matches!(result, Err(Error::InvalidRequest(_))),
        "expected InvalidRequest, got: {result:?}"
    );
}

// ── Paged dependents ────────────────────────────────────────────────

#[tokio::test]
async fn test_device_page_without_owner_omits_field() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("/device/queryPage")))
        .and(body_json(json!({ "pageNum": 1, "pageSize": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
            "total": 1,
            "list": [{ "id": 5, "instanceId": 1, "device": 3, "version": "v2.1",
                       "state": "MAINTENANCE", "remark": null, "createTime": "2025-03-01" }]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let body = serde_json::Value::from(PageQuery::new(1, 10));
    let envelope = client
        .request(Method::POST, "/device/queryPage", Some(&body))
        .await
        .unwrap();
    let page: Page<Device> = serde_json::from_value(envelope.data.unwrap()).unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.list[0].state, Some(DeviceState::Maintenance));
}

#[tokio::test]
async fn test_station_page_for_owner() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("/rcstInfo/queryPage")))
        .and(body_json(json!({ "pageNum": 2, "pageSize": 5, "instanceId": 7 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
            "total": 6,
            "list": [{ "id": 11, "instanceId": 7, "mac": "00:11:22:33:44:55",
                       "terminalNo": 1001, "modemLon": 116.39, "modemLat": 39.9,
                       "height": 43.5 }]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let body = serde_json::Value::from(PageQuery::new(2, 5).for_owner("instanceId", 7));
    let envelope = client
        .request(Method::POST, "/rcstInfo/queryPage", Some(&body))
        .await
        .unwrap();
    let page: Page<Station> = serde_json::from_value(envelope.data.unwrap()).unwrap();

    assert_eq!(page.total, 6);
    assert_eq!(page.list[0].terminal_no, Some(1001));
    assert!((page.list[0].height - 43.5).abs() < f64::EPSILON);
}

// ── Raw envelope ────────────────────────────────────────────────────

#[tokio::test]
async fn test_request_returns_failed_envelope_untouched() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("/device/queryPage")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "500", "msg": "database unavailable", "data": null, "cause": "timeout"
        })))
        .mount(&server)
        .await;

    let body = json!({ "pageNum": 1, "pageSize": 10 });
    let envelope = client
        .request(Method::POST, "/device/queryPage", Some(&body))
        .await
        .unwrap();

    assert!(!envelope.is_success());
    assert_eq!(envelope.message(), Some("database unavailable"));
    assert_eq!(envelope.cause.as_deref(), Some("timeout"));
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_upstream_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("/instance/1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "500", "msg": "instance table locked", "data": null, "cause": null
        })))
        .mount(&server)
        .await;

    match client.get_instance(1).await {
        Err(Error::Upstream { code, message }) => {
            assert_eq!(code, "500");
            assert_eq!(message, "instance table locked");
        }
        other => panic!("expected Upstream error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_http_status_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client.get_instance(1).await.unwrap_err();

    assert!(
        matches!(err, Error::Status { status: 502 }),
        "expected Status error, got: {err:?}"
    );
    assert!(!err.is_not_found());
    assert_eq!(err.to_string(), "HTTP error! status: 502");
}

#[tokio::test]
async fn test_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("/instance/1")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let result = client.get_instance(1).await;
    assert!(
        matches!(&result, Err(Error::Deserialization { body, .. }) if body.contains("gateway")),
        "expected Deserialization error, got: {result:?}"
    );
}
