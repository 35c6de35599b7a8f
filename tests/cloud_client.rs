//! End-to-end tests of the cloud client against a stub gateway.
//!
//! The client is blocking, so it is built, used and dropped on a
//! `spawn_blocking` thread while the mock server lives on the test runtime.

use serde_json::json;
use tapo_cloud::cloud::{signer, DEVICE_LIST_PATH, LOGIN_PATH};
use tapo_cloud::{CloudClient, CloudConfig, CloudError, Session};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

fn config_for(server: &MockServer) -> CloudConfig {
    CloudConfig::with_base_url(server.uri())
}

async fn mount_login(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn login_then_list_devices() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(header("content-type", "application/json"))
        .and(header("requestByApp", "true"))
        .and(header("X-Platform", "Android"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error_code": 0, "result": {"token": "T1"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(DEVICE_LIST_PATH))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error_code": 0,
            "result": {"deviceList": [{
                "deviceName": "Lamp",
                "deviceType": "SMART.PLUG",
                "deviceId": "D1",
                "model": "P100",
                "status": 1
            }]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (session, devices) = blocking(move || {
        let mut client = CloudClient::new(config).unwrap();
        client.login("a@b.com", "pw").unwrap();
        assert!(client.is_authenticated());
        let devices = client.list_devices().unwrap();
        (client.session().clone(), devices)
    })
    .await;

    assert_eq!(
        session,
        Session::Authenticated {
            token: "T1".into()
        }
    );

    assert_eq!(devices.len(), 1);
    let lamp = &devices[0];
    assert_eq!(lamp.device_name, "Lamp");
    assert_eq!(lamp.device_type, "SMART.PLUG");
    assert_eq!(lamp.device_id, "D1");
    assert_eq!(lamp.model, "P100");
    assert_eq!(lamp.status, 1);
    assert!(lamp.is_online());
}

#[tokio::test(flavor = "multi_thread")]
async fn login_body_is_signed() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"error_code": 0, "result": {"token": "T1"}})).await;

    let config = config_for(&server);
    blocking(move || CloudClient::new(config).unwrap().login("a@b.com", "pw").unwrap()).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Map<String, serde_json::Value> = requests[0].body_json().unwrap();

    assert_eq!(body["cloudUserName"], "a@b.com");
    assert_eq!(body["cloudPassword"], signer::hash_password("pw"));
    assert_eq!(body["appType"], "Tapo_Android");
    assert_eq!(body["locale"], "fr_FR");

    let signature = body["signature"].as_str().unwrap();
    let unsigned = body
        .iter()
        .filter(|(k, _)| k.as_str() != "signature")
        .map(|(k, v)| (k.as_str(), v.as_str().unwrap()));
    assert_eq!(signature, signer::sign(unsigned, "Tp-Link_Kasa_Android2.0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_login_stays_anonymous() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"error_code": -1, "msg": "bad credentials"})).await;

    let config = config_for(&server);
    let (session, result) = blocking(move || {
        let mut client = CloudClient::new(config).unwrap();
        let result = client.login("a@b.com", "wrong");
        (client.session().clone(), result)
    })
    .await;

    match result {
        Err(CloudError::ServerRejection { code, message }) => {
            assert_eq!(code, -1);
            assert_eq!(message, "bad credentials");
        }
        other => panic!("expected server rejection, got {other:?}"),
    }
    assert_eq!(session, Session::Anonymous);
}

#[tokio::test(flavor = "multi_thread")]
async fn list_devices_before_login_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DEVICE_LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error_code": 0})))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let result = blocking(move || CloudClient::new(config).unwrap().list_devices()).await;

    assert!(matches!(result, Err(CloudError::NotAuthenticated)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn http_error_keeps_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (session, result) = blocking(move || {
        let mut client = CloudClient::new(config).unwrap();
        let result = client.login("a@b.com", "pw");
        (client.session().clone(), result)
    })
    .await;

    match result {
        Err(CloudError::HttpStatus { status, body }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected HTTP status error, got {other:?}"),
    }
    assert_eq!(session, Session::Anonymous);
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_response_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let result = blocking(move || CloudClient::new(config).unwrap().login("a@b.com", "pw")).await;

    let err = result.unwrap_err();
    assert!(matches!(err, CloudError::MalformedResponse(_)));
    assert!(err.is_transport());
}

#[tokio::test(flavor = "multi_thread")]
async fn success_without_token_is_malformed() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"error_code": 0})).await;

    let config = config_for(&server);
    let (session, result) = blocking(move || {
        let mut client = CloudClient::new(config).unwrap();
        let result = client.login("a@b.com", "pw");
        (client.session().clone(), result)
    })
    .await;

    assert!(matches!(result, Err(CloudError::MalformedResponse(_))));
    assert_eq!(session, Session::Anonymous);
}

#[tokio::test(flavor = "multi_thread")]
async fn device_list_rejection_is_reported() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"error_code": 0, "result": {"token": "T1"}})).await;
    Mock::given(method("POST"))
        .and(path(DEVICE_LIST_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"error_code": -20651, "msg": "Token expired"})),
        )
        .mount(&server)
        .await;

    let config = config_for(&server);
    let result = blocking(move || {
        let mut client = CloudClient::new(config).unwrap();
        client.login("a@b.com", "pw").unwrap();
        client.list_devices()
    })
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.error_code(), Some(-20651));
    assert!(err.to_string().contains("Token expired"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_gateway_is_transport_error() {
    // Nothing listens on port 1.
    let result = blocking(|| {
        let mut config = CloudConfig::with_base_url("http://127.0.0.1:1");
        config.timeout_secs = Some(5);
        CloudClient::new(config).unwrap().login("a@b.com", "pw")
    })
    .await;

    assert!(matches!(result, Err(CloudError::Transport(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejection_with_result_object_is_still_a_rejection() {
    let server = MockServer::start().await;
    mount_login(
        &server,
        json!({"error_code": -20601, "msg": "Incorrect password", "result": {}}),
    )
    .await;

    let config = config_for(&server);
    let (session, result) = blocking(move || {
        let mut client = CloudClient::new(config).unwrap();
        let result = client.login("a@b.com", "wrong");
        (client.session().clone(), result)
    })
    .await;

    match result {
        Err(CloudError::ServerRejection { code, message }) => {
            assert_eq!(code, -20601);
            assert_eq!(message, "Incorrect password");
        }
        other => panic!("expected server rejection, got {other:?}"),
    }
    assert_eq!(session, Session::Anonymous);
}

#[tokio::test(flavor = "multi_thread")]
async fn device_with_null_fields_is_kept_alongside_others() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"error_code": 0, "result": {"token": "T1"}})).await;
    Mock::given(method("POST"))
        .and(path(DEVICE_LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error_code": 0,
            "result": {"deviceList": [
                {"deviceName": null, "deviceType": "SMART.PLUG", "deviceId": "D0",
                 "model": "P100", "status": 0},
                {"deviceName": "Lamp", "deviceType": "SMART.PLUG", "deviceId": "D1",
                 "model": "P100", "status": 1}
            ]}
        })))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let devices = blocking(move || {
        let mut client = CloudClient::new(config).unwrap();
        client.login("a@b.com", "pw").unwrap();
        client.list_devices().unwrap()
    })
    .await;

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].device_id, "D0");
    assert_eq!(devices[0].device_name, "");
    assert_eq!(devices[1].device_name, "Lamp");
    assert!(devices[1].is_online());
}
