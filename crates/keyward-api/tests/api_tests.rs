//! Router tests over the in-memory store.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use keyward_api::{AppState, ErrorDetails, build_app};
use keyward_core::clock::FixedClock;
use keyward_core::license::LicenseStatus;
use keyward_licensing::{LicenseResponse, ProductResponse};
use pretty_assertions::assert_eq;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    clock: Arc<FixedClock>,
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

impl TestApp {
    async fn new() -> Self {
        let clock = Arc::new(FixedClock::new(start()));
        let state = AppState::in_memory(clock.clone());
        let app = Self {
            router: build_app(Arc::new(state)),
            clock,
        };

        let (status, _) = app
            .send(
                "POST",
                "/api/products",
                Some(json!({"name": "CRMPro", "description": "Customer management"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        app
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, T) {
        let (status, bytes) = self.send(method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

fn license_body(key: Option<&str>, status: &str) -> Value {
    let mut body = json!({
        "productName": "CRMPro",
        "licensedTo": "Acme Corp",
        "issueDate": start(),
        "expirationDate": start() + Duration::days(30),
        "status": status,
        "enabledFeatures": ["reports", "export"],
        "maxUsers": 10
    });
    if let Some(key) = key {
        body["licenseKey"] = json!(key);
    }
    body
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = TestApp::new().await;
    let (status, body) = app.send_json::<Value>("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = app.send("GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_and_get_license() {
    let app = TestApp::new().await;
    let (status, created) = app
        .send_json::<LicenseResponse>(
            "POST",
            "/api/licenses",
            Some(license_body(Some("ABC1234567"), "PENDING_ACTIVATION")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.license_key, "ABC1234567");
    assert_eq!(created.message.as_deref(), Some("License created successfully."));

    let (status, fetched) = app
        .send_json::<LicenseResponse>("GET", "/api/licenses/ABC1234567", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched.status, LicenseStatus::PendingActivation);
    assert_eq!(fetched.enabled_features.len(), 2);
    assert_eq!(fetched.message.as_deref(), Some("License retrieved successfully."));
}

#[tokio::test]
async fn test_response_uses_camel_case() {
    let app = TestApp::new().await;
    let (_, body) = app
        .send_json::<Value>("POST", "/api/licenses", Some(license_body(None, "ACTIVE")))
        .await;

    for field in [
        "licenseKey",
        "productName",
        "licensedTo",
        "issueDate",
        "expirationDate",
        "status",
        "enabledFeatures",
        "maxUsers",
        "hardwareId",
        "activationDate",
        "message",
    ] {
        assert!(body.get(field).is_some(), "missing {}", field);
    }
    assert_eq!(body["status"], "ACTIVE");
    assert_eq!(body["licenseKey"].as_str().map(str::len), Some(20));
}

#[tokio::test]
async fn test_create_validation_errors() {
    let app = TestApp::new().await;
    let mut body = license_body(Some("SHORT"), "ACTIVE");
    body["licensedTo"] = json!("");
    body["expirationDate"] = json!(start() - Duration::days(1));
    body["issueDate"] = json!(start() - Duration::days(2));

    let (status, error) = app
        .send_json::<ErrorDetails>("POST", "/api/licenses", Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = error.validation_errors.unwrap();
    assert!(fields.contains_key("licenseKey"));
    assert!(fields.contains_key("licensedTo"));
    assert!(fields.contains_key("expirationDate"));
}

#[tokio::test]
async fn test_issue_after_expiration_is_rejected() {
    let app = TestApp::new().await;
    let mut body = license_body(None, "ACTIVE");
    body["issueDate"] = json!(start() + Duration::days(40));

    let (status, error) = app
        .send_json::<ErrorDetails>("POST", "/api/licenses", Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error.validation_errors.unwrap().get("issueDate").map(String::as_str),
        Some("Issue date cannot be after expiration date.")
    );
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::new().await;
    let (status, error) = app
        .send_json::<ErrorDetails>(
            "POST",
            "/api/licenses",
            Some(json!({"productName": "CRMPro", "status": "DORMANT"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error.validation_errors.unwrap().contains_key("body"));
}

#[tokio::test]
async fn test_duplicate_key_is_conflict() {
    let app = TestApp::new().await;
    let body = license_body(Some("ABC1234567"), "ACTIVE");
    app.send("POST", "/api/licenses", Some(body.clone())).await;

    let (status, error) = app
        .send_json::<ErrorDetails>("POST", "/api/licenses", Some(body))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error.message, "License key already exists: ABC1234567");
}

#[tokio::test]
async fn test_unknown_license_is_not_found() {
    let app = TestApp::new().await;
    let (status, error) = app
        .send_json::<ErrorDetails>("GET", "/api/licenses/NOPE000000", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error.message, "License not found with key: NOPE000000");
    assert_eq!(error.details, "Not Found");
}

#[tokio::test]
async fn test_activate_then_validate() {
    let app = TestApp::new().await;
    app.send(
        "POST",
        "/api/licenses",
        Some(license_body(Some("ABC1234567"), "PENDING_ACTIVATION")),
    )
    .await;

    let request = json!({"licenseKey": "ABC1234567", "productName": "CRMPro", "hardwareId": "H1"});
    let (status, activated) = app
        .send_json::<LicenseResponse>("POST", "/api/licenses/activate", Some(request.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(activated.status, LicenseStatus::Active);
    assert_eq!(activated.hardware_id.as_deref(), Some("H1"));

    let (status, validated) = app
        .send_json::<LicenseResponse>("POST", "/api/licenses/validate", Some(request))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(validated.valid, Some(true));
    assert_eq!(validated.message.as_deref(), Some("License is valid and active."));

    let (status, mismatch) = app
        .send_json::<LicenseResponse>(
            "POST",
            "/api/licenses/validate",
            Some(json!({"licenseKey": "ABC1234567", "productName": "CRMPro", "hardwareId": "H2"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mismatch.valid, Some(false));
    assert_eq!(mismatch.hardware_id.as_deref(), Some("H1"));
}

#[tokio::test]
async fn test_activate_expired_is_bad_request() {
    let app = TestApp::new().await;
    app.send(
        "POST",
        "/api/licenses",
        Some(license_body(Some("ABC1234567"), "PENDING_ACTIVATION")),
    )
    .await;

    app.clock.advance(Duration::days(31));
    let (status, error) = app
        .send_json::<ErrorDetails>(
            "POST",
            "/api/licenses/activate",
            Some(json!({"licenseKey": "ABC1234567", "productName": "CRMPro"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error.message, "License has expired.");

    let (_, stored) = app
        .send_json::<LicenseResponse>("GET", "/api/licenses/ABC1234567", None)
        .await;
    assert_eq!(stored.status, LicenseStatus::Expired);
}

#[tokio::test]
async fn test_activation_request_requires_fields() {
    let app = TestApp::new().await;
    let (status, error) = app
        .send_json::<ErrorDetails>("POST", "/api/licenses/activate", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = error.validation_errors.unwrap();
    assert!(fields.contains_key("licenseKey"));
    assert!(fields.contains_key("productName"));
}

#[tokio::test]
async fn test_update_and_delete_license() {
    let app = TestApp::new().await;
    app.send(
        "POST",
        "/api/licenses",
        Some(license_body(Some("ABC1234567"), "ACTIVE")),
    )
    .await;

    let mut body = license_body(None, "SUSPENDED");
    body["licensedTo"] = json!("Globex");
    let (status, updated) = app
        .send_json::<LicenseResponse>("PUT", "/api/licenses/ABC1234567", Some(body))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated.licensed_to, "Globex");
    assert_eq!(updated.status, LicenseStatus::Suspended);

    let (status, _) = app.send("DELETE", "/api/licenses/ABC1234567", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send("DELETE", "/api/licenses/ABC1234567", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_licenses() {
    let app = TestApp::new().await;
    for key in ["AAA1234567", "BBB1234567"] {
        app.send("POST", "/api/licenses", Some(license_body(Some(key), "ACTIVE")))
            .await;
        app.clock.advance(Duration::seconds(1));
    }

    let (status, licenses) = app
        .send_json::<Vec<LicenseResponse>>("GET", "/api/licenses", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let keys: Vec<_> = licenses.iter().map(|l| l.license_key.as_str()).collect();
    assert_eq!(keys, vec!["AAA1234567", "BBB1234567"]);
}

#[tokio::test]
async fn test_product_crud() {
    let app = TestApp::new().await;
    let (status, created) = app
        .send_json::<ProductResponse>(
            "POST",
            "/api/products",
            Some(json!({"name": "ERPSuite", "description": "Resource planning"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/products/{}", created.id);
    let (status, fetched) = app.send_json::<ProductResponse>("GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched.name, "ERPSuite");

    let (status, renamed) = app
        .send_json::<ProductResponse>(
            "PUT",
            &uri,
            Some(json!({"name": "ERPSuite Pro", "description": "Resource planning"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed.name, "ERPSuite Pro");

    let (_, products) = app
        .send_json::<Vec<ProductResponse>>("GET", "/api/products", None)
        .await;
    assert_eq!(products.len(), 2);

    let (status, _) = app.send("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.send("GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_errors() {
    let app = TestApp::new().await;
    let (status, error) = app
        .send_json::<ErrorDetails>(
            "POST",
            "/api/products",
            Some(json!({"name": "CRMPro", "description": "Again"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error.message, "Product with name 'CRMPro' already exists.");

    let (status, error) = app
        .send_json::<ErrorDetails>(
            "POST",
            "/api/products",
            Some(json!({"name": "AB", "description": " "})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error.validation_errors.map(|f| f.len()), Some(2));

    let (status, _) = app.send("GET", "/api/products/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deleting_product_removes_licenses() {
    let app = TestApp::new().await;
    app.send(
        "POST",
        "/api/licenses",
        Some(license_body(Some("ABC1234567"), "ACTIVE")),
    )
    .await;
    let (_, products) = app
        .send_json::<Vec<ProductResponse>>("GET", "/api/products", None)
        .await;

    let uri = format!("/api/products/{}", products[0].id);
    app.send("DELETE", &uri, None).await;

    let (_, licenses) = app
        .send_json::<Vec<LicenseResponse>>("GET", "/api/licenses", None)
        .await;
    assert!(licenses.is_empty());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-42"
    );
}
