//! HTTP surface over a real socket: health, login placeholder, upload stub
//! and CORS allow-list.

#![allow(clippy::unwrap_used)]

use reqwest::{StatusCode, header};
use secrecy::SecretString;

use school_portal_integration_tests::TestServer;
use school_portal_portal::api::ProfileImage;
use school_portal_server::ServerConfig;

#[tokio::test]
async fn test_health_banner_and_liveness() {
    let server = TestServer::spawn().await.unwrap();
    let api = server.api().unwrap();

    assert_eq!(api.health().await.unwrap(), "School Portal API is running");

    let liveness = reqwest::get(format!("{}/health", server.url()))
        .await
        .unwrap();
    assert_eq!(liveness.status(), StatusCode::OK);
    assert_eq!(liveness.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_login_echoes_origin() {
    let server = TestServer::spawn().await.unwrap();

    let response = reqwest::Client::new()
        .post(format!("{}/auth/login", server.url()))
        .header(header::ORIGIN, "http://localhost:5173")
        .json(&serde_json::json!({"email": "a@b.com", "password": "secret"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["origin"], "http://localhost:5173");
}

#[tokio::test]
async fn test_login_through_client_has_no_origin() {
    let server = TestServer::spawn().await.unwrap();
    let api = server.api().unwrap();

    let echo = api
        .login("a@b.com", &SecretString::from("secret".to_owned()))
        .await
        .unwrap();

    assert_eq!(echo.origin, None);
}

#[tokio::test]
async fn test_upload_profile_picture() {
    let server = TestServer::spawn().await.unwrap();
    let api = server.api().unwrap();

    let receipt = api
        .upload_profile_picture(
            ProfileImage {
                file_name: "me.jpg".to_owned(),
                content_type: "image/jpeg".to_owned(),
                bytes: vec![0xFF; 1024],
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(receipt.file_name.as_deref(), Some("me.jpg"));
    assert_eq!(receipt.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(receipt.size, 1024);
}

#[tokio::test]
async fn test_cors_preflight_for_allowed_origin() {
    let server = TestServer::spawn().await.unwrap();

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/create-super", server.url()))
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_configured_list_replaces_defaults() {
    let origin = axum::http::HeaderValue::from_static("https://portal.school.example");
    let config = ServerConfig {
        allowed_origins: vec![origin],
        ..ServerConfig::default()
    };
    let server = TestServer::spawn_with(config).await.unwrap();
    let client = reqwest::Client::new();

    let allowed = client
        .get(server.url())
        .header(header::ORIGIN, "https://portal.school.example")
        .send()
        .await
        .unwrap();
    assert!(allowed.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let default_origin = client
        .get(server.url())
        .header(header::ORIGIN, "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert!(
        !default_origin
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}
