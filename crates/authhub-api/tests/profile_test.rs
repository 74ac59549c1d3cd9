//! Integration tests for the authenticated profile endpoint and health.

mod helpers;

use authhub_database::UserStore;
use http::StatusCode;

#[tokio::test]
async fn test_profile_requires_token() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/profile", None, &[]).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);

    let response = app
        .request("GET", "/api/profile", None, &[("X-Auth-Token", "garbage")])
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_only_canonical_header_is_accepted() {
    let app = helpers::TestApp::new();
    let token = app.register("ann@example.com", "correct horse").await;

    // Header names are case-insensitive.
    let lower = app
        .request("GET", "/api/profile", None, &[("x-auth-token", token.as_str())])
        .await;
    assert_eq!(lower.status, StatusCode::OK);

    let legacy = app
        .request("GET", "/api/profile", None, &[("X-Auth-Key", token.as_str())])
        .await;
    assert_eq!(legacy.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_of_deleted_account() {
    let app = helpers::TestApp::new();
    let token = app.register("ann@example.com", "correct horse").await;

    let user = app
        .store
        .find_by_email("ann@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(app.store.soft_delete(user.key).await);

    let response = app.authed("GET", "/api/profile", &token).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new();
    let response = app.request("GET", "/health", None, &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], "up");
    assert_eq!(response.body["data"]["cache"], "up");

    let app = helpers::TestApp::stateless();
    let response = app.request("GET", "/health", None, &[]).await;
    assert_eq!(response.body["data"]["cache"], "disabled");
}
