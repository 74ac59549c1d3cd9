//! Integration tests for the OAuth redirect and callback.

mod helpers;

use http::StatusCode;

#[tokio::test]
async fn test_redirect_returns_url_and_state() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/auth/oauth/github", None, &[]).await;
    assert_eq!(response.status, StatusCode::OK);

    let data = &response.body["data"];
    assert_eq!(data["provider"], "github");
    let state = data["state"].as_str().unwrap();
    assert_eq!(state.len(), 32);
    assert!(data["url"].as_str().unwrap().contains(state));
}

#[tokio::test]
async fn test_unconfigured_provider() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/auth/oauth/google", None, &[]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "UNSUPPORTED_PROVIDER");

    let response = app
        .request("GET", "/auth/callback/myspace?code=abc", None, &[])
        .await;
    assert_eq!(response.error_code(), "UNSUPPORTED_PROVIDER");
}

#[tokio::test]
async fn test_callback_creates_then_reuses_user() {
    let app = helpers::TestApp::new();
    app.github.set_identity("Octo", None);

    let first = app
        .request("GET", "/auth/callback/github?code=one&state=s1", None, &[])
        .await;
    assert_eq!(first.status, StatusCode::OK);

    app.github
        .set_identity("Octo Cat", Some("https://avatars.test/583231"));
    let second = app
        .request("GET", "/auth/callback/github?code=two&state=s2", None, &[])
        .await;
    assert_eq!(second.status, StatusCode::OK);

    let first_user = &first.body["data"]["user"];
    let second_user = &second.body["data"]["user"];
    assert_eq!(first_user["id"], second_user["id"]);
    assert_eq!(second_user["name"], "Octo Cat");
    assert_eq!(second_user["avatar_url"], "https://avatars.test/583231");
    assert_eq!(second_user["provider"], "github");
    assert_eq!(app.store.count().await, 1);

    let token = second.token();
    let profile = app.authed("GET", "/api/profile", &token).await;
    assert_eq!(profile.body["data"]["email"], "octo@example.com");
}

#[tokio::test]
async fn test_callback_failures() {
    let app = helpers::TestApp::new();

    let missing_code = app.request("GET", "/auth/callback/github", None, &[]).await;
    assert_eq!(missing_code.status, StatusCode::BAD_REQUEST);

    let denied = app
        .request("GET", "/auth/callback/github?error=access_denied", None, &[])
        .await;
    assert_eq!(denied.status, StatusCode::BAD_GATEWAY);

    // The stub has no identity, so the exchange fails.
    let rejected = app
        .request("GET", "/auth/callback/github?code=stale", None, &[])
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_GATEWAY);
    assert_eq!(rejected.error_code(), "OAUTH_EXCHANGE_FAILED");
    assert!(!rejected.body["message"].as_str().unwrap().contains("bad_verification_code"));
}
