use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, AuthResponse, Preferences, User, UserProfile};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<String> {
    json_request(method, uri, Some(token), "")
}

const REGISTER_ADA: &str = r#"{"name":"Ada","email":"ada@example.com","password":"password123"}"#;

/// Clones share the router's state, so sequential calls see each other's writes.
async fn call(app: &Router, req: Request<String>) -> axum::response::Response {
    app.clone().oneshot(req).await.unwrap()
}

// --- auth ---

#[tokio::test]
async fn register_returns_201_with_token() {
    let resp = app()
        .oneshot(json_request("POST", "/auth/register", None, REGISTER_ADA))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let auth: AuthResponse = body_json(resp).await;
    assert_eq!(auth.user.name, "Ada");
    assert_eq!(auth.user.email, "ada@example.com");
    assert!(!auth.token.is_empty());
}

#[tokio::test]
async fn register_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/auth/register", None, r#"{"name":"Ada"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn duplicate_registration_returns_409() {
    let app = app();
    let resp = call(&app, json_request("POST", "/auth/register", None, REGISTER_ADA)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = call(&app, json_request("POST", "/auth/register", None, REGISTER_ADA)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_unknown_user_returns_401() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            r#"{"email":"nobody@example.com","password":"password123"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(&body_bytes(resp).await[..], b"unauthorized");
}

#[tokio::test]
async fn profile_without_token_returns_401() {
    let resp = app()
        .oneshot(Request::builder().uri("/auth/profile").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn preferences_with_unknown_token_returns_401() {
    let resp = app()
        .oneshot(authed("GET", "/settings/preferences", "bogus"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- full account lifecycle ---

#[tokio::test]
async fn account_lifecycle() {
    let app = app();

    // register
    let resp = call(&app, json_request("POST", "/auth/register", None, REGISTER_ADA)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let registered: AuthResponse = body_json(resp).await;
    let id = registered.user.id.clone();

    // login with a second session
    let resp = call(
        &app,
        json_request(
            "POST",
            "/auth/login",
            None,
            r#"{"email":"ada@example.com","password":"password123"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let auth: AuthResponse = body_json(resp).await;
    assert_eq!(auth.user, registered.user);
    assert_ne!(auth.token, registered.token);
    let token = auth.token;

    // wrong password
    let resp = call(
        &app,
        json_request(
            "POST",
            "/auth/login",
            None,
            r#"{"email":"ada@example.com","password":"wrong-password"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // auth profile
    let resp = call(&app, authed("GET", "/auth/profile", &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.id, id);
    assert!(user.bio.is_none());
    assert_eq!(user.created_at, user.updated_at);

    // auth profile update
    let resp = call(
        &app,
        json_request(
            "PUT",
            "/auth/profile",
            Some(&token),
            r#"{"name":"Ada Lovelace","email":"ada@example.com","bio":"Mathematician"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.name, "Ada Lovelace");
    assert_eq!(user.bio.as_deref(), Some("Mathematician"));

    // settings profile carries the auth-side changes
    let resp = call(
        &app,
        json_request(
            "PUT",
            "/settings/profile",
            Some(&token),
            r#"{"name":"Ada Lovelace","email":"ada@example.com","company":"Analytical Engines"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: UserProfile = body_json(resp).await;
    assert_eq!(profile.company.as_deref(), Some("Analytical Engines"));
    assert_eq!(profile.bio.as_deref(), Some("Mathematician"));

    let resp = call(&app, authed("GET", "/settings/profile", &token)).await;
    let fetched: UserProfile = body_json(resp).await;
    assert_eq!(fetched.company, profile.company);

    // preferences start at defaults
    let resp = call(&app, authed("GET", "/settings/preferences", &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let prefs: Preferences = body_json(resp).await;
    assert_eq!(prefs, Preferences::default());

    let resp = call(
        &app,
        json_request(
            "PUT",
            "/settings/preferences",
            Some(&token),
            r#"{"theme":"dark","notifications":{"email":false,"push":true,"marketing":true},"language":"fr","timezone":"Europe/Paris"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let prefs: Preferences = body_json(resp).await;
    assert_eq!(prefs.theme, "dark");
    assert!(prefs.notifications.marketing);

    // logout
    let resp = call(&app, authed("POST", "/auth/logout", &token)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // revoked token
    let resp = call(&app, authed("GET", "/auth/profile", &token)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // the registration session is still live
    let resp = call(&app, authed("GET", "/auth/profile", &registered.token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
