//! In-memory stand-in for the account REST backend.
//!
//! Serves the auth and settings endpoints with bearer-token sessions. State
//! lives in a single `RwLock`ed store and is lost when the process exits.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

type Rejection = (StatusCode, &'static str);

const UNAUTHORIZED: Rejection = (StatusCode::UNAUTHORIZED, "unauthorized");

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: AuthUser,
    pub token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notifications {
    #[serde(default = "enabled")]
    pub email: bool,
    #[serde(default = "enabled")]
    pub push: bool,
    #[serde(default)]
    pub marketing: bool,
}

impl Default for Notifications {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            marketing: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preferences {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub notifications: Notifications,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            notifications: Notifications::default(),
            language: default_language(),
            timezone: default_timezone(),
        }
    }
}

fn enabled() -> bool {
    true
}

fn default_theme() -> String {
    "system".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body of both profile updates; the auth variant simply never sends
/// `company` or `location`.
#[derive(Deserialize)]
pub struct ProfileChanges {
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

#[derive(Clone, Debug)]
struct Account {
    profile: UserProfile,
    password: String,
    preferences: Preferences,
}

#[derive(Default)]
pub struct Store {
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, String>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/profile", get(get_user).put(update_user))
        .route("/settings/profile", get(get_profile).put(update_profile))
        .route("/settings/preferences", get(get_preferences).put(update_preferences))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the session token to an account id.
fn authenticate(store: &Store, headers: &HeaderMap) -> Result<String, Rejection> {
    bearer(headers)
        .and_then(|token| store.sessions.get(token))
        .cloned()
        .ok_or(UNAUTHORIZED)
}

fn open_session(store: &mut Store, account_id: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    store.sessions.insert(token.clone(), account_id.to_string());
    token
}

fn auth_user(profile: &UserProfile) -> AuthUser {
    AuthUser {
        id: profile.id.clone(),
        name: profile.name.clone(),
        email: profile.email.clone(),
    }
}

fn user(profile: &UserProfile) -> User {
    User {
        id: profile.id.clone(),
        name: profile.name.clone(),
        email: profile.email.clone(),
        bio: profile.bio.clone(),
        website: profile.website.clone(),
        created_at: profile.created_at.clone(),
        updated_at: profile.updated_at.clone(),
    }
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<Registration>,
) -> Result<(StatusCode, Json<AuthResponse>), Rejection> {
    let mut store = db.write().await;
    if store.accounts.values().any(|a| a.profile.email == input.email) {
        return Err((StatusCode::CONFLICT, "email already registered"));
    }
    let created = now();
    let profile = UserProfile {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        email: input.email,
        bio: None,
        website: None,
        company: None,
        location: None,
        avatar: None,
        created_at: created.clone(),
        updated_at: created,
    };
    let id = profile.id.clone();
    let user = auth_user(&profile);
    store.accounts.insert(
        id.clone(),
        Account {
            profile,
            password: input.password,
            preferences: Preferences::default(),
        },
    );
    let token = open_session(&mut store, &id);
    info!(user_id = %id, "registered account");
    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

async fn login(State(db): State<Db>, Json(input): Json<Credentials>) -> Result<Json<AuthResponse>, Rejection> {
    let mut store = db.write().await;
    let account = store
        .accounts
        .values()
        .find(|a| a.profile.email == input.email && a.password == input.password)
        .ok_or(UNAUTHORIZED)?;
    let user = auth_user(&account.profile);
    let token = open_session(&mut store, &user.id);
    info!(user_id = %user.id, "logged in");
    Ok(Json(AuthResponse { user, token }))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Result<StatusCode, Rejection> {
    let mut store = db.write().await;
    let token = bearer(&headers).ok_or(UNAUTHORIZED)?;
    store.sessions.remove(token).ok_or(UNAUTHORIZED)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_user(State(db): State<Db>, headers: HeaderMap) -> Result<Json<User>, Rejection> {
    let store = db.read().await;
    let id = authenticate(&store, &headers)?;
    let account = store.accounts.get(&id).ok_or(UNAUTHORIZED)?;
    Ok(Json(user(&account.profile)))
}

/// Apply profile changes and return the updated profile.
async fn apply_changes(db: &Db, headers: &HeaderMap, changes: ProfileChanges) -> Result<UserProfile, Rejection> {
    let mut store = db.write().await;
    let id = authenticate(&store, headers)?;
    let account = store.accounts.get_mut(&id).ok_or(UNAUTHORIZED)?;
    let profile = &mut account.profile;
    profile.name = changes.name;
    profile.email = changes.email;
    if changes.bio.is_some() {
        profile.bio = changes.bio;
    }
    if changes.website.is_some() {
        profile.website = changes.website;
    }
    if changes.company.is_some() {
        profile.company = changes.company;
    }
    if changes.location.is_some() {
        profile.location = changes.location;
    }
    profile.updated_at = now();
    Ok(profile.clone())
}

async fn update_user(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(changes): Json<ProfileChanges>,
) -> Result<Json<User>, Rejection> {
    let profile = apply_changes(&db, &headers, changes).await?;
    Ok(Json(user(&profile)))
}

async fn get_profile(State(db): State<Db>, headers: HeaderMap) -> Result<Json<UserProfile>, Rejection> {
    let store = db.read().await;
    let id = authenticate(&store, &headers)?;
    let account = store.accounts.get(&id).ok_or(UNAUTHORIZED)?;
    Ok(Json(account.profile.clone()))
}

async fn update_profile(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(changes): Json<ProfileChanges>,
) -> Result<Json<UserProfile>, Rejection> {
    apply_changes(&db, &headers, changes).await.map(Json)
}

async fn get_preferences(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Preferences>, Rejection> {
    let store = db.read().await;
    let id = authenticate(&store, &headers)?;
    let account = store.accounts.get(&id).ok_or(UNAUTHORIZED)?;
    Ok(Json(account.preferences.clone()))
}

async fn update_preferences(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(preferences): Json<Preferences>,
) -> Result<Json<Preferences>, Rejection> {
    let mut store = db.write().await;
    let id = authenticate(&store, &headers)?;
    let account = store.accounts.get_mut(&id).ok_or(UNAUTHORIZED)?;
    account.preferences = preferences;
    Ok(Json(account.preferences.clone()))
}
