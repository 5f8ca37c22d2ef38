//! Stateless HTTP request builder and response parser for the account API.
//!
//! # Design
//! `ApiClient` holds the base URL, an optional bearer token and any extra
//! headers the caller wants on every request. It never touches the network.
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Request bodies are serialized as given; form validation happens upstream.
//! Response bodies are always checked against the entity schema.

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::schema::Validated;
use crate::types::{
    AuthResponse, LoginInput, ProfileInput, ProfileUpdate, RegisterInput, User, UserPreferences,
    UserProfile,
};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const AUTH_PROFILE_PATH: &str = "/auth/profile";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const SETTINGS_PROFILE_PATH: &str = "/settings/profile";
pub const PREFERENCES_PATH: &str = "/settings/preferences";

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    bearer: Option<String>,
    headers: Vec<(String, String)>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self::from_base_url(config.base_url())
    }

    /// Build from a raw base URL. A trailing slash is stripped.
    pub fn from_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer: None,
            headers: Vec::new(),
        }
    }

    /// Attach `Authorization: Bearer <token>` to every request.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Add a header to every request. Applied after the defaults, so it wins.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request descriptor for `path` with the default header set.
    pub fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let mut req = HttpRequest {
            method,
            path: path.to_string(),
            url: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body,
        };
        req.set_header("content-type", JSON_CONTENT_TYPE);
        req.set_header("cache-control", "no-store");
        if let Some(token) = &self.bearer {
            req.set_header("authorization", &format!("Bearer {token}"));
        }
        for (name, value) in &self.headers {
            req.set_header(name, value);
        }
        req
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(method, path, Some(body)))
    }

    // -- auth ---------------------------------------------------------------

    pub fn build_login(&self, input: &LoginInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, LOGIN_PATH, input)
    }

    pub fn build_register(&self, input: &RegisterInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, REGISTER_PATH, input)
    }

    pub fn build_get_profile(&self) -> HttpRequest {
        self.request(HttpMethod::Get, AUTH_PROFILE_PATH, None)
    }

    pub fn build_update_profile(&self, input: &ProfileInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, AUTH_PROFILE_PATH, input)
    }

    pub fn build_logout(&self) -> HttpRequest {
        self.request(HttpMethod::Post, LOGOUT_PATH, None)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<AuthResponse, ApiError> {
        parse_entity(LOGIN_PATH, response)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<AuthResponse, ApiError> {
        parse_entity(REGISTER_PATH, response)
    }

    pub fn parse_get_profile(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_entity(AUTH_PROFILE_PATH, response)
    }

    pub fn parse_update_profile(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_entity(AUTH_PROFILE_PATH, response)
    }

    /// Any 2xx is success; the body, if any, is ignored.
    pub fn parse_logout(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(LOGOUT_PATH, &response)
    }

    // -- settings -----------------------------------------------------------

    pub fn build_get_settings_profile(&self) -> HttpRequest {
        self.request(HttpMethod::Get, SETTINGS_PROFILE_PATH, None)
    }

    pub fn build_update_settings_profile(&self, input: &ProfileUpdate) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, SETTINGS_PROFILE_PATH, input)
    }

    pub fn build_get_preferences(&self) -> HttpRequest {
        self.request(HttpMethod::Get, PREFERENCES_PATH, None)
    }

    pub fn build_update_preferences(&self, input: &UserPreferences) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, PREFERENCES_PATH, input)
    }

    pub fn parse_get_settings_profile(&self, response: HttpResponse) -> Result<UserProfile, ApiError> {
        parse_entity(SETTINGS_PROFILE_PATH, response)
    }

    pub fn parse_update_settings_profile(&self, response: HttpResponse) -> Result<UserProfile, ApiError> {
        parse_entity(SETTINGS_PROFILE_PATH, response)
    }

    pub fn parse_get_preferences(&self, response: HttpResponse) -> Result<UserPreferences, ApiError> {
        parse_entity(PREFERENCES_PATH, response)
    }

    pub fn parse_update_preferences(&self, response: HttpResponse) -> Result<UserPreferences, ApiError> {
        parse_entity(PREFERENCES_PATH, response)
    }
}

/// Reject non-2xx responses with the raw body as the message.
fn check_status(path: &str, response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: Some(response.status),
        path: path.to_string(),
        message: response.body.clone(),
    })
}

/// Status check followed by a JSON parse of the body.
pub fn parse_json(path: &str, response: HttpResponse) -> Result<Value, ApiError> {
    check_status(path, &response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn parse_entity<T: Validated>(path: &str, response: HttpResponse) -> Result<T, ApiError> {
    let value = parse_json(path, response)?;
    Ok(T::from_json(&value)?)
}
