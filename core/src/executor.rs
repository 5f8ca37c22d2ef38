//! Typed operations over a transport.
//!
//! # Design
//! `Executor` pairs an `ApiClient` with a `Transport` and runs one blocking
//! round-trip per call. It holds no mutable state, so a shared reference can
//! serve concurrent callers. There are no retries and no internal timeout;
//! every failure is returned to the caller as-is.

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{parse_json, ApiClient};
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    AuthResponse, LoginInput, ProfileInput, ProfileUpdate, RegisterInput, User, UserPreferences,
    UserProfile,
};

#[derive(Debug, Clone)]
pub struct Executor<T = UreqTransport> {
    client: ApiClient,
    transport: T,
}

impl Executor<UreqTransport> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(ApiClient::new(config), UreqTransport::new())
    }
}

impl<T: Transport> Executor<T> {
    pub fn new(client: ApiClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Same transport, with `Authorization: Bearer <token>` on every request.
    pub fn with_bearer(self, token: impl Into<String>) -> Self {
        Self {
            client: self.client.with_bearer(token),
            transport: self.transport,
        }
    }

    /// Send a raw JSON request and return the parsed body of a 2xx response.
    pub fn send(&self, path: &str, method: HttpMethod, body: Option<&Value>) -> Result<Value, ApiError> {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let req = self.client.request(method, path, body);
        let response = self.round_trip(&req)?;
        parse_json(path, response)
    }

    fn round_trip(&self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %req.method, path = %req.path, "sending request");
        match self.transport.execute(req) {
            Ok(response) => {
                if response.is_success() {
                    debug!(method = %req.method, path = %req.path, status = response.status, "request succeeded");
                } else {
                    warn!(method = %req.method, path = %req.path, status = response.status, "request rejected");
                }
                Ok(response)
            }
            Err(e) => {
                warn!(method = %req.method, path = %req.path, error = %e, "transport failure");
                Err(ApiError::Http {
                    status: None,
                    path: req.path.clone(),
                    message: e.to_string(),
                })
            }
        }
    }

    // -- auth ---------------------------------------------------------------

    pub fn login(&self, input: &LoginInput) -> Result<AuthResponse, ApiError> {
        let req = self.client.build_login(input)?;
        self.client.parse_login(self.round_trip(&req)?)
    }

    pub fn register(&self, input: &RegisterInput) -> Result<AuthResponse, ApiError> {
        let req = self.client.build_register(input)?;
        self.client.parse_register(self.round_trip(&req)?)
    }

    pub fn get_profile(&self) -> Result<User, ApiError> {
        let req = self.client.build_get_profile();
        self.client.parse_get_profile(self.round_trip(&req)?)
    }

    pub fn update_profile(&self, input: &ProfileInput) -> Result<User, ApiError> {
        let req = self.client.build_update_profile(input)?;
        self.client.parse_update_profile(self.round_trip(&req)?)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        let req = self.client.build_logout();
        self.client.parse_logout(self.round_trip(&req)?)
    }

    // -- settings -----------------------------------------------------------

    pub fn get_settings_profile(&self) -> Result<UserProfile, ApiError> {
        let req = self.client.build_get_settings_profile();
        self.client.parse_get_settings_profile(self.round_trip(&req)?)
    }

    pub fn update_settings_profile(&self, input: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        let req = self.client.build_update_settings_profile(input)?;
        self.client.parse_update_settings_profile(self.round_trip(&req)?)
    }

    pub fn get_preferences(&self) -> Result<UserPreferences, ApiError> {
        let req = self.client.build_get_preferences();
        self.client.parse_get_preferences(self.round_trip(&req)?)
    }

    pub fn update_preferences(&self, input: &UserPreferences) -> Result<UserPreferences, ApiError> {
        let req = self.client.build_update_preferences(input)?;
        self.client.parse_update_preferences(self.round_trip(&req)?)
    }
}
