//! Typed API client core for the account service.
//!
//! # Overview
//! Builds `HttpRequest` values, executes them through a `Transport`, and
//! turns `HttpResponse` values into schema-validated entities. The request
//! builder and response parser never touch the network, so every operation
//! can be tested against canned responses.
//!
//! # Design
//! - `Config` is built once at process start and passed in explicitly.
//! - `ApiClient` is stateless apart from the base URL and fixed headers.
//!   Each operation is split into `build_*` and `parse_*`.
//! - `Executor` joins a client with a `Transport` (`UreqTransport` in
//!   production) and exposes one blocking method per operation.
//! - Entities are only produced by a successful `Schema` pass; see
//!   `schema::Validated`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod schema;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::Config;
pub use error::{ApiError, ConfigError};
pub use executor::Executor;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use schema::{FieldViolation, Validated, ValidationErrors, ViolationKind};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    AuthResponse, AuthUser, LoginInput, Notifications, ProfileInput, ProfileUpdate, RegisterInput,
    Theme, User, UserPreferences, UserProfile,
};
