//! Domain DTOs for the account API and the schemas that guard them.
//!
//! # Design
//! Response entities (`AuthResponse`, `User`, `UserProfile`,
//! `UserPreferences`) carry structural schemas with no defaults, since the
//! backend owns the data. Form inputs (`LoginInput`, `RegisterInput`,
//! `ProfileInput`, `ProfileUpdate`) carry the user-facing constraints and are
//! validated before any request is built. Wire names are camelCase.
//!
//! `UserPreferences` is both: its `Validated` schema is the strict response
//! contract, while `UserPreferences::from_form` applies the form defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{parse_with, Check, Fallback, Field, Kind, Schema, Validated, ValidationErrors};

const EMAIL_MESSAGE: &str = "Please enter a valid email address";
const NAME_RULES: Kind = Kind::String(&[Check::MinLength(2, "Name must be at least 2 characters")]);
const EMAIL_RULES: Kind = Kind::String(&[Check::Email(EMAIL_MESSAGE)]);

// ---------------------------------------------------------------------------
// Response entities
// ---------------------------------------------------------------------------

/// Identity returned alongside a token by login and register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: AuthUser,
    pub token: String,
}

const AUTH_USER_SCHEMA: Schema = Schema::new(&[
    Field::required("id", Kind::STRING),
    Field::required("name", Kind::STRING),
    Field::required("email", Kind::STRING),
]);

impl Validated for AuthResponse {
    const SCHEMA: &'static Schema = &Schema::new(&[
        Field::required("user", Kind::Object(&AUTH_USER_SCHEMA)),
        Field::required("token", Kind::STRING),
    ]);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Validated for User {
    const SCHEMA: &'static Schema = &Schema::new(&[
        Field::required("id", Kind::STRING),
        Field::required("name", Kind::STRING),
        Field::required("email", Kind::STRING),
        Field::optional("bio", Kind::STRING),
        Field::optional("website", Kind::STRING),
        Field::required("createdAt", Kind::STRING),
        Field::required("updatedAt", Kind::STRING),
    ]);
}

/// `User` plus the optional settings-page fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Validated for UserProfile {
    const SCHEMA: &'static Schema = &Schema::new(&[
        Field::required("id", Kind::STRING),
        Field::required("name", Kind::STRING),
        Field::required("email", Kind::STRING),
        Field::optional("bio", Kind::STRING),
        Field::optional("website", Kind::STRING),
        Field::optional("company", Kind::STRING),
        Field::optional("location", Kind::STRING),
        Field::optional("avatar", Kind::STRING),
        Field::required("createdAt", Kind::STRING),
        Field::required("updatedAt", Kind::STRING),
    ]);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notifications {
    pub email: bool,
    pub push: bool,
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

const THEMES: Kind = Kind::Enum(&["light", "dark", "system"]);

const NOTIFICATIONS_SCHEMA: Schema = Schema::new(&[
    Field::required("email", Kind::Boolean),
    Field::required("push", Kind::Boolean),
    Field::required("marketing", Kind::Boolean),
]);

const NOTIFICATIONS_FORM_SCHEMA: Schema = Schema::new(&[
    Field::with_default("email", Kind::Boolean, Fallback::Bool(true)),
    Field::with_default("push", Kind::Boolean, Fallback::Bool(true)),
    Field::with_default("marketing", Kind::Boolean, Fallback::Bool(false)),
]);

/// Preferences form: every leaf has a default, but the `notifications`
/// object itself must be present.
pub const PREFERENCES_FORM_SCHEMA: Schema = Schema::new(&[
    Field::with_default("theme", THEMES, Fallback::Str("system")),
    Field::required("notifications", Kind::Object(&NOTIFICATIONS_FORM_SCHEMA)),
    Field::with_default("language", Kind::STRING, Fallback::Str("en")),
    Field::with_default("timezone", Kind::STRING, Fallback::Str("UTC")),
]);

/// Display and notification preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub theme: Theme,
    pub notifications: Notifications,
    pub language: String,
    pub timezone: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            notifications: Notifications::default(),
            language: "en".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

impl UserPreferences {
    /// Parse a preferences form value, filling absent fields with defaults.
    pub fn from_form(value: &Value) -> Result<Self, ValidationErrors> {
        parse_with(&PREFERENCES_FORM_SCHEMA, value)
    }
}

/// Server responses must carry every field; nothing is defaulted.
impl Validated for UserPreferences {
    const SCHEMA: &'static Schema = &Schema::new(&[
        Field::required("theme", THEMES),
        Field::required("notifications", Kind::Object(&NOTIFICATIONS_SCHEMA)),
        Field::required("language", Kind::STRING),
        Field::required("timezone", Kind::STRING),
    ]);
}

// ---------------------------------------------------------------------------
// Form inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl Validated for LoginInput {
    const SCHEMA: &'static Schema = &Schema::new(&[
        Field::required("email", EMAIL_RULES),
        Field::required(
            "password",
            Kind::String(&[Check::MinLength(8, "Password must be at least 8 characters")]),
        ),
    ]);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Validated for RegisterInput {
    const SCHEMA: &'static Schema = &Schema::new(&[
        Field::required("name", NAME_RULES),
        Field::required("email", EMAIL_RULES),
        Field::required(
            "password",
            Kind::String(&[
                Check::MinLength(8, "Password must be at least 8 characters"),
                Check::MaxLength(100, "Password must be less than 100 characters"),
            ]),
        ),
    ]);
}

const BIO_RULES: Kind = Kind::String(&[Check::MaxLength(500, "Bio must be less than 500 characters")]);
const WEBSITE_RULES: Kind = Kind::String(&[Check::UrlOrEmpty("Please enter a valid URL")]);

/// Payload for `PUT /auth/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Validated for ProfileInput {
    const SCHEMA: &'static Schema = &Schema::new(&[
        Field::required("name", NAME_RULES),
        Field::required("email", EMAIL_RULES),
        Field::optional("bio", BIO_RULES),
        Field::optional("website", WEBSITE_RULES),
    ]);
}

/// Payload for `PUT /settings/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Validated for ProfileUpdate {
    const SCHEMA: &'static Schema = &Schema::new(&[
        Field::required("name", NAME_RULES),
        Field::required("email", EMAIL_RULES),
        Field::optional("bio", BIO_RULES),
        Field::optional("website", WEBSITE_RULES),
        Field::optional(
            "company",
            Kind::String(&[Check::MaxLength(100, "Company name must be less than 100 characters")]),
        ),
        Field::optional(
            "location",
            Kind::String(&[Check::MaxLength(100, "Location must be less than 100 characters")]),
        ),
    ]);
}
