//! Declarative schemas for request and response payloads.
//!
//! # Design
//! A `Schema` is a static table of fields. Each field names a primitive
//! `Kind`, its `Presence` (required, optional, or defaulted) and, for strings,
//! a list of `Check`s that carry their user-facing message. Schemas are plain
//! `const` data, defined once and never mutated.
//!
//! `Schema::validate` walks untyped JSON and never stops at the first
//! problem: every violated field is reported with its dotted path. On success
//! it returns a normalized value with defaults filled in and unknown keys
//! dropped, which is then deserialized into the typed entity. That second
//! step only ever sees input the schema already accepted, so a typed value
//! is never built from a partially valid payload.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Structural contract for a JSON object.
#[derive(Debug)]
pub struct Schema {
    pub fields: &'static [Field],
}

#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub kind: Kind,
    pub presence: Presence,
}

#[derive(Debug)]
pub enum Kind {
    String(&'static [Check]),
    Boolean,
    Enum(&'static [&'static str]),
    Object(&'static Schema),
}

#[derive(Debug)]
pub enum Presence {
    Required,
    Optional,
    Default(Fallback),
}

/// Value substituted for an absent defaulted field.
#[derive(Debug)]
pub enum Fallback {
    Str(&'static str),
    Bool(bool),
}

/// String constraint with the message reported when it fails.
#[derive(Debug)]
pub enum Check {
    MinLength(usize, &'static str),
    MaxLength(usize, &'static str),
    Email(&'static str),
    Url(&'static str),
    /// A well-formed URL, or the empty string.
    UrlOrEmpty(&'static str),
}

impl Schema {
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }

    /// Validate `input`, returning the normalized value or every violation.
    pub fn validate(&self, input: &Value) -> Result<Value, ValidationErrors> {
        let mut violations = Vec::new();
        let normalized = self.check_object(input, "", &mut violations);
        if violations.is_empty() {
            Ok(normalized)
        } else {
            Err(ValidationErrors { violations })
        }
    }

    fn check_object(&self, input: &Value, prefix: &str, out: &mut Vec<FieldViolation>) -> Value {
        let Some(map) = input.as_object() else {
            out.push(FieldViolation::wrong_type(display_path(prefix), "object"));
            return Value::Null;
        };

        let mut normalized = Map::new();
        for field in self.fields {
            let path = join_path(prefix, field.name);
            match map.get(field.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    if let Some(checked) = field.kind.check(value, &path, out) {
                        normalized.insert(field.name.to_string(), checked);
                    }
                }
                None => match &field.presence {
                    Presence::Required => out.push(FieldViolation::missing(path)),
                    Presence::Optional => {}
                    Presence::Default(fallback) => {
                        normalized.insert(field.name.to_string(), fallback.to_value());
                    }
                },
            }
        }
        Value::Object(normalized)
    }
}

impl Field {
    pub const fn required(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Required,
        }
    }

    pub const fn optional(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Optional,
        }
    }

    pub const fn with_default(name: &'static str, kind: Kind, fallback: Fallback) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Default(fallback),
        }
    }
}

impl Kind {
    /// Plain string with no further constraints.
    pub const STRING: Kind = Kind::String(&[]);

    fn check(&self, value: &Value, path: &str, out: &mut Vec<FieldViolation>) -> Option<Value> {
        match self {
            Kind::String(checks) => {
                let Some(s) = value.as_str() else {
                    out.push(FieldViolation::wrong_type(path.to_string(), "string"));
                    return None;
                };
                for check in *checks {
                    if let Some(violation) = check.apply(s, path) {
                        out.push(violation);
                    }
                }
                Some(value.clone())
            }
            Kind::Boolean => {
                if value.is_boolean() {
                    Some(value.clone())
                } else {
                    out.push(FieldViolation::wrong_type(path.to_string(), "boolean"));
                    None
                }
            }
            Kind::Enum(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| *a == s) => Some(value.clone()),
                _ => {
                    out.push(FieldViolation {
                        field: path.to_string(),
                        kind: ViolationKind::NotAllowed,
                        message: format!("Expected one of: {}", allowed.join(", ")),
                    });
                    None
                }
            },
            Kind::Object(schema) => Some(schema.check_object(value, path, out)),
        }
    }
}

impl Fallback {
    fn to_value(&self) -> Value {
        match self {
            Fallback::Str(s) => Value::String((*s).to_string()),
            Fallback::Bool(b) => Value::Bool(*b),
        }
    }
}

impl Check {
    fn apply(&self, s: &str, path: &str) -> Option<FieldViolation> {
        let (kind, message) = match self {
            Check::MinLength(min, msg) if s.chars().count() < *min => {
                (ViolationKind::TooShort { min: *min }, msg)
            }
            Check::MaxLength(max, msg) if s.chars().count() > *max => {
                (ViolationKind::TooLong { max: *max }, msg)
            }
            Check::Email(msg) if !EMAIL.is_match(s) => (ViolationKind::Format, msg),
            Check::Url(msg) if !is_url(s) => (ViolationKind::Format, msg),
            Check::UrlOrEmpty(msg) if !s.is_empty() && !is_url(s) => (ViolationKind::Format, msg),
            _ => return None,
        };
        Some(FieldViolation {
            field: path.to_string(),
            kind,
            message: (*message).to_string(),
        })
    }
}

fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn display_path(prefix: &str) -> String {
    if prefix.is_empty() {
        "$".to_string()
    } else {
        prefix.to_string()
    }
}

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    WrongType { expected: &'static str },
    Format,
    TooShort { min: usize },
    TooLong { max: usize },
    NotAllowed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Dotted path to the field, `$` for the document itself.
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl FieldViolation {
    fn missing(field: String) -> Self {
        Self {
            field,
            kind: ViolationKind::Missing,
            message: "Required".to_string(),
        }
    }

    fn wrong_type(field: String, expected: &'static str) -> Self {
        Self {
            field,
            kind: ViolationKind::WrongType { expected },
            message: format!("Expected {expected}"),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found in one validation pass. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", summarize(.violations))]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// First violation reported for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&FieldViolation> {
        self.violations.iter().find(|v| v.field == field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.field.as_str())
    }

    fn document(message: String) -> Self {
        Self {
            violations: vec![FieldViolation {
                field: "$".to_string(),
                kind: ViolationKind::Format,
                message,
            }],
        }
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate `value` against `schema` and deserialize the normalized result.
///
/// For types that accept more than one shape, e.g. a lenient form schema
/// next to the strict response schema bound by `Validated`.
pub fn parse_with<T: DeserializeOwned>(schema: &Schema, value: &Value) -> Result<T, ValidationErrors> {
    let normalized = schema.validate(value)?;
    serde_json::from_value(normalized).map_err(|e| ValidationErrors::document(e.to_string()))
}

/// A typed value that can only be obtained through its schema.
pub trait Validated: Serialize + DeserializeOwned {
    const SCHEMA: &'static Schema;

    /// Validate untyped JSON and convert it into `Self`.
    fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        parse_with(Self::SCHEMA, value)
    }

    /// Re-check an already typed value, e.g. one assembled by a form layer.
    fn validate(&self) -> Result<(), ValidationErrors> {
        let value = serde_json::to_value(self).map_err(|e| ValidationErrors::document(e.to_string()))?;
        Self::SCHEMA.validate(&value).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const INNER: Schema = Schema::new(&[
        Field::with_default("flag", Kind::Boolean, Fallback::Bool(false)),
        Field::with_default("label", Kind::STRING, Fallback::Str("none")),
    ]);

    const OUTER: Schema = Schema::new(&[
        Field::required(
            "name",
            Kind::String(&[Check::MinLength(2, "too short"), Check::MaxLength(5, "too long")]),
        ),
        Field::optional("email", Kind::String(&[Check::Email("bad email")])),
        Field::optional("site", Kind::String(&[Check::UrlOrEmpty("bad url")])),
        Field::optional("home", Kind::String(&[Check::Url("bad home")])),
        Field::with_default("mode", Kind::Enum(&["a", "b"]), Fallback::Str("a")),
        Field::optional("inner", Kind::Object(&INNER)),
    ]);

    #[test]
    fn fills_defaults_and_strips_unknown_keys() {
        let out = OUTER
            .validate(&json!({"name": "abc", "extra": 1, "inner": {"other": 2}}))
            .unwrap();
        assert_eq!(
            out,
            json!({"name": "abc", "mode": "a", "inner": {"flag": false, "label": "none"}})
        );
        let out = OUTER.validate(&json!({"name": "abc"})).unwrap();
        assert!(out.get("inner").is_none());
    }

    #[test]
    fn nested_defaults_fill_partial_objects() {
        let out = OUTER.validate(&json!({"name": "abc", "inner": {"flag": true}})).unwrap();
        assert_eq!(out["inner"], json!({"flag": true, "label": "none"}));
    }

    #[test]
    fn collects_every_violation() {
        let err = OUTER
            .validate(&json!({"name": 7, "email": "nope", "site": "not-a-url", "mode": "c"}))
            .unwrap_err();
        let fields: Vec<&str> = err.fields().collect();
        assert_eq!(fields, vec!["name", "email", "site", "mode"]);
        assert_eq!(
            err.field("name").unwrap().kind,
            ViolationKind::WrongType { expected: "string" }
        );
        assert_eq!(err.field("email").unwrap().message, "bad email");
        assert_eq!(err.field("mode").unwrap().kind, ViolationKind::NotAllowed);
    }

    #[test]
    fn reports_missing_required_field() {
        let err = OUTER.validate(&json!({})).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.field("name").unwrap().kind, ViolationKind::Missing);
    }

    #[test]
    fn null_counts_as_absent() {
        let out = OUTER.validate(&json!({"name": "abc", "email": null})).unwrap();
        assert!(out.get("email").is_none());
        let err = OUTER.validate(&json!({"name": null})).unwrap_err();
        assert_eq!(err.field("name").unwrap().kind, ViolationKind::Missing);
    }

    #[test]
    fn length_bounds_count_characters() {
        let err = OUTER.validate(&json!({"name": "a"})).unwrap_err();
        assert_eq!(err.field("name").unwrap().kind, ViolationKind::TooShort { min: 2 });
        let err = OUTER.validate(&json!({"name": "abcdef"})).unwrap_err();
        assert_eq!(err.field("name").unwrap().kind, ViolationKind::TooLong { max: 5 });
        assert!(OUTER.validate(&json!({"name": "éé"})).is_ok());
    }

    #[test]
    fn empty_string_passes_url_or_empty() {
        assert!(OUTER.validate(&json!({"name": "abc", "site": ""})).is_ok());
        assert!(OUTER
            .validate(&json!({"name": "abc", "site": "https://example.com"}))
            .is_ok());
    }

    #[test]
    fn url_check_rejects_empty_and_relative_values() {
        for bad in ["", "not-a-url", "/relative/path"] {
            let err = OUTER.validate(&json!({"name": "abc", "home": bad})).unwrap_err();
            assert_eq!(err.field("home").unwrap().kind, ViolationKind::Format, "{bad:?}");
            assert_eq!(err.field("home").unwrap().message, "bad home");
        }
        assert!(OUTER
            .validate(&json!({"name": "abc", "home": "https://example.com/a"}))
            .is_ok());
    }

    #[test]
    fn parse_with_uses_the_given_schema() {
        #[derive(serde::Deserialize, Debug)]
        struct Inner {
            flag: bool,
            label: String,
        }
        let inner: Inner = parse_with(&INNER, &json!({"flag": true})).unwrap();
        assert!(inner.flag);
        assert_eq!(inner.label, "none");
    }

    #[test]
    fn nested_paths_are_dotted() {
        let err = OUTER
            .validate(&json!({"name": "abc", "inner": {"flag": "yes"}}))
            .unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["inner.flag"]);
    }

    #[test]
    fn rejects_non_object_document() {
        let err = OUTER.validate(&json!([1, 2])).unwrap_err();
        assert_eq!(err.field("$").unwrap().kind, ViolationKind::WrongType { expected: "object" });
    }

    #[test]
    fn display_lists_each_violation() {
        let err = OUTER.validate(&json!({"email": "x"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation failed: name: Required; email: bad email"
        );
    }
}
