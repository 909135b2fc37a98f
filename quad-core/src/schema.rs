//! Field schemas driving the generic CRUD screens.
//!
//! Each resource is described once as a [`ResourceSpec`]; the table columns,
//! form fields, client-side validation, and REST URLs are all derived from
//! it. This replaces the per-resource copies the product started with.

use crate::datetime::is_valid_local_datetime;
use serde_json::Value;
use thiserror::Error;

/// What kind of value a field holds, and how to edit/validate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Multi-line text, rendered wider in tables and taller in forms.
    LongText,
    Email,
    Url,
    /// Local ISO-8601 datetime, normalized via [`crate::datetime`].
    DateTime,
    Bool,
    /// Bounded integer (e.g. star ratings).
    Int { min: i64, max: i64 },
}

/// One editable/displayable field of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// JSON property name on the wire (camelCase).
    pub name: &'static str,
    /// Human-readable column/form label.
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_len: Option<usize>,
}

/// Declarative description of one backend resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Stable key used in test identifiers and persistence.
    pub key: &'static str,
    /// Screen title, e.g. "Help Requests".
    pub title: &'static str,
    /// REST base path, e.g. `/api/helprequest`.
    pub api_base: &'static str,
    /// UI route path, e.g. `/helprequest`.
    pub ui_path: &'static str,
    /// JSON property identifying a record (`id`, or `orgCode` for
    /// organizations).
    pub id_field: &'static str,
    pub fields: &'static [FieldSpec],
}

impl ResourceSpec {
    /// `GET {api_base}/all`
    pub fn list_url(&self) -> String {
        format!("{}/all", self.api_base)
    }

    /// `POST {api_base}/post`
    pub fn post_url(&self) -> String {
        format!("{}/post", self.api_base)
    }

    /// `GET`/`PUT`/`DELETE` target; the id travels in params.
    pub fn item_url(&self) -> String {
        self.api_base.to_string()
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Client-side form rejection, raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be a valid email")]
    InvalidEmail { field: &'static str },
    #[error("{field} must be a valid URL")]
    InvalidUrl { field: &'static str },
    #[error("{field} must be a local datetime (YYYY-MM-DDTHH:MM)")]
    InvalidDateTime { field: &'static str },
    #[error("{field} must be a whole number")]
    NotAnInteger { field: &'static str },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
    #[error("{field} exceeds the maximum length of {max}")]
    TooLong { field: &'static str, max: usize },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field }
            | ValidationError::InvalidEmail { field }
            | ValidationError::InvalidUrl { field }
            | ValidationError::InvalidDateTime { field }
            | ValidationError::NotAnInteger { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::TooLong { field, .. } => field,
        }
    }
}

/// Matches the original form check: something before `@`, a dot after it.
fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

fn looks_like_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Validate a JSON record against a resource's field schema.
///
/// Collects every failure rather than stopping at the first, so forms can
/// mark all invalid fields in one pass.
pub fn validate_record(spec: &ResourceSpec, record: &Value) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for field in spec.fields {
        let value = record.get(field.name);
        let text = match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(v) => Some(v),
        };

        let Some(value) = text else {
            // Booleans default to false rather than failing a required check.
            if field.required && !matches!(field.kind, FieldKind::Bool) {
                errors.push(ValidationError::Required { field: field.name });
            }
            continue;
        };

        match field.kind {
            FieldKind::Text | FieldKind::LongText => {}
            FieldKind::Email => {
                if !value.as_str().is_some_and(looks_like_email) {
                    errors.push(ValidationError::InvalidEmail { field: field.name });
                }
            }
            FieldKind::Url => {
                if !value.as_str().is_some_and(looks_like_url) {
                    errors.push(ValidationError::InvalidUrl { field: field.name });
                }
            }
            FieldKind::DateTime => {
                if !value.as_str().is_some_and(is_valid_local_datetime) {
                    errors.push(ValidationError::InvalidDateTime { field: field.name });
                }
            }
            FieldKind::Bool => {}
            FieldKind::Int { min, max } => {
                let parsed = match value {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                };
                match parsed {
                    None => errors.push(ValidationError::NotAnInteger { field: field.name }),
                    Some(n) if n < min || n > max => {
                        errors.push(ValidationError::OutOfRange {
                            field: field.name,
                            min,
                            max,
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        if let (Some(max), Some(s)) = (field.max_len, value.as_str()) {
            if s.chars().count() > max {
                errors.push(ValidationError::TooLong {
                    field: field.name,
                    max,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
