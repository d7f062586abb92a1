use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// One rejected field, reported back to the client under `error.details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Runs the payload's `#[validate]` rules and flattens any failures into
/// wire-ready field errors, ordered by field name.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), Vec<FieldError>> {
    payload.validate().map_err(field_errors)
}

fn field_errors(errors: ValidationErrors) -> Vec<FieldError> {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            let field = camel_case(&field);
            errors.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {field}"));
                FieldError::new(&field, message)
            })
        })
        .collect();
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

// Payloads are camelCase on the wire.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
