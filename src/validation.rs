use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const MAX_LABEL_LENGTH: usize = 50;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// How an incoming payload relates to what is already stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Every field must be present in the payload.
    Replace,
    /// Absent fields fall back to the stored value.
    Partial,
}

/// Collects every field-level problem of a single payload so they can be
/// reported together.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> FieldErrors {
        FieldErrors::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.push(field, REQUIRED);
        }

        value
    }

    pub fn not_blank(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let value = self.required(field, value)?;

        if value.trim().is_empty() {
            self.push(field, BLANK);
            return None;
        }

        Some(value)
    }

    /// Required, non blank and at most `MAX_LABEL_LENGTH` characters.
    pub fn label(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let value = self.not_blank(field, value)?;

        if value.chars().count() > MAX_LABEL_LENGTH {
            self.push(
                field,
                format!(
                    "Ensure this field has no more than {} characters.",
                    MAX_LABEL_LENGTH
                ),
            );
            return None;
        }

        Some(value)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Callers reach this once at least one field came back as `None`, which
    /// always leaves an entry behind.
    pub fn into_error(self) -> Error {
        Error::InvalidFields {
            fields: self.errors,
        }
    }
}
