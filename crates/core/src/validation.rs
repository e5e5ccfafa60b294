//! Form coercion.
//!
//! Submitted forms arrive as loosely-typed string maps. This module turns them
//! into typed values, collecting every offending field instead of stopping at
//! the first failure, so callers can report all problems in one response.

use std::collections::HashMap;
use std::fmt;

/// A single field that failed coercion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// One or more fields that could not be coerced to their expected types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns true if `field` is among the offending fields.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid form input: ")?;
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

/// Reads typed values out of a submitted form.
///
/// Each accessor records a [`FieldError`] and returns a placeholder when the
/// field is missing or malformed; [`FormReader::finish`] then decides whether
/// the assembled value is usable.
pub struct FormReader<'a> {
    fields: &'a HashMap<String, String>,
    errors: Vec<FieldError>,
}

impl<'a> FormReader<'a> {
    pub fn new(fields: &'a HashMap<String, String>) -> Self {
        Self {
            fields,
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn raw(&mut self, field: &str) -> Option<&'a str> {
        let fields = self.fields;
        match fields.get(field) {
            Some(value) => Some(value.trim()),
            None => {
                self.fail(field, "is required");
                None
            }
        }
    }

    /// A whole number, e.g. age or a 0/1 flag.
    pub fn integer(&mut self, field: &str) -> i64 {
        let Some(raw) = self.raw(field) else {
            return 0;
        };
        match raw.parse::<i64>() {
            Ok(v) => v,
            Err(_) => {
                self.fail(field, format!("expected a whole number, got {raw:?}"));
                0
            }
        }
    }

    /// A finite decimal number.
    pub fn float(&mut self, field: &str) -> f64 {
        let Some(raw) = self.raw(field) else {
            return 0.0;
        };
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                self.fail(field, format!("expected a number, got {raw:?}"));
                0.0
            }
        }
    }

    /// A categorical label, passed through as submitted (trimmed).
    pub fn text(&mut self, field: &str) -> String {
        self.raw(field).unwrap_or_default().to_string()
    }

    /// True when the field equals `expected`; any other present value is false.
    pub fn matches(&mut self, field: &str, expected: &str) -> bool {
        self.raw(field).is_some_and(|v| v == expected)
    }

    /// Returns `value` if no field failed, otherwise all collected errors.
    ///
    /// # Errors
    ///
    /// Returns `ValidationErrors` listing every missing or malformed field.
    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}
