use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field-level validation failure
///
/// Maps each offending field (by its camelCase wire name) to a
/// human-readable message. Serializes as a flat JSON object so it can be
/// returned as-is in a `400` body and rendered inline per form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Create an empty error set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an error set holding a single field failure
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a failure for `field`
    ///
    /// Only the first message per field is kept.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Message recorded for `field`, if any
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(field, message)` pairs in field-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// `Ok(value)` when no failures were recorded, otherwise `Err(self)`
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation error")?;
        for (i, (field, message)) in self.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{} at \"{}\"", sep, message, field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
