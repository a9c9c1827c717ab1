//! Raw, unvalidated lead input

use crate::error::ValidationErrors;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Fields of a lead submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LeadField {
    Name,
    Grade,
    SchoolName,
    City,
    MobileNumber,
    Email,
}

impl LeadField {
    pub const ALL: [LeadField; 6] = [
        LeadField::Name,
        LeadField::Grade,
        LeadField::SchoolName,
        LeadField::City,
        LeadField::MobileNumber,
        LeadField::Email,
    ];

    /// Wire name used in client-facing JSON and error maps
    pub fn as_str(self) -> &'static str {
        match self {
            LeadField::Name => "name",
            LeadField::Grade => "grade",
            LeadField::SchoolName => "schoolName",
            LeadField::City => "city",
            LeadField::MobileNumber => "mobileNumber",
            LeadField::Email => "email",
        }
    }

    /// Label used in human-readable messages
    pub fn label(self) -> &'static str {
        match self {
            LeadField::Name => "Name",
            LeadField::Grade => "Grade",
            LeadField::SchoolName => "School name",
            LeadField::City => "City",
            LeadField::MobileNumber => "Mobile number",
            LeadField::Email => "Email",
        }
    }

    /// Resolve a raw key to a field
    ///
    /// Accepts the camelCase wire names, the snake_case storage names and
    /// the legacy server names `parentName` / `childGrade`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" | "parentName" | "parent_name" => Some(LeadField::Name),
            "grade" | "childGrade" | "child_grade" => Some(LeadField::Grade),
            "schoolName" | "school_name" => Some(LeadField::SchoolName),
            "city" => Some(LeadField::City),
            "mobileNumber" | "mobile_number" => Some(LeadField::MobileNumber),
            "email" => Some(LeadField::Email),
            _ => None,
        }
    }
}

impl fmt::Display for LeadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw mapping of lead field to submitted string
///
/// This is what a form or a request body produces before any validation.
/// Absent fields are simply not present in the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadInput {
    values: BTreeMap<LeadField, String>,
}

impl LeadInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, field: LeadField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: LeadField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: LeadField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Build from `(key, value)` pairs, ignoring unknown keys
    ///
    /// A canonical key wins over any alias of the same field.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut input = Self::new();
        let mut canonical = BTreeSet::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let Some(field) = LeadField::from_key(key) else {
                continue;
            };
            if key == field.as_str() {
                canonical.insert(field);
                input.set(field, value);
            } else if !canonical.contains(&field) && input.get(field).is_none() {
                input.set(field, value);
            }
        }
        input
    }

    /// Build from a JSON request body
    ///
    /// The body must be an object. Known keys must hold strings; `null`
    /// counts as absent. Unknown keys are ignored. When a body carries both
    /// a canonical key and an alias for one field, the alias is ignored.
    pub fn from_json(body: &serde_json::Value) -> Result<Self, ValidationErrors> {
        let object = body
            .as_object()
            .ok_or_else(|| ValidationErrors::single("body", "Expected a JSON object"))?;

        let mut chosen: BTreeMap<LeadField, (&str, &serde_json::Value)> = BTreeMap::new();
        for (key, value) in object {
            let Some(field) = LeadField::from_key(key) else {
                continue;
            };
            let keep_previous = match chosen.get(&field) {
                Some((prev, _)) => *prev == field.as_str() || key != field.as_str(),
                None => false,
            };
            if !keep_previous {
                chosen.insert(field, (key.as_str(), value));
            }
        }

        let mut input = Self::new();
        let mut errors = ValidationErrors::new();

        for (field, (_, value)) in chosen {
            match value {
                serde_json::Value::String(s) => input.set(field, s.as_str()),
                serde_json::Value::Null => {}
                _ => errors.add(field.as_str(), "Expected a string"),
            }
        }

        errors.into_result(input)
    }
}
