//! Data-described lead validation schema
//!
//! Client and server validate independently, but both build their rule set
//! from [`LeadSchema::shared`]. The two profiles differ only in data: the
//! client additionally restricts `grade` to [`GRADE_BANDS`].

use crate::error::ValidationErrors;
use crate::input::{LeadField, LeadInput};
use crate::lead::NewLead;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Grade labels offered by the lead form
pub const GRADE_BANDS: [&str; 12] = [
    "Class 1", "Class 2", "Class 3", "Class 4", "Class 5", "Class 6", "Class 7", "Class 8",
    "Class 9", "Class 10", "Class 11", "Class 12",
];

static ALPHABETIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]*$").expect("Invalid alphabetic regex"));

static MOBILE_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("Invalid mobile number regex"));

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("Invalid email regex")
});

/// Shape a field value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Letters and whitespace only
    Alphabetic,
    /// Exactly ten ASCII digits
    MobileNumber,
    /// Email address syntax
    Email,
    /// No shape constraint
    AnyText,
}

impl Pattern {
    pub fn matches(self, value: &str) -> bool {
        match self {
            Pattern::Alphabetic => ALPHABETIC_REGEX.is_match(value),
            Pattern::MobileNumber => MOBILE_NUMBER_REGEX.is_match(value),
            Pattern::Email => {
                !value.starts_with('.') && !value.contains("..") && EMAIL_REGEX.is_match(value)
            }
            Pattern::AnyText => true,
        }
    }

    /// Whether surrounding whitespace is stripped before matching
    ///
    /// Mobile numbers are matched exactly as entered.
    pub fn trims(self) -> bool {
        !matches!(self, Pattern::MobileNumber)
    }

    fn message(self) -> &'static str {
        match self {
            Pattern::Alphabetic => "Only alphabets allowed",
            Pattern::MobileNumber => "Must be exactly 10 digits",
            Pattern::Email => "Please enter a valid email address",
            Pattern::AnyText => "Invalid value",
        }
    }
}

/// Constraints for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: LeadField,
    pub required: bool,
    /// Minimum length in characters
    pub min_len: usize,
    pub pattern: Pattern,
    /// Closed set of accepted values, with the message used on mismatch
    pub choices: Option<(&'static [&'static str], &'static str)>,
}

impl FieldRule {
    pub fn required(field: LeadField, pattern: Pattern) -> Self {
        Self {
            field,
            required: true,
            min_len: 1,
            pattern,
            choices: None,
        }
    }

    pub fn optional(field: LeadField, pattern: Pattern) -> Self {
        Self {
            required: false,
            ..Self::required(field, pattern)
        }
    }

    pub fn min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    /// Check one raw value, returning the normalized value or a message
    ///
    /// Blank values count as absent. A missing value of a field restricted
    /// to choices reports the choice message.
    pub fn check(&self, raw: Option<&str>) -> Result<Option<String>, String> {
        let value = match raw.filter(|v| !v.trim().is_empty()) {
            Some(v) if self.pattern.trims() => v.trim(),
            Some(v) => v,
            None if self.required => return Err(self.missing_message()),
            None => return Ok(None),
        };

        if value.chars().count() < self.min_len {
            return Err(format!(
                "{} must be at least {} characters",
                self.field.label(),
                self.min_len
            ));
        }

        if !self.pattern.matches(value) {
            return Err(self.pattern.message().to_string());
        }

        if let Some((choices, message)) = self.choices {
            if !choices.contains(&value) {
                return Err(message.to_string());
            }
        }

        Ok(Some(value.to_string()))
    }

    fn missing_message(&self) -> String {
        match self.choices {
            Some((_, message)) => message.to_string(),
            None => format!("{} is required", self.field.label()),
        }
    }
}

/// Complete rule set for a lead
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadSchema {
    rules: Vec<FieldRule>,
}

impl LeadSchema {
    /// The contract both boundaries enforce
    pub fn shared() -> Self {
        Self {
            rules: vec![
                FieldRule::required(LeadField::Name, Pattern::Alphabetic).min_len(2),
                FieldRule::required(LeadField::Grade, Pattern::AnyText),
                FieldRule::optional(LeadField::SchoolName, Pattern::Alphabetic),
                FieldRule::required(LeadField::City, Pattern::Alphabetic).min_len(2),
                FieldRule::required(LeadField::MobileNumber, Pattern::MobileNumber),
                FieldRule::optional(LeadField::Email, Pattern::Email),
            ],
        }
    }

    /// Profile enforced by the lead server
    ///
    /// Accepts any non-empty grade label so older form revisions keep working.
    pub fn server() -> Self {
        Self::shared()
    }

    /// Profile enforced by the submission client
    pub fn client() -> Self {
        Self::shared().restrict(LeadField::Grade, &GRADE_BANDS, "Please select a grade")
    }

    /// Restrict `field` to a closed set of values
    pub fn restrict(
        mut self,
        field: LeadField,
        choices: &'static [&'static str],
        message: &'static str,
    ) -> Self {
        for rule in self.rules.iter_mut().filter(|r| r.field == field) {
            rule.choices = Some((choices, message));
        }
        self
    }

    pub fn rule(&self, field: LeadField) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.field == field)
    }

    /// Validate and normalize raw input
    ///
    /// Every failing field is reported, one message per field.
    pub fn validate(&self, input: &LeadInput) -> Result<NewLead, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut values: BTreeMap<LeadField, String> = BTreeMap::new();

        for rule in &self.rules {
            match rule.check(input.get(rule.field)) {
                Ok(Some(value)) => {
                    values.insert(rule.field, value);
                }
                Ok(None) => {}
                Err(message) => errors.add(rule.field.as_str(), message),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut take = |field: LeadField| values.remove(&field);
        Ok(NewLead {
            name: take(LeadField::Name).unwrap_or_default(),
            grade: take(LeadField::Grade).unwrap_or_default(),
            school_name: take(LeadField::SchoolName),
            city: take(LeadField::City).unwrap_or_default(),
            mobile_number: take(LeadField::MobileNumber).unwrap_or_default(),
            email: take(LeadField::Email),
        })
    }
}

impl Default for LeadSchema {
    fn default() -> Self {
        Self::shared()
    }
}
