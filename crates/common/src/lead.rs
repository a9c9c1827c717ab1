//! Lead record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned lead identifier
pub type LeadId = i64;

/// Validated, normalized lead awaiting insertion
///
/// Produced only by [`LeadSchema::validate`](crate::LeadSchema::validate).
/// Optional fields are `None` rather than empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    /// Parent's name
    pub name: String,

    /// Child's grade label
    pub grade: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,

    pub city: String,

    /// Ten-digit mobile number, no country code
    pub mobile_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl NewLead {
    /// Attach store-assigned identity and creation time
    pub fn into_lead(self, id: LeadId, created_at: DateTime<Utc>) -> Lead {
        Lead {
            id,
            name: self.name,
            grade: self.grade,
            school_name: self.school_name,
            city: self.city,
            mobile_number: self.mobile_number,
            email: self.email,
            created_at,
        }
    }
}

/// Stored lead in client-facing (camelCase) shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    /// Unique within its store, never reused
    pub id: LeadId,

    pub name: String,

    pub grade: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,

    pub city: String,

    pub mobile_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Assigned once by the store at insert time
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// The submitted fields, without store-assigned identity
    pub fn submission(&self) -> NewLead {
        NewLead {
            name: self.name.clone(),
            grade: self.grade.clone(),
            school_name: self.school_name.clone(),
            city: self.city.clone(),
            mobile_number: self.mobile_number.clone(),
            email: self.email.clone(),
        }
    }
}

/// Collapse a blank optional value to `None`
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == v.len() {
            Some(v)
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_lead() -> NewLead {
        NewLead {
            name: "Asha Rao".to_string(),
            grade: "Class 4".to_string(),
            school_name: None,
            city: "Pune".to_string(),
            mobile_number: "9876543210".to_string(),
            email: None,
        }
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let lead = new_lead().into_lead(1, Utc::now());
        let json = serde_json::to_value(&lead).unwrap();

        assert!(json.get("schoolName").is_none());
        assert!(json.get("email").is_none());
        assert_eq!(json["mobileNumber"], "9876543210");
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn test_deserialize_without_optionals() {
        let lead: Lead = serde_json::from_value(json!({
            "id": 3,
            "name": "Asha Rao",
            "grade": "Class 4",
            "city": "Pune",
            "mobileNumber": "9876543210",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(lead.id, 3);
        assert_eq!(lead.school_name, None);
        assert_eq!(lead.submission(), new_lead());
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(None), None);
        assert_eq!(normalize_optional(Some(String::new())), None);
        assert_eq!(normalize_optional(Some("   ".to_string())), None);
        assert_eq!(
            normalize_optional(Some(" a@b.com ".to_string())),
            Some("a@b.com".to_string())
        );
    }
}
