//! Public (browser-safe) configuration exposed by the lead server

use serde::{Deserialize, Serialize};

/// Credentials a client needs to reach the hosted lead table directly
///
/// Only the public anon key is ever carried here. Unset values are omitted
/// from the JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_anon_key: Option<String>,
}

impl PublicConfig {
    /// URL and key, when both are set
    pub fn supabase_credentials(&self) -> Option<(&str, &str)> {
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }
}
