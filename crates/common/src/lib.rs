//! Shared types for the HaloRide lead pipeline
//!
//! Everything both boundaries (submission client and lead server) need to
//! agree on lives here: the lead record, the raw field mapping a form or
//! request body produces, and the single data-described validation schema.

pub mod config;
pub mod error;
pub mod input;
pub mod lead;
pub mod schema;

pub use config::PublicConfig;
pub use error::ValidationErrors;
pub use input::{LeadField, LeadInput};
pub use lead::{normalize_optional, Lead, LeadId, NewLead};
pub use schema::{FieldRule, LeadSchema, Pattern, GRADE_BANDS};
