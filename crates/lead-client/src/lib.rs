//! Lead Submission Client
//!
//! Validates form input with the client profile of the shared schema,
//! sends exactly one insert to the configured [`LeadStore`], and turns the
//! outcome into a user-facing [`Notification`].
//!
//! Failures are terminal for a submission attempt: nothing here retries.

pub mod bootstrap;
pub mod notification;
pub mod submission;

pub use bootstrap::fetch_public_config;
pub use lead_store::LeadStore;
pub use notification::{Notification, Variant};
pub use submission::{ErrorKind, SubmissionClient, SubmissionError};
