//! Lead Stores
//!
//! Every persistence backend for leads sits behind the same two-operation
//! [`LeadStore`] interface, so the lead server and the submission client
//! can swap backends without changing code paths.
//!
//! **Backends:**
//! - `memory`: process-lifetime map, ids from 1 (reference store)
//! - `supabase`: hosted Postgres table over PostgREST
//! - `redis_store`: durable store with atomic `INCR` ids
//! - `api`: the `/api/leads` route of a running lead server

pub mod api;
pub mod error;
pub mod memory;
pub mod redis_store;
pub mod supabase;

use async_trait::async_trait;
use haloride_common::{Lead, NewLead};

pub use api::ApiStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use supabase::SupabaseStore;

/// Append-only lead persistence
///
/// Implementations assign `id` and `createdAt`. A successful `create`
/// stores exactly one record; a failed one stores none.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Short backend name for logs and health output
    fn name(&self) -> &'static str;

    /// Insert a validated lead and return the stored record
    async fn create(&self, lead: NewLead) -> StoreResult<Lead>;

    /// Every stored lead, in id order
    async fn list(&self) -> StoreResult<Vec<Lead>>;
}
