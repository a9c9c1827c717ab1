//! In-memory lead store
//!
//! Reference backend: nothing survives a process restart.

use crate::{LeadStore, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use haloride_common::{Lead, LeadId, NewLead};
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::debug;

struct Inner {
    next_id: LeadId,
    leads: BTreeMap<LeadId, Lead>,
}

/// Process-lifetime lead store
///
/// Ids start at 1 and strictly increase. The id increment and the insert
/// happen under one lock, so concurrent creates never collide.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                leads: BTreeMap::new(),
            }),
        }
    }

    /// Number of stored leads
    pub async fn len(&self) -> usize {
        self.inner.lock().await.leads.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeadStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, lead: NewLead) -> StoreResult<Lead> {
        let mut inner = self.inner.lock().await;

        let id = inner.next_id;
        inner.next_id += 1;

        let lead = lead.into_lead(id, Utc::now());
        inner.leads.insert(id, lead.clone());

        debug!("Stored lead {} in memory", id);
        Ok(lead)
    }

    async fn list(&self) -> StoreResult<Vec<Lead>> {
        let inner = self.inner.lock().await;
        Ok(inner.leads.values().cloned().collect())
    }
}
