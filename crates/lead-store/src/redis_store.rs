//! Redis lead store
//!
//! Durable counterpart of the in-memory store. Ids come from `INCR`, which
//! is atomic across every server sharing the database.

use crate::{LeadStore, StoreResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use haloride_common::{Lead, LeadId, NewLead};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info, warn};

const NEXT_ID_KEY: &str = "leads:next_id";
const INDEX_KEY: &str = "leads:all";

fn lead_key(id: LeadId) -> String {
    format!("lead:{}", id)
}

/// Store backed by Redis
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        info!("Connected to Redis at {}", redis_url);

        Ok(Self { conn })
    }

    /// Get a single lead by id
    pub async fn get(&self, id: LeadId) -> StoreResult<Option<Lead>> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.get(lead_key(id)).await?;

        match json {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    /// Total number of stored leads
    pub async fn count(&self) -> StoreResult<usize> {
        let mut conn = self.conn.clone();
        let count: usize = conn.llen(INDEX_KEY).await?;
        Ok(count)
    }
}

#[async_trait]
impl LeadStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn create(&self, lead: NewLead) -> StoreResult<Lead> {
        let mut conn = self.conn.clone();

        let id: LeadId = conn.incr(NEXT_ID_KEY, 1).await?;
        let lead = lead.into_lead(id, Utc::now());
        let json = serde_json::to_string(&lead)?;

        // Record and index entry land together or not at all
        let _: () = redis::pipe()
            .atomic()
            .set(lead_key(id), json)
            .ignore()
            .rpush(INDEX_KEY, id)
            .ignore()
            .query_async(&mut conn)
            .await?;

        info!("Created lead {} in Redis", id);
        Ok(lead)
    }

    async fn list(&self) -> StoreResult<Vec<Lead>> {
        let mut conn = self.conn.clone();
        let ids: Vec<LeadId> = conn.lrange(INDEX_KEY, 0, -1).await?;
        debug!("Listing {} leads from Redis", ids.len());

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().copied().map(lead_key).collect();
        let records: Vec<Option<String>> =
            redis::cmd("MGET").arg(&keys).query_async(&mut conn).await?;

        decode_records(&ids, records)
    }
}

/// Pair indexed ids with their `MGET` results, skipping missing records
fn decode_records(ids: &[LeadId], records: Vec<Option<String>>) -> StoreResult<Vec<Lead>> {
    let mut leads = Vec::with_capacity(records.len());
    for (id, record) in ids.iter().zip(records) {
        match record {
            Some(data) => leads.push(serde_json::from_str(&data)?),
            None => warn!("Lead {} is indexed but missing", id),
        }
    }
    Ok(leads)
}
