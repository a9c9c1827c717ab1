//! Configuration management for the Lead API
//!
//! Loads configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use haloride_common::PublicConfig;
use lead_store::{supabase::DEFAULT_TABLE, LeadStore, MemoryStore, RedisStore, SupabaseStore};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which backend holds submitted leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Supabase,
    Redis,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "supabase" => Ok(StoreKind::Supabase),
            "redis" => Ok(StoreKind::Redis),
            other => anyhow::bail!(
                "Unknown LEAD_STORE '{}' (expected memory, supabase or redis)",
                other
            ),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreKind::Memory => "memory",
            StoreKind::Supabase => "supabase",
            StoreKind::Redis => "redis",
        })
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server host
    pub api_host: String,

    /// API server port
    pub api_port: u16,

    /// Lead store backend
    pub store: StoreKind,

    /// Supabase project URL (public)
    pub supabase_url: Option<String>,

    /// Supabase anon key (public)
    pub supabase_anon_key: Option<String>,

    /// Supabase table holding leads
    pub supabase_table: String,

    /// Redis connection URL
    pub redis_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            api_host: lookup("LEAD_API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            api_port: lookup("LEAD_API_PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .context("Invalid LEAD_API_PORT")?,

            store: lookup("LEAD_STORE")
                .unwrap_or_else(|| "memory".to_string())
                .parse()?,

            supabase_url: lookup("SUPABASE_URL").filter(|v| !v.is_empty()),
            supabase_anon_key: lookup("SUPABASE_ANON_KEY").filter(|v| !v.is_empty()),

            supabase_table: lookup("SUPABASE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),

            redis_url: lookup("REDIS_URL")
                .unwrap_or_else(|| "redis://127.0.0.1:6379".to_string()),
        };

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.api_port == 0 {
            anyhow::bail!("LEAD_API_PORT must be greater than 0");
        }

        if self.store == StoreKind::Supabase
            && (self.supabase_url.is_none() || self.supabase_anon_key.is_none())
        {
            anyhow::bail!("LEAD_STORE=supabase requires SUPABASE_URL and SUPABASE_ANON_KEY");
        }

        Ok(())
    }

    /// Get the API server address
    pub fn api_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    /// Credentials safe to hand to browsers
    pub fn public_config(&self) -> PublicConfig {
        PublicConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
        }
    }

    /// Construct the configured lead store
    pub async fn build_store(&self) -> Result<Arc<dyn LeadStore>> {
        let store: Arc<dyn LeadStore> = match self.store {
            StoreKind::Memory => Arc::new(MemoryStore::new()),
            StoreKind::Supabase => {
                let (url, key) = self
                    .public_config()
                    .supabase_credentials()
                    .map(|(u, k)| (u.to_string(), k.to_string()))
                    .context("Supabase credentials missing")?;
                Arc::new(SupabaseStore::new(url, key).with_table(&self.supabase_table))
            }
            StoreKind::Redis => Arc::new(
                RedisStore::new(&self.redis_url)
                    .await
                    .context("Failed to initialize Redis store")?,
            ),
        };

        Ok(store)
    }
}
