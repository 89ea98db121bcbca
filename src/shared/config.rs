use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub request_timeout: u64,
    /// Bearer credential for the sync API. Injected by the host app.
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    pub sync_interval: u64,
    pub batch_size: u32,
    pub max_concurrent_kinds: u32,
    // metered連携: photos are deferred to unmetered unless this is set
    pub photos_on_metered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_ms: u64,
    pub stalled_after_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/vigil.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            remote: RemoteConfig {
                base_url: "https://api.vigil.example".to_string(),
                request_timeout: 30,
                auth_token: None,
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval: 300, // 5 minutes
                batch_size: 50,
                max_concurrent_kinds: 3,
                photos_on_metered: false,
            },
            retry: RetryConfig {
                max_retries: 5,
                base_delay_ms: 1_000,
                max_delay_ms: 300_000, // 5 minutes
                jitter_ms: 1_000,
                stalled_after_secs: 300,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("VIGIL_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("VIGIL_REMOTE_BASE_URL") {
            if !v.trim().is_empty() {
                cfg.remote.base_url = v;
            }
        }
        if let Ok(v) = std::env::var("VIGIL_REMOTE_TOKEN") {
            if !v.trim().is_empty() {
                cfg.remote.auth_token = Some(v);
            }
        }
        if let Ok(v) = std::env::var("VIGIL_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Ok(v) = std::env::var("VIGIL_SYNC_INTERVAL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.sync_interval = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("VIGIL_SYNC_BATCH_SIZE") {
            if let Some(value) = parse_u32(&v) {
                cfg.sync.batch_size = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("VIGIL_PHOTOS_ON_METERED") {
            cfg.sync.photos_on_metered = parse_bool(&v, cfg.sync.photos_on_metered);
        }
        if let Ok(v) = std::env::var("VIGIL_MAX_RETRIES") {
            if let Some(value) = parse_u32(&v) {
                cfg.retry.max_retries = value;
            }
        }
        if let Ok(v) = std::env::var("VIGIL_RETRY_BASE_DELAY_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.retry.base_delay_ms = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("VIGIL_RETRY_MAX_DELAY_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.retry.max_delay_ms = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("VIGIL_STALLED_AFTER_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.retry.stalled_after_secs = value.max(1);
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.remote.base_url.trim().is_empty() {
            return Err("Remote base_url cannot be empty".to_string());
        }
        if self.sync.batch_size == 0 {
            return Err("Sync batch_size must be greater than 0".to_string());
        }
        if self.sync.max_concurrent_kinds == 0 {
            return Err("Sync max_concurrent_kinds must be greater than 0".to_string());
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err("Retry base_delay_ms cannot exceed max_delay_ms".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
