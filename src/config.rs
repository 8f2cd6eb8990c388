use serde::Deserialize;

/// Configuration for the API server
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// PostgreSQL database URL
    pub database_url: String,
    /// Redis URL, used for caching variant option responses
    pub redis_url: String,
    /// Port to run the server on
    pub port: u16,
    /// Directory for the daily rotated audit log. Audit logging to file is off when unset
    #[serde(default)]
    pub log_dir: Option<String>,
    /// Maximum number of pooled PostgreSQL connections
    #[serde(default = "default_pool_size")]
    pub db_pool_size: usize,
    /// TTL of cached variant option responses
    #[serde(default = "default_variant_cache_ttl_secs")]
    pub variant_cache_ttl_secs: u64,
    /// Flat shipping fee in yen
    #[serde(default = "default_shipping_fee")]
    pub shipping_fee: f64,
    /// Cart subtotal from which shipping is free
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: f64,
}

fn default_pool_size() -> usize {
    20
}

fn default_variant_cache_ttl_secs() -> u64 {
    crate::db::connection::DEFAULT_VARIANT_CACHE_TTL_SECS
}

fn default_shipping_fee() -> f64 {
    550.0
}

fn default_free_shipping_threshold() -> f64 {
    5000.0
}
