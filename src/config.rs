//! Configuration
//!
//! Every setting is a command line flag with an environment variable
//! fallback. A `.env` file in the working directory is loaded first.

use clap::{Args, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Where records live
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// Document store connection string (`file://<dir>` or a directory)
    #[arg(long, env = "CATALOGO_STORE_URL", default_value = "file://./data", global = true)]
    pub store_url: String,

    /// Database name, a directory under the store root
    #[arg(long, env = "CATALOGO_DATABASE", default_value = "catalogo", global = true)]
    pub database: String,

    #[arg(long, env = "CATALOGO_MOVIES_COLLECTION", default_value = "filmes", global = true)]
    pub movies_collection: String,

    #[arg(long, env = "CATALOGO_COMMENTS_COLLECTION", default_value = "comentarios", global = true)]
    pub comments_collection: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    #[arg(long, env = "CATALOGO_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory with the front end's static files
    #[arg(long, env = "CATALOGO_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Requests allowed per client in one window
    #[arg(long, env = "CATALOGO_RATE_LIMIT_MAX", default_value_t = 100)]
    pub rate_limit_max: u32,

    #[arg(long, env = "CATALOGO_RATE_LIMIT_WINDOW_SECS", default_value_t = 900)]
    pub rate_limit_window_secs: u64,

    /// Rate limit by the first `X-Forwarded-For` address instead of the
    /// peer; set only behind a reverse proxy that overwrites the header
    #[arg(long, env = "CATALOGO_TRUST_PROXY")]
    pub trust_proxy: bool,

    /// How long the browser trusts its cached movie list
    #[arg(long, env = "CATALOGO_CACHE_TTL_SECS", default_value_t = 300)]
    pub cache_ttl_secs: u64,

    #[arg(long, env = "CATALOGO_SEARCH_DEBOUNCE_MS", default_value_t = 300)]
    pub search_debounce_ms: u64,
}

impl ServerConfig {
    pub fn bind_address(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address '{addr}': {e}"))
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            public_dir: PathBuf::from("public"),
            rate_limit_max: 100,
            rate_limit_window_secs: 900,
            trust_proxy: false,
            cache_ttl_secs: 300,
            search_debounce_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(self) -> &'static str {
        match self {
            Environment::Development => "catalogo=debug,tower_http=debug,info",
            Environment::Production => "catalogo=info,tower_http=warn,warn",
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}
