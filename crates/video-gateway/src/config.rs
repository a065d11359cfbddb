use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Gateway configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub cache_dir: PathBuf,
    pub cache_ttl_secs: u64,
    /// Run a background sweep on this interval, in addition to the per-request sweep
    pub sweep_interval_secs: Option<u64>,
    pub reconcile_on_start: bool,
    pub yt_dlp_path: PathBuf,
    pub upstream_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            cache_dir: PathBuf::from(".video-cache"),
            cache_ttl_secs: 2 * 60 * 60,
            sweep_interval_secs: None,
            reconcile_on_start: true,
            yt_dlp_path: PathBuf::from("yt-dlp"),
            upstream_timeout_secs: 60,
            fetch_timeout_secs: 300,
            user_agent: video_resolver::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Parse configuration from any variable source, falling back to defaults
    /// for missing or unparseable values
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let number = |name: &str| lookup(name).and_then(|v| v.trim().parse::<u64>().ok());

        let port = lookup("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);

        let cache_dir = lookup("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_dir);

        let reconcile_on_start = lookup("RECONCILE_ON_START")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(defaults.reconcile_on_start);

        let yt_dlp_path = lookup("YT_DLP_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.yt_dlp_path);

        Self {
            port,
            cache_dir,
            cache_ttl_secs: number("CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl_secs),
            sweep_interval_secs: number("SWEEP_INTERVAL_SECS").filter(|s| *s > 0),
            reconcile_on_start,
            yt_dlp_path,
            upstream_timeout_secs: number("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout_secs),
            fetch_timeout_secs: number("FETCH_TIMEOUT_SECS").unwrap_or(defaults.fetch_timeout_secs),
            user_agent: lookup("USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_secs.map(Duration::from_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
