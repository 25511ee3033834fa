use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateLimitConfig {
    /// Turning this off yields the unguarded variant of the endpoint.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[validate(range(min = 1))]
    #[serde(default = "default_generate_requests_per_minute")]
    pub generate_requests_per_minute: u32,

    #[validate(range(min = 1, max = 3600))]
    #[serde(default = "default_window_size_seconds")]
    pub window_size_seconds: Option<u64>, // Optional, defaults to 60 seconds if not set

    /// Expired entries are swept once the map tracks this many clients.
    #[validate(range(min = 100))]
    #[serde(default = "default_max_tracked_clients")]
    pub max_tracked_clients: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            generate_requests_per_minute: default_generate_requests_per_minute(),
            window_size_seconds: default_window_size_seconds(),
            max_tracked_clients: default_max_tracked_clients(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_generate_requests_per_minute() -> u32 {
    30
}

fn default_window_size_seconds() -> Option<u64> {
    Some(60)
}

fn default_max_tracked_clients() -> usize {
    10_000
}
