use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SecurityConfig {
    /// Single origin allowed to call the endpoint from a browser.
    #[validate(length(min = 1))]
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,

    #[validate(range(min = 60))]
    #[serde(default = "default_preflight_max_age_secs")]
    pub preflight_max_age_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origin: default_allowed_origin(),
            preflight_max_age_secs: default_preflight_max_age_secs(),
        }
    }
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_preflight_max_age_secs() -> u64 {
    86_400
}
