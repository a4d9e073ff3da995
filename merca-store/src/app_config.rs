use merca_pricing::DiscountPolicy;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_validity_days")]
    pub quote_validity_days: i64,
    #[serde(default = "default_lookahead_days")]
    pub expiring_lookahead_days: i64,
    #[serde(default = "default_sweep_seconds")]
    pub expiry_sweep_seconds: u64,
    #[serde(default)]
    pub discount_stacking: DiscountPolicy,
    #[serde(default)]
    pub allow_accept_from_draft: bool,
    #[serde(default)]
    pub require_view_before_accept: bool,
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_validity_days() -> i64 {
    30
}

fn default_lookahead_days() -> i64 {
    3
}

fn default_sweep_seconds() -> u64 {
    300
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            quote_validity_days: default_validity_days(),
            expiring_lookahead_days: default_lookahead_days(),
            expiry_sweep_seconds: default_sweep_seconds(),
            discount_stacking: DiscountPolicy::default(),
            allow_accept_from_draft: false,
            require_view_before_accept: false,
            default_currency: default_currency(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment file, optional.
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in.
            .add_source(config::File::with_name("config/local").required(false))
            // `MERCA__SERVER__PORT=9090` style environment overrides.
            .add_source(config::Environment::with_prefix("MERCA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
