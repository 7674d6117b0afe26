use serde::Deserialize;
use skybook_catalog::PricingConfig;
use std::env;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
    #[serde(default)]
    pub payment: PaymentSettings,
    #[serde(default)]
    pub sessions: SessionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

fn default_port() -> u16 { 3000 }

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_max_passengers")]
    pub max_passengers: u32,
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            default_currency: default_currency(),
            max_passengers: default_max_passengers(),
        }
    }
}

fn default_tax_rate() -> f64 { 0.18 }
fn default_currency() -> String { "INR".to_string() }
fn default_max_passengers() -> u32 { 9 }

impl From<&BusinessRules> for PricingConfig {
    fn from(rules: &BusinessRules) -> Self {
        PricingConfig {
            tax_rate: rules.tax_rate,
            default_currency: rules.default_currency.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentSettings {
    /// Artificial delay of the simulated gateway
    #[serde(default = "default_settlement_delay_ms")]
    pub settlement_delay_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            settlement_delay_ms: default_settlement_delay_ms(),
            timeout_ms: default_timeout_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_settlement_delay_ms() -> u64 { 1500 }
fn default_timeout_ms() -> u64 { 10_000 }
fn default_max_attempts() -> u32 { 3 }

/// Limits on the visitor sessions the API keeps in memory.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    /// Sessions untouched for this long are dropped by the sweeper
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_ttl_secs: default_idle_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_idle_ttl_secs() -> u64 { 1800 }
fn default_sweep_interval_secs() -> u64 { 60 }
fn default_max_sessions() -> usize { 10_000 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"))
    }

    pub fn load_from(dir: &Path) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let file = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let s = config::Config::builder()
            .add_source(config::File::with_name(&file("default")))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&file(&run_mode)).required(false))
            // Developer overrides, never checked in
            .add_source(config::File::with_name(&file("local")).required(false))
            // Eg.. `SKYBOOK__SERVER__PORT=8080` sets `server.port`
            .add_source(config::Environment::with_prefix("SKYBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn pricing(&self) -> PricingConfig {
        PricingConfig::from(&self.business_rules)
    }
}
