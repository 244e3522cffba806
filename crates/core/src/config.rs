use serde::Deserialize;

/// Root engine configuration. Loaded from environment variables with the
/// prefix `ADS_ENGINE__` and an optional TOML/JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub eligible_ads: EligibleAdsConfig,
    #[serde(default)]
    pub frequency_capping: FrequencyCappingConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EligibleAdsConfig {
    /// Comma separated predictor weights, in feature order: intent child,
    /// intent parent, interest child, interest parent, ad last seen,
    /// advertiser last seen, priority.
    #[serde(default = "default_ad_predictor_weights")]
    pub ad_predictor_weights: String,
    /// Seed for the sampling RNG. Unset means seeded from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrequencyCappingConfig {
    #[serde(default = "default_true")]
    pub per_hour_enabled: bool,
    #[serde(default = "default_true")]
    pub dayparting_enabled: bool,
    #[serde(default = "default_true")]
    pub subdivision_targeting_enabled: bool,
    #[serde(default = "default_true")]
    pub anti_targeting_enabled: bool,
    #[serde(default = "default_true")]
    pub conversion_cap_enabled: bool,
    #[serde(default = "default_true")]
    pub last_served_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_event_retention_days")]
    pub event_retention_days: i64,
    #[serde(default = "default_browsing_history_size")]
    pub browsing_history_size: usize,
}

// Default functions
fn default_ad_predictor_weights() -> String {
    "1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0".to_string()
}
fn default_true() -> bool {
    true
}
fn default_event_retention_days() -> i64 {
    90
}
fn default_browsing_history_size() -> usize {
    100
}

impl Default for EligibleAdsConfig {
    fn default() -> Self {
        Self {
            ad_predictor_weights: default_ad_predictor_weights(),
            seed: None,
        }
    }
}

impl Default for FrequencyCappingConfig {
    fn default() -> Self {
        Self {
            per_hour_enabled: true,
            dayparting_enabled: true,
            subdivision_targeting_enabled: true,
            anti_targeting_enabled: true,
            conversion_cap_enabled: true,
            last_served_enabled: true,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            event_retention_days: default_event_retention_days(),
            browsing_history_size: default_browsing_history_size(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables only.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from an optional file, with environment variables
    /// taking precedence.
    pub fn load_from(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("ADS_ENGINE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
