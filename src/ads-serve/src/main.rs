//! ads-serve: picks one ad for a user model from a JSON catalog and event
//! log, applying frequency capping and score-weighted sampling.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ads_core::config::EngineConfig;
use ads_core::{AdEvent, CreativeAd, UserModel};
use ads_eligibility::EligibleAds;
use ads_frequency_capping::AntiTargetingResource;
use ads_store::{ClientState, InMemoryAdEventStore, InMemoryCreativeAdStore};
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ads-serve")]
#[command(about = "Choose an eligible ad for a user model")]
#[command(version)]
struct Cli {
    /// Config file (TOML/JSON/YAML); environment variables take precedence
    #[arg(long, env = "ADS_ENGINE_CONFIG")]
    config: Option<String>,

    /// JSON array of creative ads
    #[arg(long)]
    catalog: PathBuf,

    /// JSON array of previously logged ad events
    #[arg(long)]
    events: Option<PathBuf>,

    /// JSON anti-targeting resource, `{ "sites": { "<creative_set_id>": [..] } }`
    #[arg(long)]
    anti_targeting: Option<PathBuf>,

    /// Interest segments, comma separated
    #[arg(long, value_delimiter = ',')]
    interest: Vec<String>,

    /// Intent segments, comma separated
    #[arg(long, value_delimiter = ',')]
    intent: Vec<String>,

    /// User's ISO 3166-2 subdivision, e.g. US-CA
    #[arg(long)]
    subdivision: Option<String>,

    /// Recently visited URLs, comma separated
    #[arg(long, value_delimiter = ',')]
    visited: Vec<String>,

    /// Sampling seed (overrides config)
    #[arg(long, env = "ADS_ENGINE__ELIGIBLE_ADS__SEED")]
    seed: Option<u64>,

    /// Pick from the first matching segment tier instead of the whole catalog
    #[arg(long, default_value_t = false)]
    tiered: bool,
}

#[derive(Serialize)]
struct ServeOutcome<'a> {
    served: bool,
    ad: Option<&'a CreativeAd>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ads_serve=info,ads_eligibility=info".into()),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = EngineConfig::load_from(cli.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    // Apply CLI overrides
    if let Some(seed) = cli.seed {
        config.eligible_ads.seed = Some(seed);
    }

    info!(
        ad_predictor_weights = %config.eligible_ads.ad_predictor_weights,
        seed = ?config.eligible_ads.seed,
        event_retention_days = config.store.event_retention_days,
        "Configuration loaded"
    );

    let catalog = Arc::new(InMemoryCreativeAdStore::<CreativeAd>::new());
    catalog.save(read_json(&cli.catalog)?)?;

    let ad_events = match &cli.events {
        Some(path) => InMemoryAdEventStore::with_events(read_json::<Vec<AdEvent>>(path)?),
        None => InMemoryAdEventStore::new(),
    };
    let purged = ad_events
        .purge_expired(config.store.event_retention_days)
        .await?;
    let ad_events = Arc::new(ad_events);

    let anti_targeting = match &cli.anti_targeting {
        Some(path) => read_json::<AntiTargetingResource>(path)?,
        None => AntiTargetingResource::default(),
    };

    let client = Arc::new(ClientState::new(config.store.browsing_history_size));
    client.set_subdivision(cli.subdivision);
    for url in cli.visited {
        client.record_visit(url);
    }

    info!(
        catalog_rows = catalog.len(),
        ad_events = ad_events.len(),
        purged_ad_events = purged,
        "Stores loaded"
    );

    let eligible_ads =
        EligibleAds::from_config(&config, catalog, ad_events, client, anti_targeting);

    let chosen = if cli.tiered {
        let user_model = UserModel::new(cli.interest, cli.intent);
        eligible_ads.choose_ad(&user_model).await?
    } else {
        eligible_ads
            .get_for_features(&cli.interest, &cli.intent)
            .await?
    };

    let outcome = ServeOutcome {
        served: chosen.is_some(),
        ad: chosen.as_ref(),
    };
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}
