//! Eligible ads: tiered retrieval, frequency capping and score-weighted
//! selection over an injected catalog and event log.

use std::sync::Arc;

use ads_core::config::EngineConfig;
use ads_core::{AdEvent, AdsResult, CreativeAd, CreativeAdLike, UserModel, UserPreferences};
use ads_frequency_capping::{AntiTargetingResource, ExclusionContext, FrequencyCapping};
use ads_segmentation::segment_tiers;
use ads_store::{AdEventStore, ClientState, CreativeAdStore};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::grouping::group_eligible_ads_by_creative_instance_id;
use crate::predictor::{compute_predictor_features_and_scores, AdPredictorWeights};
use crate::sampler::sample_from_ads;

/// Client state captured once per request so every rule sees the same view.
struct ClientSnapshot {
    preferences: UserPreferences,
    browsing_history: Vec<String>,
    subdivision: Option<String>,
    last_served_creative_instance_id: Option<String>,
}

pub struct EligibleAds<C, E> {
    catalog: Arc<C>,
    ad_events: Arc<E>,
    client: Arc<ClientState>,
    frequency_capping: FrequencyCapping,
    weights: AdPredictorWeights,
    rng: Mutex<StdRng>,
    last_served_ad: Mutex<Option<CreativeAd>>,
}

impl<C, E> EligibleAds<C, E>
where
    C: CreativeAdStore,
    E: AdEventStore,
{
    pub fn new(
        catalog: Arc<C>,
        ad_events: Arc<E>,
        client: Arc<ClientState>,
        frequency_capping: FrequencyCapping,
        weights: AdPredictorWeights,
    ) -> Self {
        Self {
            catalog,
            ad_events,
            client,
            frequency_capping,
            weights,
            rng: Mutex::new(StdRng::from_entropy()),
            last_served_ad: Mutex::new(None),
        }
    }

    pub fn from_config(
        config: &EngineConfig,
        catalog: Arc<C>,
        ad_events: Arc<E>,
        client: Arc<ClientState>,
        anti_targeting: AntiTargetingResource,
    ) -> Self {
        let frequency_capping =
            FrequencyCapping::from_config(&config.frequency_capping, anti_targeting);
        let weights = AdPredictorWeights::from_config(&config.eligible_ads);
        let eligible_ads = Self::new(catalog, ad_events, client, frequency_capping, weights);

        match config.eligible_ads.seed {
            Some(seed) => eligible_ads.with_rng(StdRng::seed_from_u64(seed)),
            None => eligible_ads,
        }
    }

    /// Replace the sampling RNG, e.g. with a seeded one for reproducible runs.
    pub fn with_rng(self, rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            ..self
        }
    }

    pub fn set_last_served_ad(&self, creative_ad: &CreativeAd) {
        *self.last_served_ad.lock() = Some(creative_ad.clone());
    }

    pub fn last_served_ad(&self) -> Option<CreativeAd> {
        self.last_served_ad.lock().clone()
    }

    // ─── Retrieval ───────────────────────────────────────────────────

    /// Eligible ads for the first segment tier (child, parent, untargeted)
    /// that has any left after frequency capping.
    pub async fn get(&self, user_model: &UserModel) -> AdsResult<Vec<C::Ad>> {
        let ad_events = self.ad_events.get_all().await?;
        self.get_matching(user_model, &ad_events, |_| true).await
    }

    /// Like [`Self::get`], restricted to ads of the given placement size.
    pub async fn get_for_dimensions(
        &self,
        user_model: &UserModel,
        dimensions: &str,
    ) -> AdsResult<Vec<C::Ad>> {
        let ad_events = self.ad_events.get_all().await?;
        self.get_matching(user_model, &ad_events, |ad| {
            ad.dimensions() == Some(dimensions)
        })
        .await
    }

    async fn get_matching<F>(
        &self,
        user_model: &UserModel,
        ad_events: &[AdEvent],
        predicate: F,
    ) -> AdsResult<Vec<C::Ad>>
    where
        F: Fn(&C::Ad) -> bool + Send + Sync,
    {
        let snapshot = self.client_snapshot();
        let now = Utc::now();

        for (tier, segments) in segment_tiers(user_model) {
            let ads: Vec<C::Ad> = self
                .catalog
                .get_for_segments(&segments)
                .await?
                .into_iter()
                .filter(|ad| predicate(ad))
                .collect();
            let eligible_ads = self.filter_ineligible_ads(ads, ad_events, &snapshot, now);

            if !eligible_ads.is_empty() {
                debug!(
                    tier = ?tier,
                    count = eligible_ads.len(),
                    "Found eligible ads"
                );
                return Ok(eligible_ads);
            }
            debug!(tier = ?tier, segments = ?segments, "No eligible ads for tier");
        }

        Ok(Vec::new())
    }

    // ─── Selection ───────────────────────────────────────────────────

    /// Pick one ad for the user from the first non-empty segment tier.
    /// Capping and recency scoring see the same event history.
    pub async fn choose_ad(&self, user_model: &UserModel) -> AdsResult<Option<C::Ad>> {
        let ad_events = self.ad_events.get_all().await?;
        let eligible_ads = self
            .get_matching(user_model, &ad_events, |_| true)
            .await?;

        Ok(self.choose(
            eligible_ads,
            &ad_events,
            &user_model.interest_segments,
            &user_model.intent_segments,
        ))
    }

    /// Pick one ad from the whole catalog, biased towards creatives that
    /// match the given segments.
    pub async fn get_for_features(
        &self,
        interest_segments: &[String],
        intent_segments: &[String],
    ) -> AdsResult<Option<C::Ad>> {
        let ads = self.catalog.get_all().await?;
        if ads.is_empty() {
            info!("No ads in catalog");
            return Ok(None);
        }

        let ad_events = self.ad_events.get_all().await?;
        let snapshot = self.client_snapshot();
        let eligible_ads = self.filter_ineligible_ads(ads, &ad_events, &snapshot, Utc::now());

        Ok(self.choose(eligible_ads, &ad_events, interest_segments, intent_segments))
    }

    fn choose(
        &self,
        eligible_ads: Vec<C::Ad>,
        ad_events: &[AdEvent],
        interest_segments: &[String],
        intent_segments: &[String],
    ) -> Option<C::Ad> {
        if eligible_ads.is_empty() {
            info!("No eligible ads");
            metrics::counter!("eligible_ads.no_ad").increment(1);
            return None;
        }

        let ads = group_eligible_ads_by_creative_instance_id(&eligible_ads);
        let ads = compute_predictor_features_and_scores(
            ads,
            ad_events,
            interest_segments,
            intent_segments,
            &self.weights,
            Utc::now(),
        );

        let chosen = {
            let mut rng = self.rng.lock();
            sample_from_ads(&ads, &mut *rng)
        };

        match &chosen {
            Some(ad) => {
                let creative_ad = ad.creative_ad();
                info!(
                    creative_instance_id = %creative_ad.creative_instance_id,
                    creative_set_id = %creative_ad.creative_set_id,
                    campaign_id = %creative_ad.campaign_id,
                    candidates = ads.len(),
                    "Chose ad"
                );
                metrics::counter!("eligible_ads.served").increment(1);
                self.set_last_served_ad(creative_ad);
            }
            None => {
                info!(candidates = ads.len(), "No ad with a positive score");
                metrics::counter!("eligible_ads.no_ad").increment(1);
            }
        }

        chosen
    }

    // ─── Filtering ───────────────────────────────────────────────────

    fn client_snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            preferences: self.client.preferences(),
            browsing_history: self.client.browsing_history(),
            subdivision: self.client.subdivision(),
            last_served_creative_instance_id: self
                .last_served_ad
                .lock()
                .as_ref()
                .map(|ad| ad.creative_instance_id.clone()),
        }
    }

    /// Drop ads excluded by frequency capping. If only the ad served last
    /// stood in the way, it is allowed again rather than serving nothing.
    fn filter_ineligible_ads<T: CreativeAdLike>(
        &self,
        ads: Vec<T>,
        ad_events: &[AdEvent],
        snapshot: &ClientSnapshot,
        now: DateTime<Utc>,
    ) -> Vec<T> {
        if ads.is_empty() {
            return ads;
        }

        let ctx = ExclusionContext::new(ad_events, now)
            .with_browsing_history(&snapshot.browsing_history)
            .with_preferences(&snapshot.preferences)
            .with_subdivision(snapshot.subdivision.as_deref());

        let Some(last_served) = snapshot.last_served_creative_instance_id.as_deref() else {
            return self.frequency_capping.apply(ads, &ctx);
        };

        let eligible_ads = self
            .frequency_capping
            .apply(ads.clone(), &ctx.with_last_served(Some(last_served)));
        if !eligible_ads.is_empty() {
            return eligible_ads;
        }

        debug!(
            creative_instance_id = last_served,
            "No eligible ads, retrying without excluding the last served ad"
        );
        self.frequency_capping.apply(ads, &ctx)
    }
}
