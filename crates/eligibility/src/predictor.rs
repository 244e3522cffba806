//! Ad predictor: per-candidate features and the weighted linear score used
//! to bias sampling.

use std::collections::BTreeMap;

use ads_core::ad_event::{last_seen_ad_time, last_seen_advertiser_time};
use ads_core::config::EligibleAdsConfig;
use ads_core::{AdEvent, AdsError, AdsResult, CreativeAdLike};
use ads_segmentation::match_segments;
use chrono::{DateTime, Utc};
use tracing::warn;

pub const INTENT_CHILD_SEGMENT_WEIGHT: usize = 0;
pub const INTENT_PARENT_SEGMENT_WEIGHT: usize = 1;
pub const INTEREST_CHILD_SEGMENT_WEIGHT: usize = 2;
pub const INTEREST_PARENT_SEGMENT_WEIGHT: usize = 3;
pub const AD_LAST_SEEN_WEIGHT: usize = 4;
pub const ADVERTISER_LAST_SEEN_WEIGHT: usize = 5;
pub const PRIORITY_WEIGHT: usize = 6;

const WEIGHT_COUNT: usize = 7;
const HOURS_PER_DAY: i64 = 24;

/// The seven predictor weights, indexed by the `*_WEIGHT` constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdPredictorWeights([f64; WEIGHT_COUNT]);

impl AdPredictorWeights {
    pub fn new(weights: [f64; WEIGHT_COUNT]) -> Self {
        Self(weights)
    }

    /// Parse a comma separated list such as `"1.0, 1.0, 0.5, 0.5, 1, 1, 1"`.
    pub fn parse(value: &str) -> AdsResult<Self> {
        let parsed = value
            .split(',')
            .map(|weight| {
                weight.trim().parse::<f64>().map_err(|e| {
                    AdsError::Config(format!("invalid ad predictor weight {weight:?}: {e}"))
                })
            })
            .collect::<AdsResult<Vec<f64>>>()?;

        let weights: [f64; WEIGHT_COUNT] = parsed.try_into().map_err(|parsed: Vec<f64>| {
            AdsError::Config(format!(
                "expected {WEIGHT_COUNT} ad predictor weights, got {}",
                parsed.len()
            ))
        })?;

        if weights.iter().any(|weight| !weight.is_finite() || *weight < 0.0) {
            return Err(AdsError::Config(
                "ad predictor weights must be finite and non-negative".to_string(),
            ));
        }

        Ok(Self(weights))
    }

    /// Weights from config. Malformed or all-zero weights would leave the
    /// sampler with nothing to draw from, so they fall back to the defaults.
    pub fn from_config(config: &EligibleAdsConfig) -> Self {
        match Self::parse(&config.ad_predictor_weights) {
            Ok(weights) if weights.0.iter().any(|weight| *weight > 0.0) => weights,
            Ok(_) => {
                warn!("All ad predictor weights are zero, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse ad predictor weights, using defaults");
                Self::default()
            }
        }
    }

    pub fn get(&self, index: usize) -> f64 {
        self.0[index]
    }
}

impl Default for AdPredictorWeights {
    fn default() -> Self {
        Self([1.0; WEIGHT_COUNT])
    }
}

/// A candidate creative with everything the score is computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct AdPredictor<T> {
    pub creative_ad: T,
    /// Every segment the creative is tagged with across catalog rows.
    pub segments: Vec<String>,
    pub does_match_intent_child_segments: bool,
    pub does_match_intent_parent_segments: bool,
    pub does_match_interest_child_segments: bool,
    pub does_match_interest_parent_segments: bool,
    pub ad_last_seen_hours_ago: i64,
    pub advertiser_last_seen_hours_ago: i64,
    pub score: f64,
}

impl<T: CreativeAdLike> AdPredictor<T> {
    pub fn new(creative_ad: T) -> Self {
        let segments = vec![creative_ad.creative_ad().segment.clone()];
        Self {
            creative_ad,
            segments,
            does_match_intent_child_segments: false,
            does_match_intent_parent_segments: false,
            does_match_interest_child_segments: false,
            does_match_interest_parent_segments: false,
            ad_last_seen_hours_ago: 0,
            advertiser_last_seen_hours_ago: 0,
            score: 0.0,
        }
    }
}

/// Candidates keyed by creative instance id.
pub type AdPredictorMap<T> = BTreeMap<String, AdPredictor<T>>;

/// Fill in segment match flags and recency features.
///
/// A creative that was never viewed counts as last seen at the Unix epoch,
/// which keeps it outside the one-day recency window.
pub fn compute_predictor_features<T: CreativeAdLike>(
    mut ad_predictor: AdPredictor<T>,
    ad_events: &[AdEvent],
    interest_segments: &[String],
    intent_segments: &[String],
    now: DateTime<Utc>,
) -> AdPredictor<T> {
    let intent = match_segments(intent_segments, &ad_predictor.segments);
    ad_predictor.does_match_intent_child_segments = intent.child;
    ad_predictor.does_match_intent_parent_segments = intent.parent;

    let interest = match_segments(interest_segments, &ad_predictor.segments);
    ad_predictor.does_match_interest_child_segments = interest.child;
    ad_predictor.does_match_interest_parent_segments = interest.parent;

    let creative_ad = ad_predictor.creative_ad.creative_ad();
    ad_predictor.ad_last_seen_hours_ago =
        (now - last_seen_ad_time(ad_events, creative_ad)).num_hours();
    ad_predictor.advertiser_last_seen_hours_ago =
        (now - last_seen_advertiser_time(ad_events, creative_ad)).num_hours();

    ad_predictor
}

pub fn compute_predictor_score<T: CreativeAdLike>(
    ad_predictor: &AdPredictor<T>,
    weights: &AdPredictorWeights,
) -> f64 {
    let mut score = 0.0;

    if ad_predictor.does_match_intent_child_segments {
        score += weights.get(INTENT_CHILD_SEGMENT_WEIGHT);
    } else if ad_predictor.does_match_intent_parent_segments {
        score += weights.get(INTENT_PARENT_SEGMENT_WEIGHT);
    }

    if ad_predictor.does_match_interest_child_segments {
        score += weights.get(INTEREST_CHILD_SEGMENT_WEIGHT);
    } else if ad_predictor.does_match_interest_parent_segments {
        score += weights.get(INTEREST_PARENT_SEGMENT_WEIGHT);
    }

    if ad_predictor.ad_last_seen_hours_ago <= HOURS_PER_DAY {
        score += weights.get(AD_LAST_SEEN_WEIGHT) * ad_predictor.ad_last_seen_hours_ago as f64
            / HOURS_PER_DAY as f64;
    }

    if ad_predictor.advertiser_last_seen_hours_ago <= HOURS_PER_DAY {
        score += weights.get(ADVERTISER_LAST_SEEN_WEIGHT)
            * ad_predictor.advertiser_last_seen_hours_ago as f64
            / HOURS_PER_DAY as f64;
    }

    let creative_ad = ad_predictor.creative_ad.creative_ad();
    if creative_ad.priority > 0 {
        score += weights.get(PRIORITY_WEIGHT) / creative_ad.priority as f64;
    }

    score * creative_ad.ptr
}

pub fn compute_predictor_features_and_scores<T: CreativeAdLike>(
    ads: AdPredictorMap<T>,
    ad_events: &[AdEvent],
    interest_segments: &[String],
    intent_segments: &[String],
    weights: &AdPredictorWeights,
    now: DateTime<Utc>,
) -> AdPredictorMap<T> {
    ads.into_iter()
        .map(|(creative_instance_id, ad_predictor)| {
            let mut ad_predictor = compute_predictor_features(
                ad_predictor,
                ad_events,
                interest_segments,
                intent_segments,
                now,
            );
            ad_predictor.score = compute_predictor_score(&ad_predictor, weights);
            (creative_instance_id, ad_predictor)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{creative_ad_for_segment, segments};
    use ads_core::{ConfirmationType, CreativeAd};
    use chrono::Duration;

    fn ad_predictor(segment: &str, ptr: f64, priority: u32) -> AdPredictor<CreativeAd> {
        let mut creative_ad = creative_ad_for_segment(segment);
        creative_ad.ptr = ptr;
        creative_ad.priority = priority;

        let mut ad_predictor = AdPredictor::new(creative_ad);
        ad_predictor.does_match_intent_child_segments = true;
        ad_predictor.ad_last_seen_hours_ago = 15;
        ad_predictor.advertiser_last_seen_hours_ago = 48;
        ad_predictor
    }

    #[test]
    fn test_parse_weights() {
        let weights = AdPredictorWeights::parse("0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0").unwrap();
        assert_eq!(weights.get(INTENT_CHILD_SEGMENT_WEIGHT), 0.0);
        assert_eq!(weights.get(PRIORITY_WEIGHT), 6.0);
    }

    #[test]
    fn test_parse_weights_with_wrong_arity() {
        let err = AdPredictorWeights::parse("1.0, 1.0").unwrap_err();
        assert!(err.to_string().contains("expected 7"));
    }

    #[test]
    fn test_parse_weights_rejects_garbage_and_negatives() {
        assert!(AdPredictorWeights::parse("1, 1, 1, foo, 1, 1, 1").is_err());
        assert!(AdPredictorWeights::parse("1, 1, 1, -1, 1, 1, 1").is_err());
    }

    #[test]
    fn test_zero_weights_from_config_fall_back_to_defaults() {
        let config = EligibleAdsConfig {
            ad_predictor_weights: "0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0".to_string(),
            seed: None,
        };
        assert_eq!(
            AdPredictorWeights::from_config(&config),
            AdPredictorWeights::default()
        );

        let ad_predictor = ad_predictor("foo-bar", 1.0, 1);
        let weights = AdPredictorWeights::from_config(&config);
        assert!(compute_predictor_score(&ad_predictor, &weights) > 0.0);
    }

    #[test]
    fn test_malformed_weights_from_config_fall_back_to_defaults() {
        let config = EligibleAdsConfig {
            ad_predictor_weights: "not weights".to_string(),
            seed: None,
        };
        assert_eq!(
            AdPredictorWeights::from_config(&config),
            AdPredictorWeights::default()
        );
    }

    #[test]
    fn test_score_with_zero_weights() {
        let ad_predictor = ad_predictor("foo-bar", 1.0, 1);
        let weights = AdPredictorWeights::new([0.0; 7]);

        assert_eq!(compute_predictor_score(&ad_predictor, &weights), 0.0);
    }

    #[test]
    fn test_score_with_default_weights() {
        let ad_predictor = ad_predictor("foo-bar", 1.0, 1);

        let score = compute_predictor_score(&ad_predictor, &AdPredictorWeights::default());

        let expected_score = 0.0 + 1.0 + 1.0 * (15.0 / 24.0) + 1.0 / 1.0;
        assert!((score - expected_score).abs() < f64::EPSILON);
    }

    #[test]
    fn test_child_match_takes_precedence_over_parent() {
        let mut ad_predictor = ad_predictor("foo-bar", 1.0, 1);
        ad_predictor.does_match_intent_parent_segments = true;
        ad_predictor.ad_last_seen_hours_ago = 48;
        let weights = AdPredictorWeights::new([1.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        assert_eq!(compute_predictor_score(&ad_predictor, &weights), 1.0);
    }

    #[test]
    fn test_score_scaled_by_ptr_and_priority() {
        let ad_predictor = ad_predictor("foo-bar", 0.5, 4);

        let score = compute_predictor_score(&ad_predictor, &AdPredictorWeights::default());

        let expected_score = (1.0 + 15.0 / 24.0 + 1.0 / 4.0) * 0.5;
        assert!((score - expected_score).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_ptr_zeroes_the_score() {
        let ad_predictor = ad_predictor("foo-bar", 0.0, 1);
        assert_eq!(
            compute_predictor_score(&ad_predictor, &AdPredictorWeights::default()),
            0.0
        );
    }

    #[test]
    fn test_zero_priority_skips_priority_term() {
        let mut ad_predictor = ad_predictor("foo-bar", 1.0, 0);
        ad_predictor.does_match_intent_child_segments = false;
        ad_predictor.ad_last_seen_hours_ago = 48;

        assert_eq!(
            compute_predictor_score(&ad_predictor, &AdPredictorWeights::default()),
            0.0
        );
    }

    #[test]
    fn test_compute_features_matches_segments_per_category() {
        let ad_predictor = AdPredictor::new(creative_ad_for_segment("technology & computing"));

        let ad_predictor = compute_predictor_features(
            ad_predictor,
            &[],
            &segments(&["technology & computing-software"]),
            &segments(&["technology & computing"]),
            Utc::now(),
        );

        assert!(ad_predictor.does_match_intent_child_segments);
        assert!(!ad_predictor.does_match_interest_child_segments);
        assert!(ad_predictor.does_match_interest_parent_segments);
    }

    #[test]
    fn test_compute_features_recency() {
        let now = Utc::now();
        let creative_ad = creative_ad_for_segment("foo-bar");
        let mut sibling = creative_ad_for_segment("foo-bar");
        sibling.advertiser_id = creative_ad.advertiser_id.clone();

        let ad_events = vec![
            AdEvent::new(&sibling, ConfirmationType::Viewed, now - Duration::hours(3)),
            AdEvent::new(&creative_ad, ConfirmationType::Viewed, now - Duration::hours(15)),
        ];

        let ad_predictor =
            compute_predictor_features(AdPredictor::new(creative_ad), &ad_events, &[], &[], now);

        assert_eq!(ad_predictor.ad_last_seen_hours_ago, 15);
        assert_eq!(ad_predictor.advertiser_last_seen_hours_ago, 3);
    }

    #[test]
    fn test_compute_features_for_unseen_ad_measures_from_epoch() {
        let now = Utc::now();
        let ad_predictor = compute_predictor_features(
            AdPredictor::new(creative_ad_for_segment("foo-bar")),
            &[],
            &[],
            &[],
            now,
        );

        assert_eq!(ad_predictor.ad_last_seen_hours_ago, now.timestamp() / 3600);
        assert!(ad_predictor.advertiser_last_seen_hours_ago > HOURS_PER_DAY);
    }

    #[test]
    fn test_compute_features_and_scores() {
        let ad_1 = creative_ad_for_segment("foo-bar1");
        let ad_2 = creative_ad_for_segment("foo-bar3");
        let ads: AdPredictorMap<CreativeAd> = [ad_1.clone(), ad_2.clone()]
            .into_iter()
            .map(|ad| (ad.creative_instance_id.clone(), AdPredictor::new(ad)))
            .collect();

        let scored = compute_predictor_features_and_scores(
            ads,
            &[],
            &segments(&["foo-bar3"]),
            &segments(&["foo-bar1", "foo-bar2"]),
            &AdPredictorWeights::default(),
            Utc::now(),
        );

        // Each matches one child segment plus the priority term.
        assert_eq!(scored[&ad_1.creative_instance_id].score, 2.0);
        assert_eq!(scored[&ad_2.creative_instance_id].score, 2.0);
        assert!(scored[&ad_1.creative_instance_id].does_match_intent_child_segments);
        assert!(scored[&ad_2.creative_instance_id].does_match_interest_child_segments);
    }
}
