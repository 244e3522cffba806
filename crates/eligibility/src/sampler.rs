//! Score-proportional sampling over scored candidates.

use ads_core::CreativeAdLike;
use rand::Rng;
use tracing::warn;

use crate::predictor::AdPredictorMap;

pub fn calculate_normalising_constant<T>(ads: &AdPredictorMap<T>) -> f64 {
    ads.values().map(|ad_predictor| ad_predictor.score).sum()
}

/// Draw one creative with probability proportional to its score. Returns
/// `None` when there are no candidates or the scores sum to (effectively)
/// zero.
pub fn sample_from_ads<T, R>(ads: &AdPredictorMap<T>, rng: &mut R) -> Option<T>
where
    T: CreativeAdLike,
    R: Rng + ?Sized,
{
    let draw: f64 = rng.gen();
    select_with_draw(ads, draw)
}

/// Inverse CDF walk over `ads` in key order for a uniform `draw` in `[0, 1)`.
pub(crate) fn select_with_draw<T: CreativeAdLike>(ads: &AdPredictorMap<T>, draw: f64) -> Option<T> {
    let normalising_constant = calculate_normalising_constant(ads);
    if normalising_constant <= f64::EPSILON {
        return None;
    }

    let mut probability = 0.0;
    for ad_predictor in ads.values() {
        probability += ad_predictor.score / normalising_constant;
        // Strict: a zero-score candidate never widens the interval.
        if draw < probability {
            return Some(ad_predictor.creative_ad.clone());
        }
    }

    // Accumulated probabilities can fall just short of 1.0.
    let fallback = ads
        .values()
        .rev()
        .find(|ad_predictor| ad_predictor.score > 0.0)?;
    warn!(
        draw,
        probability,
        creative_instance_id = %fallback.creative_ad.creative_ad().creative_instance_id,
        "Sampling fell through the cumulative distribution"
    );
    Some(fallback.creative_ad.clone())
}
