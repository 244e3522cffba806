use ads_core::CreativeAdLike;

use crate::predictor::{AdPredictor, AdPredictorMap};

/// Fold catalog rows into one predictor per creative instance. A creative
/// tagged with several segments appears once per segment in the catalog;
/// the first row wins and the segments are unioned in first-seen order.
pub fn group_eligible_ads_by_creative_instance_id<T: CreativeAdLike>(
    eligible_ads: &[T],
) -> AdPredictorMap<T> {
    let mut ads = AdPredictorMap::new();

    for eligible_ad in eligible_ads {
        let creative_ad = eligible_ad.creative_ad();
        ads.entry(creative_ad.creative_instance_id.clone())
            .and_modify(|ad_predictor: &mut AdPredictor<T>| {
                if !ad_predictor.segments.contains(&creative_ad.segment) {
                    ad_predictor.segments.push(creative_ad.segment.clone());
                }
            })
            .or_insert_with(|| AdPredictor::new(eligible_ad.clone()));
    }

    ads
}
