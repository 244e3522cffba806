//! Eligible ads: retrieves candidate creatives for a user model, filters
//! them through frequency capping, scores the survivors with a weighted
//! linear predictor and samples a winner in proportion to its score.

pub mod eligible_ads;
pub mod grouping;
pub mod predictor;
pub mod sampler;

#[cfg(test)]
pub(crate) mod test_util;

pub use eligible_ads::EligibleAds;
pub use grouping::group_eligible_ads_by_creative_instance_id;
pub use predictor::{
    compute_predictor_features, compute_predictor_features_and_scores, compute_predictor_score,
    AdPredictor, AdPredictorMap, AdPredictorWeights,
};
pub use sampler::{calculate_normalising_constant, sample_from_ads};
