//! Exclusions driven by explicit user feedback on previously shown ads.

use ads_core::CreativeAd;

use crate::rule::{ExclusionContext, ExclusionRule};

/// Creative sets the user gave a thumbs-down.
pub struct DislikeRule;

impl ExclusionRule for DislikeRule {
    fn name(&self) -> &'static str {
        "dislike"
    }

    fn should_exclude(&self, ad: &CreativeAd, ctx: &ExclusionContext<'_>) -> bool {
        ctx.preferences
            .disliked_creative_sets
            .contains(&ad.creative_set_id)
    }

    fn reason(&self, ad: &CreativeAd) -> String {
        format!("creativeSetId {} excluded due to being disliked", ad.creative_set_id)
    }
}

/// Creative sets the user flagged as inappropriate.
pub struct MarkedAsInappropriateRule;

impl ExclusionRule for MarkedAsInappropriateRule {
    fn name(&self) -> &'static str {
        "marked_as_inappropriate"
    }

    fn should_exclude(&self, ad: &CreativeAd, ctx: &ExclusionContext<'_>) -> bool {
        ctx.preferences
            .flagged_creative_sets
            .contains(&ad.creative_set_id)
    }

    fn reason(&self, ad: &CreativeAd) -> String {
        format!(
            "creativeSetId {} excluded due to being marked as inappropriate",
            ad.creative_set_id
        )
    }
}
