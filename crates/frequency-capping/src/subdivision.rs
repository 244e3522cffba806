//! Geographic targeting against the user's ISO 3166-2 subdivision.

use ads_core::CreativeAd;

use crate::rule::{ExclusionContext, ExclusionRule};

/// Excludes creatives whose geo targets name neither the user's
/// subdivision (`"US-CA"`) nor its country (`"US"`). Creatives without geo
/// targets, and users whose location is unknown, are never excluded.
pub struct SubdivisionTargetingRule;

fn country_code(subdivision: &str) -> &str {
    subdivision
        .split_once('-')
        .map(|(country, _)| country)
        .unwrap_or(subdivision)
}

impl ExclusionRule for SubdivisionTargetingRule {
    fn name(&self) -> &'static str {
        "subdivision_targeting"
    }

    fn should_exclude(&self, ad: &CreativeAd, ctx: &ExclusionContext<'_>) -> bool {
        let Some(subdivision) = ctx.subdivision else {
            return false;
        };
        if ad.geo_targets.is_empty() {
            return false;
        }

        let country = country_code(subdivision);
        !ad.geo_targets.iter().any(|target| {
            target.eq_ignore_ascii_case(subdivision) || target.eq_ignore_ascii_case(country)
        })
    }

    fn reason(&self, ad: &CreativeAd) -> String {
        format!(
            "creativeSetId {} excluded as not within the targeted subdivision",
            ad.creative_set_id
        )
    }
}
