//! Serving hygiene: flight dates and not repeating the ad served last.

use ads_core::CreativeAd;

use crate::rule::{ExclusionContext, ExclusionRule};

/// Creatives outside their campaign's start/end dates.
pub struct FlightDatesRule;

impl ExclusionRule for FlightDatesRule {
    fn name(&self) -> &'static str {
        "flight_dates"
    }

    fn should_exclude(&self, ad: &CreativeAd, ctx: &ExclusionContext<'_>) -> bool {
        !ad.is_active_at(ctx.now)
    }

    fn reason(&self, ad: &CreativeAd) -> String {
        format!(
            "creativeInstanceId {} excluded as outside its flight dates",
            ad.creative_instance_id
        )
    }
}

/// The creative served on the previous request.
pub struct LastServedRule;

impl ExclusionRule for LastServedRule {
    fn name(&self) -> &'static str {
        "last_served"
    }

    fn should_exclude(&self, ad: &CreativeAd, ctx: &ExclusionContext<'_>) -> bool {
        ctx.last_served_creative_instance_id == Some(ad.creative_instance_id.as_str())
    }

    fn reason(&self, ad: &CreativeAd) -> String {
        format!(
            "creativeInstanceId {} excluded as it was served last",
            ad.creative_instance_id
        )
    }
}
