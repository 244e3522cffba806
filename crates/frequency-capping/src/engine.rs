//! The rule set applied to every candidate before scoring.

use ads_core::config::FrequencyCappingConfig;
use ads_core::{CreativeAd, CreativeAdLike};
use tracing::debug;

use crate::anti_targeting::{AntiTargetingResource, AntiTargetingRule};
use crate::caps::{ConversionCap, CreativeSetCap, PerHourCap};
use crate::dayparting::DaypartingRule;
use crate::feedback::{DislikeRule, MarkedAsInappropriateRule};
use crate::rule::{ExclusionContext, ExclusionRule};
use crate::serving::{FlightDatesRule, LastServedRule};
use crate::subdivision::SubdivisionTargetingRule;

/// An ad is eligible only if no rule excludes it. Rules are evaluated in
/// order and evaluation stops at the first exclusion.
pub struct FrequencyCapping {
    rules: Vec<Box<dyn ExclusionRule>>,
}

impl FrequencyCapping {
    pub fn new(rules: Vec<Box<dyn ExclusionRule>>) -> Self {
        Self { rules }
    }

    /// The standard rule set, with optional rules toggled by config.
    pub fn from_config(
        config: &FrequencyCappingConfig,
        anti_targeting: AntiTargetingResource,
    ) -> Self {
        let mut rules: Vec<Box<dyn ExclusionRule>> = vec![
            Box::new(FlightDatesRule),
            Box::new(DislikeRule),
            Box::new(MarkedAsInappropriateRule),
        ];
        if config.subdivision_targeting_enabled {
            rules.push(Box::new(SubdivisionTargetingRule));
        }
        if config.dayparting_enabled {
            rules.push(Box::new(DaypartingRule));
        }
        if config.anti_targeting_enabled {
            rules.push(Box::new(AntiTargetingRule::new(anti_targeting)));
        }
        if config.conversion_cap_enabled {
            rules.push(Box::new(ConversionCap));
        }
        rules.push(Box::new(CreativeSetCap::daily_cap()));
        rules.push(Box::new(CreativeSetCap::per_day()));
        rules.push(Box::new(CreativeSetCap::per_week()));
        rules.push(Box::new(CreativeSetCap::per_month()));
        rules.push(Box::new(CreativeSetCap::total_max()));
        if config.per_hour_enabled {
            rules.push(Box::new(PerHourCap));
        }
        if config.last_served_enabled {
            rules.push(Box::new(LastServedRule));
        }
        Self::new(rules)
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// The first rule that excludes `ad`, if any.
    pub fn excluded_by(
        &self,
        ad: &CreativeAd,
        ctx: &ExclusionContext<'_>,
    ) -> Option<&dyn ExclusionRule> {
        self.rules
            .iter()
            .find(|rule| rule.should_exclude(ad, ctx))
            .map(|rule| rule.as_ref())
    }

    pub fn should_exclude(&self, ad: &CreativeAd, ctx: &ExclusionContext<'_>) -> bool {
        self.excluded_by(ad, ctx).is_some()
    }

    /// Keep only the ads no rule excludes, preserving order.
    pub fn apply<T: CreativeAdLike>(&self, ads: Vec<T>, ctx: &ExclusionContext<'_>) -> Vec<T> {
        ads.into_iter()
            .filter(|ad| match self.excluded_by(ad.creative_ad(), ctx) {
                Some(rule) => {
                    debug!(
                        rule = rule.name(),
                        reason = %rule.reason(ad.creative_ad()),
                        "Excluded creative ad"
                    );
                    metrics::counter!("frequency_capping.excluded", "rule" => rule.name())
                        .increment(1);
                    false
                }
                None => true,
            })
            .collect()
    }
}

impl Default for FrequencyCapping {
    fn default() -> Self {
        Self::from_config(
            &FrequencyCappingConfig::default(),
            AntiTargetingResource::default(),
        )
    }
}
