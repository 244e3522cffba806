use std::collections::BTreeSet;

use ads_core::{AdEvent, CreativeAd, UserPreferences};
use chrono::{DateTime, Utc};

static NO_PREFERENCES: UserPreferences = UserPreferences {
    disliked_creative_sets: BTreeSet::new(),
    flagged_creative_sets: BTreeSet::new(),
};

/// Everything an exclusion rule may consult besides the ad itself.
#[derive(Debug, Clone, Copy)]
pub struct ExclusionContext<'a> {
    pub ad_events: &'a [AdEvent],
    pub browsing_history: &'a [String],
    pub preferences: &'a UserPreferences,
    pub subdivision: Option<&'a str>,
    pub last_served_creative_instance_id: Option<&'a str>,
    pub now: DateTime<Utc>,
}

impl<'a> ExclusionContext<'a> {
    pub fn new(ad_events: &'a [AdEvent], now: DateTime<Utc>) -> Self {
        Self {
            ad_events,
            browsing_history: &[],
            preferences: &NO_PREFERENCES,
            subdivision: None,
            last_served_creative_instance_id: None,
            now,
        }
    }

    pub fn with_browsing_history(mut self, browsing_history: &'a [String]) -> Self {
        self.browsing_history = browsing_history;
        self
    }

    pub fn with_preferences(mut self, preferences: &'a UserPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_subdivision(mut self, subdivision: Option<&'a str>) -> Self {
        self.subdivision = subdivision;
        self
    }

    pub fn with_last_served(mut self, creative_instance_id: Option<&'a str>) -> Self {
        self.last_served_creative_instance_id = creative_instance_id;
        self
    }
}

/// A single exclusion policy. Rules are pure: the same ad and context
/// always give the same answer, so they can be evaluated in any order.
pub trait ExclusionRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn should_exclude(&self, ad: &CreativeAd, ctx: &ExclusionContext<'_>) -> bool;

    fn reason(&self, ad: &CreativeAd) -> String {
        format!(
            "creativeSetId {} excluded by {}",
            ad.creative_set_id,
            self.name()
        )
    }
}
