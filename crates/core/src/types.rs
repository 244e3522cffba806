use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AdsError, AdsResult};

/// Segment carried by creatives that are served regardless of the user model.
pub const UNTARGETED_SEGMENT: &str = "untargeted";

/// 2099-12-31T23:59:59Z, the catalog's "never ends" marker.
const DISTANT_FUTURE_TIMESTAMP: i64 = 4_102_444_799;

/// Shape of an ad placement. Each shape has its own catalog table and its
/// own event history, but they share the eligibility pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdType {
    #[default]
    AdNotification,
    NewTabPageAd,
    PromotedContentAd,
    InlineContentAd,
}

/// Time window during which a creative may be shown.
///
/// `days_of_week` is a string of digits where `0` is Sunday, e.g. `"12345"`
/// for weekdays. Minutes are counted from midnight, both ends inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeDaypart {
    #[serde(default = "default_days_of_week")]
    pub days_of_week: String,
    #[serde(default)]
    pub start_minute: u32,
    #[serde(default = "default_end_minute")]
    pub end_minute: u32,
}

fn default_days_of_week() -> String {
    "0123456".to_string()
}
fn default_end_minute() -> u32 {
    1439
}

impl Default for CreativeDaypart {
    fn default() -> Self {
        Self {
            days_of_week: default_days_of_week(),
            start_minute: 0,
            end_minute: default_end_minute(),
        }
    }
}

/// A candidate creative as stored in the catalog.
///
/// One row per (creative instance, segment) pair: a creative targeted at
/// several segments appears several times with the same
/// `creative_instance_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeAd {
    pub creative_instance_id: String,
    pub creative_set_id: String,
    pub campaign_id: String,
    pub advertiser_id: String,
    #[serde(default = "distant_past")]
    pub start_at: DateTime<Utc>,
    #[serde(default = "distant_future")]
    pub end_at: DateTime<Utc>,
    #[serde(default)]
    pub daily_cap: u32,
    #[serde(default)]
    pub per_day: u32,
    #[serde(default)]
    pub per_week: u32,
    #[serde(default)]
    pub per_month: u32,
    #[serde(default)]
    pub total_max: u32,
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default = "default_ptr")]
    pub ptr: f64,
    #[serde(default)]
    pub geo_targets: BTreeSet<String>,
    #[serde(default)]
    pub dayparts: Vec<CreativeDaypart>,
    #[serde(default = "default_segment")]
    pub segment: String,
    #[serde(default)]
    pub target_url: String,
    #[serde(default)]
    pub ad_type: AdType,
}

/// Unix epoch. Also the "last seen" time of a creative with no history.
pub fn distant_past() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

pub fn distant_future() -> DateTime<Utc> {
    DateTime::from_timestamp(DISTANT_FUTURE_TIMESTAMP, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn default_priority() -> u32 {
    1
}
fn default_ptr() -> f64 {
    1.0
}
fn default_segment() -> String {
    UNTARGETED_SEGMENT.to_string()
}

impl CreativeAd {
    /// Whether the creative's flight dates include `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start_at <= now && now <= self.end_at
    }

    pub fn is_untargeted(&self) -> bool {
        self.segment == UNTARGETED_SEGMENT
    }

    /// Reject rows the eligibility pipeline cannot reason about.
    pub fn validate(&self) -> AdsResult<()> {
        let ids = [
            ("creative_instance_id", &self.creative_instance_id),
            ("creative_set_id", &self.creative_set_id),
            ("campaign_id", &self.campaign_id),
            ("advertiser_id", &self.advertiser_id),
        ];
        for (field, value) in ids {
            if value.is_empty() {
                return Err(AdsError::Validation(format!("{field} must not be empty")));
            }
        }
        if !self.ptr.is_finite() || !(0.0..=1.0).contains(&self.ptr) {
            return Err(AdsError::Validation(format!(
                "ptr {} for creative instance {} is outside [0, 1]",
                self.ptr, self.creative_instance_id
            )));
        }
        if self.segment.is_empty() {
            return Err(AdsError::Validation(format!(
                "creative instance {} has an empty segment",
                self.creative_instance_id
            )));
        }
        if self.start_at > self.end_at {
            return Err(AdsError::Validation(format!(
                "creative instance {} ends before it starts",
                self.creative_instance_id
            )));
        }
        Ok(())
    }
}

/// Anything the eligibility pipeline can filter, score and sample.
pub trait CreativeAdLike: Clone + Send + Sync + 'static {
    fn creative_ad(&self) -> &CreativeAd;

    /// Placement size, only meaningful for inline content ads.
    fn dimensions(&self) -> Option<&str> {
        None
    }
}

impl CreativeAdLike for CreativeAd {
    fn creative_ad(&self) -> &CreativeAd {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeAdNotification {
    #[serde(flatten)]
    pub creative_ad: CreativeAd,
    pub title: String,
    pub body: String,
}

impl CreativeAdLike for CreativeAdNotification {
    fn creative_ad(&self) -> &CreativeAd {
        &self.creative_ad
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeInlineContentAd {
    #[serde(flatten)]
    pub creative_ad: CreativeAd,
    pub title: String,
    pub description: String,
    pub image_url: String,
    /// Placement size, e.g. `"200x100"`.
    pub dimensions: String,
    pub cta_text: String,
}

impl CreativeAdLike for CreativeInlineContentAd {
    fn creative_ad(&self) -> &CreativeAd {
        &self.creative_ad
    }

    fn dimensions(&self) -> Option<&str> {
        Some(&self.dimensions)
    }
}

/// Segments inferred on device from browsing behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserModel {
    #[serde(default)]
    pub interest_segments: Vec<String>,
    #[serde(default)]
    pub intent_segments: Vec<String>,
}

impl UserModel {
    pub fn new(interest_segments: Vec<String>, intent_segments: Vec<String>) -> Self {
        Self {
            interest_segments,
            intent_segments,
        }
    }

    /// Interest then intent segments, without duplicates.
    pub fn all_segments(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.interest_segments
            .iter()
            .chain(self.intent_segments.iter())
            .filter(|segment| seen.insert(segment.as_str()))
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.interest_segments.is_empty() && self.intent_segments.is_empty()
    }
}

/// Explicit feedback the user gave on previously shown ads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub disliked_creative_sets: BTreeSet<String>,
    #[serde(default)]
    pub flagged_creative_sets: BTreeSet<String>,
}
