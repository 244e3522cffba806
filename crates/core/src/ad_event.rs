//! Ad events: the append-only record of what the user was shown and how
//! they reacted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{distant_past, AdType, CreativeAd};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationType {
    Served,
    Viewed,
    Clicked,
    Dismissed,
    Transferred,
    Flagged,
    Upvoted,
    Downvoted,
    Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdEvent {
    pub uuid: Uuid,
    pub ad_type: AdType,
    pub confirmation_type: ConfirmationType,
    pub creative_instance_id: String,
    pub creative_set_id: String,
    pub campaign_id: String,
    pub advertiser_id: String,
    pub timestamp: DateTime<Utc>,
}

impl AdEvent {
    pub fn new(
        creative_ad: &CreativeAd,
        confirmation_type: ConfirmationType,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            ad_type: creative_ad.ad_type,
            confirmation_type,
            creative_instance_id: creative_ad.creative_instance_id.clone(),
            creative_set_id: creative_ad.creative_set_id.clone(),
            campaign_id: creative_ad.campaign_id.clone(),
            advertiser_id: creative_ad.advertiser_id.clone(),
            timestamp,
        }
    }

    pub fn is_viewed(&self) -> bool {
        self.confirmation_type == ConfirmationType::Viewed
    }
}

fn last_viewed(ad_events: &[AdEvent], matches: impl Fn(&AdEvent) -> bool) -> DateTime<Utc> {
    ad_events
        .iter()
        .filter(|event| event.is_viewed() && matches(event))
        .map(|event| event.timestamp)
        .max()
        .unwrap_or_else(distant_past)
}

/// Time the creative instance was last viewed, or the Unix epoch if never.
pub fn last_seen_ad_time(ad_events: &[AdEvent], creative_ad: &CreativeAd) -> DateTime<Utc> {
    last_viewed(ad_events, |event| {
        event.creative_instance_id == creative_ad.creative_instance_id
    })
}

/// Time any creative of the advertiser was last viewed, or the Unix epoch if never.
pub fn last_seen_advertiser_time(
    ad_events: &[AdEvent],
    creative_ad: &CreativeAd,
) -> DateTime<Utc> {
    last_viewed(ad_events, |event| {
        event.advertiser_id == creative_ad.advertiser_id
    })
}
