use ads_core::types::{distant_future, distant_past};
use ads_core::{AdEvent, AdType, ConfirmationType, CreativeAd, CreativeDaypart};
use chrono::{Duration, Utc};
use uuid::Uuid;

pub fn creative_ad() -> CreativeAd {
    CreativeAd {
        creative_instance_id: Uuid::new_v4().to_string(),
        creative_set_id: Uuid::new_v4().to_string(),
        campaign_id: Uuid::new_v4().to_string(),
        advertiser_id: Uuid::new_v4().to_string(),
        start_at: distant_past(),
        end_at: distant_future(),
        daily_cap: 1,
        per_day: 1,
        per_week: 1,
        per_month: 1,
        total_max: 1,
        priority: 1,
        ptr: 1.0,
        geo_targets: ["US".to_string()].into(),
        dayparts: vec![CreativeDaypart::default()],
        segment: "untargeted".to_string(),
        target_url: "https://example.com".to_string(),
        ad_type: AdType::AdNotification,
    }
}

pub fn ad_event(ad: &CreativeAd, confirmation_type: ConfirmationType, hours_ago: i64) -> AdEvent {
    AdEvent::new(ad, confirmation_type, Utc::now() - Duration::hours(hours_ago))
}

pub fn viewed(ad: &CreativeAd, hours_ago: i64) -> AdEvent {
    ad_event(ad, ConfirmationType::Viewed, hours_ago)
}
