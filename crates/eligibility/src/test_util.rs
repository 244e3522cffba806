use ads_core::types::{distant_future, distant_past};
use ads_core::{AdType, CreativeAd, CreativeDaypart};
use uuid::Uuid;

pub fn creative_ad_for_segment(segment: &str) -> CreativeAd {
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
        segment: segment.to_string(),
        target_url: "https://example.com".to_string(),
        ad_type: AdType::AdNotification,
    }
}

pub fn creative_ad_for_id_and_segment(creative_instance_id: &str, segment: &str) -> CreativeAd {
    CreativeAd {
        creative_instance_id: creative_instance_id.to_string(),
        ..creative_ad_for_segment(segment)
    }
}

pub fn segments(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}
