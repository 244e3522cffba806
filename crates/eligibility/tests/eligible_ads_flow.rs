//! Integration test for the full serve flow: catalog and event log loaded
//! from JSON, engine built from config, ads chosen and capped over time.

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Arc;

    use ads_core::config::EngineConfig;
    use ads_core::{AdEvent, ConfirmationType, CreativeAdLike, CreativeAdNotification, UserModel};
    use ads_eligibility::EligibleAds;
    use ads_frequency_capping::AntiTargetingResource;
    use ads_store::{AdEventStore, ClientState, InMemoryAdEventStore, InMemoryCreativeAdStore};
    use chrono::Utc;

    /// A small catalog in the on-disk JSON format.
    fn sample_catalog() -> Vec<CreativeAdNotification> {
        let json = r#"[
            {
                "creative_instance_id": "instance-tech",
                "creative_set_id": "set-tech",
                "campaign_id": "campaign-1",
                "advertiser_id": "advertiser-1",
                "segment": "technology & computing",
                "per_day": 2,
                "title": "Laptops",
                "body": "New laptops in stock"
            },
            {
                "creative_instance_id": "instance-tech",
                "creative_set_id": "set-tech",
                "campaign_id": "campaign-1",
                "advertiser_id": "advertiser-1",
                "segment": "technology & computing-software",
                "per_day": 2,
                "title": "Laptops",
                "body": "New laptops in stock"
            },
            {
                "creative_instance_id": "instance-food",
                "creative_set_id": "set-food",
                "campaign_id": "campaign-2",
                "advertiser_id": "advertiser-2",
                "segment": "food & drink",
                "geo_targets": ["US-CA"],
                "title": "Pizza",
                "body": "Two for one"
            },
            {
                "creative_instance_id": "instance-untargeted",
                "creative_set_id": "set-untargeted",
                "campaign_id": "campaign-3",
                "advertiser_id": "advertiser-3",
                "title": "Hello",
                "body": "For everyone"
            }
        ]"#;
        serde_json::from_str(json).unwrap()
    }

    fn engine(
        config: &EngineConfig,
        anti_targeting: AntiTargetingResource,
    ) -> (
        EligibleAds<InMemoryCreativeAdStore<CreativeAdNotification>, InMemoryAdEventStore>,
        Arc<InMemoryAdEventStore>,
        Arc<ClientState>,
    ) {
        let catalog = Arc::new(InMemoryCreativeAdStore::new());
        catalog.save(sample_catalog()).unwrap();
        let ad_events = Arc::new(InMemoryAdEventStore::new());
        let client = Arc::new(ClientState::new(config.store.browsing_history_size));

        let eligible_ads = EligibleAds::from_config(
            config,
            catalog,
            ad_events.clone(),
            client.clone(),
            anti_targeting,
        );
        (eligible_ads, ad_events, client)
    }

    fn seeded_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.eligible_ads.seed = Some(7);
        config
    }

    fn instance_ids(ads: &[CreativeAdNotification]) -> Vec<&str> {
        ads.iter()
            .map(|ad| ad.creative_ad().creative_instance_id.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_catalog_defaults_from_json() {
        let catalog = sample_catalog();
        let untargeted = &catalog[3].creative_ad;
        assert!(untargeted.is_untargeted());
        assert_eq!(untargeted.priority, 1);
        assert_eq!(untargeted.ptr, 1.0);
        assert!(untargeted.is_active_at(Utc::now()));
    }

    #[tokio::test]
    async fn test_tiered_retrieval_folds_to_parent_then_untargeted() {
        let (eligible_ads, _, _) = engine(&seeded_config(), AntiTargetingResource::default());

        let user_model = UserModel::new(
            vec!["technology & computing-laptops".to_string()],
            Vec::new(),
        );
        let ads = eligible_ads.get(&user_model).await.unwrap();
        assert_eq!(instance_ids(&ads), vec!["instance-tech"]);

        let user_model = UserModel::new(vec!["sports-tennis".to_string()], Vec::new());
        let ads = eligible_ads.get(&user_model).await.unwrap();
        assert_eq!(instance_ids(&ads), vec!["instance-untargeted"]);
    }

    #[tokio::test]
    async fn test_views_cap_creative_sets() {
        let (eligible_ads, ad_events, _) =
            engine(&seeded_config(), AntiTargetingResource::default());
        let catalog = sample_catalog();
        let tech = &catalog[0].creative_ad;
        let user_model = UserModel::new(vec!["technology & computing".to_string()], Vec::new());

        // per_day is 2, the remaining caps default to unlimited.
        ad_events
            .log_event(AdEvent::new(tech, ConfirmationType::Viewed, Utc::now()))
            .await
            .unwrap();
        ad_events
            .log_event(AdEvent::new(tech, ConfirmationType::Clicked, Utc::now()))
            .await
            .unwrap();
        let mut config = seeded_config();
        config.frequency_capping.per_hour_enabled = false;
        let (eligible_ads_without_per_hour, more_events, _) =
            engine(&config, AntiTargetingResource::default());
        more_events
            .log_event(AdEvent::new(tech, ConfirmationType::Viewed, Utc::now()))
            .await
            .unwrap();

        // One view: still under the daily cap, but seen within the hour.
        let ads = eligible_ads.get(&user_model).await.unwrap();
        assert_eq!(instance_ids(&ads), vec!["instance-untargeted"]);
        let ads = eligible_ads_without_per_hour.get(&user_model).await.unwrap();
        assert_eq!(instance_ids(&ads), vec!["instance-tech"]);

        // Second view reaches the daily cap.
        more_events
            .log_event(AdEvent::new(tech, ConfirmationType::Viewed, Utc::now()))
            .await
            .unwrap();
        let ads = eligible_ads_without_per_hour.get(&user_model).await.unwrap();
        assert_eq!(instance_ids(&ads), vec!["instance-untargeted"]);
    }

    #[tokio::test]
    async fn test_subdivision_and_anti_targeting() {
        let mut sites = HashMap::new();
        sites.insert(
            "set-tech".to_string(),
            BTreeSet::from(["https://competitor.example".to_string()]),
        );
        let (eligible_ads, _, client) =
            engine(&seeded_config(), AntiTargetingResource::new(sites));
        let user_model = UserModel::new(
            vec!["technology & computing".to_string(), "food & drink".to_string()],
            Vec::new(),
        );

        client.set_subdivision(Some("US-NY".to_string()));
        let ads = eligible_ads.get(&user_model).await.unwrap();
        assert_eq!(instance_ids(&ads), vec!["instance-tech"]);

        client.record_visit("https://shop.competitor.example/deals");
        client.set_subdivision(Some("US-CA".to_string()));
        let ads = eligible_ads.get(&user_model).await.unwrap();
        assert_eq!(instance_ids(&ads), vec!["instance-food"]);
    }

    #[tokio::test]
    async fn test_get_for_features_serves_whole_catalog() {
        let (eligible_ads, _, client) =
            engine(&seeded_config(), AntiTargetingResource::default());
        client.flag_ad("set-food");

        let mut served = BTreeSet::new();
        for _ in 0..20 {
            let ad = eligible_ads
                .get_for_features(&[], &["food & drink".to_string()])
                .await
                .unwrap()
                .unwrap();
            served.insert(ad.creative_ad().creative_instance_id.clone());
        }

        assert!(!served.contains("instance-food"));
        assert!(served.contains("instance-tech"));
        assert!(served.contains("instance-untargeted"));
    }

    #[tokio::test]
    async fn test_event_retention() {
        let ad_events = InMemoryAdEventStore::new();
        let catalog = sample_catalog();
        let tech = &catalog[0].creative_ad;
        ad_events
            .log_event(AdEvent::new(
                tech,
                ConfirmationType::Viewed,
                Utc::now() - chrono::Duration::days(120),
            ))
            .await
            .unwrap();
        ad_events
            .log_event(AdEvent::new(tech, ConfirmationType::Viewed, Utc::now()))
            .await
            .unwrap();

        let removed = ad_events
            .purge_expired(EngineConfig::default().store.event_retention_days)
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(ad_events.get_all().await.unwrap().len(), 1);
    }
}
