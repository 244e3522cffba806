//! Ad event log: append-only history of ad lifecycle transitions.

use ads_core::{AdEvent, AdType, AdsResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info};

#[async_trait]
pub trait AdEventStore: Send + Sync {
    async fn log_event(&self, ad_event: AdEvent) -> AdsResult<()>;

    /// All events, most recent first.
    async fn get_all(&self) -> AdsResult<Vec<AdEvent>>;

    /// Events for one ad type, most recent first.
    async fn get_for_type(&self, ad_type: AdType) -> AdsResult<Vec<AdEvent>>;

    /// Drop events older than `cutoff`. Returns how many were removed.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> AdsResult<usize>;
}

/// In-process event log, partitioned by ad type.
pub struct InMemoryAdEventStore {
    events: DashMap<AdType, Vec<AdEvent>>,
}

impl InMemoryAdEventStore {
    pub fn new() -> Self {
        Self {
            events: DashMap::new(),
        }
    }

    /// Seed the log with previously persisted events.
    pub fn with_events(ad_events: Vec<AdEvent>) -> Self {
        let store = Self::new();
        for event in ad_events {
            store.events.entry(event.ad_type).or_default().push(event);
        }
        store
    }

    /// Apply a retention window in days, relative to now.
    pub async fn purge_expired(&self, retention_days: i64) -> AdsResult<usize> {
        self.purge_before(Utc::now() - Duration::days(retention_days))
            .await
    }

    pub fn len(&self) -> usize {
        self.events.iter().map(|partition| partition.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryAdEventStore {
    fn default() -> Self {
        Self::new()
    }
}

fn most_recent_first(mut ad_events: Vec<AdEvent>) -> Vec<AdEvent> {
    ad_events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    ad_events
}

#[async_trait]
impl AdEventStore for InMemoryAdEventStore {
    async fn log_event(&self, ad_event: AdEvent) -> AdsResult<()> {
        debug!(
            creative_instance_id = %ad_event.creative_instance_id,
            confirmation_type = ?ad_event.confirmation_type,
            "Logged ad event"
        );
        metrics::counter!("ad_events.logged").increment(1);
        self.events
            .entry(ad_event.ad_type)
            .or_default()
            .push(ad_event);
        Ok(())
    }

    async fn get_all(&self) -> AdsResult<Vec<AdEvent>> {
        let ad_events = self
            .events
            .iter()
            .flat_map(|partition| partition.value().clone())
            .collect();
        Ok(most_recent_first(ad_events))
    }

    async fn get_for_type(&self, ad_type: AdType) -> AdsResult<Vec<AdEvent>> {
        let ad_events = self
            .events
            .get(&ad_type)
            .map(|partition| partition.value().clone())
            .unwrap_or_default();
        Ok(most_recent_first(ad_events))
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> AdsResult<usize> {
        // Counted per partition while its shard is locked, so concurrent
        // appends cannot skew the total.
        let mut purged = 0;
        for mut partition in self.events.iter_mut() {
            let before = partition.len();
            partition.retain(|event| event.timestamp >= cutoff);
            purged += before - partition.len();
        }
        if purged > 0 {
            info!(purged, "Purged expired ad events");
        }
        Ok(purged)
    }
}
