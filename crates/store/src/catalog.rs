//! Creative ad catalog: candidate creatives indexed by targeting segment.

use ads_core::{AdsResult, CreativeAdLike};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

/// Read side of the catalog consumed by the eligibility pipeline.
#[async_trait]
pub trait CreativeAdStore: Send + Sync {
    type Ad: CreativeAdLike;

    /// Active creatives tagged with any of `segments`, grouped in the order
    /// the segments were given.
    async fn get_for_segments(&self, segments: &[String]) -> AdsResult<Vec<Self::Ad>>;

    /// Every active creative in the catalog.
    async fn get_all(&self) -> AdsResult<Vec<Self::Ad>>;
}

/// In-process catalog. Rows are bucketed by segment; a creative targeted at
/// several segments has one row per segment.
pub struct InMemoryCreativeAdStore<T> {
    by_segment: DashMap<String, Vec<T>>,
    segment_order: RwLock<Vec<String>>,
}

impl<T: CreativeAdLike> InMemoryCreativeAdStore<T> {
    pub fn new() -> Self {
        Self {
            by_segment: DashMap::new(),
            segment_order: RwLock::new(Vec::new()),
        }
    }

    /// Insert or replace catalog rows. A row replaces an existing row with
    /// the same creative instance id in the same segment.
    pub fn save(&self, ads: Vec<T>) -> AdsResult<()> {
        for ad in &ads {
            ad.creative_ad().validate()?;
        }

        for ad in ads {
            let segment = ad.creative_ad().segment.clone();
            let mut bucket = self.by_segment.entry(segment.clone()).or_insert_with(|| {
                self.segment_order.write().push(segment.clone());
                Vec::new()
            });
            let instance_id = &ad.creative_ad().creative_instance_id;
            match bucket
                .iter()
                .position(|row| &row.creative_ad().creative_instance_id == instance_id)
            {
                Some(index) => bucket[index] = ad,
                None => bucket.push(ad),
            }
        }

        metrics::gauge!("catalog.rows").set(self.len() as f64);
        Ok(())
    }

    pub fn delete_all(&self) {
        self.by_segment.clear();
        self.segment_order.write().clear();
    }

    pub fn len(&self) -> usize {
        self.by_segment.iter().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn active_rows(&self, segment: &str) -> Vec<T> {
        let now = Utc::now();
        self.by_segment
            .get(segment)
            .map(|bucket| {
                bucket
                    .iter()
                    .filter(|ad| ad.creative_ad().is_active_at(now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<T: CreativeAdLike> Default for InMemoryCreativeAdStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: CreativeAdLike> CreativeAdStore for InMemoryCreativeAdStore<T> {
    type Ad = T;

    async fn get_for_segments(&self, segments: &[String]) -> AdsResult<Vec<T>> {
        let mut seen = Vec::with_capacity(segments.len());
        let mut ads = Vec::new();
        for segment in segments {
            if seen.contains(&segment) {
                continue;
            }
            seen.push(segment);
            ads.extend(self.active_rows(segment));
        }
        debug!(segments = ?segments, count = ads.len(), "Fetched creative ads for segments");
        Ok(ads)
    }

    async fn get_all(&self) -> AdsResult<Vec<T>> {
        let order = self.segment_order.read().clone();
        let ads: Vec<T> = order
            .iter()
            .flat_map(|segment| self.active_rows(segment))
            .collect();
        debug!(count = ads.len(), "Fetched all creative ads");
        Ok(ads)
    }
}
