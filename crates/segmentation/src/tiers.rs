//! Tiered segment relevance.
//!
//! Candidates are retrieved child tier first, then parent tier, then
//! untargeted; the first tier that yields eligible ads wins.

use ads_core::{UserModel, UNTARGETED_SEGMENT};
use tracing::debug;

use crate::taxonomy::{parent_segments, set_intersection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentTier {
    Child,
    Parent,
    Untargeted,
}

/// Catalog queries for each tier, in retrieval order. A user model without
/// segments only reaches the untargeted tier.
pub fn segment_tiers(user_model: &UserModel) -> Vec<(SegmentTier, Vec<String>)> {
    let mut tiers = Vec::with_capacity(3);

    let segments = user_model.all_segments();
    if !segments.is_empty() {
        let parents = parent_segments(&segments);
        tiers.push((SegmentTier::Child, segments));
        tiers.push((SegmentTier::Parent, parents));
    }
    tiers.push((SegmentTier::Untargeted, vec![UNTARGETED_SEGMENT.to_string()]));

    debug!(tiers = tiers.len(), "Built segment tiers");
    tiers
}

/// How a user's segments of one category relate to an ad's segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentMatch {
    pub child: bool,
    pub parent: bool,
}

pub fn match_segments<U: AsRef<str>, A: AsRef<str>>(
    user_segments: &[U],
    ad_segments: &[A],
) -> SegmentMatch {
    SegmentMatch {
        child: !set_intersection(user_segments, ad_segments).is_empty(),
        parent: !set_intersection(&parent_segments(user_segments), ad_segments).is_empty(),
    }
}
