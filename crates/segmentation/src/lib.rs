//! Segment taxonomy and matching: parent/child folding of hyphenated
//! segment paths and tiered candidate retrieval (child, parent, untargeted).

pub mod taxonomy;
pub mod tiers;

pub use taxonomy::{parent_segment, parent_segments, set_intersection};
pub use tiers::{match_segments, segment_tiers, SegmentMatch, SegmentTier};
