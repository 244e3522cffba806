//! Segment taxonomy helpers.
//!
//! Segments are hyphen-delimited paths: `"technology & computing-software"`
//! is a child of `"technology & computing"`. Only the first hyphen splits.

use std::collections::BTreeSet;

const SEGMENT_SEPARATOR: char = '-';

/// The top-level segment of `segment`, or the segment itself if it has no
/// parent.
pub fn parent_segment(segment: &str) -> &str {
    segment
        .split_once(SEGMENT_SEPARATOR)
        .map(|(parent, _)| parent)
        .unwrap_or(segment)
}

/// Parents of every segment, without duplicates, in first-seen order.
pub fn parent_segments<S: AsRef<str>>(segments: &[S]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    segments
        .iter()
        .map(|segment| parent_segment(segment.as_ref()))
        .filter(|parent| seen.insert(*parent))
        .map(str::to_string)
        .collect()
}

/// Sorted, de-duplicated intersection of two segment lists.
pub fn set_intersection<A: AsRef<str>, B: AsRef<str>>(lhs: &[A], rhs: &[B]) -> Vec<String> {
    let rhs: BTreeSet<&str> = rhs.iter().map(AsRef::as_ref).collect();
    lhs.iter()
        .map(AsRef::as_ref)
        .filter(|segment| rhs.contains(segment))
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
