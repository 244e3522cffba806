//! Frequency capping: exclusion rules that decide whether a candidate
//! creative may be shown: view caps per window, user feedback, dayparting,
//! geographic targeting, anti-targeting and serving hygiene.

pub mod anti_targeting;
pub mod caps;
pub mod dayparting;
pub mod engine;
pub mod feedback;
pub mod rule;
pub mod serving;
pub mod subdivision;

#[cfg(test)]
pub(crate) mod test_util;

pub use anti_targeting::{AntiTargetingResource, AntiTargetingRule};
pub use caps::{CapWindow, ConversionCap, CreativeSetCap, PerHourCap};
pub use dayparting::DaypartingRule;
pub use engine::FrequencyCapping;
pub use feedback::{DislikeRule, MarkedAsInappropriateRule};
pub use rule::{ExclusionContext, ExclusionRule};
pub use serving::{FlightDatesRule, LastServedRule};
pub use subdivision::SubdivisionTargetingRule;
