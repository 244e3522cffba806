//! View caps: limit how often a creative set (or instance) is shown within
//! a rolling window.

use ads_core::{AdEvent, ConfirmationType, CreativeAd};
use chrono::{DateTime, Duration, Utc};

use crate::rule::{ExclusionContext, ExclusionRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapWindow {
    PerHour,
    PerDay,
    PerWeek,
    PerMonth,
    AllTime,
}

impl CapWindow {
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            CapWindow::PerHour => now - Duration::hours(1),
            CapWindow::PerDay => now - Duration::days(1),
            CapWindow::PerWeek => now - Duration::weeks(1),
            CapWindow::PerMonth => now - Duration::days(30),
            CapWindow::AllTime => DateTime::<Utc>::MIN_UTC,
        }
    }
}

fn count_events(
    ad_events: &[AdEvent],
    confirmation_type: ConfirmationType,
    since: DateTime<Utc>,
    matches: impl Fn(&AdEvent) -> bool,
) -> u32 {
    ad_events
        .iter()
        .filter(|event| {
            event.confirmation_type == confirmation_type
                && event.timestamp >= since
                && matches(event)
        })
        .count() as u32
}

/// Views of the creative set within `window`, capped by one of the
/// creative's cap fields. A cap of zero never excludes.
pub struct CreativeSetCap {
    name: &'static str,
    window: CapWindow,
    cap: fn(&CreativeAd) -> u32,
}

impl CreativeSetCap {
    pub fn daily_cap() -> Self {
        Self {
            name: "daily_cap",
            window: CapWindow::PerDay,
            cap: |ad| ad.daily_cap,
        }
    }

    pub fn per_day() -> Self {
        Self {
            name: "per_day",
            window: CapWindow::PerDay,
            cap: |ad| ad.per_day,
        }
    }

    pub fn per_week() -> Self {
        Self {
            name: "per_week",
            window: CapWindow::PerWeek,
            cap: |ad| ad.per_week,
        }
    }

    pub fn per_month() -> Self {
        Self {
            name: "per_month",
            window: CapWindow::PerMonth,
            cap: |ad| ad.per_month,
        }
    }

    pub fn total_max() -> Self {
        Self {
            name: "total_max",
            window: CapWindow::AllTime,
            cap: |ad| ad.total_max,
        }
    }
}

impl ExclusionRule for CreativeSetCap {
    fn name(&self) -> &'static str {
        self.name
    }

    fn should_exclude(&self, ad: &CreativeAd, ctx: &ExclusionContext<'_>) -> bool {
        let cap = (self.cap)(ad);
        if cap == 0 {
            return false;
        }

        let views = count_events(
            ctx.ad_events,
            ConfirmationType::Viewed,
            self.window.start(ctx.now),
            |event| event.creative_set_id == ad.creative_set_id,
        );
        views >= cap
    }

    fn reason(&self, ad: &CreativeAd) -> String {
        format!(
            "creativeSetId {} has exceeded the {} frequency cap of {}",
            ad.creative_set_id,
            self.name,
            (self.cap)(ad)
        )
    }
}

/// A creative instance is shown at most once per hour.
pub struct PerHourCap;

impl ExclusionRule for PerHourCap {
    fn name(&self) -> &'static str {
        "per_hour"
    }

    fn should_exclude(&self, ad: &CreativeAd, ctx: &ExclusionContext<'_>) -> bool {
        count_events(
            ctx.ad_events,
            ConfirmationType::Viewed,
            CapWindow::PerHour.start(ctx.now),
            |event| event.creative_instance_id == ad.creative_instance_id,
        ) > 0
    }

    fn reason(&self, ad: &CreativeAd) -> String {
        format!(
            "creativeInstanceId {} has exceeded the per_hour frequency cap",
            ad.creative_instance_id
        )
    }
}

/// A creative set stops serving once the user has converted on it.
pub struct ConversionCap;

impl ExclusionRule for ConversionCap {
    fn name(&self) -> &'static str {
        "conversion"
    }

    fn should_exclude(&self, ad: &CreativeAd, ctx: &ExclusionContext<'_>) -> bool {
        count_events(
            ctx.ad_events,
            ConfirmationType::Conversion,
            CapWindow::AllTime.start(ctx.now),
            |event| event.creative_set_id == ad.creative_set_id,
        ) > 0
    }

    fn reason(&self, ad: &CreativeAd) -> String {
        format!(
            "creativeSetId {} has already converted",
            ad.creative_set_id
        )
    }
}
