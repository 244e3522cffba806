//! Dayparting: restricts a creative to the days and times of day its
//! campaign booked.

use ads_core::{CreativeAd, CreativeDaypart};
use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::rule::{ExclusionContext, ExclusionRule};

pub struct DaypartingRule;

fn matches_day(daypart: &CreativeDaypart, now: DateTime<Utc>) -> bool {
    if daypart.days_of_week.is_empty() {
        return true;
    }
    let today = char::from_digit(now.weekday().num_days_from_sunday(), 10);
    today.is_some_and(|day| daypart.days_of_week.contains(day))
}

fn matches_time(daypart: &CreativeDaypart, now: DateTime<Utc>) -> bool {
    let minute_of_day = now.hour() * 60 + now.minute();
    if daypart.start_minute <= daypart.end_minute {
        minute_of_day >= daypart.start_minute && minute_of_day <= daypart.end_minute
    } else {
        // Window wraps past midnight.
        minute_of_day >= daypart.start_minute || minute_of_day <= daypart.end_minute
    }
}

impl ExclusionRule for DaypartingRule {
    fn name(&self) -> &'static str {
        "dayparting"
    }

    fn should_exclude(&self, ad: &CreativeAd, ctx: &ExclusionContext<'_>) -> bool {
        if ad.dayparts.is_empty() {
            return false;
        }
        !ad.dayparts
            .iter()
            .any(|daypart| matches_day(daypart, ctx.now) && matches_time(daypart, ctx.now))
    }

    fn reason(&self, ad: &CreativeAd) -> String {
        format!(
            "creativeSetId {} excluded as not within a scheduled time slot",
            ad.creative_set_id
        )
    }
}
