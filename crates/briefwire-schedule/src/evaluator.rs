//! Schedule evaluation — which rules fire at a given instant.
//!
//! Matching is minute-exact: a rule is due when the wall clock in the
//! rule's timezone reads exactly the configured HH:MM and the day field
//! of its frequency matches. No windows, no catch-up — the caller is
//! expected to evaluate at least once per minute.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use briefwire_core::types::{Frequency, ScheduleRule};

/// Wall-clock fields of one instant in one timezone.
struct ClockParts {
    hour: u32,
    minute: u32,
    /// 0–6, Sunday = 0.
    weekday: u32,
    day_of_month: u32,
}

fn clock_parts<T: TimeZone>(instant: &DateTime<T>) -> ClockParts {
    ClockParts {
        hour: instant.hour(),
        minute: instant.minute(),
        weekday: instant.weekday().num_days_from_sunday(),
        day_of_month: instant.day(),
    }
}

/// Read `now` as a wall clock in the rule's timezone.
/// Unknown timezone names fall back to UTC with a warning.
fn local_clock(rule: &ScheduleRule, now: DateTime<Utc>) -> ClockParts {
    match rule.timezone.as_deref() {
        Some(name) => match name.parse::<Tz>() {
            Ok(tz) => clock_parts(&now.with_timezone(&tz)),
            Err(_) => {
                tracing::warn!(
                    "⚠️ Rule '{}' names unknown timezone '{}' — evaluating in UTC",
                    rule.id,
                    name
                );
                clock_parts(&now)
            }
        },
        None => clock_parts(&now),
    }
}

/// True when the rule fires at `now`.
///
/// A rule with a malformed time is never due; it logs once per evaluation
/// rather than failing the run.
pub fn is_due(rule: &ScheduleRule, now: DateTime<Utc>) -> bool {
    let Some((hour, minute)) = rule.time_parts() else {
        tracing::warn!(
            "⚠️ Rule '{}' has malformed time '{}' — never due",
            rule.id,
            rule.time
        );
        return false;
    };

    let local = local_clock(rule, now);
    if local.hour != hour || local.minute != minute {
        return false;
    }

    match rule.frequency {
        Frequency::Daily => true,
        // Weekly default: Monday. Monthly default: the 1st.
        Frequency::Weekly => local.weekday == u32::from(rule.day_of_week.unwrap_or(1)),
        Frequency::Monthly => local.day_of_month == u32::from(rule.day_of_month.unwrap_or(1)),
    }
}

/// Filter a rule set down to the rules due at `now`.
pub fn due_rules<'a>(rules: &'a [ScheduleRule], now: DateTime<Utc>) -> Vec<&'a ScheduleRule> {
    rules.iter().filter(|rule| is_due(rule, now)).collect()
}
