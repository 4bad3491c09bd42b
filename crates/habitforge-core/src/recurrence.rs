//! Recurrence rules and timezone-aware due-date math.
//!
//! Rules arrive as short text directives ("DAILY", "EVERY 2 DAYS",
//! "WEEKDAYS", ...). Parsing is total: anything unrecognized degrades
//! to a daily cadence rather than failing, so a malformed rule can
//! never block a completion.
//!
//! Due dates are computed at local start-of-day in the user's IANA
//! timezone via chrono-tz, so cadences stay correct across DST
//! transitions. Ambiguous or nonexistent local midnights resolve to the
//! earliest valid instant.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Days, Duration, LocalResult, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Hours after a due date during which a late completion still counts
/// as on-time. Fixed, uniform across recurrence kinds.
pub const GRACE_PERIOD_HOURS: i64 = 6;

/// Recurrence cadence kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
    /// Day-interval cadence outside the named kinds. Interval 0 means
    /// the task never recurs ("ONCE").
    Custom,
}

/// Parsed recurrence rule: a closed variant instead of re-parsing the
/// rule string at each call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    pub kind: RecurrenceKind,
    pub interval: u32,
    /// Restriction to specific weekdays, 0 = Sunday .. 6 = Saturday.
    pub days_of_week: Option<BTreeSet<u8>>,
}

impl RecurrencePattern {
    /// The fallback cadence: every day.
    pub fn daily() -> Self {
        Self {
            kind: RecurrenceKind::Daily,
            interval: 1,
            days_of_week: None,
        }
    }

    /// Parse a rule string. Case-insensitive, trimmed, total: anything
    /// unrecognized falls back to [`RecurrencePattern::daily`].
    ///
    /// Grammar: `DAILY`, `WEEKLY`, `MONTHLY`, `ONCE`,
    /// `EVERY <n> DAYS|WEEKS|MONTHS`, `WEEKDAYS`, `WEEKENDS`.
    pub fn parse(rule: &str) -> Self {
        let normalized = rule.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "DAILY" => Self::daily(),
            "WEEKLY" => Self {
                kind: RecurrenceKind::Weekly,
                interval: 1,
                days_of_week: None,
            },
            "MONTHLY" => Self {
                kind: RecurrenceKind::Monthly,
                interval: 1,
                days_of_week: None,
            },
            "ONCE" => Self {
                kind: RecurrenceKind::Custom,
                interval: 0,
                days_of_week: None,
            },
            "WEEKDAYS" => Self {
                kind: RecurrenceKind::Weekly,
                interval: 1,
                days_of_week: Some((1..=5).collect()),
            },
            "WEEKENDS" => Self {
                kind: RecurrenceKind::Weekly,
                interval: 1,
                days_of_week: Some([0u8, 6].into_iter().collect()),
            },
            _ => Self::parse_every(&normalized).unwrap_or_else(Self::daily),
        }
    }

    fn parse_every(rule: &str) -> Option<Self> {
        let mut words = rule.split_whitespace();
        if words.next()? != "EVERY" {
            return None;
        }
        let interval: u32 = words.next()?.parse().ok()?;
        let kind = match words.next()? {
            "DAY" | "DAYS" => RecurrenceKind::Daily,
            "WEEK" | "WEEKS" => RecurrenceKind::Weekly,
            "MONTH" | "MONTHS" => RecurrenceKind::Monthly,
            _ => return None,
        };
        if words.next().is_some() {
            return None;
        }
        Some(Self {
            kind,
            interval,
            days_of_week: None,
        })
    }
}

/// Result of evaluating a recurrence rule against a completion history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceCheck {
    /// Whether the task is due now (same-instant counts as due).
    pub is_due: bool,
    /// When the next completion is expected.
    pub next_due_date: DateTime<Utc>,
    /// Calendar days elapsed since the last completion, in the user
    /// timezone, clamped to zero.
    pub days_since_last_completion: u32,
    /// Whole cadence periods missed beyond the one currently due.
    pub missed_completions: u32,
    /// Whether the grace window after the due date has fully elapsed.
    pub is_overdue: bool,
    /// Whether now falls strictly inside the grace window.
    pub grace_period_active: bool,
}

/// Evaluate a raw rule string. See [`evaluate_pattern`].
pub fn evaluate(
    rule: &str,
    last_completed_at: Option<DateTime<Utc>>,
    tz: Tz,
    now: DateTime<Utc>,
) -> RecurrenceCheck {
    evaluate_pattern(&RecurrencePattern::parse(rule), last_completed_at, tz, now)
}

/// Evaluate a parsed pattern against the last completion and the
/// caller-supplied wall clock. Total: never fails for any input.
pub fn evaluate_pattern(
    pattern: &RecurrencePattern,
    last_completed_at: Option<DateTime<Utc>>,
    tz: Tz,
    now: DateTime<Utc>,
) -> RecurrenceCheck {
    let Some(last) = last_completed_at else {
        // Never completed: due immediately.
        return RecurrenceCheck {
            is_due: true,
            next_due_date: now,
            days_since_last_completion: 0,
            missed_completions: 0,
            is_overdue: false,
            grace_period_active: false,
        };
    };

    let days_since = calendar_days_between(last, now, tz);
    let next_due = next_due_date(pattern, last, tz);
    let grace_end = next_due + Duration::hours(GRACE_PERIOD_HOURS);

    RecurrenceCheck {
        is_due: now >= next_due,
        next_due_date: next_due,
        days_since_last_completion: days_since,
        missed_completions: missed_completions(pattern, days_since, last, now, tz),
        is_overdue: now > grace_end,
        grace_period_active: now > next_due && now < grace_end,
    }
}

/// Parse an IANA timezone identifier, defaulting to UTC when absent or
/// unrecognized.
pub fn parse_timezone(tz: Option<&str>) -> Tz {
    tz.and_then(|s| s.trim().parse().ok()).unwrap_or(Tz::UTC)
}

/// Whether two instants fall on the same calendar day in the given zone.
pub fn same_local_day(a: DateTime<Utc>, b: DateTime<Utc>, tz: Tz) -> bool {
    local_date(a, tz) == local_date(b, tz)
}

/// Calendar days from `from` to `to` in the given zone, clamped to zero.
pub fn calendar_days_between(from: DateTime<Utc>, to: DateTime<Utc>, tz: Tz) -> u32 {
    let days = local_date(to, tz)
        .signed_duration_since(local_date(from, tz))
        .num_days();
    days.max(0) as u32
}

fn local_date(dt: DateTime<Utc>, tz: Tz) -> NaiveDate {
    dt.with_timezone(&tz).date_naive()
}

/// Resolve local midnight on `date` to a UTC instant. On days where a
/// DST jump removes midnight, the earliest valid instant after it is
/// used; ambiguous midnights resolve to the earlier mapping.
fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            for minutes in [30i64, 60, 90, 120] {
                let shifted = naive + Duration::minutes(minutes);
                match tz.from_local_datetime(&shifted) {
                    LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                        return dt.with_timezone(&Utc);
                    }
                    LocalResult::None => {}
                }
            }
            // No DST gap is wider than two hours in practice.
            Utc.from_utc_datetime(&naive)
        }
    }
}

fn next_due_date(pattern: &RecurrencePattern, last: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let last_date = local_date(last, tz);
    match pattern.kind {
        RecurrenceKind::Daily => {
            let date = last_date
                .checked_add_days(Days::new(pattern.interval.max(1) as u64))
                .unwrap_or(last_date);
            local_midnight(date, tz)
        }
        RecurrenceKind::Weekly => match &pattern.days_of_week {
            Some(allowed) => {
                // Earliest day after the completion whose weekday is allowed.
                let mut date = last_date.checked_add_days(Days::new(1)).unwrap_or(last_date);
                for _ in 0..7 {
                    if allowed.contains(&(date.weekday().num_days_from_sunday() as u8)) {
                        break;
                    }
                    date = date.checked_add_days(Days::new(1)).unwrap_or(date);
                }
                local_midnight(date, tz)
            }
            None => {
                let date = last_date
                    .checked_add_days(Days::new(pattern.interval.max(1) as u64 * 7))
                    .unwrap_or(last_date);
                local_midnight(date, tz)
            }
        },
        RecurrenceKind::Monthly => {
            let date = last_date
                .checked_add_months(Months::new(pattern.interval.max(1)))
                .unwrap_or(last_date);
            local_midnight(date, tz)
        }
        RecurrenceKind::Custom => {
            if pattern.interval == 0 {
                // "ONCE": push the next due date out a century.
                last.checked_add_months(Months::new(1200)).unwrap_or(last)
            } else {
                last + Duration::days(pattern.interval as i64)
            }
        }
    }
}

fn missed_completions(
    pattern: &RecurrencePattern,
    days_since: u32,
    last: DateTime<Utc>,
    now: DateTime<Utc>,
    tz: Tz,
) -> u32 {
    match pattern.kind {
        RecurrenceKind::Daily => (days_since / pattern.interval.max(1)).saturating_sub(1),
        RecurrenceKind::Weekly => (days_since / (pattern.interval.max(1) * 7)).saturating_sub(1),
        RecurrenceKind::Monthly => whole_months_between(last, now, tz).saturating_sub(1),
        RecurrenceKind::Custom => 0,
    }
}

fn whole_months_between(from: DateTime<Utc>, to: DateTime<Utc>, tz: Tz) -> u32 {
    let from = local_date(from, tz);
    let to = local_date(to, tz);
    if to < from {
        return 0;
    }
    let mut months =
        (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_parse_named_rules() {
        assert_eq!(RecurrencePattern::parse("DAILY"), RecurrencePattern::daily());
        assert_eq!(RecurrencePattern::parse("  daily "), RecurrencePattern::daily());

        let weekly = RecurrencePattern::parse("weekly");
        assert_eq!(weekly.kind, RecurrenceKind::Weekly);
        assert_eq!(weekly.interval, 1);

        let once = RecurrencePattern::parse("ONCE");
        assert_eq!(once.kind, RecurrenceKind::Custom);
        assert_eq!(once.interval, 0);
    }

    #[test]
    fn test_parse_every() {
        let p = RecurrencePattern::parse("EVERY 2 DAYS");
        assert_eq!(p.kind, RecurrenceKind::Daily);
        assert_eq!(p.interval, 2);

        let p = RecurrencePattern::parse("every 3 weeks");
        assert_eq!(p.kind, RecurrenceKind::Weekly);
        assert_eq!(p.interval, 3);

        let p = RecurrencePattern::parse("EVERY 1 MONTH");
        assert_eq!(p.kind, RecurrenceKind::Monthly);
        assert_eq!(p.interval, 1);
    }

    #[test]
    fn test_parse_day_restrictions() {
        let weekdays = RecurrencePattern::parse("WEEKDAYS");
        assert_eq!(
            weekdays.days_of_week,
            Some((1..=5).collect::<BTreeSet<u8>>())
        );

        let weekends = RecurrencePattern::parse("weekends");
        assert_eq!(
            weekends.days_of_week,
            Some([0u8, 6].into_iter().collect::<BTreeSet<u8>>())
        );
    }

    #[test]
    fn test_parse_garbage_falls_back_to_daily() {
        for rule in ["", "   ", "FORTNIGHTLY", "EVERY DAYS", "EVERY x DAYS", "EVERY 2 PARSECS", "EVERY 2 DAYS EXTRA"] {
            assert_eq!(RecurrencePattern::parse(rule), RecurrencePattern::daily(), "rule: {rule:?}");
        }
    }

    #[test]
    fn test_never_completed_is_due_now() {
        let now = utc(2025, 6, 1, 12, 0);
        let check = evaluate("DAILY", None, Tz::UTC, now);
        assert!(check.is_due);
        assert_eq!(check.next_due_date, now);
        assert_eq!(check.days_since_last_completion, 0);
        assert_eq!(check.missed_completions, 0);
        assert!(!check.is_overdue);
        assert!(!check.grace_period_active);
    }

    #[test]
    fn test_every_two_days_due() {
        // "EVERY 2 DAYS" completed 2 days ago is due again.
        let last = utc(2025, 6, 1, 9, 0);
        let now = utc(2025, 6, 3, 9, 0);
        let check = evaluate("EVERY 2 DAYS", Some(last), Tz::UTC, now);
        assert!(check.is_due);
        assert_eq!(check.days_since_last_completion, 2);
        assert_eq!(check.next_due_date, utc(2025, 6, 3, 0, 0));
    }

    #[test]
    fn test_daily_grace_window() {
        let last = utc(2025, 6, 1, 20, 0);
        // Due at 2025-06-02 00:00 UTC, grace until 06:00.
        let check = evaluate("DAILY", Some(last), Tz::UTC, utc(2025, 6, 2, 3, 0));
        assert!(check.is_due);
        assert!(check.grace_period_active);
        assert!(!check.is_overdue);

        let check = evaluate("DAILY", Some(last), Tz::UTC, utc(2025, 6, 2, 7, 0));
        assert!(!check.grace_period_active);
        assert!(check.is_overdue);

        // Before the due instant, neither applies.
        let check = evaluate("DAILY", Some(last), Tz::UTC, utc(2025, 6, 1, 23, 0));
        assert!(!check.is_due);
        assert!(!check.grace_period_active);
        assert!(!check.is_overdue);
    }

    #[test]
    fn test_once_never_recurs() {
        let last = utc(2025, 6, 1, 9, 0);
        let check = evaluate("ONCE", Some(last), Tz::UTC, utc(2030, 6, 1, 9, 0));
        assert!(!check.is_due);
        assert!(!check.is_overdue);
        assert_eq!(check.missed_completions, 0);
        assert_eq!(check.next_due_date, utc(2125, 6, 1, 9, 0));
    }

    #[test]
    fn test_weekdays_skip_weekend() {
        // Completed on a Friday; next allowed day is Monday.
        let friday = utc(2025, 6, 6, 15, 0);
        let check = evaluate("WEEKDAYS", Some(friday), Tz::UTC, utc(2025, 6, 7, 12, 0));
        assert_eq!(check.next_due_date, utc(2025, 6, 9, 0, 0));
        assert!(!check.is_due);
    }

    #[test]
    fn test_weekends_skip_weekdays() {
        // Completed on a Sunday; next allowed day is Saturday.
        let sunday = utc(2025, 6, 8, 10, 0);
        let check = evaluate("WEEKENDS", Some(sunday), Tz::UTC, utc(2025, 6, 10, 10, 0));
        assert_eq!(check.next_due_date, utc(2025, 6, 14, 0, 0));
    }

    #[test]
    fn test_monthly_due_date() {
        let last = utc(2025, 1, 31, 12, 0);
        let check = evaluate("MONTHLY", Some(last), Tz::UTC, utc(2025, 2, 15, 12, 0));
        // Jan 31 + 1 month clamps to Feb 28.
        assert_eq!(check.next_due_date, utc(2025, 2, 28, 0, 0));
        assert!(!check.is_due);
    }

    #[test]
    fn test_missed_completions_daily() {
        let last = utc(2025, 6, 1, 9, 0);
        let check = evaluate("DAILY", Some(last), Tz::UTC, utc(2025, 6, 5, 9, 0));
        assert_eq!(check.days_since_last_completion, 4);
        assert_eq!(check.missed_completions, 3);

        let check = evaluate("EVERY 2 DAYS", Some(last), Tz::UTC, utc(2025, 6, 5, 9, 0));
        assert_eq!(check.missed_completions, 1);
    }

    #[test]
    fn test_missed_completions_weekly_and_monthly() {
        let last = utc(2025, 1, 6, 9, 0);
        let check = evaluate("WEEKLY", Some(last), Tz::UTC, utc(2025, 1, 27, 9, 0));
        assert_eq!(check.missed_completions, 2);

        let check = evaluate("MONTHLY", Some(last), Tz::UTC, utc(2025, 4, 10, 9, 0));
        assert_eq!(check.missed_completions, 2);
    }

    #[test]
    fn test_due_date_uses_local_midnight() {
        let tz: Tz = "America/New_York".parse().unwrap();
        // 2025-06-01 21:00 in New York is 2025-06-02 01:00 UTC; the
        // completion day is still June 1 locally.
        let last = utc(2025, 6, 2, 1, 0);
        let check = evaluate("DAILY", Some(last), tz, utc(2025, 6, 2, 2, 0));
        // Due at June 2 local midnight = 04:00 UTC (EDT).
        assert_eq!(check.next_due_date, utc(2025, 6, 2, 4, 0));
        assert!(!check.is_due);
    }

    #[test]
    fn test_weekly_due_across_spring_forward() {
        let tz: Tz = "America/New_York".parse().unwrap();
        // Monday 2025-03-03 12:00 EST (-05:00).
        let last = utc(2025, 3, 3, 17, 0);
        let check = evaluate("WEEKLY", Some(last), tz, utc(2025, 3, 9, 12, 0));
        // Monday 2025-03-10 00:00 is EDT (-04:00) after the March 9
        // transition, so local midnight lands at 04:00 UTC, not 05:00.
        assert_eq!(check.next_due_date, utc(2025, 3, 10, 4, 0));
    }

    #[test]
    fn test_nonexistent_local_midnight_resolves_forward() {
        // Chile jumps straight from 23:59 to 01:00 on the spring
        // transition night, so the transition day has no local midnight.
        let tz: Tz = "America/Santiago".parse().unwrap();
        let last = utc(2025, 9, 6, 19, 0); // 15:00 local, day before
        let check = evaluate("DAILY", Some(last), tz, utc(2025, 9, 7, 12, 0));
        let due_local = check.next_due_date.with_timezone(&tz);
        assert_eq!(due_local.date_naive(), NaiveDate::from_ymd_opt(2025, 9, 7).unwrap());
        assert!(due_local.time() <= NaiveTime::from_hms_opt(2, 0, 0).unwrap());
    }

    #[test]
    fn test_calendar_days_respect_timezone() {
        let tz: Tz = "America/New_York".parse().unwrap();
        // 23:30 local June 1 vs 00:30 local June 2: one calendar day
        // apart even though only an hour elapsed.
        let a = utc(2025, 6, 2, 3, 30);
        let b = utc(2025, 6, 2, 4, 30);
        assert_eq!(calendar_days_between(a, b, tz), 1);
        assert!(same_local_day(a, b, Tz::UTC));
        assert!(!same_local_day(a, b, tz));
        // Clamped when reversed.
        assert_eq!(calendar_days_between(b, a, tz), 0);
    }

    #[test]
    fn test_parse_timezone_fallback() {
        assert_eq!(parse_timezone(Some("America/New_York")).name(), "America/New_York");
        assert_eq!(parse_timezone(Some("Not/AZone")), Tz::UTC);
        assert_eq!(parse_timezone(None), Tz::UTC);
    }
}
