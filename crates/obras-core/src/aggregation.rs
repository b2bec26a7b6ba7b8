//! Weekly aggregation engine.
//!
//! Pure functions that derive the current-week subset, the weekly groups and
//! the budget totals from a flat list of expense entries. Nothing here does
//! I/O or keeps state between calls; callers recompute the views from the
//! stored entries whenever they need them.
//!
//! Weeks run Monday through Sunday in the calendar of the time zone supplied
//! by the caller, so a Sunday entry belongs to the week that started on the
//! previous Monday.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use rust_decimal::Decimal;
use tracing::warn;

use obras_domain::{Amounted, Anote, BudgetTotals, Obra, WeekGroup};

use crate::CoreError;

const DAYS_TO_SUNDAY: u64 = 6;

/// Inclusive instant range covering one Monday-to-Sunday week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekBounds<Tz: TimeZone> {
    /// Monday at local midnight.
    pub start: DateTime<Tz>,
    /// Sunday at the last representable instant of the local day.
    pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> WeekBounds<Tz> {
    /// Returns true when `instant` falls between `start` and `end`, both inclusive.
    pub fn contains<Z: TimeZone>(&self, instant: &DateTime<Z>) -> bool {
        let at = instant.naive_utc();
        self.start.naive_utc() <= at && at <= self.end.naive_utc()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }
}

/// Returns the Monday of the ISO week that contains `date`, or `None` when
/// that Monday lies before the first representable date.
pub fn week_start_date(date: NaiveDate) -> Option<NaiveDate> {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset))
}

/// Computes the Monday 00:00 to Sunday 23:59:59.999999999 range, in `tz`, of
/// the week containing `reference`.
pub fn week_bounds<Tz: TimeZone>(
    reference: NaiveDate,
    tz: &Tz,
) -> Result<WeekBounds<Tz>, CoreError> {
    let monday = week_start_date(reference)
        .ok_or_else(|| CoreError::InvalidDate(format!("week of {reference} is out of range")))?;
    let sunday = monday
        .checked_add_days(Days::new(DAYS_TO_SUNDAY))
        .ok_or_else(|| CoreError::InvalidDate(format!("week of {reference} is out of range")))?;

    let start_naive = monday
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CoreError::InvalidDate(format!("no midnight on {monday}")))?;
    let end_naive = sunday
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .ok_or_else(|| CoreError::InvalidDate(format!("no end of day on {sunday}")))?;

    Ok(WeekBounds {
        start: resolve_local(tz, start_naive, Edge::Earliest)?,
        end: resolve_local(tz, end_naive, Edge::Latest)?,
    })
}

/// Parses a reference date given as `YYYY-MM-DD`, `DD/MM/YYYY` or RFC 3339.
pub fn parse_reference_date(raw: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return Ok(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(stamp.date_naive());
    }
    Err(CoreError::InvalidDate(format!(
        "`{trimmed}` is not a date (expected YYYY-MM-DD)"
    )))
}

/// Returns true iff `anote` was recorded during the week containing `now`.
pub fn is_in_current_week<Tz: TimeZone>(anote: &Anote, now: &DateTime<Tz>) -> bool {
    match week_bounds(now.date_naive(), &now.timezone()) {
        Ok(bounds) => bounds.contains(&anote.timestamp),
        Err(err) => {
            warn!(error = %err, "could not resolve current week");
            false
        }
    }
}

/// Keeps the entries recorded during the week containing `now`, in input order.
pub fn filter_current_week<Tz: TimeZone>(anotes: &[Anote], now: &DateTime<Tz>) -> Vec<Anote> {
    let bounds = match week_bounds(now.date_naive(), &now.timezone()) {
        Ok(bounds) => bounds,
        Err(err) => {
            warn!(error = %err, "could not resolve current week");
            return Vec::new();
        }
    };
    anotes
        .iter()
        .filter(|anote| bounds.contains(&anote.timestamp))
        .cloned()
        .collect()
}

/// Buckets entries by the Monday-start week of their timestamp in `tz`.
///
/// Entries inside a group are ordered newest first and groups are ordered by
/// their newest entry, most recent week first.
pub fn group_by_week<Tz: TimeZone>(anotes: &[Anote], tz: &Tz) -> Vec<WeekGroup> {
    let mut buckets: BTreeMap<NaiveDate, Vec<Anote>> = BTreeMap::new();
    for anote in anotes {
        let day = anote.local_date(tz);
        let week_start = week_start_date(day).unwrap_or_else(|| {
            warn!(anote_id = anote.id, %day, "week start out of range, grouping by day");
            day
        });
        buckets.entry(week_start).or_default().push(anote.clone());
    }

    let mut groups: Vec<WeekGroup> = buckets
        .into_iter()
        .map(|(week_start, mut items)| {
            items.sort_by(newest_first);
            let week_end = week_start
                .checked_add_days(Days::new(DAYS_TO_SUNDAY))
                .unwrap_or(NaiveDate::MAX);
            let total = total_amount(&items);
            WeekGroup {
                label: WeekGroup::label_for(week_start, week_end),
                week_start,
                week_end,
                anotes: items,
                total,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        let latest_a = a.anotes.first().map(|anote| anote.timestamp);
        let latest_b = b.anotes.first().map(|anote| anote.timestamp);
        latest_b
            .cmp(&latest_a)
            .then_with(|| b.week_start.cmp(&a.week_start))
    });
    groups
}

/// Exact decimal sum of the amounts; zero for an empty slice.
///
/// Saturates at the `Decimal` bounds instead of overflowing. Amounts accepted
/// by the services stay below [`MAX_AMOUNT`](obras_domain::MAX_AMOUNT), so
/// saturation only shows up for rows that bypassed validation.
pub fn total_amount<T: Amounted>(items: &[T]) -> Decimal {
    items
        .iter()
        .map(Amounted::amount)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Budget left after the given entries. Negative once spending exceeds the budget.
pub fn remaining_budget(obra: &Obra, anotes: &[Anote]) -> Decimal {
    obra.budget.saturating_sub(total_amount(anotes))
}

/// Budget, spent and remaining for `obra` over `anotes`.
pub fn budget_totals(obra: &Obra, anotes: &[Anote]) -> BudgetTotals {
    BudgetTotals::from_parts(obra.budget, total_amount(anotes))
}

/// Ordering used for entry lists: most recent timestamp first, newer ids first on ties.
pub fn newest_first(a: &Anote, b: &Anote) -> std::cmp::Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| b.id.cmp(&a.id))
}

#[derive(Clone, Copy)]
enum Edge {
    Earliest,
    Latest,
}

fn resolve_local<Tz: TimeZone>(
    tz: &Tz,
    naive: NaiveDateTime,
    edge: Edge,
) -> Result<DateTime<Tz>, CoreError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Ok(instant),
        LocalResult::Ambiguous(first, second) => Ok(match edge {
            Edge::Earliest => first,
            Edge::Latest => second,
        }),
        LocalResult::None => Err(CoreError::InvalidDate(format!(
            "{naive} does not exist in the configured time zone"
        ))),
    }
}
