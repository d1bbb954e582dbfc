//! Time-range filter parameters and the predicate they produce.
//!
//! The builder emits a predicate over an unqualified `timestamp` column.
//! Callers joining several tables must rebind it to the right alias before
//! rendering (see [`TimePredicate::rebind`]).

use crate::error::{Error, Result};
use crate::query::ColumnRef;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

/// Time zone names are bound as query parameters, but anything outside this
/// shape is rejected before reaching the store.
static TIME_ZONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_+\-:/]{1,64}$").expect("valid regex"));

/// Time zone assumed when a date range arrives without one.
pub const DEFAULT_TIME_ZONE: &str = "UTC";

/// Generic dashboard filter parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    /// First day of the range (`YYYY-MM-DD`), inclusive
    #[validate(length(max = 10))]
    pub start_date: Option<String>,
    /// Last day of the range (`YYYY-MM-DD`), inclusive
    #[validate(length(max = 10))]
    pub end_date: Option<String>,
    /// IANA name or UTC offset the dates are expressed in
    #[validate(length(max = 64))]
    pub time_zone: Option<String>,
    /// Window start, in minutes before now
    pub past_minutes_start: Option<u32>,
    /// Window end, in minutes before now
    pub past_minutes_end: Option<u32>,
}

impl FilterParams {
    /// Filter on a calendar date range.
    pub fn date_range(start: &str, end: &str, time_zone: &str) -> Self {
        Self {
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            time_zone: Some(time_zone.to_string()),
            ..Self::default()
        }
    }

    /// Filter on a window relative to now.
    pub fn past_minutes(start: u32, end: u32) -> Self {
        Self {
            past_minutes_start: Some(start),
            past_minutes_end: Some(end),
            ..Self::default()
        }
    }

    /// Build the time predicate for these parameters.
    ///
    /// A relative window takes precedence over a date range. Returns `None`
    /// when no time restriction was requested.
    pub fn time_predicate(&self) -> Result<Option<TimePredicate>> {
        if let Some(start) = self.past_minutes_start {
            let end = self.past_minutes_end.unwrap_or(0);
            if start < end {
                return Err(Error::invalid_parameter(format!(
                    "pastMinutesStart ({}) must not be less than pastMinutesEnd ({})",
                    start, end
                )));
            }
            return Ok(Some(TimePredicate::new(TimeWindow::PastMinutes { start, end })));
        }

        match (self.start_date.as_deref(), self.end_date.as_deref()) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => {
                let start = parse_date("startDate", start)?;
                let end = parse_date("endDate", end)?;
                if end < start {
                    return Err(Error::invalid_parameter(format!(
                        "endDate {} is before startDate {}",
                        end, start
                    )));
                }

                let time_zone = self
                    .time_zone
                    .as_deref()
                    .map(str::trim)
                    .filter(|tz| !tz.is_empty())
                    .unwrap_or(DEFAULT_TIME_ZONE);
                if !TIME_ZONE_RE.is_match(time_zone) {
                    return Err(Error::invalid_parameter(format!(
                        "invalid timeZone: {}",
                        time_zone
                    )));
                }

                let end_exclusive = end
                    .succ_opt()
                    .ok_or_else(|| Error::invalid_parameter("endDate out of range"))?;

                Ok(Some(TimePredicate::new(TimeWindow::Days {
                    start,
                    end_exclusive,
                    time_zone: time_zone.to_string(),
                })))
            }
            _ => Err(Error::invalid_parameter(
                "startDate and endDate must be provided together",
            )),
        }
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        Error::invalid_parameter(format!("{} must be YYYY-MM-DD, got {:?}: {}", field, value, e))
    })
}

/// Time span selected by the filter parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeWindow {
    /// `[start 00:00, end_exclusive 00:00)` in the given time zone.
    Days {
        start: NaiveDate,
        end_exclusive: NaiveDate,
        time_zone: String,
    },
    /// `(now - start minutes, now - end minutes]`.
    PastMinutes { start: u32, end: u32 },
}

impl TimeWindow {
    /// Check whether a timestamp falls in the window.
    ///
    /// Local evaluation only understands UTC and fixed offsets; named zones
    /// are resolved by the store.
    pub fn contains(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Result<bool> {
        match self {
            Self::Days {
                start,
                end_exclusive,
                time_zone,
            } => {
                let offset = fixed_offset(time_zone)?;
                let from = start_of_day(*start, offset)?;
                let until = start_of_day(*end_exclusive, offset)?;
                Ok(timestamp >= from && timestamp < until)
            }
            Self::PastMinutes { start, end } => {
                let from = now - Duration::minutes(i64::from(*start));
                let until = now - Duration::minutes(i64::from(*end));
                Ok(timestamp > from && timestamp <= until)
            }
        }
    }
}

fn fixed_offset(time_zone: &str) -> Result<FixedOffset> {
    match time_zone {
        "UTC" | "Etc/UTC" | "GMT" | "Z" => FixedOffset::east_opt(0)
            .ok_or_else(|| Error::internal("zero offset rejected")),
        other => other.parse::<FixedOffset>().map_err(|_| {
            Error::invalid_parameter(format!(
                "time zone {} cannot be evaluated without the store",
                other
            ))
        }),
    }
}

fn start_of_day(date: NaiveDate, offset: FixedOffset) -> Result<DateTime<Utc>> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::internal("invalid midnight"))?;
    offset
        .from_local_datetime(&midnight)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| Error::invalid_parameter(format!("ambiguous local midnight on {}", date)))
}

/// A time restriction over one timestamp column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimePredicate {
    column: ColumnRef,
    window: TimeWindow,
}

impl TimePredicate {
    /// New predicate over the unqualified `timestamp` column.
    pub fn new(window: TimeWindow) -> Self {
        Self {
            column: ColumnRef::bare("timestamp"),
            window,
        }
    }

    /// Point the predicate at another column, e.g. `src.timestamp`.
    pub fn rebind(mut self, column: ColumnRef) -> Self {
        self.column = column;
        self
    }

    pub fn column(&self) -> &ColumnRef {
        &self.column
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }
}
