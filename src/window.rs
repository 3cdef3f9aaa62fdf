use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ReportError, Result};

// Windowing-related types live here to keep the aggregator focused.

const SECONDS_PER_DAY: i64 = 86_400;

/// Raw date selection as it arrives from the CLI or the config file.
///
/// Every field is optional and unvalidated; `DateRangeInput::from_args`
/// decides which shape (if any) was requested.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateRangeArgs {
  #[serde(default, deserialize_with = "string_or_number")]
  pub after: Option<String>,
  #[serde(default, deserialize_with = "string_or_number")]
  pub before: Option<String>,
  #[serde(default, deserialize_with = "string_or_number")]
  pub year: Option<String>,
  #[serde(default, deserialize_with = "string_or_number")]
  pub week: Option<String>,
  #[serde(default, deserialize_with = "string_or_number")]
  pub quarter: Option<String>,
}

impl DateRangeArgs {
  pub fn is_empty(&self) -> bool {
    self.after.is_none()
      && self.before.is_none()
      && self.year.is_none()
      && self.week.is_none()
      && self.quarter.is_none()
  }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  match value {
    None | Some(serde_json::Value::Null) => Ok(None),
    Some(serde_json::Value::String(s)) => Ok(Some(s)),
    Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
    Some(other) => Err(serde::de::Error::custom(format!(
      "expected a string or number, got {}",
      other
    ))),
  }
}

/// One validated date selection. Exactly one shape is active per resolution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DateRangeInput {
  Explicit { after: DateTime<Utc>, before: DateTime<Utc> },
  WeekYear { year: i32, week: u32 },
  QuarterYear { year: i32, quarter: u32 },
}

/// Canonical half-open window `[after, before)` in UTC epoch seconds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
  pub after: i64,
  pub before: i64,
}

impl DateRange {
  pub fn new(after: i64, before: i64) -> Result<Self> {
    if after >= before {
      return Err(ReportError::invalid_range(format!(
        "after ({}) must be earlier than before ({})",
        git_date(after),
        git_date(before)
      )));
    }
    Ok(Self { after, before })
  }

  pub fn days(&self) -> i64 {
    (self.before - self.after) / SECONDS_PER_DAY
  }

  /// Lower bound rendered for `git log --after`.
  pub fn git_after(&self) -> String {
    git_date(self.after)
  }

  /// Upper bound rendered for `git log --before`.
  ///
  /// git keeps commits stamped exactly at `--before`, so the last included second is passed.
  pub fn git_before(&self) -> String {
    git_date(self.before - 1)
  }
}

/// Render an epoch as `YYYY-MM-DD HH:MM:SS +0000`, which git parses without ambiguity.
pub fn git_date(epoch: i64) -> String {
  match Utc.timestamp_opt(epoch, 0).single() {
    Some(dt) => dt.format("%Y-%m-%d %H:%M:%S +0000").to_string(),
    None => epoch.to_string(),
  }
}

static RE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}$").unwrap());

impl DateRangeInput {
  /// Pick exactly one input shape out of the raw arguments.
  pub fn from_args(args: &DateRangeArgs) -> Result<Self> {
    // Week and quarter conflict regardless of anything else that was passed.
    if args.week.is_some() && args.quarter.is_some() {
      return Err(ReportError::invalid_range(
        "pass only one of week and quarter, not both",
      ));
    }

    if args.week.is_some() || args.quarter.is_some() {
      if args.after.is_some() || args.before.is_some() {
        return Err(ReportError::invalid_range(
          "after/before cannot be combined with week or quarter",
        ));
      }
      let year = parse_year(args.year.as_deref())?;

      if let Some(raw) = args.week.as_deref() {
        let week = parse_number(raw, "week")?;
        validate_week(week)?;
        return Ok(DateRangeInput::WeekYear { year, week });
      }

      if let Some(raw) = args.quarter.as_deref() {
        let quarter = parse_number(raw, "quarter")?;
        validate_quarter(quarter)?;
        return Ok(DateRangeInput::QuarterYear { year, quarter });
      }
    }

    if args.year.is_some() {
      return Err(ReportError::invalid_range(
        "year must be passed with either week or quarter",
      ));
    }

    match (args.after.as_deref(), args.before.as_deref()) {
      (Some(after), Some(before)) => Ok(DateRangeInput::Explicit {
        after: parse_instant(after)?,
        before: parse_instant(before)?,
      }),
      (None, None) => Err(ReportError::invalid_range(
        "provide either after and before, quarter and year, or week and year",
      )),
      _ => Err(ReportError::invalid_range("after and before must be passed together")),
    }
  }

  /// Short human label for banners and JSON output.
  pub fn label(&self) -> String {
    match self {
      DateRangeInput::Explicit { after, before } => {
        format!("{} to {}", after.format("%Y-%m-%d"), before.format("%Y-%m-%d"))
      }
      DateRangeInput::WeekYear { year, week } => format!("Week {} of {}", week, year),
      DateRangeInput::QuarterYear { year, quarter } => format!("Q{} {}", quarter, year),
    }
  }
}

/// Normalize any input shape into the canonical `{after, before}` window.
pub fn resolve(input: &DateRangeInput) -> Result<DateRange> {
  match input {
    DateRangeInput::Explicit { after, before } => DateRange::new(after.timestamp(), before.timestamp()),
    DateRangeInput::QuarterYear { year, quarter } => {
      validate_year(*year)?;
      let (after, before) = quarter_bounds(*year, *quarter)?;
      DateRange::new(utc_midnight(after), utc_midnight(before))
    }
    DateRangeInput::WeekYear { year, week } => {
      validate_year(*year)?;
      let (after, before) = week_bounds(*year, *week)?;
      DateRange::new(utc_midnight(after), utc_midnight(before))
    }
  }
}

/// Quarter edges, each widened by one day: Q1 2020 is 2019-12-31 .. 2020-04-01.
pub fn quarter_bounds(year: i32, quarter: u32) -> Result<(NaiveDate, NaiveDate)> {
  let (after, before) = match quarter {
    1 => ((year - 1, 12, 31), (year, 4, 1)),
    2 => ((year, 3, 31), (year, 7, 1)),
    3 => ((year, 6, 30), (year, 10, 1)),
    4 => ((year, 9, 30), (year + 1, 1, 1)),
    _ => return Err(ReportError::invalid_range("quarter must be 1, 2, 3, or 4")),
  };
  Ok((ymd(after)?, ymd(before)?))
}

/// Monday of ISO week `week` through the Monday of the following ISO week.
pub fn week_bounds(year: i32, week: u32) -> Result<(NaiveDate, NaiveDate)> {
  validate_week(week)?;
  let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
    .ok_or_else(|| ReportError::invalid_range(format!("{} has no ISO week {}", year, week)))?;
  Ok((monday, monday + chrono::Duration::days(7)))
}

fn ymd((y, m, d): (i32, u32, u32)) -> Result<NaiveDate> {
  NaiveDate::from_ymd_opt(y, m, d)
    .ok_or_else(|| ReportError::invalid_range(format!("{:04}-{:02}-{:02} is not a valid date", y, m, d)))
}

fn utc_midnight(date: NaiveDate) -> i64 {
  Utc.from_utc_datetime(&date.and_time(NaiveTime::default())).timestamp()
}

fn parse_year(raw: Option<&str>) -> Result<i32> {
  let raw = raw
    .map(str::trim)
    .ok_or_else(|| ReportError::invalid_range("year is required with week or quarter"))?;

  if !RE_YEAR.is_match(raw) {
    return Err(ReportError::invalid_range("year must be a four digit integer"));
  }
  raw
    .parse::<i32>()
    .map_err(|_| ReportError::invalid_range("year must be a four digit integer"))
}

fn parse_number(raw: &str, what: &str) -> Result<u32> {
  raw
    .trim()
    .parse::<u32>()
    .map_err(|_| ReportError::invalid_range(format!("{} must be a whole number, got {:?}", what, raw)))
}

fn validate_year(year: i32) -> Result<()> {
  if (1000..=9999).contains(&year) {
    Ok(())
  } else {
    Err(ReportError::invalid_range("year must be a four digit integer"))
  }
}

fn validate_week(week: u32) -> Result<()> {
  if (1..=53).contains(&week) {
    Ok(())
  } else {
    Err(ReportError::invalid_range("week must be a number between 1 and 53"))
  }
}

fn validate_quarter(quarter: u32) -> Result<()> {
  if (1..=4).contains(&quarter) {
    Ok(())
  } else {
    Err(ReportError::invalid_range("quarter must be 1, 2, 3, or 4"))
  }
}

/// Accepts `YYYY-MM-DD` (UTC midnight) or an RFC 3339 instant.
fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
  let raw = raw.trim();

  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::default())));
  }

  DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|_| ReportError::invalid_range(format!("cannot parse date {:?}; expected YYYY-MM-DD", raw)))
}
