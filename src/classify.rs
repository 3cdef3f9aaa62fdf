// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn a raw tracker record plus its credited contributors into a report-ready row
// role: classification/mapping
// inputs: IssueRecord, credited contributor names
// outputs: ReportIssue (closed date, truncated title, category, size, project, contributor tokens)
// invariants:
// - credited must already be deduplicated by username; one 2-char token per credited contributor
// - Category: 1,4 -> Maintenance; 2,3,5 -> Feature; anything else -> Other
// - Size thresholds are strict and checked from the top: >100 21, >50 13, >25 8, >10 5, else 3
// - Non project_issue records degrade to closed/project "unknown" and category Other; never an error
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{TimeZone, Utc};

use crate::model::{Category, IssueRecord, ReportIssue, Size};

pub const TITLE_LIMIT: usize = 100;

const UNKNOWN: &str = "unknown";

pub fn map_category(category_id: Option<i64>) -> Category {
  match category_id {
    Some(1) | Some(4) => Category::Maintenance,
    Some(2) | Some(3) | Some(5) => Category::Feature,
    _ => Category::Other,
  }
}

pub fn map_size(comment_count: usize) -> Size {
  const THRESHOLDS: [(usize, Size); 4] = [
    (100, Size::TwentyOne),
    (50, Size::Thirteen),
    (25, Size::Eight),
    (10, Size::Five),
  ];

  THRESHOLDS
    .iter()
    .find(|(min, _)| comment_count > *min)
    .map(|(_, size)| *size)
    .unwrap_or(Size::Three)
}

/// Cut `s` to `limit` characters, appending "..." only when something was dropped.
pub fn truncate(s: &str, limit: usize) -> String {
  if s.chars().count() <= limit {
    return s.to_string();
  }
  let mut out: String = s.chars().take(limit).collect();
  out.push_str("...");
  out
}

fn closed_day(ts: Option<i64>) -> String {
  ts.and_then(|t| Utc.timestamp_opt(t, 0).single())
    .map(|dt| dt.format("%Y-%m-%d").to_string())
    .unwrap_or_else(|| UNKNOWN.to_string())
}

fn short_name(name: &str) -> String {
  name.chars().take(2).collect()
}

pub fn classify(record: &IssueRecord, credited: &[String]) -> ReportIssue {
  let (closed, project, category) = if record.is_project_issue() {
    (
      closed_day(record.last_status_change),
      record.project.clone().unwrap_or_else(|| UNKNOWN.to_string()),
      map_category(record.category_id),
    )
  } else {
    (UNKNOWN.to_string(), UNKNOWN.to_string(), Category::Other)
  };

  ReportIssue {
    closed,
    title: truncate(&record.title, TITLE_LIMIT),
    id: record.id.clone(),
    category,
    size: map_size(record.comment_count),
    project,
    contributors: credited.iter().map(|c| short_name(c)).collect(),
  }
}
