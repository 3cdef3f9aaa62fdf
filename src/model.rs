// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the report model (raw issue records, classified rows, credit rows, summary) shared by aggregation and rendering
// role: model/types
// outputs: Serializable structs with stable field names for JSON output
// invariants: Size points are one of 3/5/8/13/21; ReportIssue is immutable once built; Report JSON field names are stable
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::window::DateRange;

/// Drupal.org node id as it appears in commit messages, e.g. `"3012345"` or `"1234.56"`.
pub type IssueId = String;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Category {
  Feature,
  Maintenance,
  Other,
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Category::Feature => "Feature",
      Category::Maintenance => "Maintenance",
      Category::Other => "Other",
    };
    f.write_str(s)
  }
}

/// Effort estimate on a Fibonacci-like scale, derived from comment volume.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(into = "u32")]
pub enum Size {
  Three,
  Five,
  Eight,
  Thirteen,
  TwentyOne,
}

impl Size {
  pub fn points(self) -> u32 {
    match self {
      Size::Three => 3,
      Size::Five => 5,
      Size::Eight => 8,
      Size::Thirteen => 13,
      Size::TwentyOne => 21,
    }
  }
}

impl From<Size> for u32 {
  fn from(size: Size) -> u32 {
    size.points()
  }
}

impl fmt::Display for Size {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.points())
  }
}

/// Issue metadata as returned by the tracker, before classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueRecord {
  pub id: IssueId,
  pub title: String,
  pub category_id: Option<i64>,
  pub comment_count: usize,
  pub last_status_change: Option<i64>,
  pub project: Option<String>,
  pub entity_type: String,
}

impl IssueRecord {
  pub fn is_project_issue(&self) -> bool {
    self.entity_type == "project_issue"
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportIssue {
  pub closed: String,
  pub title: String,
  pub id: IssueId,
  pub category: Category,
  pub size: Size,
  pub project: String,
  pub contributors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditRow {
  pub contributor: String,
  pub issues: usize,
  pub points: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
  pub issue_count: usize,
  pub feature_points: u32,
  pub maintenance_points: u32,
  pub other_points: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
  pub range: DateRange,
  pub label: String,
  pub issues: Vec<ReportIssue>,
  pub credits: Vec<CreditRow>,
  pub summary: Summary,
  pub api_requests: usize,
}
