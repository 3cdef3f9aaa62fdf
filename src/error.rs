// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed failures of the report pipeline (dates, extraction, fetch, rendering, config, git)
// role: errors/taxonomy
// outputs: ReportError enum and crate-wide Result alias
// invariants:
// - Fatal pipeline errors bubble unmodified to main; no local recovery in core modules
// - IssueFetch always carries the failing issue id and the last HTTP status (when one was received)
// - UnknownContributors lists every configured name Drupal.org does not know, not just the first
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
  #[error("Invalid date range: {0}")]
  InvalidDateRange(String),
  #[error("Cannot find any issue numbers in commit log")]
  NoIssuesFound,
  #[error("Fetching issue #{id} failed{}: {message}", status_suffix(.status))]
  IssueFetch {
    id: String,
    status: Option<u16>,
    message: String,
  },
  #[error("Looking up Drupal.org user {name:?} failed{}: {message}", status_suffix(.status))]
  UserLookup {
    name: String,
    status: Option<u16>,
    message: String,
  },
  #[error("Unknown Drupal.org usernames in committers: {}", .0.join(", "))]
  UnknownContributors(Vec<String>),
  #[error("No issue data collected yet; gather issues before rendering")]
  EmptyReport,
  #[error("Config error: {0}")]
  Config(String),
  #[error("Git error: {0}")]
  Git(String),
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
  #[error("Serialization error: {0}")]
  Json(#[from] serde_json::Error),
}

impl ReportError {
  pub fn invalid_range(msg: impl Into<String>) -> Self {
    ReportError::InvalidDateRange(msg.into())
  }

  pub fn fetch(id: &str, status: Option<u16>, message: impl Into<String>) -> Self {
    ReportError::IssueFetch {
      id: id.to_string(),
      status,
      message: message.into(),
    }
  }
}

fn status_suffix(status: &Option<u16>) -> String {
  match status {
    Some(code) => format!(" (HTTP {})", code),
    None => String::new(),
  }
}
