// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Pull Drupal.org issue ids out of one-line commit logs and locate the commit line for an id
// role: parsing/extraction
// inputs: Concatenated `git log --oneline` text
// outputs: Ordered unique issue ids; first matching commit line per id
// invariants:
// - Ids are returned once each, in first-seen order
// - An id only matches a line when it was extracted from that line (1234 never matches #12345)
// errors: NoIssuesFound when the log mentions no issue at all
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ReportError, Result};
use crate::model::IssueId;
use crate::util::dedup_preserving_order;

static RE_ISSUE: Lazy<Regex> = Lazy::new(|| Regex::new(r" Issue #(\d+(?:\.\d+)?)").unwrap());

fn ids_in<'a>(text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
  RE_ISSUE
    .captures_iter(text)
    .filter_map(|c| c.get(1).map(|m| m.as_str()))
}

/// Every distinct issue id mentioned in `log`, in order of first appearance.
pub fn extract_issue_ids(log: &str) -> Result<Vec<IssueId>> {
  let ids = dedup_preserving_order(ids_in(log).map(str::to_string));

  if ids.is_empty() {
    return Err(ReportError::NoIssuesFound);
  }
  Ok(ids)
}

/// First log line that references `id`, if any.
pub fn find_commit_line<'a>(log: &'a str, id: &str) -> Option<&'a str> {
  log.lines().find(|line| ids_in(line).any(|found| found == id))
}
