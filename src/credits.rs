// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Attribute configured contributors to issues by substring match on the commit line and roll up per-contributor credit
// role: attribution/indexes
// inputs: Issue id, optional commit line, configured contributor names, points per issue
// outputs: issue -> contributors and contributor -> issues indexes; CreditRow per contributor
// invariants:
// - Matching is case-sensitive substring containment with no word boundary
// - Indexes keep raw appends (duplicates from repeated config entries survive); credited() and credit rows dedupe
// - A missing commit line credits nobody and leaves indexes untouched
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashMap};

use crate::model::{CreditRow, IssueId};
use crate::util::dedup_preserving_order;

#[derive(Debug, Default, Clone)]
pub struct Attribution {
  pub issue_credits: BTreeMap<IssueId, Vec<String>>,
  pub contributor_issues: BTreeMap<String, Vec<IssueId>>,
}

impl Attribution {
  pub fn new() -> Self {
    Self::default()
  }

  /// Credit every contributor whose name appears in `commit_line`.
  ///
  /// Returns the matches in configuration order, duplicates included.
  pub fn attribute(&mut self, issue_id: &str, commit_line: Option<&str>, contributors: &[String]) -> Vec<String> {
    let Some(line) = commit_line else {
      return Vec::new();
    };

    let matched: Vec<String> = contributors
      .iter()
      .filter(|name| !name.is_empty() && line.contains(name.as_str()))
      .cloned()
      .collect();

    for name in &matched {
      self
        .issue_credits
        .entry(issue_id.to_string())
        .or_default()
        .push(name.clone());
      self
        .contributor_issues
        .entry(name.clone())
        .or_default()
        .push(issue_id.to_string());
    }

    matched
  }

  /// Distinct contributors credited on `issue_id`, first-seen order.
  pub fn credited(&self, issue_id: &str) -> Vec<String> {
    self
      .issue_credits
      .get(issue_id)
      .map(|names| dedup_preserving_order(names.iter().cloned()))
      .unwrap_or_default()
  }

  /// One row per distinct configured contributor, in configuration order.
  ///
  /// Issues are counted once each; points come from `points_by_issue`.
  pub fn credit_rows(&self, contributors: &[String], points_by_issue: &HashMap<IssueId, u32>) -> Vec<CreditRow> {
    dedup_preserving_order(contributors.iter().cloned())
      .into_iter()
      .map(|contributor| {
        let issues = self
          .contributor_issues
          .get(&contributor)
          .map(|ids| dedup_preserving_order(ids.iter().cloned()))
          .unwrap_or_default();
        let points: u32 = issues
          .iter()
          .map(|id| points_by_issue.get(id).copied().unwrap_or(0))
          .sum();
        CreditRow {
          contributor,
          issues: issues.len(),
          points,
        }
      })
      .collect()
  }
}
