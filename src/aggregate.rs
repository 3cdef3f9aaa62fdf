// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Drive the report pipeline: window -> log -> issue ids -> fetch -> attribute -> classify -> totals
// role: orchestration/aggregation
// inputs: Committers, DateRangeInput, LogSource, IssueTracker
// outputs: Report (issue rows in first-seen order, credit rows, summary, request count)
// invariants:
// - Issues are fetched one at a time in extraction order; the first fetch error aborts the run
// - Every extracted id yields exactly one ReportIssue
// - report() before a successful gather() is EmptyReport
// - With the committer check on, every configured name is looked up before any git work
// errors: InvalidDateRange, UnknownContributors, UserLookup, NoIssuesFound (unless allow_empty), IssueFetch, Git
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use tracing::{debug, info};

use crate::classify::classify;
use crate::credits::Attribution;
use crate::error::{ReportError, Result};
use crate::gitio::LogSource;
use crate::issues::{extract_issue_ids, find_commit_line};
use crate::model::{Category, IssueId, Report, ReportIssue, Summary};
use crate::tracker::IssueTracker;
use crate::util::dedup_preserving_order;
use crate::window::{resolve, DateRange, DateRangeInput};

struct Gathered {
  range: DateRange,
  issues: Vec<ReportIssue>,
  attribution: Attribution,
  points: HashMap<IssueId, u32>,
  api_requests: usize,
}

pub struct Aggregator {
  committers: Vec<String>,
  date_input: DateRangeInput,
  allow_empty: bool,
  check_committers: bool,
  gathered: Option<Gathered>,
}

impl Aggregator {
  pub fn new(committers: Vec<String>, date_input: DateRangeInput, allow_empty: bool) -> Self {
    Self {
      committers,
      date_input,
      allow_empty,
      check_committers: false,
      gathered: None,
    }
  }

  /// Look every committer up on Drupal.org before reading logs.
  pub fn with_committer_check(mut self, on: bool) -> Self {
    self.check_committers = on;
    self
  }

  fn verify_committers(&self, tracker: &dyn IssueTracker) -> Result<()> {
    let names = dedup_preserving_order(self.committers.iter().filter(|c| !c.is_empty()).cloned());
    let mut unknown = Vec::new();

    for name in &names {
      if !tracker.user_exists(name)? {
        unknown.push(name.clone());
      }
    }

    if !unknown.is_empty() {
      return Err(ReportError::UnknownContributors(unknown));
    }
    info!(count = names.len(), "committers verified");
    Ok(())
  }

  pub fn gather(&mut self, logs: &dyn LogSource, tracker: &dyn IssueTracker) -> Result<()> {
    let range = resolve(&self.date_input)?;
    info!(
      window = %self.date_input.label(),
      after = %range.git_after(),
      before = %range.git_before(),
      days = range.days(),
      "resolved date range"
    );

    if self.check_committers {
      self.verify_committers(tracker)?;
    }

    let log = logs.commit_log(&range, &self.committers)?;

    let ids = match extract_issue_ids(&log) {
      Ok(ids) => ids,
      Err(ReportError::NoIssuesFound) if self.allow_empty => {
        info!("no issue numbers in commit log; continuing with an empty report");
        Vec::new()
      }
      Err(e) => return Err(e),
    };
    info!(count = ids.len(), "found issues");

    let mut attribution = Attribution::new();
    let mut issues = Vec::with_capacity(ids.len());
    let mut points = HashMap::new();

    for id in &ids {
      let record = tracker.fetch_issue(id)?;
      let line = find_commit_line(&log, id);
      attribution.attribute(id, line, &self.committers);

      let row = classify(&record, &attribution.credited(id));
      debug!(issue = %id, category = %row.category, size = row.size.points(), "classified");

      points.insert(id.clone(), row.size.points());
      issues.push(row);
    }

    self.gathered = Some(Gathered {
      range,
      issues,
      attribution,
      points,
      api_requests: tracker.requests_made(),
    });
    Ok(())
  }

  pub fn report(&self) -> Result<Report> {
    let g = self.gathered.as_ref().ok_or(ReportError::EmptyReport)?;

    Ok(Report {
      range: g.range,
      label: self.date_input.label(),
      issues: g.issues.clone(),
      credits: g.attribution.credit_rows(&self.committers, &g.points),
      summary: summarize(&g.issues),
      api_requests: g.api_requests,
    })
  }
}

pub fn summarize(issues: &[ReportIssue]) -> Summary {
  issues.iter().fold(Summary::default(), |mut s, issue| {
    s.issue_count += 1;
    let pts = issue.size.points();
    match issue.category {
      Category::Feature => s.feature_points += pts,
      Category::Maintenance => s.maintenance_points += pts,
      Category::Other => s.other_points += pts,
    }
    s
  })
}
