// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fetch Drupal.org issue nodes and user lookups over HTTP with bounded retry, or from env fixtures in tests
// role: enrichment/issue tracker client
// inputs: Issue id or username; base URL and retry policy from config; DOSTATS_TEST_ISSUES_JSON / DOSTATS_TEST_USERS_JSON for fixtures
// outputs: IssueRecord parsed leniently from node JSON; username existence; count of successful API responses
// side_effects: Network calls to <base_url>node/<id>.json and <base_url>user.json?name=<name>; sleeps between retries
// invariants:
// - At most max_attempts requests per lookup; 5xx and transport failures retry, 4xx fails at once
// - requests_made counts successful responses only; failed attempts and retries are not counted
// - A username exists only when the first listed account has exactly that name
// errors: IssueFetch / UserLookup carry the subject, last HTTP status (if any), and a short reason
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::cell::Cell;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::error::{ReportError, Result};
use crate::ext::serde_json::JsonFetch;
use crate::model::IssueRecord;

pub const FIXTURE_ENV: &str = "DOSTATS_TEST_ISSUES_JSON";
pub const USERS_FIXTURE_ENV: &str = "DOSTATS_TEST_USERS_JSON";

const USER_AGENT: &str = "do-stats";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// --- Trait seam for the issue tracker ---
pub trait IssueTracker {
  fn fetch_issue(&self, id: &str) -> Result<IssueRecord>;

  /// Whether Drupal.org has an account named exactly `name`.
  fn user_exists(&self, name: &str) -> Result<bool>;

  /// Number of successful API responses so far.
  fn requests_made(&self) -> usize;
}

/// Build an `IssueRecord` from a Drupal.org node document.
///
/// Missing fields fall back to empty or `None`; numbers may be strings.
pub fn parse_issue_record(requested_id: &str, node: &Value) -> IssueRecord {
  IssueRecord {
    id: node
      .fetch("nid")
      .to_text()
      .unwrap_or_else(|| requested_id.to_string()),
    title: node.fetch("title").to_or_default::<String>(),
    category_id: node.fetch("field_issue_category").to_int(),
    comment_count: node.fetch("comments").array_len(),
    last_status_change: node.fetch("field_issue_last_status_change").to_int(),
    project: node.fetch("field_project.machine_name").to_text(),
    entity_type: node.fetch("type").to_or_default::<String>(),
  }
}

/// True when the first account in a `user.json` listing is named `name`.
pub fn listing_names_user(listing: &Value, name: &str) -> bool {
  listing
    .fetch("list")
    .to::<Vec<Value>>()
    .and_then(|users| users.into_iter().next())
    .and_then(|user| user.fetch("name").to_text())
    .map_or(false, |found| found == name)
}

pub struct DrupalOrgTracker {
  agent: ureq::Agent,
  base_url: String,
  max_attempts: u32,
  retry_delay: Duration,
  requests: Cell<usize>,
}

struct Failure {
  status: Option<u16>,
  message: String,
}

enum Attempt {
  Done(Value),
  Retry(Failure),
  Fail(Failure),
}

impl DrupalOrgTracker {
  pub fn new(cfg: &TrackerConfig) -> Self {
    let agent = ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build();
    let mut base_url = cfg.base_url.clone();

    if !base_url.ends_with('/') {
      base_url.push('/');
    }

    Self {
      agent,
      base_url,
      max_attempts: cfg.max_attempts.max(1),
      retry_delay: Duration::from_millis(cfg.retry_delay_ms),
      requests: Cell::new(0),
    }
  }

  pub fn node_url(&self, id: &str) -> String {
    format!("{}node/{}.json", self.base_url, id)
  }

  pub fn user_url(&self) -> String {
    format!("{}user.json", self.base_url)
  }

  fn attempt(&self, url: &str, query: &[(&str, &str)]) -> Attempt {
    let mut req = self.agent.get(url).set("User-Agent", USER_AGENT);
    for (key, value) in query {
      req = req.query(key, value);
    }

    match req.call() {
      Ok(resp) => {
        let status = resp.status();
        match resp.into_json::<Value>() {
          Ok(v) => {
            self.requests.set(self.requests.get() + 1);
            Attempt::Done(v)
          }
          Err(e) => Attempt::Fail(Failure {
            status: Some(status),
            message: format!("invalid JSON body: {}", e),
          }),
        }
      }
      Err(ureq::Error::Status(code, _)) if code >= 500 => Attempt::Retry(Failure {
        status: Some(code),
        message: format!("server error {}", code),
      }),
      Err(ureq::Error::Status(code, _)) => Attempt::Fail(Failure {
        status: Some(code),
        message: format!("request rejected with status {}", code),
      }),
      Err(ureq::Error::Transport(t)) => Attempt::Retry(Failure {
        status: None,
        message: t.to_string(),
      }),
    }
  }

  /// GET `url` with bounded retry; `subject` only labels log lines.
  fn get_json(&self, url: &str, query: &[(&str, &str)], subject: &str) -> std::result::Result<Value, Failure> {
    let mut last = Failure {
      status: None,
      message: String::from("no attempt made"),
    };

    for n in 1..=self.max_attempts {
      debug!(subject, attempt = n, url = %url, "requesting");

      match self.attempt(url, query) {
        Attempt::Done(v) => return Ok(v),
        Attempt::Fail(f) => return Err(f),
        Attempt::Retry(f) => {
          warn!(subject, attempt = n, max = self.max_attempts, "{}", f.message);
          last = f;
          if n < self.max_attempts && !self.retry_delay.is_zero() {
            thread::sleep(self.retry_delay);
          }
        }
      }
    }

    Err(Failure {
      status: last.status,
      message: format!("{} after {} attempts", last.message, self.max_attempts),
    })
  }
}

impl IssueTracker for DrupalOrgTracker {
  fn fetch_issue(&self, id: &str) -> Result<IssueRecord> {
    self
      .get_json(&self.node_url(id), &[], id)
      .map(|node| parse_issue_record(id, &node))
      .map_err(|f| ReportError::fetch(id, f.status, f.message))
  }

  fn user_exists(&self, name: &str) -> Result<bool> {
    self
      .get_json(&self.user_url(), &[("name", name)], name)
      .map(|listing| listing_names_user(&listing, name))
      .map_err(|f| ReportError::UserLookup {
        name: name.to_string(),
        status: f.status,
        message: f.message,
      })
  }

  fn requests_made(&self) -> usize {
    self.requests.get()
  }
}

/// Serves issues from a JSON object (id -> node document) held in `DOSTATS_TEST_ISSUES_JSON`.
///
/// Known usernames come from a JSON array in `DOSTATS_TEST_USERS_JSON`; without it every name exists.
pub struct EnvFixtureTracker {
  nodes: Value,
  users: Option<Vec<String>>,
  requests: Cell<usize>,
}

impl EnvFixtureTracker {
  pub fn from_env() -> Result<Self> {
    let raw = std::env::var(FIXTURE_ENV).unwrap_or_else(|_| "{}".to_string());
    let tracker = Self::from_json(&raw)?;
    match std::env::var(USERS_FIXTURE_ENV) {
      Ok(users) => Ok(tracker.with_users(serde_json::from_str(&users)?)),
      Err(_) => Ok(tracker),
    }
  }

  pub fn from_json(raw: &str) -> Result<Self> {
    let nodes: Value = serde_json::from_str(raw)?;
    Ok(Self {
      nodes,
      users: None,
      requests: Cell::new(0),
    })
  }

  pub fn with_users(mut self, users: Vec<String>) -> Self {
    self.users = Some(users);
    self
  }
}

impl IssueTracker for EnvFixtureTracker {
  fn fetch_issue(&self, id: &str) -> Result<IssueRecord> {
    match self.nodes.get(id) {
      Some(node) => {
        self.requests.set(self.requests.get() + 1);
        Ok(parse_issue_record(id, node))
      }
      None => Err(ReportError::fetch(id, Some(404), "no fixture for issue")),
    }
  }

  fn user_exists(&self, name: &str) -> Result<bool> {
    self.requests.set(self.requests.get() + 1);
    Ok(self.users.as_ref().map_or(true, |users| users.iter().any(|u| u == name)))
  }

  fn requests_made(&self) -> usize {
    self.requests.get()
  }
}

fn env_wants_mock() -> bool {
  std::env::var(FIXTURE_ENV).is_ok()
}

pub fn make_default_tracker(cfg: &TrackerConfig) -> Result<Box<dyn IssueTracker>> {
  if env_wants_mock() {
    debug!("serving issues from {}", FIXTURE_ENV);
    return Ok(Box::new(EnvFixtureTracker::from_env()?));
  }
  Ok(Box::new(DrupalOrgTracker::new(cfg)))
}
