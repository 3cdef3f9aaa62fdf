// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Load and validate the JSON run configuration (committers, repos, default date range, tracker policy)
// role: config/loading
// inputs: Path to a JSON config file, or its text
// outputs: ReportConfig with tracker defaults filled in
// invariants:
// - Documents are checked against CONFIG_SCHEMA before deserialization
// - All schema violations are reported together, not just the first
// errors: ReportError::Config for unreadable files, invalid JSON, or schema violations
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReportError, Result};
use crate::window::DateRangeArgs;

pub const DEFAULT_BASE_URL: &str = "https://www.drupal.org/api-d7/";

pub const CONFIG_SCHEMA: &str = r#"{
  "title": "do-stats configuration",
  "type": "object",
  "required": ["committers", "repos"],
  "additionalProperties": false,
  "properties": {
    "committers": {
      "type": "array",
      "items": { "type": "string", "minLength": 1 }
    },
    "repos": {
      "type": "object",
      "additionalProperties": {
        "type": "object",
        "required": ["url", "branch"],
        "additionalProperties": false,
        "properties": {
          "url": { "type": "string", "minLength": 1 },
          "branch": { "type": "string", "minLength": 1 }
        }
      }
    },
    "date_range": {
      "type": "object",
      "additionalProperties": false,
      "properties": {
        "after": { "type": "string" },
        "before": { "type": "string" },
        "year": { "type": ["integer", "string"] },
        "week": { "type": ["integer", "string"] },
        "quarter": { "type": ["integer", "string"] }
      }
    },
    "issue_tracker": {
      "type": "object",
      "additionalProperties": false,
      "properties": {
        "base_url": { "type": "string", "minLength": 1 },
        "max_attempts": { "type": "integer", "minimum": 1 },
        "retry_delay_ms": { "type": "integer", "minimum": 0 }
      }
    }
  }
}"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSpec {
  pub url: String,
  pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
  pub base_url: String,
  pub max_attempts: u32,
  pub retry_delay_ms: u64,
}

impl Default for TrackerConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      max_attempts: 5,
      retry_delay_ms: 250,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
  pub committers: Vec<String>,
  pub repos: BTreeMap<String, RepoSpec>,
  #[serde(default)]
  pub date_range: Option<DateRangeArgs>,
  #[serde(default)]
  pub issue_tracker: TrackerConfig,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ReportConfig> {
  let path = path.as_ref();
  let text = std::fs::read_to_string(path)
    .map_err(|e| ReportError::Config(format!("reading {}: {}", path.display(), e)))?;
  parse_config(&text).map_err(|e| match e {
    ReportError::Config(msg) => ReportError::Config(format!("{}: {}", path.display(), msg)),
    other => other,
  })
}

pub fn parse_config(text: &str) -> Result<ReportConfig> {
  let doc: Value = serde_json::from_str(text).map_err(|e| ReportError::Config(format!("invalid JSON: {}", e)))?;

  validate(&doc)?;

  serde_json::from_value(doc).map_err(|e| ReportError::Config(e.to_string()))
}

fn validate(doc: &Value) -> Result<()> {
  let schema: Value =
    serde_json::from_str(CONFIG_SCHEMA).map_err(|e| ReportError::Config(format!("embedded schema: {}", e)))?;
  let validator =
    jsonschema::validator_for(&schema).map_err(|e| ReportError::Config(format!("embedded schema: {}", e)))?;

  let errors: Vec<String> = validator
    .iter_errors(doc)
    .map(|e| e.to_string())
    .collect();

  if errors.is_empty() {
    Ok(())
  } else {
    Err(ReportError::Config(format!("schema violations: {}", errors.join("; "))))
  }
}
