// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Keep local clones of configured repos current and produce one-line commit logs for a date window
// role: git/log source
// inputs: repos dir, repo name -> {url, branch}, DateRange, committer names
// outputs: Concatenated `git log --oneline` text across repos (config order)
// side_effects: clone/fetch/checkout/pull under the repos dir
// invariants:
// - Bounds are passed to git as explicit UTC timestamps; the window is [after, before)
// - Committer names are matched as fixed strings, not regexes
// - One --grep per committer; git ORs them, so a commit naming any committer is listed
// errors: ReportError::Git with the failing command and stderr
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::RepoSpec;
use crate::error::{ReportError, Result};
use crate::util::{canonicalize_lossy, run_git};
use crate::window::DateRange;

pub trait LogSource {
  fn commit_log(&self, range: &DateRange, committers: &[String]) -> Result<String>;
}

/// Arguments for the per-repo log query.
pub fn log_args(range: &DateRange, committers: &[String]) -> Vec<String> {
  let mut args: Vec<String> = vec![
    "-c".into(),
    "log.showSignature=false".into(),
    "log".into(),
    "--oneline".into(),
    "--no-color".into(),
    "--fixed-strings".into(),
    format!("--after={}", range.git_after()),
    format!("--before={}", range.git_before()),
  ];
  args.extend(
    committers
      .iter()
      .filter(|c| !c.is_empty())
      .map(|c| format!("--grep={}", c)),
  );
  args
}

pub struct GitLogSource {
  repos_dir: PathBuf,
  repos: BTreeMap<String, RepoSpec>,
}

impl GitLogSource {
  pub fn new<P: AsRef<Path>>(repos_dir: P, repos: BTreeMap<String, RepoSpec>) -> Self {
    Self {
      repos_dir: repos_dir.as_ref().to_path_buf(),
      repos,
    }
  }

  /// Clone when missing, then fetch, check out the branch, and fast-forward it.
  pub fn sync_repo(&self, name: &str, spec: &RepoSpec) -> Result<PathBuf> {
    let dir = self.repos_dir.join(name);

    if !dir.join(".git").exists() {
      std::fs::create_dir_all(&self.repos_dir)?;
      info!(repo = name, url = %spec.url, "cloning");
      let target = canonicalize_lossy(&dir);
      run_git(&self.repos_dir, &["clone".into(), "-q".into(), spec.url.clone(), target])?;
    }

    info!(repo = name, branch = %spec.branch, "updating");
    run_git(&dir, &["fetch".into(), "-q".into(), "origin".into()])?;
    run_git(&dir, &["checkout".into(), "-q".into(), spec.branch.clone()])?;
    run_git(&dir, &["pull".into(), "-q".into(), "--ff-only".into()])?;

    Ok(dir)
  }
}

impl LogSource for GitLogSource {
  fn commit_log(&self, range: &DateRange, committers: &[String]) -> Result<String> {
    if committers.iter().all(|c| c.is_empty()) {
      return Err(ReportError::Config("no committers configured".into()));
    }

    let args = log_args(range, committers);
    let mut log = String::new();

    for (name, spec) in &self.repos {
      let dir = self.sync_repo(name, spec)?;
      let out = run_git(&dir, &args)?;
      info!(repo = %name, commits = out.lines().count(), "read commit log");
      log.push_str(&out);
      if !log.is_empty() && !log.ends_with('\n') {
        log.push('\n');
      }
    }

    Ok(log)
  }
}
