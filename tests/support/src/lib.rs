//! test-support: helpers for robust, nextest-friendly tests.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support", features = ["serde"] }
//! ```
//!
//! Then in tests:
//! ```rust,ignore
//! use test_support::{init_tracing, init_drupal_fixture_repo, write_config};
//!
//! #[test]
//! fn example() {
//!     init_tracing();
//!     let repo = init_drupal_fixture_repo();
//!     let cfg = write_config(repo.path(), &["balsama"], repo.path());
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::process::Command;
use std::{
    env,
    path::{Path, PathBuf},
};

/// Committers configured by `write_config` in most tests.
pub const COMMITTERS: [&str; 2] = ["balsama", "phenaproxima"];

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn,test=info"))
            .unwrap();
        // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Return the path to the repository's `tests/fixtures` directory.
///
/// Resolved from the workspace root (the parent of `tests/support`), so it's stable
/// regardless of the runner's working directory (cargo vs nextest).
pub fn fixtures_dir() -> PathBuf {
    let support_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    support_dir
        .parent()
        .map(|tests| tests.join("fixtures"))
        .unwrap_or_else(|| support_dir.join("fixtures"))
}

/// Read a UTF-8 text fixture into a string.
pub fn read_fixture_text<P: AsRef<Path>>(rel_path: P) -> String {
    let path = fixtures_dir().join(rel_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

/// Deserialize a JSON fixture into `T` (enable `serde` feature).
#[cfg(feature = "serde")]
pub fn read_fixture_json<T, P>(rel_path: P) -> T
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = fixtures_dir().join(rel_path);
    let file = std::fs::File::open(&path)
        .unwrap_or_else(|e| panic!("failed to open fixture {}: {e}", path.display()));
    serde_json::from_reader::<_, T>(file)
        .unwrap_or_else(|e| panic!("failed to parse JSON fixture {}: {e}", path.display()))
}

/// Drupal.org node documents keyed by issue id, in the shape the binary reads
/// from `DOSTATS_TEST_ISSUES_JSON`.
pub fn issue_fixtures_json() -> String {
    read_fixture_text("issues.json")
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Set multiple environment variables for the duration of the returned guard.
pub fn with_env(vars: &[(&str, &str)]) -> EnvGuard {
    EnvGuard::set_many(vars)
}

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
///
/// Example:
/// ```ignore
/// use test_support::cmd_bin;
///
/// let mut cmd = cmd_bin("do-stats");
/// cmd.arg("--help").assert().success();
/// ```
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
    init_tracing();
    assert_cmd::Command::cargo_bin(bin).expect("binary target not found")
}

/// Guard for temporarily setting environment variables.
pub struct EnvGuard {
    prev: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn set_many(kv: &[(&str, &str)]) -> Self {
        let mut prev = Vec::with_capacity(kv.len());
        for (k, v) in kv {
            let k_owned = k.to_string();
            prev.push((k_owned.clone(), env::var(k).ok()));
            env::set_var(k, v);
        }
        Self { prev }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (k, old) in self.prev.drain(..) {
            match old {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
    }
}

pub fn run(repo: &Path, args: &[&str]) {
    let status = Command::new("git").args(args).current_dir(repo).status().unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

/// Commit `message` into `file` with author and committer dates pinned to `date`.
pub fn commit_at(repo: &Path, file: &str, message: &str, date: &str) {
    std::fs::write(repo.join(file), format!("{}\n", message)).unwrap();
    run(repo, &["add", "."]);

    let status = Command::new("git")
        .args(["commit", "-q", "-m", message])
        .current_dir(repo)
        .env("GIT_AUTHOR_DATE", date)
        .env("GIT_COMMITTER_DATE", date)
        .status()
        .unwrap();

    assert!(status.success(), "commit {:?} failed", message);
}

/// Build a small upstream repo on branch `main` with Drupal-style commit messages.
///
/// Q1 2020 holds issues 3012345 (twice) and 3023456; Q2 2020 holds 3034567;
/// Q3 2021 holds only a commit with no issue reference.
pub fn init_drupal_fixture_repo() -> tempfile::TempDir {
    let dir = tempdir();
    let repo = dir.path();

    run(repo, &["init", "-q", "-b", "main"]);
    run(repo, &["config", "user.name", "Fixture Bot"]);
    run(repo, &["config", "user.email", "fixture@example.com"]);
    run(repo, &["config", "commit.gpgsign", "false"]);

    commit_at(
        repo,
        "media.txt",
        "Issue #3012345 by balsama, gabesullice: Add a media library widget",
        "2020-01-15 10:00:00 +0000",
    );
    commit_at(
        repo,
        "config.txt",
        "Issue #3023456 by phenaproxima: Fix broken config import",
        "2020-02-20 10:00:00 +0000",
    );
    commit_at(
        repo,
        "media.txt",
        "Issue #3012345 by balsama: Follow-up for media library widget",
        "2020-03-05 10:00:00 +0000",
    );
    commit_at(
        repo,
        "layout.txt",
        "Issue #3034567 by balsama: Improve layout builder UX",
        "2020-05-10 10:00:00 +0000",
    );
    commit_at(
        repo,
        "README.txt",
        "Update README for phenaproxima",
        "2021-08-02 10:00:00 +0000",
    );

    dir
}

/// Write a do-stats JSON config pointing the `drupal` repo at `upstream`.
pub fn write_config(dir: &Path, committers: &[&str], upstream: &Path) -> PathBuf {
    let mut doc = String::from("{\n  \"committers\": [");
    let names: Vec<String> = committers.iter().map(|c| format!("\"{}\"", c)).collect();
    doc.push_str(&names.join(", "));
    doc.push_str("],\n  \"repos\": {\n    \"drupal\": { \"url\": \"");
    doc.push_str(&upstream.to_string_lossy().replace('\\', "\\\\"));
    doc.push_str("\", \"branch\": \"main\" }\n  },\n");
    doc.push_str("  \"issue_tracker\": { \"base_url\": \"http://127.0.0.1:9/\", \"max_attempts\": 1, \"retry_delay_ms\": 0 }\n}\n");

    let path = dir.join("do-stats.json");
    std::fs::write(&path, doc).unwrap();
    path
}

/// Upstream fixture repo, a scratch dir for clones, and a config wired to both.
pub struct DrupalFixture {
    pub upstream: tempfile::TempDir,
    pub work: tempfile::TempDir,
    pub config: PathBuf,
}

impl DrupalFixture {
    pub fn new() -> Self {
        Self::with_committers(&COMMITTERS)
    }

    pub fn with_committers(committers: &[&str]) -> Self {
        let upstream = init_drupal_fixture_repo();
        let work = tempdir();
        let config = write_config(work.path(), committers, upstream.path());
        Self {
            upstream,
            work,
            config,
        }
    }

    /// Add a commit to the upstream repo; the next run pulls it in.
    pub fn commit(&self, file: &str, message: &str, date: &str) {
        commit_at(self.upstream.path(), file, message, date);
    }

    pub fn repos_dir(&self) -> PathBuf {
        self.work.path().join("repos")
    }

    /// `do-stats` preconfigured with this fixture's config, repos dir, and issue fixtures.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = cmd_bin("do-stats");
        cmd.arg("--config")
            .arg(&self.config)
            .arg("--repos-dir")
            .arg(self.repos_dir())
            .env("DOSTATS_TEST_ISSUES_JSON", issue_fixtures_json())
            .env("RUST_LOG", "warn");
        cmd
    }
}

impl Default for DrupalFixture {
    fn default() -> Self {
        Self::new()
    }
}
