// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for paths, git subprocesses, ordered dedup, output writing, tracing setup, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; paths; clap CommandFactory
// outputs: Canonicalized paths, git stdout, deduplicated vectors, man page text
// side_effects: run_git invokes subprocesses; write_output writes files or stdout; init_tracing installs a global subscriber
// invariants:
// - dedup_preserving_order keeps the first occurrence of each item
// - write_output treats "-" as stdout
// errors: run_git surfaces command + stderr as ReportError::Git
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;
use std::hash::Hash;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use clap::CommandFactory;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ReportError, Result};

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

pub fn run_git<P: AsRef<Path>>(dir: P, args: &[String]) -> Result<String> {
  let out = Command::new("git")
    .args(args)
    .current_dir(dir.as_ref())
    .output()
    .map_err(|e| ReportError::Git(format!("spawning git {:?}: {}", args, e)))?;

  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    let stderr = String::from_utf8_lossy(&out.stderr);
    Err(ReportError::Git(format!("git {:?} failed: {}", args, stderr.trim())))
  }
}

/// Keep the first occurrence of each item, preserving input order.
pub fn dedup_preserving_order<T, I>(items: I) -> Vec<T>
where
  T: Eq + Hash + Clone,
  I: IntoIterator<Item = T>,
{
  let mut seen = HashSet::new();
  items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}

fn verbosity_level(verbose: u8) -> &'static str {
  match verbose {
    0 => "info",
    1 => "debug",
    _ => "trace",
  }
}

/// Install the fmt subscriber on stderr. `RUST_LOG` wins over the verbosity count.
///
/// Colour is only used when stderr is a terminal.
pub fn init_tracing(verbose: u8) -> anyhow::Result<()> {
  let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(verbosity_level(verbose)))?;
  let subscriber = fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_ansi(std::io::stderr().is_terminal())
    .with_writer(std::io::stderr)
    .compact();
  let _ = subscriber.try_init();
  Ok(())
}

/// Write `text` to `out`, where "-" means stdout.
pub fn write_output(out: &str, text: &str) -> anyhow::Result<()> {
  if out == "-" {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(text.as_bytes()).context("writing report to stdout")?;
    return Ok(());
  }

  if let Some(parent) = Path::new(out).parent() {
    if !parent.as_os_str().is_empty() {
      std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
  }
  std::fs::write(out, text).with_context(|| format!("writing report to {}", out))?;
  Ok(())
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
