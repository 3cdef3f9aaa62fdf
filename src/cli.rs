use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::{load_config, ReportConfig};
use crate::render::Format;
use crate::window::{DateRangeArgs, DateRangeInput};

#[derive(Parser, Debug)]
#[command(
    name = "do-stats",
    version,
    about = "Report Drupal.org issue credit for configured contributors",
    long_about = None
)]
pub struct Cli {
  /// JSON config with committers, repos, and optional default date range
  #[arg(long, short = 'c', default_value = "config/do-stats.json")]
  pub config: PathBuf,

  /// Four digit year; pair with --week or --quarter
  #[arg(long, short = 'y')]
  pub year: Option<String>,

  /// ISO week number (1-53)
  #[arg(long, short = 'w')]
  pub week: Option<String>,

  /// Quarter (1-4)
  #[arg(long, short = 'Q')]
  pub quarter: Option<String>,

  /// Start date, YYYY-MM-DD; must be paired with --before
  #[arg(long)]
  pub after: Option<String>,

  /// End date (exclusive), YYYY-MM-DD; must be paired with --after
  #[arg(long)]
  pub before: Option<String>,

  /// Ignore date flags and use the config's date_range
  #[arg(long)]
  pub use_date_config: bool,

  /// Where local clones of the configured repos live
  #[arg(long, default_value = "repos")]
  pub repos_dir: PathBuf,

  /// Output format
  #[arg(long, value_enum, default_value_t = Format::Table)]
  pub format: Format,

  /// Output file path (default stdout "-")
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Render an empty report instead of failing when no issues are referenced
  #[arg(long)]
  pub allow_empty: bool,

  /// Check every committer is a Drupal.org username before reading logs
  #[arg(long)]
  pub validate_committers: bool,

  /// Override the issue tracker base URL from the config
  #[arg(long)]
  pub base_url: Option<String>,

  /// Increase log verbosity (-v debug, -vv trace); RUST_LOG wins when set
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Debug)]
pub struct EffectiveConfig {
  pub config: ReportConfig,
  pub date_input: DateRangeInput,
  pub repos_dir: PathBuf,
  pub format: Format,
  pub out: String,
  pub allow_empty: bool,
  pub validate_committers: bool,
}

impl Cli {
  fn date_args(&self) -> DateRangeArgs {
    DateRangeArgs {
      after: self.after.clone(),
      before: self.before.clone(),
      year: self.year.clone(),
      week: self.week.clone(),
      quarter: self.quarter.clone(),
    }
  }
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let config = load_config(&cli.config).with_context(|| format!("loading config {}", cli.config.display()))?;
  normalize_with(cli, config)
}

/// Merge CLI flags over a loaded config.
pub fn normalize_with(cli: Cli, mut config: ReportConfig) -> Result<EffectiveConfig> {
  let cli_dates = cli.date_args();

  // CLI dates win unless the caller asked for the config's range or gave none.
  let chosen = if cli.use_date_config || cli_dates.is_empty() {
    match config.date_range.clone() {
      Some(args) if !args.is_empty() => args,
      _ if cli.use_date_config => bail!("--use-date-config was given but the config has no date_range"),
      _ => bail!("Provide --year with --week or --quarter, or --after AND --before (or a date_range in the config)"),
    }
  } else {
    cli_dates
  };

  let date_input = DateRangeInput::from_args(&chosen)?;

  if let Some(url) = cli.base_url {
    config.issue_tracker.base_url = url;
  }

  Ok(EffectiveConfig {
    config,
    date_input,
    repos_dir: cli.repos_dir,
    format: cli.format,
    out: cli.out,
    allow_empty: cli.allow_empty,
    validate_committers: cli.validate_committers,
  })
}
