use anyhow::{Context, Result};
use clap::Parser;

mod aggregate;
mod classify;
mod cli;
mod config;
mod credits;
mod error;
mod ext;
mod gitio;
mod issues;
mod model;
mod render;
mod tracker;
mod util;
mod window;

use crate::aggregate::Aggregator;
use crate::cli::{normalize, Cli};
use crate::gitio::GitLogSource;

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  util::init_tracing(cli.verbose)?;

  // Phase 1: normalize CLI + config
  let cfg = normalize(cli)?;

  // Phase 2: wire collaborators
  let logs = GitLogSource::new(&cfg.repos_dir, cfg.config.repos.clone());
  let tracker = tracker::make_default_tracker(&cfg.config.issue_tracker)?;

  // Phase 3: gather, then render
  let mut aggregator = Aggregator::new(cfg.config.committers.clone(), cfg.date_input.clone(), cfg.allow_empty)
    .with_committer_check(cfg.validate_committers);
  aggregator.gather(&logs, tracker.as_ref())?;
  let report = aggregator.report()?;

  let text = render::render(&report, cfg.format)?;
  util::write_output(&cfg.out, &text).with_context(|| format!("writing {:?} output", cfg.format))
}
