// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Render a Report as a console table, CSV, or JSON
// role: rendering/output
// inputs: Report, output Format
// outputs: UTF-8 text ready for stdout or a file
// invariants:
// - Table and CSV columns follow a fixed order: Closed, Title, ID, Category, Size, Project, Contributors
// - CSV quoting follows RFC 4180 (quote on comma, quote, CR or LF; double inner quotes)
// - Table widths are measured in characters, not bytes
// errors: EmptyReport when an issue table is requested with no rows
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::model::{CreditRow, Report, ReportIssue, Summary};
use crate::window::git_date;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum Format {
  Table,
  Csv,
  Json,
}

const ISSUE_HEADERS: [&str; 7] = ["Closed", "Title", "ID", "Category", "Size", "Project", "Contributors"];
const CREDIT_HEADERS: [&str; 3] = ["Contributor", "Issues", "Points"];

pub fn render(report: &Report, format: Format) -> Result<String> {
  match format {
    Format::Table => Ok(render_table_report(report)),
    Format::Csv => Ok(render_csv(&report.issues)),
    Format::Json => Ok(serde_json::to_string_pretty(report)? + "\n"),
  }
}

fn issue_cells(issue: &ReportIssue) -> Vec<String> {
  vec![
    issue.closed.clone(),
    issue.title.clone(),
    issue.id.clone(),
    issue.category.to_string(),
    issue.size.to_string(),
    issue.project.clone(),
    issue.contributors.join(", "),
  ]
}

/// Asterisk-framed banner naming the window and its bounds.
pub fn date_banner(report: &Report) -> String {
  let line = format!(
    "Window: {} ({} to {})",
    report.label,
    git_date(report.range.after),
    git_date(report.range.before)
  );
  let rule = "*".repeat(line.chars().count() + 4);
  format!("{}\n* {} *\n{}\n", rule, line, rule)
}

pub fn format_issue_table(issues: &[ReportIssue]) -> Result<String> {
  if issues.is_empty() {
    return Err(ReportError::EmptyReport);
  }
  let rows: Vec<Vec<String>> = issues.iter().map(issue_cells).collect();
  Ok(ascii_table(&ISSUE_HEADERS, &rows))
}

pub fn format_credit_table(credits: &[CreditRow]) -> String {
  let rows: Vec<Vec<String>> = credits
    .iter()
    .map(|c| vec![c.contributor.clone(), c.issues.to_string(), c.points.to_string()])
    .collect();
  ascii_table(&CREDIT_HEADERS, &rows)
}

pub fn format_summary(summary: &Summary) -> String {
  format!(
    "Issues: {}\nFeature points: {}\nMaintenance points: {}\nOther points: {}\n",
    summary.issue_count, summary.feature_points, summary.maintenance_points, summary.other_points
  )
}

fn render_table_report(report: &Report) -> String {
  let mut out = date_banner(report);

  match format_issue_table(&report.issues) {
    Ok(table) => out.push_str(&table),
    Err(_) => out.push_str("No issues found in range.\n"),
  }

  out.push('\n');
  out.push_str(&format_summary(&report.summary));
  out.push('\n');
  out.push_str(&format_credit_table(&report.credits));
  out.push_str(&format!("\nTotal API Requests: {}\n", report.api_requests));
  out
}

fn ascii_table(headers: &[&str], rows: &[Vec<String>]) -> String {
  let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
  for row in rows {
    for (i, cell) in row.iter().enumerate() {
      widths[i] = widths[i].max(cell.chars().count());
    }
  }

  let rule = {
    let mut s = String::from("+");
    for w in &widths {
      s.push_str(&"-".repeat(w + 2));
      s.push('+');
    }
    s.push('\n');
    s
  };

  let line = |cells: &[String]| {
    let mut s = String::from("|");
    for (cell, w) in cells.iter().zip(&widths) {
      let pad = w - cell.chars().count();
      s.push(' ');
      s.push_str(cell);
      s.push_str(&" ".repeat(pad + 1));
      s.push('|');
    }
    s.push('\n');
    s
  };

  let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
  let mut out = String::new();
  out.push_str(&rule);
  out.push_str(&line(&header_cells));
  out.push_str(&rule);
  for row in rows {
    out.push_str(&line(row));
  }
  out.push_str(&rule);
  out
}

fn csv_field(value: &str) -> String {
  if value.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}

pub fn render_csv(issues: &[ReportIssue]) -> String {
  let mut out = ISSUE_HEADERS.join(",");
  out.push('\n');
  for issue in issues {
    let cells: Vec<String> = issue_cells(issue).iter().map(|c| csv_field(c)).collect();
    out.push_str(&cells.join(","));
    out.push('\n');
  }
  out
}
