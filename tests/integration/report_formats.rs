use test_support::DrupalFixture;

#[test]
fn json_report_carries_rows_credits_and_summary() {
  let fx = DrupalFixture::new();
  let out = fx
    .command()
    .args(["--year", "2020", "--quarter", "1", "--format", "json"])
    .output()
    .unwrap();

  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();

  assert_eq!(v["label"], "Q1 2020");
  assert_eq!(v["range"]["after"], 1_577_750_400);
  assert_eq!(v["range"]["before"], 1_585_699_200);
  assert_eq!(v["issues"].as_array().unwrap().len(), 2);
  assert_eq!(v["issues"][0]["id"], "3012345");
  assert_eq!(v["issues"][0]["size"], 5);
  assert_eq!(v["issues"][1]["category"], "Maintenance");
  assert_eq!(v["summary"]["issue_count"], 2);
  assert_eq!(v["credits"][1]["contributor"], "phenaproxima");
  assert_eq!(v["api_requests"], 2);
}

#[test]
fn out_flag_writes_file_instead_of_stdout() {
  let fx = DrupalFixture::new();
  let target = fx.work.path().join("reports").join("q1.csv");

  let out = fx
    .command()
    .args(["--year", "2020", "--quarter", "1", "--format", "csv", "--out"])
    .arg(&target)
    .output()
    .unwrap();

  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  assert!(out.stdout.is_empty());
  let written = std::fs::read_to_string(&target).unwrap();
  assert!(written.starts_with("Closed,Title,ID,Category,Size,Project,Contributors\n"));
  assert_eq!(written.lines().count(), 3);
}

#[test]
fn piped_logs_carry_no_colour_codes() {
  let fx = DrupalFixture::new();
  let out = fx
    .command()
    .env("RUST_LOG", "info")
    .args(["--year", "2020", "--quarter", "1", "--format", "csv"])
    .output()
    .unwrap();

  assert!(out.status.success());
  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(stderr.contains("resolved date range"), "{}", stderr);
  assert!(!stderr.contains('\u{1b}'), "{:?}", stderr);
}
