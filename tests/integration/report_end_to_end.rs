use predicates::prelude::*;
use test_support::DrupalFixture;

#[test]
fn quarter_csv_lists_each_issue_once() {
  let fx = DrupalFixture::new();
  let out = fx
    .command()
    .args(["--year", "2020", "--quarter", "1", "--format", "csv"])
    .output()
    .unwrap();

  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let stdout = String::from_utf8_lossy(&out.stdout);
  // git log lists newest first, so the follow-up commit is the one matched for 3012345.
  insta::assert_snapshot!(stdout, @r"
  Closed,Title,ID,Category,Size,Project,Contributors
  2020-03-05,Add a media library widget,3012345,Feature,5,drupal,ba
  2020-02-20,Fix broken config import,3023456,Maintenance,3,drupal,ph
  ");
}

#[test]
fn quarter_table_has_summary_credits_and_request_count() {
  let fx = DrupalFixture::new();
  fx.command()
    .args(["-y", "2020", "-Q", "1"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Window: Q1 2020 (2019-12-31 00:00:00 +0000 to 2020-04-01 00:00:00 +0000)"))
    .stdout(predicate::str::contains("Issues: 2\nFeature points: 5\nMaintenance points: 3\nOther points: 0\n"))
    .stdout(predicate::str::contains("| balsama      | 1      | 5      |"))
    .stdout(predicate::str::contains("| phenaproxima | 1      | 3      |"))
    .stdout(predicate::str::contains("Total API Requests: 2"));
}

#[test]
fn non_issue_nodes_are_degraded_not_fatal() {
  let fx = DrupalFixture::new();
  let out = fx
    .command()
    .args(["--year", "2020", "--quarter", "2", "--format", "csv"])
    .output()
    .unwrap();

  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let stdout = String::from_utf8_lossy(&out.stdout);
  assert!(
    stdout.contains("unknown,Improve layout builder UX,3034567,Other,8,unknown,ba"),
    "{}",
    stdout
  );
}

#[test]
fn week_window_only_sees_that_week() {
  let fx = DrupalFixture::new();
  let out = fx
    .command()
    .args(["--year", "2020", "--week", "3", "--format", "csv"])
    .output()
    .unwrap();

  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let stdout = String::from_utf8_lossy(&out.stdout);
  let rows: Vec<&str> = stdout.lines().skip(1).collect();
  assert_eq!(rows, vec!["2020-03-05,Add a media library widget,3012345,Feature,5,drupal,ba"]);
}

#[test]
fn explicit_range_is_exclusive_of_before() {
  let fx = DrupalFixture::new();
  let out = fx
    .command()
    .args(["--after", "2020-02-01", "--before", "2020-02-20", "--format", "csv"])
    .output()
    .unwrap();

  // The only February commit lands at 10:00 on the 20th, after the bound.
  assert!(!out.status.success());
  assert!(String::from_utf8_lossy(&out.stderr).contains("Cannot find any issue numbers"));
}

#[test]
fn commit_stamped_at_before_is_left_out() {
  let fx = DrupalFixture::new();
  fx.commit("edge.txt", "Issue #777 by balsama: Lands on the bound", "2020-04-01 00:00:00 +0000");

  let mut issues: serde_json::Value = test_support::read_fixture_json("issues.json");
  issues["777"] = serde_json::json!({"nid": "777", "title": "t"});

  let out = fx
    .command()
    .env("DOSTATS_TEST_ISSUES_JSON", issues.to_string())
    .args(["--after", "2020-03-01", "--before", "2020-04-01", "--format", "csv"])
    .output()
    .unwrap();

  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let stdout = String::from_utf8_lossy(&out.stdout);
  assert!(stdout.contains(",3012345,"), "{}", stdout);
  assert!(!stdout.contains(",777,"), "{}", stdout);

  fx.command()
    .env("DOSTATS_TEST_ISSUES_JSON", issues.to_string())
    .args(["--after", "2020-04-01", "--before", "2020-04-02", "--format", "csv"])
    .assert()
    .success()
    .stdout(predicate::str::contains(",777,"));
}

#[test]
fn committer_names_are_not_regexes() {
  let fx = DrupalFixture::with_committers(&["bal.ama"]);
  fx.command()
    .args(["--year", "2020", "--quarter", "1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Cannot find any issue numbers"));
}

#[test]
fn no_issue_numbers_fails_unless_allowed() {
  let fx = DrupalFixture::new();
  fx.command()
    .args(["--year", "2021", "--quarter", "3"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Cannot find any issue numbers in commit log"));

  fx.command()
    .args(["--year", "2021", "--quarter", "3", "--allow-empty"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No issues found in range."))
    .stdout(predicate::str::contains("Issues: 0"))
    .stdout(predicate::str::contains("Total API Requests: 0"));
}

#[test]
fn missing_issue_aborts_and_names_it() {
  let fx = DrupalFixture::new();
  let mut issues: serde_json::Value = test_support::read_fixture_json("issues.json");
  issues.as_object_mut().unwrap().remove("3023456");

  fx.command()
    .env("DOSTATS_TEST_ISSUES_JSON", issues.to_string())
    .args(["--year", "2020", "--quarter", "1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Fetching issue #3023456 failed (HTTP 404)"));
}

#[test]
fn second_run_reuses_existing_clone() {
  let fx = DrupalFixture::new();
  fx.command().args(["-y", "2020", "-Q", "1"]).assert().success();
  assert!(fx.repos_dir().join("drupal").join(".git").exists());
  fx.command().args(["-y", "2020", "-Q", "1"]).assert().success();
}

#[test]
fn commits_by_unconfigured_people_are_not_listed() {
  let fx = DrupalFixture::with_committers(&["webchick"]);
  fx.command()
    .args(["--year", "2020", "--quarter", "1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Cannot find any issue numbers"));
}

#[test]
fn validate_committers_rejects_unknown_usernames() {
  let fx = DrupalFixture::new();
  fx.command()
    .env("DOSTATS_TEST_USERS_JSON", r#"["balsama"]"#)
    .args(["-y", "2020", "-Q", "1", "--validate-committers"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Unknown Drupal.org usernames in committers: phenaproxima"));

  // Lookups are API requests too.
  fx.command()
    .env("DOSTATS_TEST_USERS_JSON", r#"["balsama", "phenaproxima"]"#)
    .args(["-y", "2020", "-Q", "1", "--validate-committers"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Total API Requests: 4"));
}
