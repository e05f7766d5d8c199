mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use common::{csv_rows, fixture, winners};
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_schedule_declining_group() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("arisan"));
    cmd.arg("schedule").arg(fixture("declining.toml"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("turn,contribution,reduction"))
        .stdout(predicate::str::contains("1,150000,0"))
        .stdout(predicate::str::contains("2,100000,50000"))
        .stdout(predicate::str::contains("3,50000,100000"))
        .stderr(predicate::str::contains("WARNING").not());

    Ok(())
}

#[test]
fn test_schedule_warns_when_unbalanced() {
    let mut cmd = Command::new(cargo_bin!("arisan"));
    cmd.arg("schedule").arg(fixture("unbalanced.toml"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1,113333,0"))
        .stdout(predicate::str::contains("3,0,160000"))
        .stderr(predicate::str::contains("WARNING: schedule collects"));
}

#[test]
fn test_schedule_fixed_group() {
    let output = Command::new(cargo_bin!("arisan"))
        .arg("schedule")
        .arg(fixture("fixed.toml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows = csv_rows(&output.stdout);
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| row[1] == "50000" && row[2] == "0"));
}

#[test]
fn test_simulate_declining_group() {
    let mut cmd = Command::new(cargo_bin!("arisan"));
    cmd.arg("simulate").arg(fixture("declining.toml"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("round,winner,due_date,collected"))
        .stdout(predicate::str::is_match(r"1,Siti,\d{4}-\d{2}-\d{2},300000").unwrap())
        .stdout(predicate::str::is_match(r"2,Budi,\d{4}-\d{2}-\d{2},300000").unwrap())
        .stdout(predicate::str::is_match(r"3,Ani,\d{4}-\d{2}-\d{2},300000").unwrap());
}

#[test]
fn test_simulate_fills_open_seats() {
    let output = Command::new(cargo_bin!("arisan"))
        .arg("simulate")
        .arg(fixture("fixed.toml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows = csv_rows(&output.stdout);
    assert_eq!(rows.len(), 4);
    assert_eq!(
        winners(&output.stdout),
        vec!["Siti", "Budi", "Anggota 3", "Anggota 4"]
    );
    // 50000 + 75000 + 50000 + 50000
    assert!(rows.iter().all(|row| row[3] == "225000"));
}

#[test]
fn test_simulate_with_member_csv_reports_bad_rows() {
    let output = Command::new(cargo_bin!("arisan"))
        .arg("simulate")
        .arg(fixture("fixed.toml"))
        .arg("--members")
        .arg(fixture("members.csv"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error reading member"));

    assert_eq!(
        winners(&output.stdout),
        vec!["Dewi", "Eko", "Anggota 3", "Anggota 4"]
    );
    let rows = csv_rows(&output.stdout);
    assert!(rows.iter().all(|row| row[3] == "210000"));
}

#[test]
fn test_seeded_draw_is_reproducible() {
    let run = || {
        let output = Command::new(cargo_bin!("arisan"))
            .arg("simulate")
            .arg(fixture("declining.toml"))
            .arg("--draw")
            .arg("--seed")
            .arg("42")
            .output()
            .unwrap();
        assert!(output.status.success());
        winners(&output.stdout)
    };

    let first = run();
    assert_eq!(first, run());

    let mut sorted = first.clone();
    sorted.sort();
    assert_eq!(sorted, vec!["Ani", "Budi", "Siti"]);
}

#[test]
fn test_missing_config_fails() {
    let mut cmd = Command::new(cargo_bin!("arisan"));
    cmd.arg("schedule").arg("tests/fixtures/does_not_exist.toml");
    cmd.assert().failure();
}
