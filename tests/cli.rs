use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn moneymind(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("moneymind").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

/// A fresh HOME with settings pointing at `<home>/data`.
fn setup() -> TempDir {
    let home = tempfile::tempdir().unwrap();
    let data = home.path().join("data");
    moneymind(home.path())
        .args(["init", "--data-dir", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized moneymind"));
    home
}

#[test]
fn test_help() {
    let home = tempfile::tempdir().unwrap();
    moneymind(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Free-text money tracking"));
}

#[test]
fn test_init_creates_database() {
    let home = setup();
    assert!(home.path().join("data").join("moneymind.db").exists());
    assert!(home.path().join("data").join("models").is_dir());
    assert!(home.path().join(".config/moneymind/settings.json").exists());
}

#[test]
fn test_entry_without_yes_saves_nothing() {
    let home = setup();
    moneymind(home.path())
        .args(["entry", "ข้าวมันไก่ 50", "--date", "2026-01-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-50.00"))
        .stdout(predicate::str::contains("Nothing saved"));

    moneymind(home.path())
        .args(["records", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions (0)"));
}

#[test]
fn test_entry_with_date_lines_and_yes() {
    let home = setup();
    let text = "25/12/2025\n25000 เงินเดือน\n-150 ค่าอาหาร\n26/12/2025\n-150 ค่าอาหาร\n";
    moneymind(home.path())
        .args(["entry", text, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 3 entries."));

    moneymind(home.path())
        .args(["records", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions (3)"))
        .stdout(predicate::str::contains("2025-12-25"))
        .stdout(predicate::str::contains("25,000.00"))
        .stdout(predicate::str::contains("-150.00"));
}

#[test]
fn test_entry_reads_stdin() {
    let home = setup();
    moneymind(home.path())
        .args(["entry", "--date", "2026-01-05", "--yes"])
        .write_stdin("กาแฟ 45\nแท็กซี่ 120\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 2 entries."));
}

#[test]
fn test_entry_with_nothing_parseable() {
    let home = setup();
    moneymind(home.path())
        .args(["entry", "hello there", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries found."));
}

#[test]
fn test_entry_out_then_confirm() {
    let home = setup();
    let proposal = home.path().join("proposal.json");
    moneymind(home.path())
        .args(["entry", "ค่าน้ำ 300", "--date", "2026-01-05", "--out"])
        .arg(&proposal)
        .assert()
        .success()
        .stdout(predicate::str::contains("Proposal written to"));
    assert!(proposal.exists());

    moneymind(home.path())
        .arg("confirm")
        .arg(&proposal)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 1 entries."));
}

#[test]
fn test_confirm_partial_proposal() {
    let home = setup();
    let proposal = home.path().join("proposal.json");
    std::fs::write(
        &proposal,
        r#"{"import": null, "entries": [
            {"date": "2026-01-05", "amount": "-45", "description": "กาแฟ"},
            {"date": "not a date", "amount": "-10", "description": "broken"}
        ]}"#,
    )
    .unwrap();
    moneymind(home.path())
        .arg("confirm")
        .arg(&proposal)
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped: entry 2"))
        .stdout(predicate::str::contains("Saved 1 of 2 entries."));
}

#[test]
fn test_confirm_rejects_non_proposal() {
    let home = setup();
    let bogus = home.path().join("bogus.json");
    std::fs::write(&bogus, "[1, 2, 3]").unwrap();
    moneymind(home.path())
        .arg("confirm")
        .arg(&bogus)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a proposal file"));
}

#[test]
fn test_template_import_and_duplicate() {
    let home = setup();
    let csv = home.path().join("sample.csv");
    moneymind(home.path())
        .arg("template")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote sample import file"));

    moneymind(home.path())
        .arg("import")
        .arg(&csv)
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("manual"))
        .stdout(predicate::str::contains("Saved 4 entries."));

    moneymind(home.path())
        .arg("import")
        .arg(&csv)
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("already been imported"));

    moneymind(home.path())
        .args(["records", "list", "--month", "2025-12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions (4)"))
        .stdout(predicate::str::contains("หวย"));
}

#[test]
fn test_import_text_file() {
    let home = setup();
    let txt = home.path().join("week.txt");
    std::fs::write(&txt, "03/01/2026\n500 ขายของ\n-60 ข้าว\n").unwrap();
    moneymind(home.path())
        .arg("import")
        .arg(&txt)
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("500.00"))
        .stdout(predicate::str::contains("-60.00"))
        .stdout(predicate::str::contains("Saved 2 entries."));
}

#[test]
fn test_import_missing_columns() {
    let home = setup();
    let csv = home.path().join("bad.csv");
    std::fs::write(&csv, "foo,bar\n1,2\n").unwrap();
    moneymind(home.path())
        .arg("import")
        .arg(&csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required column"));
}

#[test]
fn test_import_unknown_extension() {
    let home = setup();
    let pdf = home.path().join("statement.pdf");
    std::fs::write(&pdf, "not really a pdf").unwrap();
    moneymind(home.path())
        .arg("import")
        .arg(&pdf)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown file format"));
}

#[test]
fn test_categories_add_and_list() {
    let home = setup();
    moneymind(home.path())
        .args(["categories", "add", "สัตว์เลี้ยง"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added category"));

    moneymind(home.path())
        .args(["categories", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("สัตว์เลี้ยง"))
        .stdout(predicate::str::contains("mine"))
        .stdout(predicate::str::contains("เงินเดือน"));

    moneymind(home.path())
        .args(["categories", "list", "--user", "someone-else"])
        .assert()
        .success()
        .stdout(predicate::str::contains("สัตว์เลี้ยง").not());
}

#[test]
fn test_categories_edit_renames() {
    let home = setup();
    let out = moneymind(home.path())
        .args(["categories", "add", "Pets"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(out.stdout).unwrap();
    let id = stdout
        .trim()
        .strip_prefix("Added category ")
        .and_then(|rest| rest.split(':').next())
        .unwrap()
        .to_string();

    moneymind(home.path())
        .args(["categories", "edit", &id, "--name", "Animals", "--kind", "income"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Updated category {id}: Animals (income)")));

    moneymind(home.path())
        .args(["categories", "edit", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to change"));

    moneymind(home.path())
        .args(["categories", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Animals"))
        .stdout(predicate::str::contains("Pets").not());
}

#[test]
fn test_categories_add_rejects_bad_kind() {
    let home = setup();
    moneymind(home.path())
        .args(["categories", "add", "x", "--kind", "transfer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid category kind"));
}

#[test]
fn test_train_labels_then_predict() {
    let home = setup();
    let labels = home.path().join("labels.csv");
    std::fs::write(
        &labels,
        "description,category\nกาแฟ,อาหาร\nข้าวผัด,อาหาร\nแท็กซี่,เดินทาง\nรถไฟฟ้า,เดินทาง\n",
    )
    .unwrap();
    moneymind(home.path())
        .args(["train", "labels"])
        .arg(&labels)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 added"))
        .stdout(predicate::str::contains("Classifier trained on 4 examples across 2 categories"));

    moneymind(home.path())
        .args(["predict", "กาแฟ"])
        .assert()
        .success()
        .stdout(predicate::str::contains("อาหาร (trained, 100%)"))
        .stdout(predicate::str::contains("verified"));

    moneymind(home.path())
        .args(["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Examples:       4 (4 verified)"))
        .stdout(predicate::str::contains("generation 1"));

    moneymind(home.path())
        .args(["train", "retrain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(generation 2)"));
}

#[test]
fn test_predict_without_training_data() {
    let home = setup();
    moneymind(home.path())
        .args(["predict", "something new"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No category"));
}

#[test]
fn test_edit_category_teaches_and_history_applies() {
    let home = setup();
    moneymind(home.path())
        .args(["entry", "ค่าอาหาร 150", "--date", "2026-01-05", "--yes"])
        .assert()
        .success();

    moneymind(home.path())
        .args(["records", "edit", "1", "--category", "อาหาร"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 1:"))
        .stdout(predicate::str::contains("Learned from this change"));

    moneymind(home.path())
        .args(["predict", "ค่าอาหาร"])
        .assert()
        .success()
        .stdout(predicate::str::contains("อาหาร (trained"));
}

#[test]
fn test_edit_unknown_record() {
    let home = setup();
    moneymind(home.path())
        .args(["records", "edit", "99", "--amount", "-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No transaction with ID 99"));
}

#[test]
fn test_records_are_scoped_by_user() {
    let home = setup();
    moneymind(home.path())
        .args(["entry", "กาแฟ 45", "--date", "2026-01-05", "--yes", "--user", "alice"])
        .assert()
        .success();

    moneymind(home.path())
        .args(["records", "list", "--user", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions (0)"));

    moneymind(home.path())
        .args(["records", "list", "--user", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions (1)"));
}

#[test]
fn test_status() {
    let home = setup();
    moneymind(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("User:       default"))
        .stdout(predicate::str::contains("Transactions:   0"))
        .stdout(predicate::str::contains("Classifier:     not trained"));
}

#[test]
fn test_completions() {
    let home = tempfile::tempdir().unwrap();
    moneymind(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("moneymind"));
}
