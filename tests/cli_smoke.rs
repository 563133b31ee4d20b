use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn store_arg(dir: &TempDir) -> String {
    dir.path()
        .join("event_reminder_events.json")
        .display()
        .to_string()
}

#[test]
fn nudge_help_works() {
    Command::cargo_bin("nudge")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("personal event reminders"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = ["add", "list", "edit", "remove", "done", "watch"];

    for cmd in subcommands {
        Command::cargo_bin("nudge")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn add_then_list_round_trip() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_arg(&dir);

    Command::cargo_bin("nudge")
        .expect("binary")
        .args(["add", "dentist", "--date", "2099-06-15", "--time", "09:30"])
        .args(["--store", &store])
        .assert()
        .success()
        .stdout(contains("added event"));

    Command::cargo_bin("nudge")
        .expect("binary")
        .args(["list", "--store", &store, "--json"])
        .assert()
        .success()
        .stdout(contains("\"dentist\""))
        .stdout(contains("\"count\": 1"));
}

#[test]
fn empty_title_is_a_user_error() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_arg(&dir);

    Command::cargo_bin("nudge")
        .expect("binary")
        .args(["add", "", "--date", "2099-06-15", "--time", "09:30"])
        .args(["--store", &store])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Invalid event input"));

    // No store file was created by the rejected mutation.
    Command::cargo_bin("nudge")
        .expect("binary")
        .args(["list", "--store", &store, "--json"])
        .assert()
        .success()
        .stdout(contains("\"count\": 0"));
}

#[test]
fn bad_date_is_a_user_error() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_arg(&dir);

    Command::cargo_bin("nudge")
        .expect("binary")
        .args(["add", "x", "--date", "June 15th", "--time", "09:30"])
        .args(["--store", &store])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn done_toggles_and_list_hides_completed() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_arg(&dir);

    Command::cargo_bin("nudge")
        .expect("binary")
        .args(["add", "laundry", "--date", "2099-06-15", "--time", "18:00"])
        .args(["--store", &store])
        .assert()
        .success();

    // Recover the id from the JSON listing.
    let output = Command::cargo_bin("nudge")
        .expect("binary")
        .args(["list", "--store", &store, "--json"])
        .output()
        .expect("list output");
    let listing: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json listing");
    let id = listing["data"]["events"][0]["id"]
        .as_i64()
        .expect("event id");

    Command::cargo_bin("nudge")
        .expect("binary")
        .args(["done", &id.to_string(), "--store", &store])
        .assert()
        .success()
        .stdout(contains("completed event"));

    Command::cargo_bin("nudge")
        .expect("binary")
        .args(["list", "--store", &store])
        .assert()
        .success()
        .stdout(contains("no pending events"));

    Command::cargo_bin("nudge")
        .expect("binary")
        .args(["list", "--store", &store, "--all"])
        .assert()
        .success()
        .stdout(contains("laundry"));
}

#[test]
fn remove_of_unknown_id_is_a_soft_notice() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_arg(&dir);

    Command::cargo_bin("nudge")
        .expect("binary")
        .args(["remove", "424242", "--store", &store])
        .assert()
        .success()
        .stdout(contains("not found"));
}

#[test]
fn watch_reports_due_events_within_duration() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_arg(&dir);

    let now = chrono::Local::now();
    Command::cargo_bin("nudge")
        .expect("binary")
        .args([
            "add",
            "due-now",
            "--date",
            &now.format("%Y-%m-%d").to_string(),
            "--time",
            &now.format("%H:%M:%S").to_string(),
        ])
        .args(["--store", &store])
        .assert()
        .success();

    Command::cargo_bin("nudge")
        .expect("binary")
        .args(["watch", "--duration", "1", "--store", &store])
        .assert()
        .success()
        .stdout(contains("REMINDER"))
        .stdout(contains("due-now"));
}
