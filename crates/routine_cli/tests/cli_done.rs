mod common;

use common::{Sandbox, stderr, stdout, write_json};

fn weekly_store(sandbox: &Sandbox) {
    sandbox.write_store(serde_json::json!([
        {
            "id": "routine-1",
            "name": "Gym",
            "frequency": { "type": "weekly", "days": ["monday", "wednesday"] },
            "completions": [],
            "color": "#3B82F6"
        }
    ]));
}

#[test]
fn done_records_completion_with_duration() {
    let sandbox = Sandbox::new();
    weekly_store(&sandbox);

    let output = sandbox.run(&[
        "done",
        "routine-1",
        "--duration",
        "2:05",
        "--today",
        "2025-03-03",
    ]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("next due 2025-03-05"));

    let stored = sandbox.read_store();
    assert_eq!(
        stored["routines"][0]["completions"],
        serde_json::json!([{ "date": "2025-03-03", "duration": 125 }])
    );
}

#[test]
fn done_twice_same_day_is_informational() {
    let sandbox = Sandbox::new();
    weekly_store(&sandbox);

    let first = sandbox.run(&["done", "routine-1", "--today", "2025-03-03"]);
    assert!(first.status.success());

    let second = sandbox.run(&["done", "routine-1", "-d", "60", "--today", "2025-03-03"]);
    assert!(second.status.success());
    assert!(stdout(&second).contains("Already completed on 2025-03-03"));

    let stored = sandbox.read_store();
    assert_eq!(
        stored["routines"][0]["completions"],
        serde_json::json!([{ "date": "2025-03-03" }])
    );
}

#[test]
fn done_keeps_history_sorted_newest_first() {
    let sandbox = Sandbox::new();
    weekly_store(&sandbox);

    for day in ["2025-03-05", "2025-03-03", "2025-03-10"] {
        let output = sandbox.run(&["done", "routine-1", "--today", day]);
        assert!(output.status.success());
    }

    let stored = sandbox.read_store();
    let dates: Vec<&str> = stored["routines"][0]["completions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|completion| completion["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2025-03-10", "2025-03-05", "2025-03-03"]);
}

#[test]
fn done_reports_missing_routine() {
    let sandbox = Sandbox::new();
    sandbox.write_store(serde_json::json!([]));

    let output = sandbox.run(&["done", "routine-1", "--today", "2025-03-03"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("ERROR: not_found"));
}

#[test]
fn done_rejects_malformed_duration() {
    let sandbox = Sandbox::new();
    weekly_store(&sandbox);

    let output = sandbox.run(&["done", "routine-1", "--duration", "ten minutes"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("ERROR: invalid_input"));
    assert_eq!(
        sandbox.read_store()["routines"][0]["completions"],
        serde_json::json!([])
    );
}

#[test]
fn done_upgrades_legacy_store() {
    let sandbox = Sandbox::new();
    write_json(
        &sandbox.store_path(),
        serde_json::json!({
            "schema_version": 1,
            "routines": [{
                "id": "routine-1",
                "name": "Walk",
                "frequency": { "type": "interval", "days": 2 },
                "completions": ["2025-02-27", "2025-03-01"],
                "color": "#22C55E"
            }]
        }),
    );

    let output = sandbox.run(&["--json", "done", "routine-1", "--today", "2025-03-03"]);

    assert!(output.status.success());
    let payload: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert_eq!(payload["next_due_date"], "2025-03-05");
    assert_eq!(payload["status"], "completed_today");

    let stored = sandbox.read_store();
    assert_eq!(stored["schema_version"], 2);
    assert_eq!(
        stored["routines"][0]["completions"],
        serde_json::json!([
            { "date": "2025-03-03" },
            { "date": "2025-03-01" },
            { "date": "2025-02-27" }
        ])
    );
}
