use std::fs;

use telestar_catalog::Relationship;
use telestar_core::{Table, TableStore, Value};
use telestar_eval::{AuditReport, audit, write_audit};

fn store() -> TableStore {
    let mut store = TableStore::new();
    store
        .add(Table::from_rows("Agents", ["Agent_ID"], vec![vec![Value::from("G1")]]).unwrap())
        .unwrap();
    store
        .add(
            Table::from_rows(
                "SupportLogs",
                ["Log_ID", "Agent_ID"],
                vec![
                    vec![Value::from("L1"), Value::from("G1")],
                    vec![Value::from("L2"), Value::from("G7")],
                ],
            )
            .unwrap(),
        )
        .unwrap();
    store
}

#[test]
fn audit_files_are_written_and_parse_back() {
    let rels = vec![Relationship::new("Agents", "Agent_ID", "SupportLogs", "Agent_ID")];
    let before = store();
    let report = audit(&rels, &before);

    let dir = std::env::temp_dir().join(format!("telestar_audit_{}", uuid::Uuid::new_v4()));
    let paths = write_audit(&dir, &report, 5).expect("write audit");

    let parsed: AuditReport =
        serde_json::from_str(&fs::read_to_string(&paths.json_path).expect("read audit.json"))
            .expect("parse audit.json");
    assert_eq!(parsed.total_invalid_rows, 1);
    assert_eq!(parsed.violations[0].row_indices, vec![2]);
    assert_eq!(parsed.violations[0].relationship, rels[0]);

    let markdown = fs::read_to_string(&paths.report_path).expect("read audit_report.md");
    assert!(markdown.starts_with("# Telestar Integrity Audit"));
    assert!(markdown.contains("values [G7]"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn audit_does_not_mutate_the_store() {
    let rels = vec![Relationship::new("Agents", "Agent_ID", "SupportLogs", "Agent_ID")];
    let store = store();
    let counts = store.row_counts();
    let first = audit(&rels, &store);
    let second = audit(&rels, &store);

    assert_eq!(store.row_counts(), counts);
    assert_eq!(first.total_invalid_rows, second.total_invalid_rows);
}
