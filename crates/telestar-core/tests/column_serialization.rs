use telestar_core::{Column, ColumnKind};

#[test]
fn serializes_columns_deterministically() {
    let columns = vec![
        Column::new("Account_ID", ColumnKind::Identifier),
        Column::new("Creation_Time", ColumnKind::Timestamp),
        Column::new("Notes", ColumnKind::FreeText),
    ];

    let json = serde_json::to_string_pretty(&columns).expect("serialize columns");
    let expected = r#"[
  {
    "name": "Account_ID",
    "kind": "identifier"
  },
  {
    "name": "Creation_Time",
    "kind": "timestamp"
  },
  {
    "name": "Notes",
    "kind": "free_text"
  }
]"#;
    assert_eq!(json, expected);
}

#[test]
fn kind_names_match_serde() {
    for kind in [
        ColumnKind::Identifier,
        ColumnKind::Integer,
        ColumnKind::Float,
        ColumnKind::Timestamp,
        ColumnKind::Boolean,
        ColumnKind::FreeText,
        ColumnKind::Unknown,
    ] {
        let json = serde_json::to_value(kind).expect("serialize kind");
        assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
    }
}
