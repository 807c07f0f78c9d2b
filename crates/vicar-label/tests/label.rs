//! End-to-end label editing scenarios.

use vicar_label::{Key, LabelEntry, Value, ValueFormat, VicarError, VicarLabel};

#[test]
fn test_task_history_workflow() {
    let mut label = VicarLabel::new();
    label.set("RECSIZE", 512i64).unwrap();
    label.set_nbls(1, 512, 512).unwrap();

    // Each processing step appends a TASK block
    for (task, user, when) in [
        ("COPY", "ALICE", "2024-01-01T10:00:00"),
        ("STRETCH", "BOB", "2024-02-02T11:00:00"),
        ("MASK", "ALICE", "2024-03-03T12:00:00"),
    ] {
        label.set("TASK+", task).unwrap();
        label.set(("USER", "TASK", task), user).unwrap();
        label.set(("DAT_TIM", "TASK", task), when).unwrap();
    }

    assert_eq!(label.values_of("TASK").unwrap().len(), 3);
    assert_eq!(label.get(("TASK", -1)).unwrap(), &Value::from("MASK"));
    assert_eq!(
        label.get(("USER", "TASK", "STRETCH")).unwrap(),
        &Value::from("BOB")
    );
    assert_eq!(
        label.get(("DAT_TIM", "TASK")).unwrap(),
        &Value::from("2024-01-01T10:00:00")
    );

    // Editing through a block-scoped key touches only that block
    label.set(("USER", "TASK", "MASK"), "CAROL").unwrap();
    assert_eq!(
        label.get(("USER", "TASK", "COPY")).unwrap(),
        &Value::from("ALICE")
    );
    assert_eq!(
        label.get(("USER", "TASK", "MASK")).unwrap(),
        &Value::from("CAROL")
    );

    // Dropping the middle block's entries by occurrence
    label.delete(("TASK", 1)).unwrap();
    assert_eq!(label.values_of("TASK").unwrap().len(), 2);
}

#[test]
fn test_minimal_label_from_text() {
    // Text carrying every required parameter, BSQ with a 1x10x20 shape
    let mut base = VicarLabel::new();
    base.set("RECSIZE", 512i64).unwrap();
    base.set_nbls(1, 10, 20).unwrap();
    let text = base.to_string();

    let mut label = VicarLabel::from_text(&text).unwrap();
    assert_eq!(label.len(), 24);
    assert_eq!(label.int("NL").unwrap(), 10);
    assert_eq!(label.int("N2").unwrap(), 10);

    let (header, eol) = label.export(true).unwrap();
    assert!(eol.is_empty());
    assert_eq!(header.len() as i64, label.int("LBLSIZE").unwrap());
    assert_eq!(header.len() % 512, 0);
    assert!(header.ends_with('\0'));
}

#[test]
fn test_mixed_key_forms_address_same_entry() {
    let mut label = VicarLabel::new();
    label.append([("SCALE", Value::Real(1.25))]).unwrap();

    let idx = label.arg("SCALE").unwrap();
    assert_eq!(label.get(idx as isize).unwrap(), &Value::Real(1.25));
    assert_eq!(label.get(("SCALE", 0)).unwrap(), &Value::Real(1.25));
    assert_eq!(label.get(("SCALE", -1)).unwrap(), &Value::Real(1.25));
    assert_eq!(
        label.arg_value("SCALE", &Value::Real(1.25)).unwrap(),
        idx
    );
}

#[test]
fn test_required_defaults_and_guards() {
    let mut label = VicarLabel::new();
    assert_eq!(label.int("LBLSIZE").unwrap(), 0);
    assert_eq!(label.get("FORMAT").unwrap(), &Value::from("BYTE"));
    assert_eq!(label.get("TYPE").unwrap(), &Value::from("IMAGE"));

    assert!(matches!(
        label.delete("FORMAT"),
        Err(VicarError::RequiredParameter { .. })
    ));
    assert!(matches!(
        label.set("FORMAT", "BMP"),
        Err(VicarError::ConstrainedValue { .. })
    ));
    assert!(matches!(
        label.set("RECSIZE", -5i64),
        Err(VicarError::RequiredInt { .. })
    ));

    label.set("FORMAT", "HALF").unwrap();
    assert_eq!(label.get("FORMAT").unwrap(), &Value::from("HALF"));
}

#[test]
fn test_failed_bulk_append_leaves_label_unchanged() {
    let mut label = VicarLabel::new();
    let before = label.clone();
    let result = label.append([
        LabelEntry::new("GOOD", 1i64),
        LabelEntry::new("bad", 2i64),
    ]);
    assert!(matches!(result, Err(VicarError::InvalidName { .. })));
    assert_eq!(label, before);
    assert!(!label.contains("GOOD"));
}

#[test]
fn test_formatting_survives_edits() {
    let mut label = VicarLabel::from_text("EXPOSURE  =  1.5  SCALE=2.5  ").unwrap();
    label.set("EXPOSURE", 2.25).unwrap();
    // Blanks around the '=' are kept across a value change
    assert_eq!(
        label.name_value_str("EXPOSURE", false).unwrap(),
        "EXPOSURE  =  2.25  "
    );

    label
        .set_with_format("SCALE", 2.5, ValueFormat::new().with_fmt("%7.3f"))
        .unwrap();
    assert_eq!(label.value_str("SCALE").unwrap(), "  2.500");
}

#[test]
fn test_projection_filters() {
    let mut label = VicarLabel::new();
    label.append_text("TASK='COPY'  TASK='MASK'  ").unwrap();

    let names = label.names(Some("task")).unwrap();
    assert_eq!(names, vec!["TASK", "TASK"]);

    let items = label.items(Some("TASK|FORMAT"), true).unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].0.to_string(), "FORMAT");
    assert_eq!(items[1].0.to_string(), "(TASK, 0)");
    assert_eq!(items[2].1, &Value::from("MASK"));

    let unique: Vec<String> = label.iter().map(ToString::to_string).collect();
    assert!(unique.contains(&"(TASK, 1)".to_string()));
}

#[test]
fn test_key_conversions() {
    let mut label = VicarLabel::new();
    label.append_text("TASK='COPY'  DAT_TIM='T0'  ").unwrap();

    // All these forms convert into keys implicitly
    assert!(label.contains("TASK"));
    assert!(label.contains(("TASK", 0)));
    assert!(label.contains(("DAT_TIM", "TASK")));
    assert!(label.contains(("DAT_TIM", "TASK", "COPY")));
    assert!(label.contains(Key::Index(-1)));
}
