use parlance::dialogue::{
    ConfirmStatus, ConstantType, DialogueItem, DialogueState, create_constants, extract_constants,
};
use parlance::program::{Num, Program, Value};

#[test]
fn extraction_covers_every_literal_kind() {
    let program = Program::new("book_table")
        .with_arg("guests", Value::Number { value: Num(4.0) })
        .with_arg("cuisine", Value::Str { value: "italian".into() })
        .with_arg("outdoor", Value::Bool { value: true })
        .with_arg("day", Value::Date { value: "2026-09-01".into() })
        .with_arg(
            "venue",
            Value::Entity {
                value: "venue:rist_0".into(),
                display: Some("trattoria da luca".into()),
            },
        );
    let state =
        DialogueState::from_items(vec![DialogueItem::new(program, ConfirmStatus::Accepted)]);

    let constants = extract_constants(&state);
    assert_eq!(constants.len(), 5);
    let types: Vec<ConstantType> = constants.iter().map(|c| c.typ).collect();
    for expected in [
        ConstantType::Number,
        ConstantType::Str,
        ConstantType::Bool,
        ConstantType::Entity,
        ConstantType::Date,
    ] {
        assert!(types.contains(&expected), "missing {expected:?}");
    }
}

#[test]
fn creation_returns_min_of_cap_and_available() {
    // Unbounded type: exactly the cap.
    let numbers = create_constants("NUMBER", ConstantType::Number, 7);
    assert_eq!(numbers.len(), 7);
    // Bounded type: exactly what exists.
    let bools = create_constants("BOOL", ConstantType::Bool, 7);
    assert_eq!(bools.len(), 2);

    for constant in numbers.iter().chain(&bools) {
        assert!(constant.token == "NUMBER" || constant.token == "BOOL");
    }
}

#[test]
fn created_constants_are_tagged_and_ordered() {
    let dates = create_constants("DATE", ConstantType::Date, 3);
    assert!(dates.iter().all(|c| c.token == "DATE" && c.typ == ConstantType::Date));
    assert_eq!(dates[0].surface, "DATE_0");
    assert_eq!(dates[2].surface, "DATE_2");
}
