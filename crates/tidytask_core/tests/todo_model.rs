use tidytask_core::{TodoItem, TodoStatus, TodoValidationError};
use uuid::Uuid;

#[test]
fn new_todo_sets_defaults() {
    let todo = TodoItem::new("buy milk");

    assert!(!todo.id.is_nil());
    assert_eq!(todo.name, "buy milk");
    assert_eq!(todo.status, TodoStatus::Created);
    assert!(todo.is_active());
}

#[test]
fn soft_delete_and_restore_work() {
    let mut todo = TodoItem::new("take out trash");

    todo.soft_delete();
    assert!(todo.is_deleted);
    assert!(!todo.is_active());

    todo.restore();
    assert!(!todo.is_deleted);
    assert!(todo.is_active());
}

#[test]
fn with_id_rejects_nil_uuid() {
    let err = TodoItem::with_id(Uuid::nil(), "invalid", TodoStatus::Created).unwrap_err();
    assert_eq!(err, TodoValidationError::NilId);
}

#[test]
fn validate_rejects_blank_name() {
    let mut todo = TodoItem::new("  ");
    assert_eq!(todo.validate().unwrap_err(), TodoValidationError::BlankName);

    todo.name = String::new();
    assert_eq!(todo.validate().unwrap_err(), TodoValidationError::BlankName);
}

#[test]
fn validate_rejects_overlong_name() {
    let todo = TodoItem::new("x".repeat(201));
    assert_eq!(
        todo.validate().unwrap_err(),
        TodoValidationError::NameTooLong {
            length: 201,
            max: 200,
        }
    );

    let todo = TodoItem::new("x".repeat(200));
    todo.validate().unwrap();
}

#[test]
fn todo_serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut todo = TodoItem::with_id(id, "ship the release", TodoStatus::InProgress).unwrap();
    todo.is_deleted = false;

    let json = serde_json::to_value(&todo).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["name"], "ship the release");
    assert_eq!(json["status"], "in_progress");
    assert_eq!(json["is_deleted"], false);

    let decoded: TodoItem = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, todo);
}
