use rusqlite::Connection;
use std::collections::HashSet;
use tidytask_core::db::migrations::latest_version;
use tidytask_core::db::open_db_in_memory;
use tidytask_core::{
    AuditStamp, RepoError, SqliteTodoRepository, TodoItem, TodoListQuery, TodoRepository,
    TodoService, TodoStatus,
};
use uuid::Uuid;

fn test_repo(conn: &Connection) -> SqliteTodoRepository<'_> {
    SqliteTodoRepository::try_new(conn, AuditStamp::new("test.unit")).unwrap()
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = test_repo(&conn);

    let todo = TodoItem::new("first todo");
    let id = repo.create_todo(&todo).unwrap();

    let loaded = repo.get_todo(id, false).unwrap().unwrap();
    assert_eq!(loaded.id, todo.id);
    assert_eq!(loaded.name, "first todo");
    assert_eq!(loaded.status, TodoStatus::Created);
    assert!(!loaded.is_deleted);
}

#[test]
fn update_existing_todo() {
    let conn = open_db_in_memory().unwrap();
    let repo = test_repo(&conn);

    let mut todo = TodoItem::new("draft");
    repo.create_todo(&todo).unwrap();

    todo.name = "updated todo".to_string();
    todo.status = TodoStatus::InProgress;
    repo.update_todo(&todo).unwrap();

    let loaded = repo.get_todo(todo.id, false).unwrap().unwrap();
    assert_eq!(loaded.name, "updated todo");
    assert_eq!(loaded.status, TodoStatus::InProgress);
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = test_repo(&conn);

    let todo = TodoItem::new("missing");
    let err = repo.update_todo(&todo).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == todo.id));
}

#[test]
fn list_excludes_deleted_by_default_and_can_include_them() {
    let conn = open_db_in_memory().unwrap();
    let repo = test_repo(&conn);

    let todo_a = TodoItem::new("active");
    let todo_b = TodoItem::new("deleted later");
    repo.create_todo(&todo_a).unwrap();
    repo.create_todo(&todo_b).unwrap();
    repo.soft_delete_todo(todo_b.id).unwrap();

    let visible = repo.list_todos(&TodoListQuery::default()).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, todo_a.id);

    let include_deleted = TodoListQuery {
        include_deleted: true,
        ..TodoListQuery::default()
    };
    let all = repo.list_todos(&include_deleted).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn soft_delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = test_repo(&conn);

    let todo = TodoItem::new("weekly errand");
    repo.create_todo(&todo).unwrap();

    repo.soft_delete_todo(todo.id).unwrap();
    repo.soft_delete_todo(todo.id).unwrap();

    assert!(repo.get_todo(todo.id, false).unwrap().is_none());
    let deleted = repo.get_todo(todo.id, true).unwrap().unwrap();
    assert!(deleted.is_deleted);
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = test_repo(&conn);

    let invalid = TodoItem::new("   ");
    let create_err = repo.create_todo(&invalid).unwrap_err();
    assert!(matches!(create_err, RepoError::Validation(_)));

    let mut valid = TodoItem::new("good name");
    repo.create_todo(&valid).unwrap();

    valid.name = String::new();
    let update_err = repo.update_todo(&valid).unwrap_err();
    assert!(matches!(update_err, RepoError::Validation(_)));
}

#[test]
fn list_filters_by_status() {
    let conn = open_db_in_memory().unwrap();
    let repo = test_repo(&conn);

    let created = TodoItem::new("created");
    let mut started = TodoItem::new("started");
    started.status = TodoStatus::InProgress;
    let mut done = TodoItem::new("done");
    done.status = TodoStatus::Completed;
    repo.create_todo(&created).unwrap();
    repo.create_todo(&started).unwrap();
    repo.create_todo(&done).unwrap();

    let query = TodoListQuery {
        status: Some(TodoStatus::InProgress),
        include_deleted: true,
        ..TodoListQuery::default()
    };

    let result = repo.list_todos(&query).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, started.id);
}

#[test]
fn list_pagination_with_limit_and_offset_is_stable() {
    let conn = open_db_in_memory().unwrap();
    let repo = test_repo(&conn);

    let todo_a = todo_with_fixed_id("00000000-0000-4000-8000-000000000001", "a");
    let todo_b = todo_with_fixed_id("00000000-0000-4000-8000-000000000002", "b");
    let todo_c = todo_with_fixed_id("00000000-0000-4000-8000-000000000003", "c");
    repo.create_todo(&todo_c).unwrap();
    repo.create_todo(&todo_a).unwrap();
    repo.create_todo(&todo_b).unwrap();

    // Creation can land in the same millisecond; pin created_at so the
    // id tie-break decides the order.
    conn.execute("UPDATE todos SET created_at = 1234567890000;", [])
        .unwrap();

    let query = TodoListQuery {
        include_deleted: true,
        limit: Some(2),
        offset: 1,
        ..TodoListQuery::default()
    };
    let page = repo.list_todos(&query).unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, todo_b.id);
    assert_eq!(page[1].id, todo_c.id);
}

#[test]
fn list_pagination_with_offset_only_path_is_stable() {
    let conn = open_db_in_memory().unwrap();
    let repo = test_repo(&conn);

    let todo_a = todo_with_fixed_id("00000000-0000-4000-8000-000000000001", "a");
    let todo_b = todo_with_fixed_id("00000000-0000-4000-8000-000000000002", "b");
    let todo_c = todo_with_fixed_id("00000000-0000-4000-8000-000000000003", "c");
    repo.create_todo(&todo_a).unwrap();
    repo.create_todo(&todo_b).unwrap();
    repo.create_todo(&todo_c).unwrap();

    conn.execute("UPDATE todos SET created_at = 1234567890000;", [])
        .unwrap();

    let query = TodoListQuery {
        include_deleted: true,
        offset: 1,
        ..TodoListQuery::default()
    };
    let page = repo.list_todos(&query).unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, todo_b.id);
    assert_eq!(page[1].id, todo_c.id);
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let service = TodoService::new(test_repo(&conn));

    let id = service.create_todo("from service").unwrap();

    let fetched = service.get_todo(id, false).unwrap().unwrap();
    assert_eq!(fetched.name, "from service");
    assert_eq!(fetched.status, TodoStatus::Created);

    service.set_status(id, TodoStatus::Completed).unwrap();
    let completed = service.get_todo(id, false).unwrap().unwrap();
    assert_eq!(completed.status, TodoStatus::Completed);

    let ids: HashSet<_> = service
        .list_todos(&TodoListQuery::default())
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert!(ids.contains(&id));
}

#[test]
fn service_set_status_on_missing_todo_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = TodoService::new(test_repo(&conn));

    let missing = Uuid::new_v4();
    let err = service
        .set_status(missing, TodoStatus::Cancelled)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteTodoRepository::try_new(&conn, AuditStamp::new("test.unit"));
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_todos_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTodoRepository::try_new(&conn, AuditStamp::new("test.unit"));
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("todos"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_todos_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE todos (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTodoRepository::try_new(&conn, AuditStamp::new("test.unit"));
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "todos",
            column: "status"
        })
    ));
}

fn todo_with_fixed_id(id: &str, name: &str) -> TodoItem {
    TodoItem::with_id(Uuid::parse_str(id).unwrap(), name, TodoStatus::Created).unwrap()
}
