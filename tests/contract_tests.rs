//! The async store contract, exercised through a trait object the way
//! an embedding UI would hold it.

use taskpad::db::Database;
use taskpad::store::TaskStore;
use taskpad::types::{TaskDraft, TaskPatch, TaskStatus};

#[tokio::test]
async fn local_store_honors_the_contract() {
    let db = Database::open_in_memory().expect("Failed to create in-memory database");
    let store: &dyn TaskStore = &db;

    // Write, then re-fetch the whole list rather than patching state.
    let created = store
        .insert_task(&TaskDraft::new("Buy milk"))
        .await
        .expect("Failed to insert");

    let tasks = store.list_tasks().await.expect("Failed to list");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, created.id);
    assert_eq!(tasks[0].status, TaskStatus::NotSet);

    let updated = store
        .update_task(
            created.id,
            &TaskPatch {
                status: Some(TaskStatus::Completed),
                ..TaskPatch::default()
            },
        )
        .await
        .expect("Failed to update");
    assert_eq!(updated.status, TaskStatus::Completed);

    let tasks = store.list_tasks().await.expect("Failed to re-list");
    assert_eq!(tasks[0].status, TaskStatus::Completed);
    assert_eq!(tasks[0].title, "Buy milk");

    store.delete_task(created.id).await.expect("Failed to delete");
    assert_eq!(store.task_count().await.unwrap(), 0);
}

#[tokio::test]
async fn contract_failures_surface_as_store_errors() {
    let db = Database::open_in_memory().expect("Failed to create in-memory database");
    let store: &dyn TaskStore = &db;

    let result = store
        .update_task(
            404,
            &TaskPatch {
                title: Some("ghost".into()),
                ..TaskPatch::default()
            },
        )
        .await;

    match result {
        Err(err) => assert!(err.is_not_found()),
        Ok(_) => panic!("updating a missing id must fail"),
    }

    // Idempotent delete holds across the trait boundary too.
    store.delete_task(404).await.expect("Delete is a no-op");
}
