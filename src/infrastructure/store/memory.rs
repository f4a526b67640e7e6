use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
};

use super::{StoreError, TodoStore};
use crate::domain::models::{NewTodo, Todo, TodoId, TodoPatch};

/// Process-local store. Rows survive `disconnect`, like a database would.
#[derive(Default)]
pub struct MemoryTodoStore {
    connected: AtomicBool,
    rows: RwLock<Rows>,
}

#[derive(Default)]
struct Rows {
    next_id: TodoId,
    todos: BTreeMap<TodoId, Todo>,
}

impl MemoryTodoStore {
    fn ensure_connected(&self) -> Result<(), StoreError> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::NotConnected)
        }
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn connect(&self) -> Result<(), StoreError> {
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, StoreError> {
        self.ensure_connected()?;
        Ok(self.rows.read().todos.values().cloned().collect())
    }

    async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        self.ensure_connected()?;
        Ok(self.rows.read().todos.get(&id).cloned())
    }

    async fn create_todo(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        self.ensure_connected()?;
        let mut rows = self.rows.write();
        let id = rows
            .next_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Query("todo id sequence exhausted".to_string()))?;
        rows.next_id = id;
        let now = Utc::now();
        let record = Todo {
            id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            created_at: now,
            updated_at: now,
        };
        rows.todos.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_todo(
        &self,
        id: TodoId,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, StoreError> {
        self.ensure_connected()?;
        let mut rows = self.rows.write();
        let Some(todo) = rows.todos.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(todo, Utc::now());
        Ok(Some(todo.clone()))
    }

    async fn delete_todo(&self, id: TodoId) -> Result<bool, StoreError> {
        self.ensure_connected()?;
        Ok(self.rows.write().todos.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_reads_until_connected() {
        let store = MemoryTodoStore::default();

        assert!(!store.is_connected());
        assert!(matches!(
            store.list_todos().await,
            Err(StoreError::NotConnected)
        ));

        store.connect().await.expect("connect");
        assert!(store.list_todos().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn connect_and_disconnect_are_idempotent() {
        let store = MemoryTodoStore::default();

        store.disconnect().await;
        store.connect().await.expect("first connect");
        store.connect().await.expect("second connect");
        assert!(store.is_connected());

        store.disconnect().await;
        store.disconnect().await;
        assert!(!store.is_connected());

        store.connect().await.expect("reconnect");
        assert!(store.is_connected());
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let store = MemoryTodoStore::default();
        store.connect().await.expect("connect");

        let first = store.create_todo(NewTodo::new("a")).await.expect("create");
        assert!(store.delete_todo(first.id).await.expect("delete"));
        let second = store.create_todo(NewTodo::new("b")).await.expect("create");

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(!store.delete_todo(first.id).await.expect("delete again"));
    }

    #[tokio::test]
    async fn exhausted_id_sequence_is_an_error() {
        let store = MemoryTodoStore::default();
        store.connect().await.expect("connect");
        store.rows.write().next_id = TodoId::MAX;

        let err = store
            .create_todo(NewTodo::new("one too many"))
            .await
            .expect_err("expected id overflow");

        assert!(matches!(err, StoreError::Query(_)), "got {err:?}");
        assert!(store.list_todos().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_row_returns_none() {
        let store = MemoryTodoStore::default();
        store.connect().await.expect("connect");

        let updated = store
            .update_todo(
                42,
                TodoPatch {
                    completed: Some(true),
                    ..TodoPatch::default()
                },
            )
            .await
            .expect("update");

        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn rows_survive_reconnect() {
        let store = MemoryTodoStore::default();
        store.connect().await.expect("connect");
        store
            .create_todo(NewTodo::new("Buy milk"))
            .await
            .expect("create");

        store.disconnect().await;
        store.connect().await.expect("reconnect");

        let todos = store.list_todos().await.expect("list");
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Buy milk");
    }
}
