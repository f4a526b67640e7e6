use std::sync::Arc;

use tracing::warn;

use crate::{
    domain::models::{NewTodo, Todo, TodoId, TodoPatch},
    infrastructure::store::{StoreError, TodoStore},
};

use super::errors::ServiceError;

pub struct TodoService {
    pub store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Todo>, ServiceError> {
        self.store
            .list_todos()
            .await
            .map_err(|err| report("list_todos", err))
    }

    pub async fn get(&self, id: TodoId) -> Result<Option<Todo>, ServiceError> {
        self.store
            .get_todo(id)
            .await
            .map_err(|err| report("get_todo", err))
    }

    pub async fn create(&self, todo: NewTodo) -> Result<Todo, ServiceError> {
        self.store
            .create_todo(todo)
            .await
            .map_err(|err| report("create_todo", err))
    }

    pub async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Option<Todo>, ServiceError> {
        if patch.is_empty() {
            return self.get(id).await;
        }
        self.store
            .update_todo(id, patch)
            .await
            .map_err(|err| report("update_todo", err))
    }

    pub async fn delete(&self, id: TodoId) -> Result<bool, ServiceError> {
        self.store
            .delete_todo(id)
            .await
            .map_err(|err| report("delete_todo", err))
    }
}

fn report(operation: &'static str, err: StoreError) -> ServiceError {
    warn!(operation, error = %err, "todo store operation failed");
    ServiceError::from(err)
}
