use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    domain::models::{NewTodo, Todo, TodoId, TodoPatch},
    infrastructure::config::DatabaseConfig,
};

mod memory;
mod postgres;

pub use memory::MemoryTodoStore;
pub use postgres::PgTodoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("store is not connected")]
    NotConnected,
    #[error("query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => StoreError::NotConnected,
            sqlx::Error::PoolTimedOut => {
                StoreError::Connection("timed out acquiring a pooled connection".to_string())
            }
            sqlx::Error::Io(io) => StoreError::Connection(io.to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Backing store for todos, including the lifecycle of its connection.
///
/// `connect` is idempotent and `disconnect` is a no-op on a disconnected
/// store. Data operations on a disconnected store fail with
/// [`StoreError::NotConnected`].
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn connect(&self) -> Result<(), StoreError>;
    async fn disconnect(&self);
    fn is_connected(&self) -> bool;

    async fn list_todos(&self) -> Result<Vec<Todo>, StoreError>;
    async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>, StoreError>;
    async fn create_todo(&self, todo: NewTodo) -> Result<Todo, StoreError>;
    async fn update_todo(&self, id: TodoId, patch: TodoPatch)
        -> Result<Option<Todo>, StoreError>;
    async fn delete_todo(&self, id: TodoId) -> Result<bool, StoreError>;
}

pub fn build_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn TodoStore>> {
    match config.backend.as_str() {
        "postgres" => Ok(Arc::new(PgTodoStore::new(config.clone()))),
        "memory" => Ok(Arc::new(MemoryTodoStore::default())),
        other => anyhow::bail!("unsupported database backend: {other}"),
    }
}
