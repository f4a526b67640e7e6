use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{info, warn};

use super::{StoreError, TodoStore};
use crate::{
    domain::models::{NewTodo, Todo, TodoId, TodoPatch},
    infrastructure::{
        config::DatabaseConfig,
        db::{self, PgPool},
    },
};

const TODO_COLUMNS: &str = "id, title, description, completed, created_at, updated_at";

pub struct PgTodoStore {
    config: DatabaseConfig,
    pool: RwLock<Option<PgPool>>,
}

impl PgTodoStore {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
        }
    }

    fn pool(&self) -> Result<PgPool, StoreError> {
        self.pool.read().clone().ok_or(StoreError::NotConnected)
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn connect(&self) -> Result<(), StoreError> {
        if self.pool.read().is_some() {
            return Ok(());
        }

        let pool = db::connect(&self.config)
            .await
            .map_err(|err| StoreError::Connection(format!("{err:#}")))?;

        if self.config.run_migrations {
            if let Err(err) = db::run_migrations(&pool).await {
                pool.close().await;
                return Err(StoreError::Connection(format!("{err:#}")));
            }
            info!("database migrations completed successfully");
        }

        let duplicate = {
            let mut slot = self.pool.write();
            if slot.is_some() {
                Some(pool)
            } else {
                *slot = Some(pool);
                None
            }
        };
        if let Some(pool) = duplicate {
            warn!("concurrent connect detected, closing redundant pool");
            pool.close().await;
        }

        info!(database = %self.config.redacted_url(), "connected to PostgreSQL");
        Ok(())
    }

    async fn disconnect(&self) {
        let pool = self.pool.write().take();
        if let Some(pool) = pool {
            pool.close().await;
            info!(database = %self.config.redacted_url(), "disconnected from PostgreSQL");
        }
    }

    fn is_connected(&self) -> bool {
        self.pool.read().is_some()
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, StoreError> {
        let pool = self.pool()?;
        let rows = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos ORDER BY id"
        ))
        .fetch_all(&pool)
        .await?;
        Ok(rows)
    }

    async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let pool = self.pool()?;
        let row = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&pool)
        .await?;
        Ok(row)
    }

    async fn create_todo(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let pool = self.pool()?;
        let row = sqlx::query_as::<_, Todo>(&format!(
            "INSERT INTO todos (title, description, completed)
             VALUES ($1, $2, $3)
             RETURNING {TODO_COLUMNS}"
        ))
        .bind(todo.title)
        .bind(todo.description)
        .bind(todo.completed)
        .fetch_one(&pool)
        .await?;
        Ok(row)
    }

    async fn update_todo(
        &self,
        id: TodoId,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, StoreError> {
        let pool = self.pool()?;
        let clear_or_set_description = patch.description.is_some();
        let row = sqlx::query_as::<_, Todo>(&format!(
            "UPDATE todos
             SET title = COALESCE($2, title),
                 description = CASE WHEN $3 THEN $4 ELSE description END,
                 completed = COALESCE($5, completed),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {TODO_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.title)
        .bind(clear_or_set_description)
        .bind(patch.description.flatten())
        .bind(patch.completed)
        .fetch_optional(&pool)
        .await?;
        Ok(row)
    }

    async fn delete_todo(&self, id: TodoId) -> Result<bool, StoreError> {
        let pool = self.pool()?;
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
