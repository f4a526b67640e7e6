use async_graphql::{Context, ErrorExtensions, Object, Result};

use crate::{
    domain::models::{Todo, TodoId},
    services::todos::TodoService,
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All todos, ordered by id.
    async fn todos(&self, ctx: &Context<'_>) -> Result<Vec<Todo>> {
        let service = ctx.data::<TodoService>()?;
        service.list().await.map_err(|err| err.extend())
    }

    /// A single todo, or null when no todo has this id.
    async fn todo(&self, ctx: &Context<'_>, id: TodoId) -> Result<Option<Todo>> {
        let service = ctx.data::<TodoService>()?;
        service.get(id).await.map_err(|err| err.extend())
    }
}
