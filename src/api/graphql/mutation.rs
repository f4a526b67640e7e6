use async_graphql::{Context, ErrorExtensions, InputObject, MaybeUndefined, Object, Result};

use crate::{
    domain::models::{NewTodo, Todo, TodoId, TodoPatch},
    infrastructure::config::GraphqlConfig,
    services::{errors::ServiceError, todos::TodoService},
};

#[derive(Debug, InputObject)]
pub struct CreateTodoInput {
    pub title: String,
    pub description: Option<String>,
    #[graphql(default)]
    pub completed: bool,
}

impl From<CreateTodoInput> for NewTodo {
    fn from(input: CreateTodoInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            completed: input.completed,
        }
    }
}

/// Fields left out of the input keep their current value. An explicit
/// `description: null` clears the description.
#[derive(Debug, Default, InputObject)]
pub struct UpdateTodoInput {
    pub title: Option<String>,
    pub description: MaybeUndefined<String>,
    pub completed: Option<bool>,
}

impl From<UpdateTodoInput> for TodoPatch {
    fn from(input: UpdateTodoInput) -> Self {
        let description = match input.description {
            MaybeUndefined::Undefined => None,
            MaybeUndefined::Null => Some(None),
            MaybeUndefined::Value(value) => Some(Some(value)),
        };
        Self {
            title: input.title,
            description,
            completed: input.completed,
        }
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_todo(&self, ctx: &Context<'_>, input: CreateTodoInput) -> Result<Todo> {
        let service = writable(ctx)?;
        service
            .create(input.into())
            .await
            .map_err(|err| err.extend())
    }

    /// Returns null when no todo has this id.
    async fn update_todo(
        &self,
        ctx: &Context<'_>,
        id: TodoId,
        input: UpdateTodoInput,
    ) -> Result<Option<Todo>> {
        let service = writable(ctx)?;
        service
            .update(id, input.into())
            .await
            .map_err(|err| err.extend())
    }

    /// Whether a todo was removed.
    async fn delete_todo(&self, ctx: &Context<'_>, id: TodoId) -> Result<bool> {
        let service = writable(ctx)?;
        service.delete(id).await.map_err(|err| err.extend())
    }
}

fn writable<'a>(ctx: &Context<'a>) -> Result<&'a TodoService> {
    let settings = ctx.data::<GraphqlConfig>()?;
    if !settings.enable_mutations {
        return Err(ServiceError::MutationsDisabled.extend());
    }
    ctx.data::<TodoService>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_input_distinguishes_null_from_absent() {
        let absent: TodoPatch = UpdateTodoInput::default().into();
        assert!(absent.is_empty());

        let cleared: TodoPatch = UpdateTodoInput {
            description: MaybeUndefined::Null,
            ..UpdateTodoInput::default()
        }
        .into();
        assert_eq!(cleared.description, Some(None));
    }
}
