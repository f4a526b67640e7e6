//! GraphQL endpoint: schema construction and the axum handlers serving it.

use std::sync::Arc;

use async_graphql::{
    extensions::Tracing,
    http::{parse_query_string, GraphiQLSource},
    parser::{
        parse_query,
        types::{DocumentOperations, OperationType},
    },
    EmptySubscription, Schema,
};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::{Extension, RawQuery, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::{
    infrastructure::{config::GraphqlConfig, state::AppState, store::TodoStore},
    services::todos::TodoService,
};

mod mutation;
mod query;

pub use mutation::{CreateTodoInput, MutationRoot, UpdateTodoInput};
pub use query::QueryRoot;

pub type TodoSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(store: Arc<dyn TodoStore>, settings: &GraphqlConfig) -> TodoSchema {
    let mut builder = Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(TodoService::new(store))
        .data(settings.clone())
        .extension(Tracing);

    if let Some(depth) = settings.depth_limit {
        builder = builder.limit_depth(depth);
    }
    if let Some(complexity) = settings.complexity_limit {
        builder = builder.limit_complexity(complexity);
    }

    builder.finish()
}

pub fn router(state: Arc<AppState>) -> Router {
    let schema = build_schema(Arc::clone(&state.store), &state.config.graphql);

    Router::new()
        .route(
            &state.config.graphql.path,
            get(graphql_get).post(graphql_post),
        )
        .route_layer(Extension(schema))
        .route_layer(middleware::from_fn_with_state(state, require_ready))
}

async fn graphql_post(
    Extension(schema): Extension<TodoSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphql_get(
    Extension(schema): Extension<TodoSchema>,
    Extension(state): Extension<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Response {
    let settings = &state.config.graphql;
    match query.filter(|raw| !raw.is_empty()) {
        Some(raw) => match parse_query_string(&raw) {
            Ok(request) if !is_query_operation(&request) => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, "POST")],
                Json(serde_json::json!({ "error": "only queries may be sent with GET" })),
            )
                .into_response(),
            Ok(request) => GraphQLResponse::from(schema.execute(request).await).into_response(),
            Err(err) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": err.to_string() })),
            )
                .into_response(),
        },
        None if settings.playground => {
            Html(GraphiQLSource::build().endpoint(&settings.path).finish()).into_response()
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "missing query" })),
        )
            .into_response(),
    }
}

/// Whether the operation a GET request selects is a query. Documents that fail to
/// parse, or name an unknown operation, are left to the executor to report.
fn is_query_operation(request: &async_graphql::Request) -> bool {
    let Ok(document) = parse_query(&request.query) else {
        return true;
    };
    match &document.operations {
        DocumentOperations::Single(operation) => operation.node.ty == OperationType::Query,
        DocumentOperations::Multiple(operations) => match &request.operation_name {
            Some(name) => operations
                .get(name.as_str())
                .map_or(true, |operation| operation.node.ty == OperationType::Query),
            None => operations
                .values()
                .all(|operation| operation.node.ty == OperationType::Query),
        },
    }
}

/// Requests arriving before the store is connected are not routed to the executor.
async fn require_ready(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.is_ready() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": "not_ready" })),
        )
            .into_response();
    }
    next.run(request).await
}
