pub mod auth;
pub mod docs;
pub mod security;
pub mod tasks;

#[cfg(test)]
pub mod test_util;

use crate::SharedData;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

/// Assembles every route the application serves.
pub fn application_router() -> Router<Arc<SharedData>> {
    Router::new()
        .route("/", get(|| async { "Task Manager API is running" }))
        .nest("/auth", auth::auth_routes())
        .nest("/tasks", tasks::task_routes())
        .merge(docs::build_documentation())
}
