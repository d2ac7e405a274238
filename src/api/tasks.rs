use crate::api::security::Authenticated;
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{
    ApiResponse, GenericErrorResponse, Json, Query, ValidationErrorResponse, error_response,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::{delete, get, post, put};
use domain::task::driving_ports::{TaskMutationError, TaskPort};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(list_tasks, create_task, update_task, delete_task))]
pub struct TasksApi;

/// Builds a router for the task endpoints. Every route requires a valid
/// session token.
pub fn task_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(
                |State(app_state): AppState,
                 Authenticated(user_id): Authenticated,
                 Query(params): Query<dto::task::TaskListParams>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    list_tasks(user_id, params, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/",
            post(
                |State(app_state): AppState,
                 Authenticated(user_id): Authenticated,
                 Json(new_task): Json<dto::task::NewTask>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    create_task(user_id, new_task, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/:task_id",
            put(
                |State(app_state): AppState,
                 Authenticated(user_id): Authenticated,
                 Path(task_id): Path<i64>,
                 Json(task_update): Json<dto::task::UpdateTask>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    update_task(task_id, user_id, task_update, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/:task_id",
            delete(
                |State(app_state): AppState,
                 Authenticated(user_id): Authenticated,
                 Path(task_id): Path<i64>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    delete_task(task_id, user_id, &mut ext_cxn, &task_service).await
                },
            ),
        )
}

/// Maps a failed task mutation onto the API's error responses.
fn mutation_error_response(mutation_err: TaskMutationError) -> ErrorResponse {
    match mutation_err {
        TaskMutationError::NotFound => {
            error_response(StatusCode::NOT_FOUND, "Task not found").into()
        }
        TaskMutationError::NotOwner => {
            error_response(StatusCode::UNAUTHORIZED, "Unauthorized").into()
        }
        TaskMutationError::PortError(port_err) => {
            error!("Task mutation failure: {port_err}");
            GenericErrorResponse(port_err).into()
        }
    }
}

/// Lists the authenticated user's tasks with filtering, sorting, and
/// pagination applied.
#[utoipa::path(
    get,
    path = "/tasks",
    tag = "tasks",
    params(crate::dto::task::TaskListParams),
    responses(
        (status = 200, description = "One page of the user's tasks", body = crate::dto::task::TaskPage),
        (status = 401, description = "Missing or invalid session token", body = crate::routing_utils::ErrorBody),
    ),
)]
async fn list_tasks(
    user_id: i64,
    params: dto::task::TaskListParams,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<ApiResponse<dto::task::TaskPage>, ErrorResponse> {
    info!("Listing tasks for user {user_id}");
    params.validate().map_err(ValidationErrorResponse::from)?;

    let task_query = domain::task::TaskQuery::from(params);
    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};

    let task_page = task_service
        .tasks_for_user(user_id, &task_query, &mut *ext_cxn, &task_reader)
        .await
        .map_err(|list_err| {
            error!("Task listing failure: {list_err}");
            GenericErrorResponse(list_err)
        })?;

    Ok(ApiResponse::success(
        "Tasks retrieved successfully",
        task_page.into(),
    ))
}

/// Creates a task owned by the authenticated user.
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "tasks",
    request_body = crate::dto::task::NewTask,
    responses(
        (status = 201, description = "Task created", body = crate::dto::task::Task),
        (status = 400, description = "Invalid task payload", body = crate::routing_utils::ErrorBody),
        (status = 401, description = "Missing or invalid session token", body = crate::routing_utils::ErrorBody),
    ),
)]
async fn create_task(
    user_id: i64,
    new_task: dto::task::NewTask,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<(StatusCode, ApiResponse<dto::task::Task>), ErrorResponse> {
    info!("Creating task for user {user_id}");
    new_task.validate().map_err(ValidationErrorResponse::from)?;

    let domain_new_task = domain::task::NewTask::from(new_task);
    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};

    let created_task = task_service
        .create_task(user_id, &domain_new_task, &mut *ext_cxn, &task_writer)
        .await
        .map_err(|create_err| {
            error!("Task creation failure: {create_err}");
            GenericErrorResponse(create_err)
        })?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::success("Task created successfully", created_task.into()),
    ))
}

/// Applies a partial update to one of the authenticated user's tasks.
#[utoipa::path(
    put,
    path = "/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = i64, Path, description = "ID of the task to update")),
    request_body = crate::dto::task::UpdateTask,
    responses(
        (status = 200, description = "Task updated", body = crate::dto::task::Task),
        (status = 400, description = "Invalid task payload", body = crate::routing_utils::ErrorBody),
        (status = 401, description = "Missing token or task owned by another user", body = crate::routing_utils::ErrorBody),
        (status = 404, description = "No task with the given ID", body = crate::routing_utils::ErrorBody),
    ),
)]
async fn update_task(
    task_id: i64,
    user_id: i64,
    task_update: dto::task::UpdateTask,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<ApiResponse<dto::task::Task>, ErrorResponse> {
    info!("Updating task {task_id} for user {user_id}");
    task_update
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let domain_update = domain::task::UpdateTask::from(task_update);
    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};
    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};

    let updated_task = task_service
        .update_task(
            task_id,
            user_id,
            &domain_update,
            &mut *ext_cxn,
            &task_reader,
            &task_writer,
        )
        .await
        .map_err(mutation_error_response)?;

    Ok(ApiResponse::success(
        "Task updated successfully",
        updated_task.into(),
    ))
}

/// Deletes one of the authenticated user's tasks.
#[utoipa::path(
    delete,
    path = "/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = i64, Path, description = "ID of the task to delete")),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 401, description = "Missing token or task owned by another user", body = crate::routing_utils::ErrorBody),
        (status = 404, description = "No task with the given ID", body = crate::routing_utils::ErrorBody),
    ),
)]
async fn delete_task(
    task_id: i64,
    user_id: i64,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<ApiResponse<()>, ErrorResponse> {
    info!("Deleting task {task_id} for user {user_id}");
    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};
    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};

    task_service
        .delete_task(task_id, user_id, &mut *ext_cxn, &task_reader, &task_writer)
        .await
        .map_err(mutation_error_response)?;

    Ok(ApiResponse::success("Task deleted successfully", ()))
}
