pub mod task;
pub mod user;

use utoipa::OpenApi;

/// Collects the OpenAPI schemas of the API's data transfer objects
#[derive(OpenApi)]
#[openapi(components(schemas(
    user::RegisterUser,
    user::LoginUser,
    user::AuthenticatedUser,
    user::LoginData,
    task::NewTask,
    task::UpdateTask,
    task::Task,
    task::Pagination,
    task::TaskPage,
    task::StatusParam,
    task::SortByParam,
    task::OrderParam,
)))]
pub struct OpenApiSchemas;
