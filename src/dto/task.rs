use crate::domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Payload for creating a task. Completion state is optional and defaults to
/// incomplete.
#[derive(Serialize, Deserialize, Validate, Clone, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    #[schema(example = "Buy milk")]
    pub title: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl From<NewTask> for domain::task::NewTask {
    fn from(value: NewTask) -> Self {
        domain::task::NewTask {
            title: value.title,
            description: value.description,
            completed: value.completed.unwrap_or(false),
        }
    }
}

/// Payload for partially updating a task. Absent fields are left untouched.
#[derive(Serialize, Deserialize, Validate, Clone, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl From<UpdateTask> for domain::task::UpdateTask {
    fn from(value: UpdateTask) -> Self {
        domain::task::UpdateTask {
            title: value.title,
            description: value.description,
            completed: value.completed,
        }
    }
}

/// A task as it appears on the wire.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::task::Task> for Task {
    fn from(value: domain::task::Task) -> Self {
        Task {
            id: value.id,
            user_id: value.owner_user_id,
            title: value.title,
            description: value.description,
            completed: value.completed,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<Task> for domain::task::Task {
    fn from(value: Task) -> Self {
        domain::task::Task {
            id: value.id,
            owner_user_id: value.user_id,
            title: value.title,
            description: value.description,
            completed: value.completed,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl From<domain::task::Pagination> for Pagination {
    fn from(value: domain::task::Pagination) -> Self {
        Pagination {
            page: value.page,
            limit: value.limit,
            total: value.total,
            total_pages: value.total_pages,
        }
    }
}

/// One page of tasks plus pagination info describing the filtered whole.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub pagination: Pagination,
}

impl From<domain::task::TaskPage> for TaskPage {
    fn from(value: domain::task::TaskPage) -> Self {
        TaskPage {
            tasks: value.tasks.into_iter().map(Task::from).collect(),
            pagination: value.pagination.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusParam {
    Completed,
    Active,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortByParam {
    CreatedAt,
    UpdatedAt,
    Title,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderParam {
    Asc,
    Desc,
}

/// Query string parameters accepted by the task listing endpoint. Every field
/// is optional; absent fields fall back to the listing defaults.
#[derive(Serialize, Deserialize, Validate, Clone, Debug, Default, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TaskListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortByParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderParam>,
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[validate(range(min = 1, message = "Limit must be at least 1"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl From<TaskListParams> for domain::task::TaskQuery {
    fn from(value: TaskListParams) -> Self {
        let defaults = domain::task::TaskQuery::default();

        domain::task::TaskQuery {
            search: value.search,
            status: value.status.map(|status| match status {
                StatusParam::Completed => domain::task::StatusFilter::Completed,
                StatusParam::Active => domain::task::StatusFilter::Active,
            }),
            sort_by: match value.sort_by {
                Some(SortByParam::CreatedAt) => domain::task::SortField::CreatedAt,
                Some(SortByParam::UpdatedAt) => domain::task::SortField::UpdatedAt,
                Some(SortByParam::Title) => domain::task::SortField::Title,
                None => defaults.sort_by,
            },
            order: match value.order {
                Some(OrderParam::Asc) => domain::task::SortOrder::Asc,
                Some(OrderParam::Desc) => domain::task::SortOrder::Desc,
                None => defaults.order,
            },
            page: value.page.unwrap_or(defaults.page),
            limit: value.limit.unwrap_or(defaults.limit),
        }
    }
}
