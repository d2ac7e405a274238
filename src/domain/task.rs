use anyhow::Context;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::external_connections::ExternalConnectivity;

/// A task owned by a single user. The owner is fixed at creation and never
/// changes afterwards.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Task {
    pub id: i64,
    pub owner_user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a task.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// A partial update to a task. Fields left as [None] keep their current value.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum StatusFilter {
    Completed,
    Active,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter, sort, and pagination parameters for a task listing. Derives [Hash]
/// and [Eq] so a query can key the client-side list cache.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TaskQuery {
    pub search: Option<String>,
    pub status: Option<StatusFilter>,
    pub sort_by: SortField,
    pub order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl Default for TaskQuery {
    fn default() -> Self {
        TaskQuery {
            search: None,
            status: None,
            sort_by: SortField::default(),
            order: SortOrder::default(),
            page: 1,
            limit: 10,
        }
    }
}

/// Pagination info describing the full filtered set a page was drawn from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    /// Computes pagination metadata given the pre-pagination filtered count.
    pub fn compute(page: u32, limit: u32, total: u64) -> Pagination {
        Pagination {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit.max(1) as u64) as u32,
        }
    }
}

/// One page of a user's task list.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub pagination: Pagination,
}

/// Whether a task passes a query's search and status filters.
pub(crate) fn matches_query(task: &Task, query: &TaskQuery) -> bool {
    if let Some(ref search) = query.search {
        let needle = search.to_lowercase();
        let title_hit = task.title.to_lowercase().contains(&needle);
        let desc_hit = task
            .description
            .as_ref()
            .is_some_and(|desc| desc.to_lowercase().contains(&needle));
        if !title_hit && !desc_hit {
            return false;
        }
    }

    match query.status {
        Some(StatusFilter::Completed) => task.completed,
        Some(StatusFilter::Active) => !task.completed,
        None => true,
    }
}

/// Applies a [TaskQuery] to an in-memory task list: filter, then sort, then
/// paginate. This is the reference semantics the database adapter mirrors in
/// SQL, and the guest-mode store uses it directly so both modes behave
/// identically.
pub fn page_of(tasks: &[Task], query: &TaskQuery) -> TaskPage {
    let mut filtered: Vec<Task> = tasks
        .iter()
        .filter(|task| matches_query(task, query))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| {
        let ordering = match query.sort_by {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Title => a.title.cmp(&b.title),
        };
        match query.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let total = filtered.len() as u64;
    let skip = query.page.saturating_sub(1) as usize * query.limit as usize;
    let page_tasks: Vec<Task> = filtered
        .into_iter()
        .skip(skip)
        .take(query.limit as usize)
        .collect();

    TaskPage {
        tasks: page_tasks,
        pagination: Pagination::compute(query.page, query.limit, total),
    }
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader: Sync {
        /// Fetches the requested page of a user's tasks under the given query.
        async fn page_for_user(
            &self,
            user_id: i64,
            query: &TaskQuery,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error>;

        /// Counts the user's tasks matching the query's filters, ignoring
        /// pagination.
        async fn count_for_user(
            &self,
            user_id: i64,
            query: &TaskQuery,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        async fn task_by_id(
            &self,
            task_id: i64,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error>;
    }

    pub trait TaskWriter: Sync {
        async fn create_task_for_user(
            &self,
            user_id: i64,
            new_task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Task, anyhow::Error>;

        /// Applies a partial update and refreshes the task's updated timestamp.
        async fn update_task(
            &self,
            task_id: i64,
            update: &UpdateTask,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Task, anyhow::Error>;

        async fn delete_task(
            &self,
            task_id: i64,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    #[derive(Debug, Error)]
    pub enum TaskMutationError {
        #[error("the specified task does not exist")]
        NotFound,
        #[error("the task belongs to another user")]
        NotOwner,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait TaskPort {
        async fn tasks_for_user(
            &self,
            user_id: i64,
            query: &TaskQuery,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<TaskPage, anyhow::Error>;

        async fn create_task(
            &self,
            user_id: i64,
            new_task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, anyhow::Error>;

        async fn update_task(
            &self,
            task_id: i64,
            user_id: i64,
            update: &UpdateTask,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskMutationError>;

        async fn delete_task(
            &self,
            task_id: i64,
            user_id: i64,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), TaskMutationError>;
    }
}

/// Single ownership gate shared by every mutating operation: the task must
/// exist and belong to the acting user.
fn authorize_owner(
    maybe_task: Option<Task>,
    user_id: i64,
) -> Result<Task, driving_ports::TaskMutationError> {
    match maybe_task {
        None => Err(driving_ports::TaskMutationError::NotFound),
        Some(task) if task.owner_user_id != user_id => {
            Err(driving_ports::TaskMutationError::NotOwner)
        }
        Some(task) => Ok(task),
    }
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn tasks_for_user(
        &self,
        user_id: i64,
        query: &TaskQuery,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl driven_ports::TaskReader,
    ) -> Result<TaskPage, anyhow::Error> {
        let total = task_read
            .count_for_user(user_id, query, &mut *ext_cxn)
            .await
            .context("counting a user's filtered tasks")?;
        let tasks = task_read
            .page_for_user(user_id, query, &mut *ext_cxn)
            .await
            .context("fetching a page of a user's tasks")?;

        Ok(TaskPage {
            tasks,
            pagination: Pagination::compute(query.page, query.limit, total),
        })
    }

    async fn create_task(
        &self,
        user_id: i64,
        new_task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl driven_ports::TaskWriter,
    ) -> Result<Task, anyhow::Error> {
        let created = task_write
            .create_task_for_user(user_id, new_task, &mut *ext_cxn)
            .await
            .context("creating a task")?;

        Ok(created)
    }

    async fn update_task(
        &self,
        task_id: i64,
        user_id: i64,
        update: &UpdateTask,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl driven_ports::TaskReader,
        task_write: &impl driven_ports::TaskWriter,
    ) -> Result<Task, driving_ports::TaskMutationError> {
        let existing_task = task_read
            .task_by_id(task_id, &mut *ext_cxn)
            .await
            .context("looking up a task before update")?;
        authorize_owner(existing_task, user_id)?;

        let updated = task_write
            .update_task(task_id, update, &mut *ext_cxn)
            .await
            .context("updating a task")?;

        Ok(updated)
    }

    async fn delete_task(
        &self,
        task_id: i64,
        user_id: i64,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl driven_ports::TaskReader,
        task_write: &impl driven_ports::TaskWriter,
    ) -> Result<(), driving_ports::TaskMutationError> {
        let existing_task = task_read
            .task_by_id(task_id, &mut *ext_cxn)
            .await
            .context("looking up a task before delete")?;
        authorize_owner(existing_task, user_id)?;

        task_write
            .delete_task(task_id, &mut *ext_cxn)
            .await
            .context("deleting a task")?;

        Ok(())
    }
}
