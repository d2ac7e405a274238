use crate::domain;
use crate::domain::task::{NewTask, SortField, SortOrder, StatusFilter, Task, TaskQuery, UpdateTask};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder, query, query_as};

const TASK_COLUMNS: &str = "t.id, t.user_id, t.title, t.description, t.completed, t.created_at, t.updated_at";

pub struct DbTaskReader;

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    user_id: i64,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(value: TaskRow) -> Self {
        Task {
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

/// Appends the WHERE clause shared by the page fetch and the count query so
/// both always agree on which tasks match.
fn push_task_filters(builder: &mut QueryBuilder<'_, Postgres>, user_id: i64, task_query: &TaskQuery) {
    builder.push(" WHERE t.user_id = ").push_bind(user_id);

    if let Some(ref search) = task_query.search {
        let pattern = format!("%{search}%");
        builder
            .push(" AND (t.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR t.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    match task_query.status {
        Some(StatusFilter::Completed) => {
            builder.push(" AND t.completed = TRUE");
        }
        Some(StatusFilter::Active) => {
            builder.push(" AND t.completed = FALSE");
        }
        None => {}
    }
}

impl domain::task::driven_ports::TaskReader for DbTaskReader {
    async fn page_for_user(
        &self,
        user_id: i64,
        task_query: &TaskQuery,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {TASK_COLUMNS} FROM task t"));
        push_task_filters(&mut builder, user_id, task_query);

        // Sort column and direction come from a fixed set, never from user input
        let sort_column = match task_query.sort_by {
            SortField::CreatedAt => "t.created_at",
            SortField::UpdatedAt => "t.updated_at",
            SortField::Title => "t.title",
        };
        let sort_direction = match task_query.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        // The ID tiebreaker keeps row order stable across the page and count
        // queries when sort values tie, so LIMIT/OFFSET pages never overlap
        builder
            .push(" ORDER BY ")
            .push(sort_column)
            .push(" ")
            .push(sort_direction)
            .push(", t.id ")
            .push(sort_direction);

        let offset = task_query.page.saturating_sub(1) as i64 * task_query.limit as i64;
        builder
            .push(" LIMIT ")
            .push_bind(task_query.limit as i64)
            .push(" OFFSET ")
            .push_bind(offset);

        let tasks: Vec<Task> = builder
            .build_query_as::<TaskRow>()
            .fetch_all(cxn.borrow_connection())
            .await
            .context("trying to fetch a page of tasks for a user")?
            .into_iter()
            .map(Task::from)
            .collect();

        Ok(tasks)
    }

    async fn count_for_user(
        &self,
        user_id: i64,
        task_query: &TaskQuery,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let mut builder = QueryBuilder::<Postgres>::new("SELECT count(*) FROM task t");
        push_task_filters(&mut builder, user_id, task_query);

        let total: i64 = builder
            .build_query_scalar()
            .fetch_one(cxn.borrow_connection())
            .await
            .context("trying to count a user's filtered tasks")?;

        Ok(total as u64)
    }

    async fn task_by_id(
        &self,
        task_id: i64,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let task_row = query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM task t WHERE t.id = $1"
        ))
        .bind(task_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch a task by ID")?;

        Ok(task_row.map(Task::from))
    }
}

pub struct DbTaskWriter;

impl domain::task::driven_ports::TaskWriter for DbTaskWriter {
    async fn create_task_for_user(
        &self,
        user_id: i64,
        new_task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Task, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let created_row = query_as::<_, TaskRow>(
            "INSERT INTO task(user_id, title, description, completed) \
             VALUES ($1, $2, $3, $4) \
             RETURNING task.id, task.user_id, task.title, task.description, \
                       task.completed, task.created_at, task.updated_at",
        )
        .bind(user_id)
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(new_task.completed)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new task into the database")?;

        Ok(created_row.into())
    }

    async fn update_task(
        &self,
        task_id: i64,
        update: &UpdateTask,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Task, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE task t SET updated_at = now()");
        if let Some(ref title) = update.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(ref description) = update.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(completed) = update.completed {
            builder.push(", completed = ").push_bind(completed);
        }
        builder
            .push(" WHERE t.id = ")
            .push_bind(task_id)
            .push(&format!(" RETURNING {TASK_COLUMNS}"));

        let updated_row = builder
            .build_query_as::<TaskRow>()
            .fetch_one(cxn.borrow_connection())
            .await
            .context("trying to update a task in the database")?;

        Ok(updated_row.into())
    }

    async fn delete_task(
        &self,
        task_id: i64,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        query("DELETE FROM task WHERE id = $1")
            .bind(task_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a task from the database")?;

        Ok(())
    }
}
