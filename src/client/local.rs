use crate::client::{StoreError, TaskStore};
use crate::domain;
use crate::dto;
use anyhow::Context;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

/// Owner recorded on tasks created while browsing as a guest.
const GUEST_USER_ID: i64 = 0;

/// Task store for guest sessions. Tasks live in a JSON file on disk, and
/// listings run through the same filter/sort/paginate semantics the server
/// applies, so switching to an account does not change listing behavior.
pub struct GuestTaskStore {
    storage_path: PathBuf,
}

impl GuestTaskStore {
    pub fn new(storage_path: PathBuf) -> GuestTaskStore {
        GuestTaskStore { storage_path }
    }

    fn read_tasks(&self) -> Result<Vec<dto::task::Task>, StoreError> {
        if !self.storage_path.exists() {
            return Ok(Vec::new());
        }

        let raw_tasks = fs::read_to_string(&self.storage_path)
            .context("reading the guest task file")?;
        let tasks = serde_json::from_str(&raw_tasks)
            .context("parsing the guest task file")?;

        Ok(tasks)
    }

    fn write_tasks(&self, tasks: &[dto::task::Task]) -> Result<(), StoreError> {
        let serialized =
            serde_json::to_string_pretty(tasks).context("serializing guest tasks")?;
        fs::write(&self.storage_path, serialized).context("writing the guest task file")?;

        Ok(())
    }
}

impl TaskStore for GuestTaskStore {
    fn is_authenticated(&self) -> bool {
        false
    }

    async fn list(
        &self,
        params: &dto::task::TaskListParams,
    ) -> Result<dto::task::TaskPage, StoreError> {
        let stored_tasks: Vec<domain::task::Task> = self
            .read_tasks()?
            .into_iter()
            .map(domain::task::Task::from)
            .collect();
        let query = domain::task::TaskQuery::from(params.clone());

        Ok(domain::task::page_of(&stored_tasks, &query).into())
    }

    async fn create(&self, new_task: &dto::task::NewTask) -> Result<dto::task::Task, StoreError> {
        let mut tasks = self.read_tasks()?;

        // IDs are creation timestamps, nudged forward on collision
        let mut task_id = Utc::now().timestamp_millis();
        while tasks.iter().any(|task| task.id == task_id) {
            task_id += 1;
        }

        let now = Utc::now();
        let created = dto::task::Task {
            id: task_id,
            user_id: GUEST_USER_ID,
            title: new_task.title.clone(),
            description: new_task.description.clone(),
            completed: new_task.completed.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        tasks.insert(0, created.clone());
        self.write_tasks(&tasks)?;

        Ok(created)
    }

    async fn update(
        &self,
        task_id: i64,
        update: &dto::task::UpdateTask,
    ) -> Result<dto::task::Task, StoreError> {
        let mut tasks = self.read_tasks()?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or(StoreError::NotFound)?;

        if let Some(ref title) = update.title {
            task.title = title.clone();
        }
        if let Some(ref description) = update.description {
            task.description = Some(description.clone());
        }
        if let Some(completed) = update.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();

        let updated = task.clone();
        self.write_tasks(&tasks)?;

        Ok(updated)
    }

    async fn delete(&self, task_id: i64) -> Result<(), StoreError> {
        let mut tasks = self.read_tasks()?;
        let task_count = tasks.len();
        tasks.retain(|task| task.id != task_id);
        if tasks.len() == task_count {
            return Err(StoreError::NotFound);
        }

        self.write_tasks(&tasks)?;

        Ok(())
    }
}
