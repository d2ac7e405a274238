pub mod cache;
pub mod local;
pub mod remote;

use crate::dto;
use thiserror::Error;

/// Failures surfaced by a task store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("the requested task does not exist")]
    NotFound,
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Backing store for task data. The rest of the client code only talks to
/// this trait, so the remote API and local guest storage are interchangeable.
pub trait TaskStore {
    /// Whether this store operates against an authenticated session.
    fn is_authenticated(&self) -> bool;

    async fn list(&self, params: &dto::task::TaskListParams)
    -> Result<dto::task::TaskPage, StoreError>;

    async fn create(&self, new_task: &dto::task::NewTask) -> Result<dto::task::Task, StoreError>;

    async fn update(
        &self,
        task_id: i64,
        update: &dto::task::UpdateTask,
    ) -> Result<dto::task::Task, StoreError>;

    async fn delete(&self, task_id: i64) -> Result<(), StoreError>;
}

/// The active session's task store: the remote API when logged in, local
/// guest storage otherwise.
pub enum SessionStore {
    Remote(remote::RemoteTaskStore),
    Local(local::GuestTaskStore),
}

impl TaskStore for SessionStore {
    fn is_authenticated(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    async fn list(
        &self,
        params: &dto::task::TaskListParams,
    ) -> Result<dto::task::TaskPage, StoreError> {
        match self {
            Self::Remote(store) => store.list(params).await,
            Self::Local(store) => store.list(params).await,
        }
    }

    async fn create(&self, new_task: &dto::task::NewTask) -> Result<dto::task::Task, StoreError> {
        match self {
            Self::Remote(store) => store.create(new_task).await,
            Self::Local(store) => store.create(new_task).await,
        }
    }

    async fn update(
        &self,
        task_id: i64,
        update: &dto::task::UpdateTask,
    ) -> Result<dto::task::Task, StoreError> {
        match self {
            Self::Remote(store) => store.update(task_id, update).await,
            Self::Local(store) => store.update(task_id, update).await,
        }
    }

    async fn delete(&self, task_id: i64) -> Result<(), StoreError> {
        match self {
            Self::Remote(store) => store.delete(task_id).await,
            Self::Local(store) => store.delete(task_id).await,
        }
    }
}
