use crate::client::{StoreError, TaskStore};
use crate::domain;
use crate::domain::task::TaskQuery;
use crate::dto;
use chrono::Utc;
use std::collections::HashMap;

/// Cached listings are keyed by the full query plus whether the session was
/// authenticated, so guest pages never leak into a logged-in session.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct CacheKey {
    query: TaskQuery,
    authenticated: bool,
}

#[derive(Clone)]
struct Slot {
    page: dto::task::TaskPage,
    stale: bool,
}

/// Client-side cache over task listings with optimistic mutations.
///
/// Mutations patch every cached page immediately, then settle against the
/// store. Settlement marks all of the session's pages stale so the next
/// listing refetches authoritative data, whether the store accepted the
/// mutation or not; on failure the optimistic patch is first rolled back to
/// the pre-mutation snapshot. Taking `&mut self` for every operation
/// serializes mutations, so a settlement can never interleave with another
/// optimistic patch.
pub struct TaskListCache {
    slots: HashMap<CacheKey, Slot>,
    next_provisional_id: i64,
}

impl Default for TaskListCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskListCache {
    pub fn new() -> TaskListCache {
        TaskListCache {
            slots: HashMap::new(),
            next_provisional_id: 0,
        }
    }

    /// Drops every cached page, e.g. when the session changes on login or
    /// logout.
    pub fn invalidate_all(&mut self) {
        self.slots.clear();
    }

    /// Returns the cached page for the query if it is fresh, otherwise
    /// fetches from the store and caches the result.
    pub async fn list(
        &mut self,
        params: &dto::task::TaskListParams,
        store: &impl TaskStore,
    ) -> Result<dto::task::TaskPage, StoreError> {
        let key = CacheKey {
            query: TaskQuery::from(params.clone()),
            authenticated: store.is_authenticated(),
        };

        if let Some(slot) = self.slots.get(&key) {
            if !slot.stale {
                return Ok(slot.page.clone());
            }
        }

        let page = store.list(params).await?;
        self.slots.insert(
            key,
            Slot {
                page: page.clone(),
                stale: false,
            },
        );

        Ok(page)
    }

    pub async fn create(
        &mut self,
        new_task: &dto::task::NewTask,
        store: &impl TaskStore,
    ) -> Result<dto::task::Task, StoreError> {
        let authenticated = store.is_authenticated();
        let snapshot = self.slots.clone();

        // Provisional IDs are negative so they can never collide with a real task
        self.next_provisional_id -= 1;
        let now = Utc::now();
        let provisional = dto::task::Task {
            id: self.next_provisional_id,
            user_id: 0,
            title: new_task.title.clone(),
            description: new_task.description.clone(),
            completed: new_task.completed.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        self.patch_created(authenticated, &provisional);

        match store.create(new_task).await {
            Ok(created) => {
                self.mark_stale(authenticated);
                Ok(created)
            }
            Err(store_err) => {
                self.slots = snapshot;
                self.mark_stale(authenticated);
                Err(store_err)
            }
        }
    }

    pub async fn update(
        &mut self,
        task_id: i64,
        update: &dto::task::UpdateTask,
        store: &impl TaskStore,
    ) -> Result<dto::task::Task, StoreError> {
        let authenticated = store.is_authenticated();
        let snapshot = self.slots.clone();

        self.patch_updated(authenticated, task_id, update);

        match store.update(task_id, update).await {
            Ok(updated) => {
                self.mark_stale(authenticated);
                Ok(updated)
            }
            Err(store_err) => {
                self.slots = snapshot;
                self.mark_stale(authenticated);
                Err(store_err)
            }
        }
    }

    pub async fn delete(
        &mut self,
        task_id: i64,
        store: &impl TaskStore,
    ) -> Result<(), StoreError> {
        let authenticated = store.is_authenticated();
        let snapshot = self.slots.clone();

        self.patch_deleted(authenticated, task_id);

        match store.delete(task_id).await {
            Ok(()) => {
                self.mark_stale(authenticated);
                Ok(())
            }
            Err(store_err) => {
                self.slots = snapshot;
                self.mark_stale(authenticated);
                Err(store_err)
            }
        }
    }

    fn session_slots(
        &mut self,
        authenticated: bool,
    ) -> impl Iterator<Item = (&CacheKey, &mut Slot)> {
        self.slots
            .iter_mut()
            .filter(move |(key, _)| key.authenticated == authenticated)
    }

    fn mark_stale(&mut self, authenticated: bool) {
        for (_, slot) in self.session_slots(authenticated) {
            slot.stale = true;
        }
    }

    fn patch_created(&mut self, authenticated: bool, created: &dto::task::Task) {
        let domain_task = domain::task::Task::from(created.clone());

        for (key, slot) in self.session_slots(authenticated) {
            if !domain::task::matches_query(&domain_task, &key.query) {
                continue;
            }

            slot.page.pagination = recount(&slot.page.pagination, 1);
            if key.query.page == 1 {
                slot.page.tasks.insert(0, created.clone());
                slot.page.tasks.truncate(key.query.limit as usize);
            }
        }
    }

    fn patch_updated(&mut self, authenticated: bool, task_id: i64, update: &dto::task::UpdateTask) {
        for (_, slot) in self.session_slots(authenticated) {
            let Some(task) = slot.page.tasks.iter_mut().find(|task| task.id == task_id) else {
                continue;
            };

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
        }
    }

    fn patch_deleted(&mut self, authenticated: bool, task_id: i64) {
        for (_, slot) in self.session_slots(authenticated) {
            let task_count = slot.page.tasks.len();
            slot.page.tasks.retain(|task| task.id != task_id);
            if slot.page.tasks.len() < task_count {
                slot.page.pagination = recount(&slot.page.pagination, -1);
            }
        }
    }
}

fn recount(pagination: &dto::task::Pagination, delta: i64) -> dto::task::Pagination {
    let total = pagination.total.saturating_add_signed(delta);

    domain::task::Pagination::compute(pagination.page, pagination.limit, total).into()
}
