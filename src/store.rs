//! Task store: the local-cache/remote-store sync layer.
//!
//! The store exclusively owns the authoritative in-memory collection. The
//! local cache is read synchronously at startup so callers always have data
//! even with no network; a signed-in session triggers one full remote fetch
//! that replaces the whole collection (last-fetch-wins, not a merge). Every
//! mutation applies locally first, rewrites the full cache snapshot, then
//! propagates to the remote store fire-and-forget: failures are logged and
//! swallowed, with no retry and no rollback.
//!
//! The collection is replaced wholesale on every mutation rather than edited
//! in place, which keeps reads consistent under the single-threaded
//! event-driven flow this store is built for.

use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::LocalCache;
use crate::datekey::{day_key, parse_day_key};
use crate::error::{Error, Result};
use crate::remote::RemoteStore;
use crate::task::{now_ms, Category, Task, TaskKind, TaskPatch, WorkoutPart};

/// Versioned local-cache key for the task collection snapshot.
pub const TASKS_CACHE_KEY: &str = "taskpulse.tasks.v1";

/// Sync lifecycle of the task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Nothing loaded yet
    Unloaded,
    /// Local cache read; in-memory collection is authoritative
    LocalCacheLoaded,
    /// Session detected, full remote fetch in flight
    RemoteSyncing,
    /// Remote fetch replaced the collection
    RemoteSynced,
    /// Remote fetch failed; local data kept and flagged stale
    SyncFailed,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub text: String,
    pub category: Category,
    /// Day key; absent means unscheduled (due today)
    pub due_day: Option<String>,
    /// Meaningful only for the workout category; dropped otherwise
    pub workout_part: Option<WorkoutPart>,
}

/// The task collection and its sync machinery.
pub struct TaskStore<C: LocalCache, R: RemoteStore> {
    cache: C,
    remote: Arc<R>,
    tasks: Vec<Task>,
    session: Option<String>,
    state: SyncState,
}

impl<C: LocalCache, R: RemoteStore> TaskStore<C, R> {
    pub fn new(cache: C, remote: Arc<R>) -> Self {
        Self {
            cache,
            remote,
            tasks: Vec::new(),
            session: None,
            state: SyncState::Unloaded,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The full collection, newest-created first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks of one category, preserving collection order.
    pub fn tasks_in(&self, category: Category) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.category() == category)
            .cloned()
            .collect()
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// The signed-in user id, if a session is active.
    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    /// Resolve a full id or unique id prefix to a task id.
    pub fn resolve_id(&self, prefix: &str) -> Result<String> {
        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(prefix));
        let first = matches
            .next()
            .ok_or_else(|| Error::TaskNotFound(prefix.to_string()))?;
        if matches.next().is_some() {
            return Err(Error::AmbiguousTaskId(prefix.to_string()));
        }
        Ok(first.id.clone())
    }

    // =========================================================================
    // Load and session
    // =========================================================================

    /// Read the local cache snapshot. Best-effort: any read or parse failure
    /// leaves the collection empty. The in-memory collection is authoritative
    /// from this point on.
    pub fn load_local(&mut self) {
        self.tasks = self
            .cache
            .read(TASKS_CACHE_KEY)
            .and_then(|raw| serde_json::from_str::<Vec<Value>>(&raw).ok())
            .map(|docs| docs.iter().filter_map(decode_cached).collect())
            .unwrap_or_default();
        self.state = SyncState::LocalCacheLoaded;
        debug!(count = self.tasks.len(), "local cache loaded");
    }

    /// Start a session for `user`: one full remote fetch that replaces the
    /// whole in-memory collection, sorted newest-created first.
    ///
    /// This is last-fetch-wins: local-only tasks created before the session
    /// began are discarded. On fetch failure the local collection is kept,
    /// the state flags the failed sync and the error is returned.
    pub async fn begin_session(&mut self, user: impl Into<String>) -> Result<usize> {
        let user = user.into();
        self.state = SyncState::RemoteSyncing;

        match self.remote.fetch_tasks(&user).await {
            Ok(docs) => {
                let replaced = self.tasks.len();
                let mut tasks: Vec<Task> = docs
                    .iter()
                    .map(|(id, doc)| Task::from_persisted(id, doc))
                    .collect();
                tasks.sort_by(|left, right| right.created_at.cmp(&left.created_at));
                debug!(
                    user = %user,
                    fetched = tasks.len(),
                    replaced,
                    "remote fetch replaced local collection"
                );
                self.tasks = tasks;
                self.session = Some(user);
                self.state = SyncState::RemoteSynced;
                self.snapshot_cache();
                Ok(self.tasks.len())
            }
            Err(err) => {
                self.state = SyncState::SyncFailed;
                Err(Error::SyncFailed(err.to_string()))
            }
        }
    }

    /// Drop the session. No remote traffic; the local collection stays.
    pub fn end_session(&mut self) {
        self.session = None;
    }

    // =========================================================================
    // Mutations (optimistic local apply + fire-and-forget remote)
    // =========================================================================

    /// Create a task. The text must be non-empty after trimming; a due day,
    /// when given, must be a well-formed day key.
    pub fn add_task(&mut self, new: NewTask) -> Result<Task> {
        self.add_task_at(new, Local::now())
    }

    pub fn add_task_at(&mut self, new: NewTask, now: DateTime<Local>) -> Result<Task> {
        let text = new.text.trim().to_string();
        if text.is_empty() {
            return Err(Error::InvalidArgument(
                "task text cannot be empty".to_string(),
            ));
        }
        if let Some(key) = &new.due_day {
            if parse_day_key(key).is_none() {
                return Err(Error::InvalidArgument(format!(
                    "invalid day key '{key}', expected YYYY-MM-DD"
                )));
            }
        }

        let created_at = now.timestamp_millis();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            text,
            done: false,
            created_at,
            kind: TaskKind::from_parts(new.category, new.workout_part),
            done_at: None,
            done_day: None,
            due_day: new.due_day,
        };

        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(task.clone());
        next.extend(self.tasks.iter().cloned());
        self.tasks = next;
        self.snapshot_cache();

        if let Some(user) = self.session.clone() {
            let remote = Arc::clone(&self.remote);
            let id = task.id.clone();
            let doc = task.to_persisted(created_at);
            spawn_forget("upsert", async move {
                remote.upsert_task(&user, &id, doc).await
            });
        }

        Ok(task)
    }

    /// Flip a task's done state. Marking done stamps `done_at`/`done_day`
    /// from "now"; marking undone clears both.
    pub fn toggle_done(&mut self, id: &str) -> Result<Task> {
        self.toggle_done_at(id, Local::now())
    }

    pub fn toggle_done_at(&mut self, id: &str, now: DateTime<Local>) -> Result<Task> {
        let today_key = day_key(now.date_naive());
        let stamp = now.timestamp_millis();

        let mut toggled = None;
        let next: Vec<Task> = self
            .tasks
            .iter()
            .map(|t| {
                if t.id != id {
                    return t.clone();
                }
                let mut updated = t.clone();
                if updated.done {
                    updated.done = false;
                    updated.done_at = None;
                    updated.done_day = None;
                } else {
                    updated.done = true;
                    updated.done_at = Some(stamp);
                    updated.done_day = Some(today_key.clone());
                }
                toggled = Some(updated.clone());
                updated
            })
            .collect();

        let task = toggled.ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        self.tasks = next;
        self.snapshot_cache();

        if let Some(user) = self.session.clone() {
            let remote = Arc::clone(&self.remote);
            let id = task.id.clone();
            let patch = TaskPatch {
                done: Some(task.done),
                done_at: Some(task.done_at),
                done_day: Some(task.done_day.clone()),
                ..Default::default()
            };
            let fields = patch.into_fields(stamp);
            spawn_forget("patch", async move {
                remote.patch_task(&user, &id, fields).await
            });
        }

        Ok(task)
    }

    /// Delete one task.
    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        if !self.tasks.iter().any(|t| t.id == id) {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        self.tasks = self
            .tasks
            .iter()
            .filter(|t| t.id != id)
            .cloned()
            .collect();
        self.snapshot_cache();

        if let Some(user) = self.session.clone() {
            let remote = Arc::clone(&self.remote);
            let id = id.to_string();
            spawn_forget("delete", async move {
                remote.delete_task(&user, &id).await
            });
        }

        Ok(())
    }

    /// Remove every done task, optionally restricted to one category.
    /// Returns the number removed. Each remote delete is an independent
    /// fire-and-forget operation.
    pub fn clear_done(&mut self, category: Option<Category>) -> usize {
        let removed: Vec<String> = self
            .tasks
            .iter()
            .filter(|t| t.done && category.map_or(true, |c| t.category() == c))
            .map(|t| t.id.clone())
            .collect();
        if removed.is_empty() {
            return 0;
        }

        self.tasks = self
            .tasks
            .iter()
            .filter(|t| !removed.contains(&t.id))
            .cloned()
            .collect();
        self.snapshot_cache();

        if let Some(user) = self.session.clone() {
            for id in &removed {
                let remote = Arc::clone(&self.remote);
                let user = user.clone();
                let id = id.clone();
                spawn_forget("delete", async move {
                    remote.delete_task(&user, &id).await
                });
            }
        }

        removed.len()
    }

    // =========================================================================
    // Cache snapshot
    // =========================================================================

    /// Rewrite the full cache snapshot: a JSON array of persisted documents
    /// with the task id embedded. Write failures are logged, never fatal.
    fn snapshot_cache(&self) {
        let stamp = now_ms();
        let docs: Vec<Value> = self
            .tasks
            .iter()
            .map(|task| {
                let mut doc = task.to_persisted(stamp);
                if let Value::Object(map) = &mut doc {
                    map.insert("id".to_string(), Value::String(task.id.clone()));
                }
                doc
            })
            .collect();

        match serde_json::to_string(&docs) {
            Ok(raw) => {
                if let Err(err) = self.cache.write(TASKS_CACHE_KEY, &raw) {
                    warn!(error = %err, "cache snapshot failed");
                }
            }
            Err(err) => warn!(error = %err, "cache snapshot encode failed"),
        }
    }
}

fn decode_cached(doc: &Value) -> Option<Task> {
    let id = doc.get("id").and_then(Value::as_str)?;
    Some(Task::from_persisted(id, doc))
}

/// Spawn a remote write and swallow its outcome. Failures degrade to "local
/// state diverges from remote" until the next full fetch.
fn spawn_forget<F>(op: &'static str, fut: F)
where
    F: std::future::Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = fut.await {
            warn!(op, error = %err, "remote write failed; keeping local state");
        }
    });
}
