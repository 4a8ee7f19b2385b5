//! Remote document store boundary.
//!
//! The hosted backend keeps, per user, a sub-collection of task documents
//! keyed by task id plus a single settings document holding the weekly plan.
//! The core never relies on server-side queries: it fetches the whole
//! collection and filters/aggregates client-side, so the trait surface is
//! just fetch-all, merge-upsert, field-patch, delete and the settings pair.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Per-user remote document store.
///
/// Implementations are shared across fire-and-forget write tasks, hence the
/// `Send + Sync + 'static` bound and the explicitly `Send` futures.
pub trait RemoteStore: Send + Sync + 'static {
    /// Fetch every task document for a user as `(id, document)` pairs.
    fn fetch_tasks(&self, user: &str)
        -> impl Future<Output = Result<Vec<(String, Value)>>> + Send;

    /// Create or merge a full task document.
    fn upsert_task(
        &self,
        user: &str,
        id: &str,
        doc: Value,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Merge a partial field update into a task document.
    fn patch_task(
        &self,
        user: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a task document.
    fn delete_task(&self, user: &str, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Read the user's settings document, if any.
    fn read_settings(&self, user: &str) -> impl Future<Output = Result<Option<Value>>> + Send;

    /// Create or merge the user's settings document.
    fn write_settings(&self, user: &str, doc: Value)
        -> impl Future<Output = Result<()>> + Send;
}

/// In-memory remote store.
///
/// Serves as the test double and as the placeholder backend for signed-out
/// CLI runs (where it is never touched). The failure switch simulates an
/// unreachable backend for swallow-and-continue tests.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    state: Mutex<MemoryState>,
    failing: AtomicBool,
}

#[derive(Debug, Default)]
struct MemoryState {
    tasks: HashMap<String, BTreeMap<String, Value>>,
    settings: HashMap<String, Value>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Seed a task document directly, bypassing the failure switch.
    pub fn seed_task(&self, user: &str, id: &str, doc: Value) {
        let mut state = self.lock();
        state
            .tasks
            .entry(user.to_string())
            .or_default()
            .insert(id.to_string(), doc);
    }

    pub fn task_count(&self, user: &str) -> usize {
        self.lock().tasks.get(user).map_or(0, BTreeMap::len)
    }

    pub fn task_doc(&self, user: &str, id: &str) -> Option<Value> {
        self.lock()
            .tasks
            .get(user)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    pub fn settings_doc(&self, user: &str) -> Option<Value> {
        self.lock().settings.get(user).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(Error::RemoteUnavailable("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

fn merge_into(target: &mut Value, fields: &Map<String, Value>) {
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        for (key, value) in fields {
            map.insert(key.clone(), value.clone());
        }
    }
}

impl RemoteStore for MemoryRemote {
    async fn fetch_tasks(&self, user: &str) -> Result<Vec<(String, Value)>> {
        self.check()?;
        let state = self.lock();
        Ok(state
            .tasks
            .get(user)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upsert_task(&self, user: &str, id: &str, doc: Value) -> Result<()> {
        self.check()?;
        let mut state = self.lock();
        let entry = state
            .tasks
            .entry(user.to_string())
            .or_default()
            .entry(id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(fields) = doc {
            merge_into(entry, &fields);
        }
        Ok(())
    }

    async fn patch_task(&self, user: &str, id: &str, fields: Map<String, Value>) -> Result<()> {
        self.check()?;
        let mut state = self.lock();
        let entry = state
            .tasks
            .entry(user.to_string())
            .or_default()
            .entry(id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        merge_into(entry, &fields);
        Ok(())
    }

    async fn delete_task(&self, user: &str, id: &str) -> Result<()> {
        self.check()?;
        let mut state = self.lock();
        if let Some(docs) = state.tasks.get_mut(user) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn read_settings(&self, user: &str) -> Result<Option<Value>> {
        self.check()?;
        Ok(self.lock().settings.get(user).cloned())
    }

    async fn write_settings(&self, user: &str, doc: Value) -> Result<()> {
        self.check()?;
        let mut state = self.lock();
        let entry = state
            .settings
            .entry(user.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(fields) = doc {
            merge_into(entry, &fields);
        }
        Ok(())
    }
}
