//! Task record model and its persisted-document mapping.
//!
//! The remote store keeps one flat document per task, with optional fields
//! written as explicit nulls because partial updates cannot cleanly omit a
//! field. Deserialization never fails: missing or oddly-typed fields degrade
//! through coercion defaults so partially-written or legacy-shaped documents
//! still load.
//!
//! # Invariants
//!
//! - `done_at` and `done_day` are present iff `done` is true; both are set
//!   and cleared only by the store's toggle operation.
//! - `due_day` absent means "treat as due today" for filtering/grouping.
//! - A workout body part is expressible only for workout tasks ([`TaskKind`]
//!   is a sum type, so the wrong combination does not typecheck).

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};

/// Current time in milliseconds since the epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

// =============================================================================
// Category and workout part
// =============================================================================

/// Task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Daily,
    Workout,
    Work,
}

impl Default for Category {
    fn default() -> Self {
        Category::Daily
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Daily => write!(f, "daily"),
            Category::Workout => write!(f, "workout"),
            Category::Work => write!(f, "work"),
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Category::Daily),
            "workout" => Ok(Category::Workout),
            "work" => Ok(Category::Work),
            _ => Err(Error::InvalidArgument(format!(
                "Invalid category '{}'. Expected: daily, workout, work",
                s
            ))),
        }
    }
}

/// Body-part tag for workout tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutPart {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    Core,
}

impl Default for WorkoutPart {
    fn default() -> Self {
        WorkoutPart::Chest
    }
}

impl WorkoutPart {
    /// Human label ("Chest", "Back", ...).
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutPart::Chest => "Chest",
            WorkoutPart::Back => "Back",
            WorkoutPart::Legs => "Legs",
            WorkoutPart::Shoulders => "Shoulders",
            WorkoutPart::Arms => "Arms",
            WorkoutPart::Core => "Core",
        }
    }
}

impl fmt::Display for WorkoutPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkoutPart::Chest => write!(f, "chest"),
            WorkoutPart::Back => write!(f, "back"),
            WorkoutPart::Legs => write!(f, "legs"),
            WorkoutPart::Shoulders => write!(f, "shoulders"),
            WorkoutPart::Arms => write!(f, "arms"),
            WorkoutPart::Core => write!(f, "core"),
        }
    }
}

impl FromStr for WorkoutPart {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chest" => Ok(WorkoutPart::Chest),
            "back" => Ok(WorkoutPart::Back),
            "legs" => Ok(WorkoutPart::Legs),
            "shoulders" => Ok(WorkoutPart::Shoulders),
            "arms" => Ok(WorkoutPart::Arms),
            "core" => Ok(WorkoutPart::Core),
            _ => Err(Error::InvalidArgument(format!(
                "Invalid workout part '{}'. Expected: chest, back, legs, shoulders, arms, core",
                s
            ))),
        }
    }
}

/// Category-specific task data.
///
/// Only workout tasks carry a body part; daily and work tasks cannot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Daily,
    Work,
    Workout { part: Option<WorkoutPart> },
}

impl TaskKind {
    /// Combine a flat category and an optional part into a kind.
    ///
    /// A part on a non-workout category is dropped (it is meaningless there).
    pub fn from_parts(category: Category, part: Option<WorkoutPart>) -> Self {
        match category {
            Category::Daily => TaskKind::Daily,
            Category::Work => TaskKind::Work,
            Category::Workout => TaskKind::Workout { part },
        }
    }

    /// The flat category of this kind.
    pub fn category(&self) -> Category {
        match self {
            TaskKind::Daily => Category::Daily,
            TaskKind::Work => Category::Work,
            TaskKind::Workout { .. } => Category::Workout,
        }
    }

    /// The workout body part, if this is a workout task with one.
    pub fn workout_part(&self) -> Option<WorkoutPart> {
        match self {
            TaskKind::Workout { part } => *part,
            _ => None,
        }
    }
}

// =============================================================================
// Task record
// =============================================================================

/// A single task record.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Opaque unique identifier, immutable once created
    pub id: String,
    /// Task text, non-empty after trimming
    pub text: String,
    /// Completion state
    pub done: bool,
    /// Creation timestamp, milliseconds since epoch
    pub created_at: i64,
    /// Category and category-specific data
    pub kind: TaskKind,
    /// Completion timestamp; present iff `done`
    pub done_at: Option<i64>,
    /// Local day key the task was completed on; present iff `done`
    pub done_day: Option<String>,
    /// Scheduled day key; absent means "due today"
    pub due_day: Option<String>,
}

impl Task {
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn workout_part(&self) -> Option<WorkoutPart> {
        self.kind.workout_part()
    }

    /// The day key this task counts against: `due_day` when scheduled,
    /// otherwise today's key.
    pub fn effective_due_day(&self, today_key: &str) -> String {
        self.due_day
            .clone()
            .unwrap_or_else(|| today_key.to_string())
    }

    /// Map this task to the flat persisted document shape.
    ///
    /// Optional fields are written as explicit nulls and `updated_at` is the
    /// store-assigned update marker; it is not part of the logical task.
    pub fn to_persisted(&self, updated_at: i64) -> Value {
        json!({
            "text": self.text,
            "done": self.done,
            "createdAt": self.created_at,
            "category": self.category().to_string(),
            "doneAt": self.done_at,
            "doneDay": self.done_day,
            "dueDay": self.due_day,
            "workoutPart": self.workout_part().map(|p| p.to_string()),
            "updatedAt": updated_at,
        })
    }

    /// Rebuild a task from a persisted document, using the current time for
    /// a missing creation timestamp. Never fails.
    pub fn from_persisted(id: &str, doc: &Value) -> Task {
        Self::from_persisted_at(id, doc, now_ms())
    }

    /// [`Task::from_persisted`] with an injected "now" for tests.
    pub fn from_persisted_at(id: &str, doc: &Value, now: i64) -> Task {
        let category: Category = coerce_string(doc.get("category"))
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let part: Option<WorkoutPart> =
            coerce_string(doc.get("workoutPart")).and_then(|s| s.parse().ok());

        Task {
            id: id.to_string(),
            text: coerce_string(doc.get("text")).unwrap_or_default(),
            done: doc.get("done").and_then(Value::as_bool).unwrap_or(false),
            created_at: coerce_i64(doc.get("createdAt")).unwrap_or(now),
            kind: TaskKind::from_parts(category, part),
            done_at: coerce_i64(doc.get("doneAt")),
            done_day: coerce_string(doc.get("doneDay")),
            due_day: coerce_string(doc.get("dueDay")),
        }
    }
}

/// Coerce a JSON value to an integer: numbers pass through, numeric strings
/// are parsed, anything else (including null) is absent.
fn coerce_i64(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a JSON value to a non-empty string; null and missing are absent.
fn coerce_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

// =============================================================================
// Partial updates
// =============================================================================

/// A minimal update payload for one task.
///
/// Each field is tri-state: unspecified (outer `None`), set, or - for the
/// clearable fields - cleared back to the null sentinel (inner `None`).
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub done: Option<bool>,
    pub done_at: Option<Option<i64>>,
    pub done_day: Option<Option<String>>,
    pub due_day: Option<Option<String>>,
    pub workout_part: Option<Option<WorkoutPart>>,
}

impl TaskPatch {
    /// Build the persistable field map: only explicitly specified fields,
    /// with nulls for cleared ones, plus the update marker.
    pub fn into_fields(self, updated_at: i64) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(text) = self.text {
            fields.insert("text".into(), json!(text));
        }
        if let Some(done) = self.done {
            fields.insert("done".into(), json!(done));
        }
        if let Some(done_at) = self.done_at {
            fields.insert("doneAt".into(), json!(done_at));
        }
        if let Some(done_day) = self.done_day {
            fields.insert("doneDay".into(), json!(done_day));
        }
        if let Some(due_day) = self.due_day {
            fields.insert("dueDay".into(), json!(due_day));
        }
        if let Some(part) = self.workout_part {
            fields.insert("workoutPart".into(), json!(part.map(|p| p.to_string())));
        }
        fields.insert("updatedAt".into(), json!(updated_at));
        fields
    }
}

// =============================================================================
// Tests
// =============================================================================
