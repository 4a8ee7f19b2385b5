//! Task commands: add, done, rm, clear-done, list.

use clap::Args;
use serde::Serialize;
use serde_json::json;

use crate::datekey::today;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::stats::{filter_tasks, TaskFilter};
use crate::store::NewTask;
use crate::task::{Category, Task, WorkoutPart};

use super::{category_or_default, select_tasks, Context};

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub text: String,

    /// Category: daily, workout, work
    #[arg(long)]
    pub category: Option<Category>,

    /// Due day as YYYY-MM-DD (omit for "due today")
    #[arg(long, value_name = "DAY")]
    pub due: Option<String>,

    /// Body part for workout tasks (defaults to the weekly plan's suggestion)
    #[arg(long)]
    pub part: Option<WorkoutPart>,
}

/// Serializable task view for JSON output.
#[derive(Serialize)]
pub(crate) struct TaskView {
    pub id: String,
    pub text: String,
    pub done: bool,
    pub category: String,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_part: Option<String>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        TaskView {
            id: task.id.clone(),
            text: task.text.clone(),
            done: task.done,
            category: task.category().to_string(),
            created_at: task.created_at,
            done_at: task.done_at,
            done_day: task.done_day.clone(),
            due_day: task.due_day.clone(),
            workout_part: task.workout_part().map(|p| p.to_string()),
        }
    }
}

pub(crate) fn format_task_line(task: &Task) -> String {
    let mark = if task.done { "x" } else { " " };
    let short_id = &task.id[..task.id.len().min(8)];
    let due = task.due_day.as_deref().unwrap_or("today");
    let mut line = format!(
        "[{mark}] {short_id}  {due:<10}  {:<7}  {}",
        task.category().to_string(),
        task.text
    );
    if let Some(part) = task.workout_part() {
        line.push_str(&format!(" ({part})"));
    }
    line
}

pub(crate) fn run_add(mut ctx: Context, args: AddArgs) -> Result<()> {
    let category = category_or_default(&ctx.config, args.category);
    let part = match (category, args.part) {
        (Category::Workout, Some(part)) => Some(part),
        (Category::Workout, None) => {
            super::plan::load_local_plan(&ctx.cache).suggested_part(today())
        }
        _ => None,
    };

    let task = ctx.store.add_task(NewTask {
        text: args.text,
        category,
        due_day: args.due,
        workout_part: part,
    })?;

    let mut human = HumanOutput::new("Added task");
    human.push_summary("id", &task.id);
    human.push_summary("category", task.category().to_string());
    if let Some(part) = task.workout_part() {
        human.push_summary("part", part.to_string());
    }
    human.push_detail(format_task_line(&task));

    emit_success(ctx.options, "add", &TaskView::from(&task), Some(&human))
}

pub(crate) fn run_done(mut ctx: Context, id: &str) -> Result<()> {
    let id = ctx.store.resolve_id(id)?;
    let task = ctx.store.toggle_done(&id)?;

    let header = if task.done {
        "Marked done"
    } else {
        "Marked not done"
    };
    let mut human = HumanOutput::new(header);
    human.push_detail(format_task_line(&task));

    emit_success(ctx.options, "done", &TaskView::from(&task), Some(&human))
}

pub(crate) fn run_rm(mut ctx: Context, id: &str) -> Result<()> {
    let id = ctx.store.resolve_id(id)?;
    ctx.store.delete_task(&id)?;

    let mut human = HumanOutput::new("Deleted task");
    human.push_summary("id", &id);
    emit_success(ctx.options, "rm", &json!({ "id": id }), Some(&human))
}

pub(crate) fn run_clear_done(mut ctx: Context, category: Option<Category>) -> Result<()> {
    let removed = ctx.store.clear_done(category);

    let mut human = HumanOutput::new("Cleared done tasks");
    human.push_summary("removed", removed.to_string());
    emit_success(
        ctx.options,
        "clear-done",
        &json!({ "removed": removed }),
        Some(&human),
    )
}

pub(crate) fn run_list(
    ctx: Context,
    filter: TaskFilter,
    category: Option<Category>,
) -> Result<()> {
    let tasks = select_tasks(&ctx.store, category);
    let filtered = filter_tasks(&tasks, filter, today());

    let mut human = HumanOutput::new(format!("Tasks ({filter}): {}", filtered.len()));
    for task in &filtered {
        human.push_detail(format_task_line(task));
    }

    let views: Vec<TaskView> = filtered.iter().map(TaskView::from).collect();
    emit_success(ctx.options, "list", &views, Some(&human))
}
