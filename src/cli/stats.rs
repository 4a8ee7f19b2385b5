//! Statistics commands: week, stats, chart.

use serde_json::json;

use crate::chart::build_chart;
use crate::datekey::{label_weekday_en, today};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::stats::{counts, cumulative_14d, group_week, streak, week_overview};
use crate::task::Category;

use super::task::{format_task_line, TaskView};
use super::{select_tasks, Context};

/// Inner margin for the rendered chart area.
const CHART_INSET: f64 = 24.0;

pub(crate) fn run_stats(ctx: Context, category: Option<Category>) -> Result<()> {
    let tasks = select_tasks(&ctx.store, category);
    let counts = counts(&tasks);
    let streak = streak(&tasks, today());

    let mut human = HumanOutput::new("Stats");
    if let Some(category) = category {
        human.push_summary("category", category.to_string());
    }
    human.push_summary("total", counts.total.to_string());
    human.push_summary("active", counts.active.to_string());
    human.push_summary("done", counts.done.to_string());
    human.push_summary("streak", format!("{streak} days"));

    emit_success(
        ctx.options,
        "stats",
        &json!({ "counts": counts, "streak": streak }),
        Some(&human),
    )
}

pub(crate) fn run_week(ctx: Context, category: Option<Category>) -> Result<()> {
    let tasks = select_tasks(&ctx.store, category);
    // only the workout category has a weekly plan to label
    let plan = (category == Some(Category::Workout))
        .then(|| super::plan::load_local_plan(&ctx.cache));
    let overview = week_overview(&tasks, plan.as_ref(), today());
    let grouped = group_week(&tasks, today());

    let mut human = HumanOutput::new("This week");
    for (day, (_, day_tasks)) in overview.iter().zip(&grouped) {
        let mut line = format!(
            "{} {}  planned {:>2}  done {:>2}",
            day.day_key,
            label_weekday_en(&day.day_key),
            day.planned,
            day.done
        );
        if let Some(label) = &day.plan_label {
            line.push_str(&format!("  [{label}]"));
        }
        human.push_detail(line);
        for task in day_tasks {
            human.push_detail(format!("    {}", format_task_line(task)));
        }
    }

    let groups: Vec<_> = grouped
        .iter()
        .map(|(key, day_tasks)| {
            let views: Vec<TaskView> = day_tasks.iter().map(TaskView::from).collect();
            json!({ "day": key, "tasks": views })
        })
        .collect();

    emit_success(
        ctx.options,
        "week",
        &json!({ "days": overview, "groups": groups }),
        Some(&human),
    )
}

pub(crate) fn run_chart(
    ctx: Context,
    category: Option<Category>,
    width: f64,
    height: f64,
) -> Result<()> {
    let tasks = select_tasks(&ctx.store, category);
    let series = cumulative_14d(&tasks, today());
    let geometry = build_chart(&series.values, width, height, CHART_INSET);

    let mut human = HumanOutput::new("14-day cumulative completions");
    human.push_summary("axis max", geometry.max.to_string());
    for (label, value) in series.labels.iter().zip(&series.values) {
        human.push_detail(format!("{label}  {value}"));
    }

    emit_success(
        ctx.options,
        "chart",
        &json!({ "series": series, "geometry": geometry }),
        Some(&human),
    )
}
