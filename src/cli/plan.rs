//! Weekly plan commands.
//!
//! The CLI runs signed out, so the plan lives in the local cache under its
//! own versioned key; a signed-in client keeps it in the remote settings
//! document and saves through the debounced [`crate::plan::PlanSaver`].

use clap::Subcommand;
use serde_json::Value;
use tracing::warn;

use crate::cache::LocalCache;
use crate::datekey::WeekdayKey;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::plan::{PlanRow, WeeklyPlan};
use crate::task::WorkoutPart;

use super::Context;

/// Versioned local-cache key for the weekly plan.
pub const PLAN_CACHE_KEY: &str = "taskpulse.plan.v1";

#[derive(Subcommand)]
pub(crate) enum PlanCommand {
    /// Show the weekly plan
    Show,
    /// Enable a weekday with a body part, or disable it with --off
    Set {
        /// Weekday: mon..sun
        day: WeekdayKey,
        /// Body part: chest, back, legs, shoulders, arms, core
        #[arg(required_unless_present = "off")]
        part: Option<WorkoutPart>,
        /// Disable this weekday
        #[arg(long)]
        off: bool,
    },
}

/// Read the plan from the local cache; any failure yields the default plan.
pub(crate) fn load_local_plan(cache: &impl LocalCache) -> WeeklyPlan {
    cache
        .read(PLAN_CACHE_KEY)
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
        .map(|doc| WeeklyPlan::from_persisted(&doc))
        .unwrap_or_default()
}

fn save_local_plan(cache: &impl LocalCache, plan: &WeeklyPlan) {
    match serde_json::to_string(&plan.to_persisted()) {
        Ok(raw) => {
            if let Err(err) = cache.write(PLAN_CACHE_KEY, &raw) {
                warn!(error = %err, "plan cache write failed");
            }
        }
        Err(err) => warn!(error = %err, "plan encode failed"),
    }
}

pub(crate) fn run(ctx: Context, command: PlanCommand) -> Result<()> {
    match command {
        PlanCommand::Show => {
            let plan = load_local_plan(&ctx.cache);
            emit_plan(ctx, "plan show", &plan)
        }
        PlanCommand::Set { day, part, off } => {
            let mut plan = load_local_plan(&ctx.cache);
            let row = if off {
                PlanRow {
                    enabled: false,
                    ..plan.row(day)
                }
            } else {
                PlanRow {
                    enabled: true,
                    part: part.unwrap_or_default(),
                }
            };
            plan.set_row(day, row);
            save_local_plan(&ctx.cache, &plan);
            emit_plan(ctx, "plan set", &plan)
        }
    }
}

fn emit_plan(ctx: Context, command: &str, plan: &WeeklyPlan) -> Result<()> {
    let mut human = HumanOutput::new("Weekly plan");
    for day in WeekdayKey::ALL {
        let row = plan.row(day);
        let line = if row.enabled {
            format!("{}  {}", day.label(), row.part.label())
        } else {
            format!("{}  -", day.label())
        };
        human.push_detail(line);
    }

    emit_success(ctx.options, command, &plan.to_persisted(), Some(&human))
}
