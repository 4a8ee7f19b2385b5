//! Command-line interface for taskpulse.
//!
//! The CLI is the user-action driver over the task store. It runs signed out
//! against the file cache: no session is ever begun, so the remote store is
//! never touched and every mutation stays local, exactly the offline path of
//! the sync layer.

mod plan;
mod stats;
mod task;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::cache::FileCache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputOptions;
use crate::remote::MemoryRemote;
use crate::stats::TaskFilter;
use crate::store::TaskStore;
use crate::task::Category;

#[derive(Parser)]
#[command(
    name = "taskpulse",
    version,
    about = "Personal task tracker: categorized tasks, streaks, weekly stats"
)]
pub struct Cli {
    /// Emit machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress human-readable output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Data directory holding the cache and config
    #[arg(long, global = true, env = "TASKPULSE_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a task
    Add(task::AddArgs),
    /// Toggle a task's done state
    Done {
        /// Task id or unique id prefix
        id: String,
    },
    /// Delete a task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },
    /// Remove all done tasks
    ClearDone {
        /// Restrict to one category
        #[arg(long)]
        category: Option<Category>,
    },
    /// List tasks
    List {
        /// Filter: all, today, tomorrow, week, active, done
        #[arg(long, default_value = "all")]
        filter: TaskFilter,
        /// Restrict to one category
        #[arg(long)]
        category: Option<Category>,
    },
    /// Per-day overview of the current week
    Week {
        /// Restrict to one category
        #[arg(long)]
        category: Option<Category>,
    },
    /// Counts and streak
    Stats {
        /// Restrict to one category
        #[arg(long)]
        category: Option<Category>,
    },
    /// 14-day cumulative completion chart geometry
    Chart {
        /// Restrict to one category
        #[arg(long)]
        category: Option<Category>,
        #[arg(long, default_value_t = 640.0)]
        width: f64,
        #[arg(long, default_value_t = 240.0)]
        height: f64,
    },
    /// Weekly workout plan
    Plan {
        #[command(subcommand)]
        command: plan::PlanCommand,
    },
}

/// Shared state for command handlers.
pub(crate) struct Context {
    pub store: TaskStore<FileCache, MemoryRemote>,
    pub cache: FileCache,
    pub config: Config,
    pub options: OutputOptions,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let data_dir = resolve_data_dir(self.data_dir)?;
        let config = Config::load_from_dir(&data_dir);
        let cache = FileCache::new(&data_dir);

        let mut store = TaskStore::new(cache.clone(), Arc::new(MemoryRemote::new()));
        store.load_local();

        let ctx = Context {
            store,
            cache,
            config,
            options: OutputOptions {
                json: self.json,
                quiet: self.quiet,
            },
        };

        match self.command {
            Command::Add(args) => task::run_add(ctx, args),
            Command::Done { id } => task::run_done(ctx, &id),
            Command::Rm { id } => task::run_rm(ctx, &id),
            Command::ClearDone { category } => task::run_clear_done(ctx, category),
            Command::List { filter, category } => task::run_list(ctx, filter, category),
            Command::Week { category } => stats::run_week(ctx, category),
            Command::Stats { category } => stats::run_stats(ctx, category),
            Command::Chart {
                category,
                width,
                height,
            } => stats::run_chart(ctx, category, width, height),
            Command::Plan { command } => plan::run(ctx, command),
        }
    }
}

fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    directories::ProjectDirs::from("", "", "taskpulse")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(Error::NoDataDir)
}

/// Tasks for an optional category restriction.
pub(crate) fn select_tasks(
    store: &TaskStore<FileCache, MemoryRemote>,
    category: Option<Category>,
) -> Vec<crate::task::Task> {
    match category {
        Some(category) => store.tasks_in(category),
        None => store.tasks().to_vec(),
    }
}

pub(crate) fn category_or_default(config: &Config, category: Option<Category>) -> Category {
    category.unwrap_or_else(|| config.tasks.default_category.parse().unwrap_or_default())
}
