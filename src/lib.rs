//! taskpulse - Personal Task Tracker Core
//!
//! This library provides the core of a personal task-tracking client:
//! categorized task records, derived statistics, and a local-cache/remote
//! sync layer with optimistic mutations.
//!
//! # Core Concepts
//!
//! - **Day keys**: local calendar dates (`YYYY-MM-DD`) as the atomic unit of
//!   "which day" a task is due or was completed
//! - **Derived statistics**: streaks, weekly aggregates and the 14-day
//!   cumulative series, recomputed from the snapshot on every read
//! - **Optimistic sync**: mutations apply locally and snapshot the cache
//!   first; remote writes are fire-and-forget
//! - **Weekly plan**: per-weekday workout suggestions with a debounced save
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `config.toml`
//! - `error`: error types and result aliases
//! - `datekey`: day-key and Monday-week calendar utilities
//! - `task`: the task record model and its persisted-document mapping
//! - `stats`: pure derived-statistics engine
//! - `chart`: axis ceilings and smooth curve geometry
//! - `plan`: weekly workout plan and its debounced saver
//! - `cache`: local key-value cache boundary
//! - `remote`: remote document store boundary
//! - `store`: the task collection and its sync state machine

pub mod cache;
pub mod chart;
pub mod cli;
pub mod config;
pub mod datekey;
pub mod error;
pub mod output;
pub mod plan;
pub mod remote;
pub mod stats;
pub mod store;
pub mod task;

pub use error::{Error, Result};
