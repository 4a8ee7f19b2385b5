//! Weekly workout plan and its debounced auto-save.
//!
//! The plan maps each weekday to an enabled flag and a body part. It only
//! auto-suggests a part when a workout task is created on that weekday; it
//! never constrains or validates task creation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::datekey::WeekdayKey;
use crate::remote::RemoteStore;
use crate::task::WorkoutPart;

/// Quiet period after the last edit before the plan is saved.
pub const DEFAULT_PLAN_SAVE_DEBOUNCE_MS: u64 = 450;

/// One weekday row of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanRow {
    pub enabled: bool,
    pub part: WorkoutPart,
}

impl Default for PlanRow {
    fn default() -> Self {
        Self {
            enabled: false,
            part: WorkoutPart::Chest,
        }
    }
}

/// The weekly plan: all seven weekdays, always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyPlan {
    rows: BTreeMap<WeekdayKey, PlanRow>,
}

impl Default for WeeklyPlan {
    fn default() -> Self {
        Self {
            rows: WeekdayKey::ALL
                .iter()
                .map(|&day| (day, PlanRow::default()))
                .collect(),
        }
    }
}

impl WeeklyPlan {
    pub fn row(&self, day: WeekdayKey) -> PlanRow {
        self.rows.get(&day).copied().unwrap_or_default()
    }

    pub fn set_row(&mut self, day: WeekdayKey, row: PlanRow) {
        self.rows.insert(day, row);
    }

    /// The part to suggest for a workout task created on `date`, when that
    /// weekday is enabled.
    pub fn suggested_part(&self, date: NaiveDate) -> Option<WorkoutPart> {
        let row = self.row(WeekdayKey::from_date(date));
        row.enabled.then_some(row.part)
    }

    /// Map the plan to the settings-document shape.
    pub fn to_persisted(&self) -> Value {
        let mut days = Map::new();
        for day in WeekdayKey::ALL {
            let row = self.row(day);
            days.insert(
                day.to_string(),
                json!({ "enabled": row.enabled, "part": row.part.to_string() }),
            );
        }
        json!({ "weeklyPlan": days })
    }

    /// Rebuild a plan from a settings document. Never fails; missing or
    /// malformed rows fall back to the default row.
    pub fn from_persisted(doc: &Value) -> WeeklyPlan {
        let days = doc.get("weeklyPlan").and_then(Value::as_object);
        let mut plan = WeeklyPlan::default();
        if let Some(days) = days {
            for day in WeekdayKey::ALL {
                if let Some(row) = days.get(&day.to_string()) {
                    let enabled = row
                        .get("enabled")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    let part = row
                        .get("part")
                        .and_then(Value::as_str)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or_default();
                    plan.set_row(day, PlanRow { enabled, part });
                }
            }
        }
        plan
    }
}

// =============================================================================
// Debounced save
// =============================================================================

/// Trailing-edge debounced saver for the weekly plan.
///
/// Each edit replaces the pending save: the previous timer task is aborted and
/// a new one is scheduled for the full quiet period. Save failures are
/// swallowed with a warning, matching the fire-and-forget write policy.
pub struct PlanSaver<R: RemoteStore> {
    remote: Arc<R>,
    user: String,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl<R: RemoteStore> PlanSaver<R> {
    pub fn new(remote: Arc<R>, user: impl Into<String>, delay: Duration) -> Self {
        Self {
            remote,
            user: user.into(),
            delay,
            pending: None,
        }
    }

    /// Schedule a save of this plan snapshot after the quiet period,
    /// cancelling any previously pending save.
    pub fn schedule(&mut self, plan: &WeeklyPlan) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }

        let remote = Arc::clone(&self.remote);
        let user = self.user.clone();
        let doc = plan.to_persisted();
        // Capture the deadline now so the quiet period runs from the edit,
        // not from when the spawned task is first polled.
        let sleep = tokio::time::sleep(self.delay);
        self.pending = Some(tokio::spawn(async move {
            sleep.await;
            if let Err(err) = remote.write_settings(&user, doc).await {
                warn!(error = %err, "plan save failed; local plan kept");
            }
        }));
    }

    /// Whether a save is still pending.
    pub fn has_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Wait for the pending save (if any) to run to completion.
    pub async fn flush(&mut self) {
        if let Some(handle) = self.pending.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemote;

    #[test]
    fn test_suggested_part_only_when_enabled() {
        let mut plan = WeeklyPlan::default();
        // 2024-08-19 is a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 8, 19).unwrap();
        assert_eq!(plan.suggested_part(monday), None);

        plan.set_row(
            WeekdayKey::Mon,
            PlanRow {
                enabled: true,
                part: WorkoutPart::Back,
            },
        );
        assert_eq!(plan.suggested_part(monday), Some(WorkoutPart::Back));

        let tuesday = NaiveDate::from_ymd_opt(2024, 8, 20).unwrap();
        assert_eq!(plan.suggested_part(tuesday), None);
    }

    #[test]
    fn test_plan_round_trip() {
        let mut plan = WeeklyPlan::default();
        plan.set_row(
            WeekdayKey::Wed,
            PlanRow {
                enabled: true,
                part: WorkoutPart::Legs,
            },
        );
        let doc = plan.to_persisted();
        assert_eq!(WeeklyPlan::from_persisted(&doc), plan);
    }

    #[test]
    fn test_plan_from_malformed_doc_defaults() {
        let plan = WeeklyPlan::from_persisted(&json!({ "weeklyPlan": { "wed": 42 } }));
        assert_eq!(plan, WeeklyPlan::default());
        let plan = WeeklyPlan::from_persisted(&json!("nonsense"));
        assert_eq!(plan, WeeklyPlan::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_saves_after_quiet_period() {
        let remote = Arc::new(MemoryRemote::new());
        let mut saver = PlanSaver::new(Arc::clone(&remote), "u1", Duration::from_millis(450));

        let mut plan = WeeklyPlan::default();
        plan.set_row(
            WeekdayKey::Fri,
            PlanRow {
                enabled: true,
                part: WorkoutPart::Arms,
            },
        );
        saver.schedule(&plan);
        assert!(saver.has_pending());
        assert_eq!(remote.settings_doc("u1"), None);

        saver.flush().await;
        let saved = remote.settings_doc("u1").expect("settings saved");
        assert_eq!(WeeklyPlan::from_persisted(&saved), plan);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_cancels_previous_save() {
        let remote = Arc::new(MemoryRemote::new());
        let mut saver = PlanSaver::new(Arc::clone(&remote), "u1", Duration::from_millis(450));

        let mut first = WeeklyPlan::default();
        first.set_row(
            WeekdayKey::Mon,
            PlanRow {
                enabled: true,
                part: WorkoutPart::Chest,
            },
        );
        saver.schedule(&first);

        // A new edit before the quiet period elapses replaces the pending save
        tokio::time::advance(Duration::from_millis(200)).await;
        let mut second = first.clone();
        second.set_row(
            WeekdayKey::Tue,
            PlanRow {
                enabled: true,
                part: WorkoutPart::Core,
            },
        );
        saver.schedule(&second);

        saver.flush().await;
        let saved = remote.settings_doc("u1").expect("settings saved");
        assert_eq!(WeeklyPlan::from_persisted(&saved), second);
    }
}
