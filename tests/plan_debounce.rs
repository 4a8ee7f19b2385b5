//! Debounce timing tests for the weekly plan saver, on the paused tokio
//! clock so the quiet period is exact.

use std::sync::Arc;
use std::time::Duration;

use taskpulse::datekey::WeekdayKey;
use taskpulse::plan::{PlanRow, PlanSaver, WeeklyPlan, DEFAULT_PLAN_SAVE_DEBOUNCE_MS};
use taskpulse::remote::MemoryRemote;
use taskpulse::task::WorkoutPart;

fn plan_with(day: WeekdayKey, part: WorkoutPart) -> WeeklyPlan {
    let mut plan = WeeklyPlan::default();
    plan.set_row(day, PlanRow { enabled: true, part });
    plan
}

async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn save_fires_only_after_full_quiet_period() {
    let remote = Arc::new(MemoryRemote::new());
    let delay = Duration::from_millis(DEFAULT_PLAN_SAVE_DEBOUNCE_MS);
    let mut saver = PlanSaver::new(Arc::clone(&remote), "u1", delay);

    saver.schedule(&plan_with(WeekdayKey::Mon, WorkoutPart::Chest));

    // one tick short of the quiet period: nothing written yet
    tokio::time::advance(delay - Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(remote.settings_doc("u1"), None);
    assert!(saver.has_pending());

    tokio::time::advance(Duration::from_millis(1)).await;
    settle().await;
    assert!(remote.settings_doc("u1").is_some());
    assert!(!saver.has_pending());
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_collapses_into_one_save() {
    let remote = Arc::new(MemoryRemote::new());
    let delay = Duration::from_millis(DEFAULT_PLAN_SAVE_DEBOUNCE_MS);
    let mut saver = PlanSaver::new(Arc::clone(&remote), "u1", delay);

    let final_plan = plan_with(WeekdayKey::Fri, WorkoutPart::Legs);
    for plan in [
        plan_with(WeekdayKey::Mon, WorkoutPart::Chest),
        plan_with(WeekdayKey::Wed, WorkoutPart::Back),
        final_plan.clone(),
    ] {
        saver.schedule(&plan);
        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
    }
    assert_eq!(remote.settings_doc("u1"), None);

    saver.flush().await;
    let saved = remote.settings_doc("u1").expect("settings saved");
    assert_eq!(WeeklyPlan::from_persisted(&saved), final_plan);
}

#[tokio::test(start_paused = true)]
async fn flush_without_pending_save_is_a_no_op() {
    let remote = Arc::new(MemoryRemote::new());
    let mut saver = PlanSaver::new(
        Arc::clone(&remote),
        "u1",
        Duration::from_millis(DEFAULT_PLAN_SAVE_DEBOUNCE_MS),
    );

    saver.flush().await;
    assert_eq!(remote.settings_doc("u1"), None);
    assert!(!saver.has_pending());
}
