use chrono::{Days, NaiveDate};
use habit_tracker::{
    AllTimeTotals, AppError, CreateHabitPayload, TrackerCore, HEATMAP_ROW_LEN, QUOTES,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("date literal")
}

#[test]
fn full_tracking_flow_from_create_to_charts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = TrackerCore::new(dir.path().join("data")).expect("core");
    let today = day("2024-03-30");

    let read = core
        .create_habit(CreateHabitPayload {
            name: "Read".to_string(),
            description: Some("20 pages before bed".to_string()),
        })
        .expect("create read");
    let run = core
        .create_habit(CreateHabitPayload {
            name: "Run".to_string(),
            description: None,
        })
        .expect("create run");
    assert_ne!(read.id, run.id);

    core.mark_done(read.id, today).expect("mark today");
    core.mark_done(read.id, today - Days::new(2)).expect("mark today-2");
    core.mark_done(read.id, today - Days::new(29)).expect("mark today-29");
    // Marking twice on the same day is the same as marking once.
    core.mark_done(read.id, today).expect("re-mark today");

    let overview = core.habit_overview(today).expect("overview");
    assert_eq!(overview.len(), 2);
    assert!(overview[0].done_today);
    assert!(!overview[1].done_today);

    let table = core.weekly_progress_all(today).expect("weekly table");
    assert_eq!(table[0].done, 2);
    assert_eq!(table[0].total, 7);
    assert_eq!(table[1].done, 0);
    assert_eq!(table[1].total, 7);

    let matrix = core.calendar_heatmap(read.id, today).expect("heatmap");
    assert_eq!(matrix.rows.len(), 5);
    assert_eq!(matrix.row_len, HEATMAP_ROW_LEN);
    let flat: Vec<bool> = matrix.rows.iter().flatten().copied().collect();
    assert!(flat[0]);
    assert!(flat[27]);
    assert!(flat[29]);
    assert_eq!(flat.iter().filter(|cell| **cell).count(), 3);

    match core.all_time_totals().expect("totals") {
        AllTimeTotals::Data(totals) => {
            assert_eq!(totals[0].done, 3);
            assert_eq!(totals[1].done, 0);
        }
        AllTimeTotals::NoData => panic!("expected data"),
    }
}

#[test]
fn errors_surface_synchronously_to_the_caller() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = TrackerCore::new(dir.path().join("data")).expect("core");
    let today = day("2024-03-30");

    let invalid = core.create_habit(CreateHabitPayload {
        name: "  ".to_string(),
        description: None,
    });
    assert!(matches!(invalid, Err(AppError::Validation(_))));

    assert!(matches!(core.mark_done(404, today), Err(AppError::NotFound(_))));
    assert!(matches!(
        core.weekly_progress(404, today),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        core.calendar_heatmap(404, today),
        Err(AppError::NotFound(_))
    ));

    // Reads of unmarked days are false, never an error.
    assert_eq!(core.all_time_totals().expect("totals"), AllTimeTotals::NoData);
}

#[test]
fn store_survives_core_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path().join("data");
    let today = day("2024-03-30");

    let habit_id = {
        let core = TrackerCore::new(data_dir.clone()).expect("core");
        let habit = core
            .create_habit(CreateHabitPayload {
                name: "Meditate".to_string(),
                description: None,
            })
            .expect("create");
        core.mark_done(habit.id, today).expect("mark");
        habit.id
    };

    let reopened = TrackerCore::new(data_dir).expect("reopened core");
    assert!(reopened.is_done(habit_id, today).expect("is_done"));
    let habits = reopened.list_habits().expect("list");
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].id, habit_id);
}

#[tokio::test(start_paused = true)]
async fn reminders_follow_settings_and_stop_on_shutdown() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = TrackerCore::new(dir.path().join("data")).expect("core");

    core.update_settings(serde_json::json!({ "reminderIntervalSecs": 60 }))
        .expect("update settings");

    let fired = Arc::new(AtomicUsize::new(0));
    let last_quote = Arc::new(Mutex::new(String::new()));
    let counter = fired.clone();
    let quote_slot = last_quote.clone();
    core.start_reminders(Arc::new(move |quote| {
        counter.fetch_add(1, Ordering::SeqCst);
        *quote_slot.lock().expect("quote slot") = quote.to_string();
    }))
    .expect("start reminders");

    // The spawned timer task takes its immediate first tick once polled.
    tokio::task::yield_now().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1, "startup reminder");
    assert!(QUOTES.contains(&last_quote.lock().expect("quote slot").as_str()));

    tokio::time::advance(std::time::Duration::from_secs(60)).await;
    tokio::task::yield_now().await;
    assert_eq!(fired.load(Ordering::SeqCst), 2, "hourly-style recurring fire");

    core.stop_reminders();
    tokio::time::advance(std::time::Duration::from_secs(600)).await;
    tokio::task::yield_now().await;
    assert_eq!(fired.load(Ordering::SeqCst), 2, "no fires after shutdown");
}

#[tokio::test(start_paused = true)]
async fn disabled_reminders_never_fire() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = TrackerCore::new(dir.path().join("data")).expect("core");

    core.update_settings(serde_json::json!({ "remindersEnabled": false }))
        .expect("update settings");

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    core.start_reminders(Arc::new(move |_quote| {
        counter.fetch_add(1, Ordering::SeqCst);
    }))
    .expect("start reminders");

    tokio::time::advance(std::time::Duration::from_secs(7_200)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
