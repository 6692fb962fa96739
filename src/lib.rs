mod db;
mod errors;
mod models;
mod progress;
mod reminders;
mod tracker;

pub use crate::db::Database;
pub use crate::errors::{AppError, AppResult};
pub use crate::models::{
    AllTimeTotals, AppSettings, CreateHabitPayload, Habit, HabitStatus, HabitTotal, HeatmapMatrix,
    WeeklyProgress,
};
pub use crate::progress::{
    all_time_totals, calendar_heatmap, chunk_rows, trailing_days, weekly_progress,
    weekly_progress_all, HEATMAP_DAYS, HEATMAP_ROW_LEN, WEEKLY_WINDOW_DAYS,
};
pub use crate::reminders::{random_quote, ReminderScheduler, QUOTES};
pub use crate::tracker::TrackerCore;

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Initializes JSON file logging under `<app_data_dir>/logs`. Safe to call
/// once per process; the presentation layer calls this during startup.
pub fn init_tracing(app_data_dir: &Path) -> Result<(), String> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "tracker.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
