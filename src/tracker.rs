use crate::db::Database;
use crate::errors::AppResult;
use crate::models::{
    AllTimeTotals, AppSettings, CreateHabitPayload, Habit, HabitStatus, HeatmapMatrix,
    WeeklyProgress,
};
use crate::progress;
use crate::reminders::ReminderScheduler;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::time::Duration;

const DB_FILE_NAME: &str = "habits.db";

/// The synchronous request/response surface the presentation layer calls.
/// Owns the store and the reminder timer; never blocks on user input.
pub struct TrackerCore {
    db: Arc<Database>,
    reminders: RwLock<Option<ReminderScheduler>>,
    app_data_dir: PathBuf,
}

impl TrackerCore {
    pub fn new(app_data_dir: PathBuf) -> AppResult<Arc<Self>> {
        std::fs::create_dir_all(&app_data_dir)?;
        let db = Arc::new(Database::new(&app_data_dir.join(DB_FILE_NAME))?);

        Ok(Arc::new(Self {
            db,
            reminders: RwLock::new(None),
            app_data_dir,
        }))
    }

    pub fn app_data_dir(&self) -> &PathBuf {
        &self.app_data_dir
    }

    /// Today per the machine's local calendar; the implicit reference date
    /// for the list view and the mark action.
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn create_habit(&self, payload: CreateHabitPayload) -> AppResult<Habit> {
        self.db
            .create_habit(&payload.name, payload.description.as_deref(), self.today())
    }

    pub fn list_habits(&self) -> AppResult<Vec<Habit>> {
        self.db.list_habits()
    }

    /// The main list view: every habit with its done marker for the given
    /// day.
    pub fn habit_overview(&self, today: NaiveDate) -> AppResult<Vec<HabitStatus>> {
        self.db
            .list_habits()?
            .into_iter()
            .map(|habit| {
                let done_today = self.db.is_done(habit.id, today)?;
                Ok(HabitStatus { habit, done_today })
            })
            .collect()
    }

    pub fn mark_done(&self, habit_id: i64, day: NaiveDate) -> AppResult<()> {
        self.db.mark_done(habit_id, day)
    }

    pub fn is_done(&self, habit_id: i64, day: NaiveDate) -> AppResult<bool> {
        self.db.is_done(habit_id, day)
    }

    pub fn weekly_progress(&self, habit_id: i64, today: NaiveDate) -> AppResult<WeeklyProgress> {
        progress::weekly_progress(&self.db, habit_id, today)
    }

    pub fn weekly_progress_all(&self, today: NaiveDate) -> AppResult<Vec<WeeklyProgress>> {
        progress::weekly_progress_all(&self.db, today)
    }

    pub fn calendar_heatmap(&self, habit_id: i64, today: NaiveDate) -> AppResult<HeatmapMatrix> {
        progress::calendar_heatmap(&self.db, habit_id, today)
    }

    pub fn all_time_totals(&self) -> AppResult<AllTimeTotals> {
        progress::all_time_totals(&self.db)
    }

    pub fn get_settings(&self) -> AppResult<AppSettings> {
        self.db.get_settings()
    }

    pub fn update_settings(&self, update: serde_json::Value) -> AppResult<AppSettings> {
        self.db.update_settings(update)
    }

    /// Wires the reminder timer to the settings-configured cadence. The
    /// callback receives each quote to display; a no-op when reminders are
    /// disabled.
    pub fn start_reminders(&self, callback: Arc<dyn Fn(&str) + Send + Sync>) -> AppResult<()> {
        let settings = self.get_settings()?;
        if !settings.reminders_enabled {
            tracing::info!("reminders disabled by settings");
            return Ok(());
        }

        let scheduler = ReminderScheduler::new(Duration::from_secs(settings.reminder_interval_secs));
        scheduler.start(callback);

        let mut guard = self
            .reminders
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = guard.replace(scheduler) {
            previous.stop();
        }
        Ok(())
    }

    /// Cancels the reminder timer; called on application shutdown.
    pub fn stop_reminders(&self) {
        let mut guard = self
            .reminders
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(scheduler) = guard.take() {
            scheduler.stop();
        }
    }
}

impl Drop for TrackerCore {
    fn drop(&mut self) {
        self.stop_reminders();
    }
}
