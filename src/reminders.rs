use rand::seq::IndexedRandom;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// The fixed motivational pool shown by reminders and after marking a habit
/// done.
pub const QUOTES: [&str; 5] = [
    "Keep going, you're doing great!",
    "Small steps lead to big changes.",
    "Progress over perfection.",
    "Stay consistent, not perfect.",
    "You're one day closer to your goal!",
];

pub fn random_quote() -> &'static str {
    QUOTES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(QUOTES[0])
}

type ReminderCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Recurring reminder timer: invokes the callback with a random quote once
/// immediately on start, then once per interval, until stopped. Carries no
/// data dependency on the store.
pub struct ReminderScheduler {
    interval: Duration,
    task: Mutex<Option<(JoinHandle<()>, Arc<Notify>)>>,
}

impl ReminderScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: Mutex::new(None),
        }
    }

    /// Spawns the timer task. A second start replaces the previous task.
    /// Each task gets its own shutdown handle, so replacing never cancels
    /// the wrong one.
    pub fn start(&self, callback: ReminderCallback) {
        self.stop();

        let shutdown = Arc::new(Notify::new());
        let shutdown_task = shutdown.clone();
        let interval = self.interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let quote = random_quote();
                        tracing::debug!(quote = %quote, "reminder fired");
                        callback(quote);
                    }
                    _ = shutdown_task.notified() => {
                        tracing::debug!("reminder scheduler stopped");
                        break;
                    }
                }
            }
        });

        let mut guard = self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some((task, shutdown));
    }

    /// Cancels the recurring task. Idempotent; safe to call without a prior
    /// start.
    pub fn stop(&self) {
        let mut guard = self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some((_, shutdown)) = guard.take() {
            shutdown.notify_one();
        }
    }

    pub fn is_running(&self) -> bool {
        let guard = self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard
            .as_ref()
            .map(|(task, _)| !task.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
