use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitPayload {
    pub name: String,
    pub description: Option<String>,
}

/// One row of the main list view: a habit plus its done marker for today.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStatus {
    pub habit: Habit,
    pub done_today: bool,
}

/// "X/7 done" entry for the weekly progress table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgress {
    pub habit_id: i64,
    pub name: String,
    pub done: i64,
    pub total: i64,
}

/// Calendar heatmap data for one habit: the 30 trailing calendar days
/// ending at `end_date` (see `progress::HEATMAP_DAYS`), flattened
/// chronologically and reshaped into consecutive rows of `row_len` cells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapMatrix {
    pub habit_id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub row_len: usize,
    pub rows: Vec<Vec<bool>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HabitTotal {
    pub habit_id: i64,
    pub name: String,
    pub done: i64,
}

/// All-time completion counts for the bar chart. `NoData` is the explicit
/// empty signal the presentation layer must handle instead of drawing an
/// empty chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind", content = "totals")]
pub enum AllTimeTotals {
    NoData,
    Data(Vec<HabitTotal>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub reminder_interval_secs: u64,
    pub reminders_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            reminder_interval_secs: 3_600,
            reminders_enabled: true,
        }
    }
}
