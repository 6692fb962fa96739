use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{AllTimeTotals, HabitTotal, HeatmapMatrix, WeeklyProgress};
use chrono::{Days, NaiveDate};

/// Fixed weekly window: always exactly 7 calendar days ending at the
/// reference date, regardless of when the habit was created.
pub const WEEKLY_WINDOW_DAYS: usize = 7;

/// The heatmap covers the 30 calendar days ending at the reference date.
pub const HEATMAP_DAYS: usize = 30;

/// Cells per heatmap row. The 30-day sequence is grouped into consecutive
/// chunks of 6, so rows do not align to 7-day weeks; callers must render
/// from `HeatmapMatrix::row_len` rather than assuming week-width rows.
pub const HEATMAP_ROW_LEN: usize = 6;

/// The `n` calendar days ending at `today`, in chronological order:
/// `[today-(n-1), .., today]`.
pub fn trailing_days(today: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n)
        .rev()
        .map(|offset| today - Days::new(offset as u64))
        .collect()
}

/// Reshapes a flat chronological sequence into consecutive rows of
/// `row_len`. The final row is shorter when the lengths do not divide
/// evenly (they do for 30/6).
pub fn chunk_rows(flat: &[bool], row_len: usize) -> Vec<Vec<bool>> {
    flat.chunks(row_len).map(<[bool]>::to_vec).collect()
}

/// "X/7" completion fraction for one habit over the trailing 7-day window.
pub fn weekly_progress(db: &Database, habit_id: i64, today: NaiveDate) -> AppResult<WeeklyProgress> {
    let habit = db
        .get_habit(habit_id)?
        .ok_or_else(|| AppError::NotFound(format!("habit {} does not exist", habit_id)))?;

    let window = trailing_days(today, WEEKLY_WINDOW_DAYS);
    let done = db.count_done_in_range(habit_id, &window)?;
    Ok(WeeklyProgress {
        habit_id,
        name: habit.name,
        done,
        total: WEEKLY_WINDOW_DAYS as i64,
    })
}

/// The weekly progress table: one entry per habit, in id order.
pub fn weekly_progress_all(db: &Database, today: NaiveDate) -> AppResult<Vec<WeeklyProgress>> {
    let window = trailing_days(today, WEEKLY_WINDOW_DAYS);
    db.list_habits()?
        .into_iter()
        .map(|habit| {
            let done = db.count_done_in_range(habit.id, &window)?;
            Ok(WeeklyProgress {
                habit_id: habit.id,
                name: habit.name,
                done,
                total: WEEKLY_WINDOW_DAYS as i64,
            })
        })
        .collect()
}

/// 30-day completion matrix for one habit: per-day booleans in
/// chronological order, reshaped into rows of `HEATMAP_ROW_LEN`.
pub fn calendar_heatmap(db: &Database, habit_id: i64, today: NaiveDate) -> AppResult<HeatmapMatrix> {
    let habit = db
        .get_habit(habit_id)?
        .ok_or_else(|| AppError::NotFound(format!("habit {} does not exist", habit_id)))?;

    let days = trailing_days(today, HEATMAP_DAYS);
    let mut flat = Vec::with_capacity(days.len());
    for day in &days {
        flat.push(db.is_done(habit_id, *day)?);
    }

    Ok(HeatmapMatrix {
        habit_id,
        name: habit.name,
        start_date: days[0],
        end_date: today,
        row_len: HEATMAP_ROW_LEN,
        rows: chunk_rows(&flat, HEATMAP_ROW_LEN),
    })
}

/// All-time completion counts per habit for the bar chart. Zero habits
/// yields the explicit `NoData` signal; habits with no log entries are
/// included with a count of 0.
pub fn all_time_totals(db: &Database) -> AppResult<AllTimeTotals> {
    let habits = db.list_habits()?;
    if habits.is_empty() {
        return Ok(AllTimeTotals::NoData);
    }

    let mut totals = Vec::with_capacity(habits.len());
    for habit in habits {
        let done = db.count_done_all_time(habit.id)?;
        totals.push(HabitTotal {
            habit_id: habit.id,
            name: habit.name,
            done,
        });
    }
    Ok(AllTimeTotals::Data(totals))
}
