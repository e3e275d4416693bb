//! Medication reminder commands.

use crate::core_state::CoreState;
use crate::medications::{reminder_rows, ReminderRow};

/// Add a reminder and return its row.
pub fn add_medication_reminder(
    state: &CoreState,
    name: &str,
    time: &str,
) -> Result<ReminderRow, String> {
    let index = state.add_reminder(name, time).map_err(|e| e.to_string())?;
    row_at(state, index)
}

/// Mark the reminder at the 1-based `position` as taken.
pub fn mark_medication_done(state: &CoreState, position: usize) -> Result<ReminderRow, String> {
    let index = position
        .checked_sub(1)
        .ok_or_else(|| "Reminder numbers start at 1".to_string())?;
    state.mark_reminder_done(index).map_err(|e| e.to_string())?;
    row_at(state, index)
}

pub fn get_medication_reminders(state: &CoreState) -> Result<Vec<ReminderRow>, String> {
    let meds = state.reminders().map_err(|e| e.to_string())?;
    Ok(reminder_rows(&meds))
}

fn row_at(state: &CoreState, index: usize) -> Result<ReminderRow, String> {
    get_medication_reminders(state)?
        .into_iter()
        .nth(index)
        .ok_or_else(|| format!("Reminder {} not found", index + 1))
}
