//! Medication reminders: add, mark done, list.
//!
//! Reminders live in the session state in insertion order. Every change
//! goes through `StateStore::apply`, so a rejected call leaves the list
//! exactly as it was.

use serde::Serialize;

use crate::models::{is_valid_reminder_time, Medication, ReminderStatus};
use crate::store::{StateStore, StoreError};

/// One row of the reminder sidebar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderRow {
    pub index: usize,
    /// "⏰ HH:MM"
    pub time_label: String,
    pub name: String,
    pub done: bool,
}

impl ReminderRow {
    /// "⏰ 08:00  阿莫西林", with a trailing check mark once taken.
    pub fn display(&self) -> String {
        let mark = if self.done { "  ✓" } else { "" };
        format!("{}  {}{}", self.time_label, self.name, mark)
    }
}

pub struct MedicationTracker<'a> {
    store: &'a StateStore,
}

impl<'a> MedicationTracker<'a> {
    pub fn new(store: &'a StateStore) -> Self {
        Self { store }
    }

    /// Append a pending reminder. Returns its index.
    pub fn add_reminder(&self, name: &str, time: &str) -> Result<usize, ReminderError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ReminderError::InvalidReminder("medication name is empty".into()));
        }
        if !is_valid_reminder_time(time) {
            return Err(ReminderError::InvalidReminder(format!(
                "time {time:?} is not HH:MM"
            )));
        }

        let index = self.store.apply(|s| {
            s.medications.push(Medication::pending(name, time));
            Ok::<_, ReminderError>(s.medications.len() - 1)
        })?;
        tracing::debug!(index, time, "Medication reminder added");
        Ok(index)
    }

    /// Mark a reminder done. Marking an already-done reminder is a no-op.
    pub fn mark_done(&self, index: usize) -> Result<(), ReminderError> {
        let snapshot = self.store.get()?;
        let len = snapshot.medications.len();
        match snapshot.medications.get(index) {
            None => return Err(ReminderError::IndexOutOfRange { index, len }),
            Some(med) if med.is_done() => return Ok(()),
            Some(_) => {}
        }

        self.store.apply(|s| {
            let len = s.medications.len();
            let med = s
                .medications
                .get_mut(index)
                .ok_or(ReminderError::IndexOutOfRange { index, len })?;
            med.status = ReminderStatus::Done;
            Ok::<_, ReminderError>(())
        })?;
        tracing::debug!(index, "Medication reminder done");
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Medication>, ReminderError> {
        Ok(self.store.get()?.medications.clone())
    }

    pub fn pending_count(&self) -> Result<usize, ReminderError> {
        Ok(self
            .store
            .get()?
            .medications
            .iter()
            .filter(|m| !m.is_done())
            .count())
    }
}

/// Sidebar rows for the given reminders, in insertion order.
pub fn reminder_rows(medications: &[Medication]) -> Vec<ReminderRow> {
    medications
        .iter()
        .enumerate()
        .map(|(index, med)| ReminderRow {
            index,
            time_label: format!("⏰ {}", med.time),
            name: med.name.clone(),
            done: med.is_done(),
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error("Invalid reminder: {0}")]
    InvalidReminder(String),
    #[error("Reminder index {index} out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("State error: {0}")]
    Store(#[from] StoreError),
}
