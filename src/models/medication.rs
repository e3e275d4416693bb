use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::enums::ReminderStatus;

/// Zero-padded 24-hour clock time.
static REMINDER_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[01]\d|2[0-3]):[0-5]\d$").expect("valid time regex"));

/// A medication reminder. Status only ever moves pending → done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub time: String,
    pub status: ReminderStatus,
}

impl Medication {
    pub fn pending(name: &str, time: &str) -> Self {
        Self {
            name: name.to_string(),
            time: time.to_string(),
            status: ReminderStatus::Pending,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == ReminderStatus::Done
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && is_valid_reminder_time(&self.time)
    }
}

/// True for "HH:MM" between 00:00 and 23:59.
pub fn is_valid_reminder_time(time: &str) -> bool {
    REMINDER_TIME.is_match(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_times() {
        for t in ["00:00", "08:00", "12:30", "23:59"] {
            assert!(is_valid_reminder_time(t), "{t} should be valid");
        }
    }

    #[test]
    fn invalid_times() {
        for t in ["", "8:00", "24:00", "12:60", "12:3", "12-30", "08:00 ", "ab:cd"] {
            assert!(!is_valid_reminder_time(t), "{t:?} should be invalid");
        }
    }

    #[test]
    fn new_reminder_is_pending() {
        let med = Medication::pending("阿莫西林", "08:00");
        assert_eq!(med.status, ReminderStatus::Pending);
        assert!(!med.is_done());
        assert!(med.is_valid());
    }

    #[test]
    fn blank_name_is_not_valid() {
        assert!(!Medication::pending("  ", "08:00").is_valid());
    }
}
