//! User profile commands.

use crate::core_state::CoreState;
use crate::models::{ProfileUpdate, UserProfile};

pub fn get_profile(state: &CoreState) -> Result<UserProfile, String> {
    let snapshot = state.snapshot().map_err(|e| e.to_string())?;
    Ok(snapshot.user_profile.clone())
}

pub fn update_profile(state: &CoreState, update: ProfileUpdate) -> Result<UserProfile, String> {
    state.update_profile(update).map_err(|e| e.to_string())
}

/// Append one entry to the medical history.
pub fn add_history_entry(state: &CoreState, entry: &str) -> Result<UserProfile, String> {
    state.add_history_entry(entry).map_err(|e| e.to_string())
}

/// Parse `key=value` pairs from the profile form line.
///
/// Keys: `name`, `age`, `gender`, `history` (comma separated).
pub fn parse_profile_fields<'a>(
    fields: impl IntoIterator<Item = &'a str>,
) -> Result<ProfileUpdate, String> {
    let mut update = ProfileUpdate::default();
    for field in fields {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got {field:?}"))?;
        match key {
            "name" => update.name = Some(value.to_string()),
            "age" => {
                let age = value
                    .parse::<i64>()
                    .map_err(|_| format!("Age must be a whole number, got {value:?}"))?;
                update.age = Some(age);
            }
            "gender" => update.gender = Some(value.to_string()),
            "history" => {
                update.medical_history = Some(
                    value
                        .split([',', '，'])
                        .map(str::to_string)
                        .collect(),
                )
            }
            other => return Err(format!("Unknown profile field: {other}")),
        }
    }
    Ok(update)
}
