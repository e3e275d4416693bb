//! User profile panel: the "update profile" operation.

use crate::models::{Gender, ProfileUpdate, UserProfile};
use crate::store::{StateStore, StoreError};

pub struct ProfileManager<'a> {
    store: &'a StateStore,
}

impl<'a> ProfileManager<'a> {
    pub fn new(store: &'a StateStore) -> Self {
        Self { store }
    }

    pub fn current(&self) -> Result<UserProfile, StoreError> {
        Ok(self.store.get()?.user_profile.clone())
    }

    /// Apply the submitted form. Any out-of-domain field rejects the whole update.
    pub fn update(&self, update: ProfileUpdate) -> Result<UserProfile, StoreError> {
        let age = match update.age {
            Some(age) if !UserProfile::age_in_range(age) => {
                return Err(StoreError::InvalidMutation(format!(
                    "age {age} outside 1..=100"
                )));
            }
            Some(age) => Some(age as u32),
            None => None,
        };
        let gender = update
            .gender
            .as_deref()
            .map(Gender::parse_any)
            .transpose()
            .map_err(|e| StoreError::InvalidMutation(e.to_string()))?;

        let profile = self.store.apply(|s| {
            let profile = &mut s.user_profile;
            if let Some(name) = update.name {
                profile.name = name.trim().to_string();
            }
            if let Some(age) = age {
                profile.age = age;
            }
            if let Some(gender) = gender {
                profile.gender = gender;
            }
            if let Some(history) = update.medical_history {
                profile.medical_history = history
                    .into_iter()
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty())
                    .collect();
            }
            Ok::<_, StoreError>(profile.clone())
        })?;

        tracing::info!("Profile updated");
        Ok(profile)
    }

    /// Append one entry to the medical history. Blank entries are rejected.
    pub fn add_history_entry(&self, entry: &str) -> Result<(), StoreError> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(StoreError::InvalidMutation("history entry is empty".into()));
        }
        self.store.apply(|s| {
            s.user_profile.medical_history.push(entry.to_string());
            Ok(())
        })
    }
}
