use serde::{Deserialize, Serialize};

use super::enums::Gender;

pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 100;
pub const DEFAULT_AGE: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub medical_history: Vec<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: DEFAULT_AGE,
            gender: Gender::Male,
            medical_history: Vec::new(),
        }
    }
}

impl UserProfile {
    pub fn age_in_range(age: i64) -> bool {
        (i64::from(MIN_AGE)..=i64::from(MAX_AGE)).contains(&age)
    }
}

/// Fields submitted by the profile form. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub medical_history: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_matches_form_defaults() {
        let profile = UserProfile::default();
        assert_eq!(profile.name, "");
        assert_eq!(profile.age, 30);
        assert_eq!(profile.gender, Gender::Male);
        assert!(profile.medical_history.is_empty());
    }

    #[test]
    fn age_bounds_are_inclusive() {
        assert!(UserProfile::age_in_range(1));
        assert!(UserProfile::age_in_range(100));
        assert!(!UserProfile::age_in_range(0));
        assert!(!UserProfile::age_in_range(-5));
        assert!(!UserProfile::age_in_range(101));
    }
}
