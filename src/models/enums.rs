use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(MessageType {
    User => "user",
    System => "system",
});

str_enum!(Gender {
    Male => "male",
    Female => "female",
});

str_enum!(ReminderStatus {
    Pending => "pending",
    Done => "done",
});

impl Gender {
    /// Label shown in the profile form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "男",
            Self::Female => "女",
        }
    }

    /// Parse either the stored code or the form label.
    pub fn parse_any(s: &str) -> Result<Self, ModelError> {
        match s.trim() {
            "男" => Ok(Self::Male),
            "女" => Ok(Self::Female),
            other => other.to_ascii_lowercase().parse(),
        }
    }
}
