pub mod conversation;
pub mod diagnosis;
pub mod enums;
pub mod medication;
pub mod profile;

pub use conversation::*;
pub use diagnosis::*;
pub use enums::*;
pub use medication::*;
pub use profile::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
