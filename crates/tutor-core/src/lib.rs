pub mod config;
pub mod error;
pub mod types;

pub use config::TutorConfig;
pub use error::{Result, TutorError};
pub use types::*;
