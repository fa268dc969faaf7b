pub mod config;
pub mod constants;
pub mod mode;

pub use config::SessionConfig;
pub use mode::{AccessMode, OpenMode, ParseModeError, SeekOrigin};
