pub mod core;
pub mod seek;

pub use self::core::{FileSession, SessionStats};
pub use self::seek::{SeekEngine, SeekOutcome};
