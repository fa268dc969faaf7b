pub mod access;
pub mod codec;
pub mod error;
pub mod format;
pub mod session;
pub mod storage;

pub use codec::{Complex, Complex32, Complex64, Count, Dest, Value};
pub use error::{ErrorCode, Status, UnfError, UnfResult};
pub use format::{FieldDescriptor, FieldType, FormatSpec};
pub use session::{FileSession, SessionStats};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use unf_common::{AccessMode, OpenMode, SeekOrigin, SessionConfig};
