//! Cross-checking helpers for `unf-storage`.
//!
//! The integration tests in this crate compare what the library writes
//! against an independent, hand-rolled reading of the same bytes.

pub mod fixture;
pub mod hex;
pub mod reference;

pub use fixture::Workspace;
pub use hex::hex;
pub use reference::{
    FieldReader, Fields, ReferenceError, ReferenceResult, frame_records, split_records,
    split_slots,
};
