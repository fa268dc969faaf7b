//! Compilation of field-specification strings into descriptor lists.

pub mod compiler;
pub mod descriptor;

pub use compiler::compile;
pub use descriptor::{FieldDescriptor, FieldType, FormatSpec, IntWidth, RealWidth};
