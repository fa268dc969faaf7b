//! Conversion between tagged field values and contiguous record payloads.

pub mod decode;
pub mod encode;
pub mod value;

pub use decode::{FieldSource, SliceSource, Transfer, decode};
pub use encode::encode;
pub use value::{
    ArrayDest, ArrayValue, Complex, Complex32, Complex64, Count, Dest, Element, Scalar,
    ScalarDest, Value,
};
