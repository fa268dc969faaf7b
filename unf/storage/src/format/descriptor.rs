//! Field descriptors produced by the format compiler.

use std::fmt;

use super::compiler;
use crate::codec::Value;
use crate::error::UnfResult;

/// Width of a signed two's-complement integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W1,
    W2,
    W4,
    W8,
}

/// Width of an IEEE-754 floating point field (or of each half of a complex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RealWidth {
    W4,
    W8,
}

/// The type and width of one field element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Int(IntWidth),
    Real(RealWidth),
    /// Real part followed by imaginary part, each of the given width.
    Complex(RealWidth),
    /// Fixed-width character block of the given length in bytes.
    Char(usize),
}

/// One compiled field of a format.
///
/// `count` is set for array fields and names the integer type of the
/// element count; the count itself is never part of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub ty: FieldType,
    pub count: Option<IntWidth>,
}

/// Ordered list of field descriptors describing one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSpec {
    fields: Vec<FieldDescriptor>,
}

impl IntWidth {
    pub fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            1 => Some(IntWidth::W1),
            2 => Some(IntWidth::W2),
            4 => Some(IntWidth::W4),
            8 => Some(IntWidth::W8),
            _ => None,
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            IntWidth::W1 => 1,
            IntWidth::W2 => 2,
            IntWidth::W4 => 4,
            IntWidth::W8 => 8,
        }
    }

    /// Largest element count an integer of this width can hold.
    pub fn max_count(self) -> u64 {
        match self {
            IntWidth::W1 => i8::MAX as u64,
            IntWidth::W2 => i16::MAX as u64,
            IntWidth::W4 => i32::MAX as u64,
            IntWidth::W8 => i64::MAX as u64,
        }
    }
}

impl RealWidth {
    pub fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            4 => Some(RealWidth::W4),
            8 => Some(RealWidth::W8),
            _ => None,
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            RealWidth::W4 => 4,
            RealWidth::W8 => 8,
        }
    }
}

impl FieldType {
    /// Size in bytes of one element of this type.
    pub fn size(self) -> usize {
        match self {
            FieldType::Int(w) => w.bytes(),
            FieldType::Real(w) => w.bytes(),
            FieldType::Complex(w) => 2 * w.bytes(),
            FieldType::Char(len) => len,
        }
    }
}

impl FieldDescriptor {
    pub fn scalar(ty: FieldType) -> Self {
        Self { ty, count: None }
    }

    pub fn array(ty: FieldType, count: IntWidth) -> Self {
        Self {
            ty,
            count: Some(count),
        }
    }

    pub fn is_array(&self) -> bool {
        self.count.is_some()
    }

    /// Size in bytes of the field, if it does not depend on an array count.
    pub fn fixed_size(&self) -> Option<usize> {
        if self.is_array() {
            None
        } else {
            Some(self.ty.size())
        }
    }
}

impl FormatSpec {
    /// Compiles a format string such as `"c10,2i4,r8[i4]"`.
    pub fn compile(format: &str) -> UnfResult<Self> {
        compiler::compile(format)
    }

    /// Derives the format describing a list of tagged values.
    ///
    /// Arrays get an `i4` count type, the default integer kind of the
    /// runtimes producing these files.
    pub fn of_values(values: &[Value<'_>]) -> Self {
        Self {
            fields: values.iter().map(Value::descriptor).collect(),
        }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.fields.iter()
    }

    /// Total payload size, if no field is an array.
    pub fn fixed_size(&self) -> Option<usize> {
        self.fields.iter().map(FieldDescriptor::fixed_size).sum()
    }
}

impl From<Vec<FieldDescriptor>> for FormatSpec {
    fn from(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }
}

impl<'a> IntoIterator for &'a FormatSpec {
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;
    type Item = &'a FieldDescriptor;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int(w) => write!(f, "i{}", w.bytes()),
            FieldType::Real(w) => write!(f, "r{}", w.bytes()),
            FieldType::Complex(w) => write!(f, "z{}", w.bytes()),
            FieldType::Char(len) => write!(f, "c{len}"),
        }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            Some(count) => write!(f, "{}[i{}]", self.ty, count.bytes()),
            None => write!(f, "{}", self.ty),
        }
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}
