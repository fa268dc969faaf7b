//! Tagged field values (for writing) and destinations (for reading).
//!
//! Every value and destination carries its own element type and width, so a
//! record is described by an explicit list instead of being inferred from an
//! untyped argument list.

use std::ops::{Add, Mul, Sub};

use crate::format::{FieldDescriptor, FieldType, IntWidth, RealWidth};

/// A complex number stored as real part followed by imaginary part.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

pub type Complex32 = Complex<f32>;
pub type Complex64 = Complex<f64>;

impl<T> Complex<T> {
    pub const fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

impl<T> Mul for Complex<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<Output = T>,
{
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A numeric element with a fixed on-disk width, stored in native byte order.
pub trait Element: Copy + Default + sealed::Sealed {
    const TYPE: FieldType;

    fn put(self, out: &mut Vec<u8>);

    /// Decodes from exactly `TYPE.size()` bytes.
    fn get(bytes: &[u8]) -> Self;
}

fn fixed<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

macro_rules! primitive_element {
    ($($ty:ty => $field:expr),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Element for $ty {
                const TYPE: FieldType = $field;

                fn put(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_ne_bytes());
                }

                fn get(bytes: &[u8]) -> Self {
                    <$ty>::from_ne_bytes(fixed(bytes))
                }
            }
        )*
    };
}

macro_rules! complex_element {
    ($($ty:ty => $width:expr),* $(,)?) => {
        $(
            impl sealed::Sealed for Complex<$ty> {}

            impl Element for Complex<$ty> {
                const TYPE: FieldType = FieldType::Complex($width);

                fn put(self, out: &mut Vec<u8>) {
                    self.re.put(out);
                    self.im.put(out);
                }

                fn get(bytes: &[u8]) -> Self {
                    let half = bytes.len() / 2;
                    Complex::new(<$ty>::get(&bytes[..half]), <$ty>::get(&bytes[half..]))
                }
            }
        )*
    };
}

primitive_element! {
    i8 => FieldType::Int(IntWidth::W1),
    i16 => FieldType::Int(IntWidth::W2),
    i32 => FieldType::Int(IntWidth::W4),
    i64 => FieldType::Int(IntWidth::W8),
    f32 => FieldType::Real(RealWidth::W4),
    f64 => FieldType::Real(RealWidth::W8),
}

complex_element! {
    f32 => RealWidth::W4,
    f64 => RealWidth::W8,
}

fn type_of<T: Element>(_: &T) -> FieldType {
    T::TYPE
}

fn slice_type<T: Element>(_: &[T]) -> FieldType {
    T::TYPE
}

fn fill_vec<T: Element>(out: &mut Vec<T>, bytes: &[u8]) {
    out.clear();
    out.extend(bytes.chunks_exact(T::TYPE.size()).map(T::get));
}

/// Matches every numeric variant of `$enum`, binding the payload to `$bind`.
macro_rules! dispatch {
    ($enum:ident, $value:expr, $bind:ident => $body:expr) => {
        match $value {
            $enum::Int1($bind) => $body,
            $enum::Int2($bind) => $body,
            $enum::Int4($bind) => $body,
            $enum::Int8($bind) => $body,
            $enum::Real4($bind) => $body,
            $enum::Real8($bind) => $body,
            $enum::Complex4($bind) => $body,
            $enum::Complex8($bind) => $body,
        }
    };
}

/// A single numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int1(i8),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Real4(f32),
    Real8(f64),
    Complex4(Complex32),
    Complex8(Complex64),
}

impl Scalar {
    pub fn field_type(&self) -> FieldType {
        dispatch!(Scalar, self, v => type_of(v))
    }

    pub(crate) fn put(&self, out: &mut Vec<u8>) {
        dispatch!(Scalar, *self, v => v.put(out))
    }
}

/// A borrowed array of numeric values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrayValue<'a> {
    Int1(&'a [i8]),
    Int2(&'a [i16]),
    Int4(&'a [i32]),
    Int8(&'a [i64]),
    Real4(&'a [f32]),
    Real8(&'a [f64]),
    Complex4(&'a [Complex32]),
    Complex8(&'a [Complex64]),
}

impl ArrayValue<'_> {
    pub fn element_type(&self) -> FieldType {
        dispatch!(ArrayValue, self, v => slice_type(*v))
    }

    pub fn len(&self) -> usize {
        dispatch!(ArrayValue, self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn put(&self, out: &mut Vec<u8>) {
        dispatch!(ArrayValue, self, v => v.iter().for_each(|x| x.put(out)))
    }
}

/// One field value to be written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Scalar(Scalar),
    /// Character block; padded with spaces or truncated to the field width.
    Char(&'a [u8]),
    Array(ArrayValue<'a>),
}

impl<'a> Value<'a> {
    pub fn chars(text: &'a str) -> Self {
        Value::Char(text.as_bytes())
    }

    /// The descriptor this value would be written with on its own.
    pub fn descriptor(&self) -> FieldDescriptor {
        match self {
            Value::Scalar(s) => FieldDescriptor::scalar(s.field_type()),
            Value::Char(text) => FieldDescriptor::scalar(FieldType::Char(text.len())),
            Value::Array(a) => FieldDescriptor::array(a.element_type(), IntWidth::W4),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Value::Scalar(s) => s.field_type().to_string(),
            Value::Char(text) => format!("c{} text", text.len()),
            Value::Array(a) => format!("{} array of {}", a.element_type(), a.len()),
        }
    }
}

/// Where a numeric scalar is decoded into.
#[derive(Debug)]
pub enum ScalarDest<'a> {
    Int1(&'a mut i8),
    Int2(&'a mut i16),
    Int4(&'a mut i32),
    Int8(&'a mut i64),
    Real4(&'a mut f32),
    Real8(&'a mut f64),
    Complex4(&'a mut Complex32),
    Complex8(&'a mut Complex64),
}

impl ScalarDest<'_> {
    pub fn field_type(&self) -> FieldType {
        dispatch!(ScalarDest, self, v => type_of(&**v))
    }

    pub(crate) fn set(&mut self, bytes: &[u8]) {
        dispatch!(ScalarDest, self, v => **v = Element::get(bytes))
    }
}

/// Where a numeric array is decoded into; the vector is replaced.
#[derive(Debug)]
pub enum ArrayDest<'a> {
    Int1(&'a mut Vec<i8>),
    Int2(&'a mut Vec<i16>),
    Int4(&'a mut Vec<i32>),
    Int8(&'a mut Vec<i64>),
    Real4(&'a mut Vec<f32>),
    Real8(&'a mut Vec<f64>),
    Complex4(&'a mut Vec<Complex32>),
    Complex8(&'a mut Vec<Complex64>),
}

impl ArrayDest<'_> {
    pub fn element_type(&self) -> FieldType {
        dispatch!(ArrayDest, self, v => slice_type(v.as_slice()))
    }

    pub(crate) fn fill(&mut self, bytes: &[u8]) {
        dispatch!(ArrayDest, self, v => fill_vec(&mut **v, bytes))
    }
}

/// Element count of an array field being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Fixed(usize),
    /// The value of an earlier integer field (by index) of the same record.
    Field(usize),
}

/// One field destination for a read.
#[derive(Debug)]
pub enum Dest<'a> {
    /// Consume the field without storing it.
    Skip,
    Scalar(ScalarDest<'a>),
    /// Receives exactly the field width; no terminator is appended.
    Char(&'a mut [u8]),
    /// `target: None` consumes the array without storing it.
    Array {
        target: Option<ArrayDest<'a>>,
        count: Count,
    },
}

impl<'a> Dest<'a> {
    pub fn chars(buf: &'a mut [u8]) -> Self {
        Dest::Char(buf)
    }

    pub fn array(target: impl Into<ArrayDest<'a>>, count: Count) -> Self {
        Dest::Array {
            target: Some(target.into()),
            count,
        }
    }

    pub fn skip_array(count: Count) -> Self {
        Dest::Array {
            target: None,
            count,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Dest::Skip => "skip".to_string(),
            Dest::Scalar(d) => d.field_type().to_string(),
            Dest::Char(buf) => format!("{} byte buffer", buf.len()),
            Dest::Array {
                target: Some(t), ..
            } => format!("{} array", t.element_type()),
            Dest::Array { target: None, .. } => "skipped array".to_string(),
        }
    }
}

macro_rules! conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Scalar::$variant(v)
                }
            }

            impl From<$ty> for Value<'_> {
                fn from(v: $ty) -> Self {
                    Value::Scalar(Scalar::$variant(v))
                }
            }

            impl<'a> From<&'a [$ty]> for ArrayValue<'a> {
                fn from(v: &'a [$ty]) -> Self {
                    ArrayValue::$variant(v)
                }
            }

            impl<'a> From<&'a [$ty]> for Value<'a> {
                fn from(v: &'a [$ty]) -> Self {
                    Value::Array(ArrayValue::$variant(v))
                }
            }

            impl<'a> From<&'a mut $ty> for ScalarDest<'a> {
                fn from(v: &'a mut $ty) -> Self {
                    ScalarDest::$variant(v)
                }
            }

            impl<'a> From<&'a mut $ty> for Dest<'a> {
                fn from(v: &'a mut $ty) -> Self {
                    Dest::Scalar(ScalarDest::$variant(v))
                }
            }

            impl<'a> From<&'a mut Vec<$ty>> for ArrayDest<'a> {
                fn from(v: &'a mut Vec<$ty>) -> Self {
                    ArrayDest::$variant(v)
                }
            }
        )*
    };
}

conversions! {
    i8 => Int1,
    i16 => Int2,
    i32 => Int4,
    i64 => Int8,
    f32 => Real4,
    f64 => Real8,
    Complex32 => Complex4,
    Complex64 => Complex8,
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(text: &'a str) -> Self {
        Value::Char(text.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Value::Char(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Value<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Value::Char(bytes)
    }
}

impl<'a> From<&'a mut [u8]> for Dest<'a> {
    fn from(buf: &'a mut [u8]) -> Self {
        Dest::Char(buf)
    }
}

impl<'a, const N: usize> From<&'a mut [u8; N]> for Dest<'a> {
    fn from(buf: &'a mut [u8; N]) -> Self {
        Dest::Char(buf)
    }
}
