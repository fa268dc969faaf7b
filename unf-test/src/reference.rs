//! A byte-level producer and consumer of the on-disk layouts.
//!
//! Nothing here goes through `unf-storage`: records are assembled and taken
//! apart by hand, the way the numerical runtimes lay them out, so files made
//! by the library can be checked against an independent reading and vice
//! versa.

use thiserror::Error;
use unf_common::constants::{CHAR_PAD, MARKER_SIZE};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("need {needed} bytes at offset {offset}, only {available} left")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("markers disagree at offset {offset}: {leading} vs {trailing}")]
    MarkerMismatch {
        offset: usize,
        leading: u32,
        trailing: u32,
    },

    #[error("file of {len} bytes is not a whole number of {record_length} byte slots")]
    PartialSlot { len: usize, record_length: usize },
}

pub type ReferenceResult<T> = Result<T, ReferenceError>;

/// Packs field values back to back in native byte order.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    bytes: Vec<u8>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn i1(mut self, v: i8) -> Self {
        self.bytes.extend_from_slice(&v.to_ne_bytes());
        self
    }

    pub fn i2(mut self, v: i16) -> Self {
        self.bytes.extend_from_slice(&v.to_ne_bytes());
        self
    }

    pub fn i4(mut self, v: i32) -> Self {
        self.bytes.extend_from_slice(&v.to_ne_bytes());
        self
    }

    pub fn i8(mut self, v: i64) -> Self {
        self.bytes.extend_from_slice(&v.to_ne_bytes());
        self
    }

    pub fn r4(mut self, v: f32) -> Self {
        self.bytes.extend_from_slice(&v.to_ne_bytes());
        self
    }

    pub fn r8(mut self, v: f64) -> Self {
        self.bytes.extend_from_slice(&v.to_ne_bytes());
        self
    }

    pub fn z4(self, re: f32, im: f32) -> Self {
        self.r4(re).r4(im)
    }

    pub fn z8(self, re: f64, im: f64) -> Self {
        self.r8(re).r8(im)
    }

    /// A character block of exactly `width` bytes, blank padded.
    pub fn chars(mut self, text: &str, width: usize) -> Self {
        let text = &text.as_bytes()[..text.len().min(width)];
        self.bytes.extend_from_slice(text);
        self.bytes.resize(self.bytes.len() + width - text.len(), CHAR_PAD);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Fields> for Vec<u8> {
    fn from(fields: Fields) -> Self {
        fields.bytes
    }
}

/// Unpacks fields in order from one payload.
#[derive(Debug)]
pub struct FieldReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, needed: usize) -> ReferenceResult<&'a [u8]> {
        if self.remaining() < needed {
            return Err(ReferenceError::Truncated {
                offset: self.pos,
                needed,
                available: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += needed;
        Ok(&self.bytes[start..self.pos])
    }

    fn array<const N: usize>(&mut self) -> ReferenceResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn i1(&mut self) -> ReferenceResult<i8> {
        Ok(i8::from_ne_bytes(self.array()?))
    }

    pub fn i2(&mut self) -> ReferenceResult<i16> {
        Ok(i16::from_ne_bytes(self.array()?))
    }

    pub fn i4(&mut self) -> ReferenceResult<i32> {
        Ok(i32::from_ne_bytes(self.array()?))
    }

    pub fn i8(&mut self) -> ReferenceResult<i64> {
        Ok(i64::from_ne_bytes(self.array()?))
    }

    pub fn r4(&mut self) -> ReferenceResult<f32> {
        Ok(f32::from_ne_bytes(self.array()?))
    }

    pub fn r8(&mut self) -> ReferenceResult<f64> {
        Ok(f64::from_ne_bytes(self.array()?))
    }

    pub fn z4(&mut self) -> ReferenceResult<(f32, f32)> {
        Ok((self.r4()?, self.r4()?))
    }

    pub fn z8(&mut self) -> ReferenceResult<(f64, f64)> {
        Ok((self.r8()?, self.r8()?))
    }

    pub fn chars(&mut self, width: usize) -> ReferenceResult<&'a [u8]> {
        self.take(width)
    }
}

/// Frames each payload as `marker | payload | marker`.
pub fn frame_records<I>(payloads: I) -> Vec<u8>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut out = Vec::new();
    for payload in payloads {
        let payload = payload.as_ref();
        let marker = (payload.len() as u32).to_ne_bytes();
        out.extend_from_slice(&marker);
        out.extend_from_slice(payload);
        out.extend_from_slice(&marker);
    }
    out
}

/// Splits a sequential file into record payloads, checking every marker pair.
pub fn split_records(bytes: &[u8]) -> ReferenceResult<Vec<&[u8]>> {
    let mut records = Vec::new();
    let mut reader = FieldReader::new(bytes);
    while reader.remaining() > 0 {
        let offset = reader.pos;
        let leading = u32::from_ne_bytes(reader.array()?);
        let payload = reader.take(leading as usize)?;
        let trailing = u32::from_ne_bytes(reader.array::<MARKER_SIZE>()?);
        if leading != trailing {
            return Err(ReferenceError::MarkerMismatch {
                offset,
                leading,
                trailing,
            });
        }
        records.push(payload);
    }
    Ok(records)
}

/// Splits a direct-access file into its fixed-length slots.
pub fn split_slots(bytes: &[u8], record_length: usize) -> ReferenceResult<Vec<&[u8]>> {
    if record_length == 0 || bytes.len() % record_length != 0 {
        return Err(ReferenceError::PartialSlot {
            len: bytes.len(),
            record_length,
        });
    }
    Ok(bytes.chunks_exact(record_length).collect())
}
