//! Access strategies: how record payloads map onto storage bytes.
//!
//! - **Sequential**: every payload framed by a leading and trailing length marker
//! - **Direct**: fixed-length slots addressed by a 1-based record number
//! - **Stream**: raw bytes with no framing at all

pub mod direct;
pub mod sequential;
pub mod stream;

pub use direct::DirectAccess;
pub use sequential::{RecordFrame, SequentialAccess};
pub use stream::StreamAccess;

use unf_common::AccessMode;

use crate::codec::FieldSource;
use crate::error::UnfResult;
use crate::storage::Storage;

/// The strategy a session was opened with, together with its cursor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Sequential(SequentialAccess),
    Direct(DirectAccess),
    Stream(StreamAccess),
}

impl Access {
    pub fn mode(&self) -> AccessMode {
        match self {
            Access::Sequential(_) => AccessMode::Sequential,
            Access::Direct(_) => AccessMode::Direct,
            Access::Stream(_) => AccessMode::Stream,
        }
    }

    /// Byte offset of the cursor. Direct access has none.
    pub fn position(&self) -> Option<u64> {
        match self {
            Access::Sequential(seq) => Some(seq.position()),
            Access::Direct(_) => None,
            Access::Stream(stream) => Some(stream.position()),
        }
    }

    pub fn record_length(&self) -> Option<u64> {
        match self {
            Access::Direct(direct) => Some(direct.record_length()),
            _ => None,
        }
    }
}

/// Feeds the decoder from the byte range `[offset, end)` of a storage.
///
/// Only the bytes a field actually asks for are read, so the unrequested tail
/// of a record is never touched.
pub(crate) struct StorageSource<'s, S: Storage + ?Sized> {
    storage: &'s mut S,
    offset: u64,
    end: u64,
    buf: Vec<u8>,
}

impl<'s, S: Storage + ?Sized> StorageSource<'s, S> {
    pub(crate) fn new(storage: &'s mut S, offset: u64, end: u64) -> Self {
        Self {
            storage,
            offset,
            end,
            buf: Vec::new(),
        }
    }

    /// Offset just past the last byte handed out.
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }
}

impl<S: Storage + ?Sized> FieldSource for StorageSource<'_, S> {
    fn take(&mut self, len: usize) -> UnfResult<Option<&[u8]>> {
        if self.available() < len as u64 {
            return Ok(None);
        }
        self.buf.resize(len, 0);
        if !self.storage.read_exact_at(self.offset, &mut self.buf)? {
            return Ok(None);
        }
        self.offset += len as u64;
        Ok(Some(&self.buf))
    }

    fn available(&self) -> u64 {
        self.end.saturating_sub(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_storage_source_is_bounded() {
        let mut storage = MemoryStorage::from_bytes(b"0123456789".to_vec());
        let mut source = StorageSource::new(&mut storage, 2, 7);
        assert_eq!(source.available(), 5);
        assert_eq!(source.take(3).unwrap(), Some(&b"234"[..]));
        assert_eq!(source.take(3).unwrap(), None);
        assert_eq!(source.take(2).unwrap(), Some(&b"56"[..]));
        assert_eq!(source.offset(), 7);
        assert_eq!(source.available(), 0);
    }
}
