use tracing::debug;
use unf_common::constants::MAX_RECORD_LENGTH;

use super::StorageSource;
use crate::codec::{Dest, Transfer, decode};
use crate::error::{UnfError, UnfResult};
use crate::format::FormatSpec;
use crate::storage::Storage;

/// Largest run of fill bytes written in one call.
const FILL_CHUNK: u64 = 64 * 1024;

/// Fixed-length slots addressed by a 1-based record number.
///
/// Every write fills its whole slot: the payload followed by `fill` bytes up
/// to `record_length`. The file is therefore always a whole number of slots
/// long, ending with the highest record number written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectAccess {
    record_length: u64,
    fill: u8,
}

impl DirectAccess {
    pub fn new(record_length: u64, fill: u8) -> UnfResult<Self> {
        if record_length == 0 {
            return Err(UnfError::Open(
                "direct access requires a positive record length".to_string(),
            ));
        }
        if record_length > MAX_RECORD_LENGTH || usize::try_from(record_length).is_err() {
            return Err(UnfError::Open(format!(
                "record length {record_length} exceeds the {MAX_RECORD_LENGTH} byte limit"
            )));
        }
        Ok(Self {
            record_length,
            fill,
        })
    }

    pub fn record_length(&self) -> u64 {
        self.record_length
    }

    /// Byte offset of slot `record`.
    pub fn slot_offset(&self, record: u64) -> UnfResult<u64> {
        if record == 0 {
            return Err(UnfError::Bounds("record numbers start at 1".to_string()));
        }
        (record - 1)
            .checked_mul(self.record_length)
            .ok_or_else(|| UnfError::Bounds(format!("record {record} is beyond addressable range")))
    }

    pub fn write_record<S>(&self, storage: &mut S, record: u64, payload: &[u8]) -> UnfResult<()>
    where
        S: Storage + ?Sized,
    {
        let offset = self.slot_offset(record)?;
        if payload.len() as u64 > self.record_length {
            return Err(UnfError::Bounds(format!(
                "payload of {} bytes does not fit record length {}",
                payload.len(),
                self.record_length
            )));
        }

        let end = offset.checked_add(self.record_length).ok_or_else(|| {
            UnfError::Bounds(format!("record {record} is beyond addressable range"))
        })?;

        storage.write_at(offset, payload)?;
        let mut pos = offset + payload.len() as u64;
        let chunk = vec![self.fill; (end - pos).min(FILL_CHUNK) as usize];
        while pos < end {
            let n = (end - pos).min(chunk.len() as u64) as usize;
            storage.write_at(pos, &chunk[..n])?;
            pos += n as u64;
        }
        Ok(())
    }

    /// Decodes slot `record`. A slot cut short by the end of the file is read
    /// as far as it goes.
    pub fn read_record<S>(
        &self,
        storage: &mut S,
        record: u64,
        spec: &FormatSpec,
        dests: &mut [Dest<'_>],
    ) -> Transfer
    where
        S: Storage + ?Sized,
    {
        let offset = match self.slot_offset(record) {
            Ok(offset) => offset,
            Err(err) => return Transfer::failed(err),
        };
        let size = match storage.size() {
            Ok(size) => size,
            Err(err) => return Transfer::failed(err.into()),
        };
        if offset >= size {
            debug!(record, size, "direct record beyond end of file");
            return Transfer::failed(UnfError::Eof);
        }

        let end = size.min(offset.saturating_add(self.record_length));
        decode(spec, &mut StorageSource::new(storage, offset, end), dests)
    }
}
