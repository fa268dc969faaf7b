use tracing::{debug, warn};
use unf_common::constants::{FRAME_OVERHEAD, MARKER_SIZE, MAX_RECORD_PAYLOAD};

use super::StorageSource;
use crate::codec::decode::check_dests;
use crate::codec::{Dest, Transfer, decode};
use crate::error::{UnfError, UnfResult};
use crate::format::FormatSpec;
use crate::storage::Storage;

/// Location of one framed record: `marker | payload | marker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFrame {
    /// Offset of the leading marker.
    pub offset: u64,
    /// Payload length as stored in both markers.
    pub len: u64,
}

impl RecordFrame {
    pub fn payload_offset(&self) -> u64 {
        self.offset + MARKER_SIZE as u64
    }

    pub fn trailer_offset(&self) -> u64 {
        self.payload_offset() + self.len
    }

    /// Offset just past the trailing marker.
    pub fn end(&self) -> u64 {
        self.offset + FRAME_OVERHEAD + self.len
    }
}

/// Marker-framed records read and written in order.
///
/// The cursor always sits on a record boundary. Moving backwards re-derives
/// the previous record's extent from its trailing marker, so no history of
/// boundaries is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequentialAccess {
    cursor: u64,
}

impl SequentialAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> u64 {
        self.cursor
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Frames `payload` at the cursor and moves past it.
    ///
    /// Anything that followed the cursor is discarded, so writing after a
    /// backspace replaces the rest of the file.
    pub fn write_record<S>(&mut self, storage: &mut S, payload: &[u8]) -> UnfResult<()>
    where
        S: Storage + ?Sized,
    {
        if payload.len() > MAX_RECORD_PAYLOAD {
            return Err(UnfError::Bounds(format!(
                "record payload of {} bytes exceeds the {MAX_RECORD_PAYLOAD} byte limit",
                payload.len()
            )));
        }

        let marker = (payload.len() as u32).to_ne_bytes();
        let mut frame = Vec::with_capacity(payload.len() + FRAME_OVERHEAD as usize);
        frame.extend_from_slice(&marker);
        frame.extend_from_slice(payload);
        frame.extend_from_slice(&marker);

        storage.write_at(self.cursor, &frame)?;
        self.cursor += frame.len() as u64;

        let size = storage.size()?;
        if size > self.cursor {
            debug!(from = size, to = self.cursor, "truncating after rewritten record");
            storage.truncate(self.cursor)?;
        }
        Ok(())
    }

    /// Decodes the record at the cursor into `dests`.
    ///
    /// Once the frame itself is valid the cursor moves past the whole record,
    /// however many of its fields were requested or could be decoded. A
    /// destination list that does not fit `spec` consumes nothing.
    pub fn read_record<S>(
        &mut self,
        storage: &mut S,
        spec: &FormatSpec,
        dests: &mut [Dest<'_>],
    ) -> Transfer
    where
        S: Storage + ?Sized,
    {
        if let Err(err) = check_dests(spec, dests) {
            return Transfer::failed(err);
        }
        let frame = match frame_at(storage, self.cursor) {
            Ok(frame) => frame,
            Err(err) => return Transfer::failed(err),
        };
        let mut source =
            StorageSource::new(storage, frame.payload_offset(), frame.trailer_offset());
        let transfer = decode(spec, &mut source, dests);
        self.cursor = frame.end();
        transfer
    }

    /// Moves past the record at the cursor without decoding it.
    pub fn skip<S: Storage + ?Sized>(&mut self, storage: &mut S) -> UnfResult<RecordFrame> {
        let frame = frame_at(storage, self.cursor)?;
        self.cursor = frame.end();
        Ok(frame)
    }

    /// Moves to the start of the record preceding the cursor.
    pub fn backspace<S: Storage + ?Sized>(&mut self, storage: &mut S) -> UnfResult<RecordFrame> {
        let frame = frame_before(storage, self.cursor)?;
        self.cursor = frame.offset;
        Ok(frame)
    }
}

fn read_marker<S: Storage + ?Sized>(storage: &mut S, offset: u64) -> UnfResult<Option<u32>> {
    let mut buf = [0u8; MARKER_SIZE];
    if storage.read_exact_at(offset, &mut buf)? {
        Ok(Some(u32::from_ne_bytes(buf)))
    } else {
        Ok(None)
    }
}

/// Validates the record whose leading marker starts at `offset`.
pub fn frame_at<S: Storage + ?Sized>(storage: &mut S, offset: u64) -> UnfResult<RecordFrame> {
    let Some(leading) = read_marker(storage, offset)? else {
        return Err(UnfError::Eof);
    };
    let frame = RecordFrame {
        offset,
        len: u64::from(leading),
    };

    let Some(trailing) = read_marker(storage, frame.trailer_offset())? else {
        let available = storage.size()?.saturating_sub(frame.payload_offset());
        warn!(offset, len = frame.len, available, "truncated record");
        return Err(UnfError::ShortRecord {
            needed: frame.len + MARKER_SIZE as u64,
            available,
        });
    };
    check_markers(offset, leading, trailing)?;
    Ok(frame)
}

/// Validates the record that ends exactly at `end`.
pub fn frame_before<S: Storage + ?Sized>(storage: &mut S, end: u64) -> UnfResult<RecordFrame> {
    if end == 0 {
        return Err(UnfError::Bounds("no record before the start of the file".to_string()));
    }
    let trailer_offset = end.checked_sub(MARKER_SIZE as u64).ok_or_else(|| {
        UnfError::Bounds(format!("offset {end} is inside the first record marker"))
    })?;
    let Some(trailing) = read_marker(storage, trailer_offset)? else {
        return Err(UnfError::Eof);
    };

    let len = u64::from(trailing);
    let offset = end.checked_sub(FRAME_OVERHEAD + len).ok_or_else(|| {
        UnfError::Bounds(format!(
            "record of {len} bytes ending at offset {end} would start before the file"
        ))
    })?;
    let Some(leading) = read_marker(storage, offset)? else {
        return Err(UnfError::Eof);
    };
    check_markers(offset, leading, trailing)?;
    Ok(RecordFrame { offset, len })
}

fn check_markers(offset: u64, leading: u32, trailing: u32) -> UnfResult<()> {
    if leading != trailing {
        warn!(offset, leading, trailing, "record marker mismatch");
        return Err(UnfError::MarkerMismatch {
            offset,
            leading,
            trailing,
        });
    }
    Ok(())
}
