use tracing::debug;
use unf_common::SeekOrigin;

use crate::access::SequentialAccess;
use crate::error::{UnfError, UnfResult};
use crate::storage::Storage;

/// Where a successful seek left the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekOutcome {
    pub position: u64,
    /// Set when forward skipping stopped exactly at the end of the data.
    pub at_end: bool,
}

/// Record-relative positioning over a sequential cursor.
///
/// Every move runs on a copy of the cursor and is committed only once all of
/// its steps succeed, so a failed seek leaves the session where it was.
pub struct SeekEngine<'a, S: Storage + ?Sized> {
    storage: &'a mut S,
    cursor: &'a mut SequentialAccess,
}

impl<'a, S: Storage + ?Sized> SeekEngine<'a, S> {
    pub fn new(storage: &'a mut S, cursor: &'a mut SequentialAccess) -> Self {
        Self { storage, cursor }
    }

    /// Moves `delta` records from `origin`.
    ///
    /// From `Begin` the delta counts records to skip after rewinding and must
    /// not be negative. From `Current` a negative delta backspaces.
    pub fn seek(&mut self, origin: SeekOrigin, delta: i64) -> UnfResult<SeekOutcome> {
        let mut probe = *self.cursor;
        match origin {
            SeekOrigin::Begin => {
                if delta < 0 {
                    return Err(UnfError::Bounds(format!(
                        "cannot seek {delta} records from the beginning"
                    )));
                }
                probe.rewind();
            }
            SeekOrigin::Current => {}
        }

        if delta < 0 {
            for _ in 0..delta.unsigned_abs() {
                probe.backspace(&mut *self.storage)?;
            }
        } else {
            for _ in 0..delta {
                probe.skip(&mut *self.storage)?;
            }
        }

        let at_end = delta > 0 && probe.position() >= self.storage.size()?;
        debug!(
            ?origin,
            delta,
            from = self.cursor.position(),
            to = probe.position(),
            "seek"
        );
        *self.cursor = probe;
        Ok(SeekOutcome {
            position: probe.position(),
            at_end,
        })
    }

    pub fn backspace(&mut self) -> UnfResult<SeekOutcome> {
        self.seek(SeekOrigin::Current, -1)
    }
}
