use super::StorageSource;
use crate::codec::{Dest, Transfer, decode};
use crate::error::{UnfError, UnfResult};
use crate::format::FormatSpec;
use crate::storage::Storage;

/// Unframed bytes behind a single cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamAccess {
    cursor: u64,
}

impl StreamAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> u64 {
        self.cursor
    }

    pub fn write<S: Storage + ?Sized>(&mut self, storage: &mut S, payload: &[u8]) -> UnfResult<()> {
        storage.write_at(self.cursor, payload)?;
        self.cursor += payload.len() as u64;
        Ok(())
    }

    /// Decodes fields at the cursor, advancing by exactly the bytes consumed.
    pub fn read<S>(&mut self, storage: &mut S, spec: &FormatSpec, dests: &mut [Dest<'_>]) -> Transfer
    where
        S: Storage + ?Sized,
    {
        let size = match storage.size() {
            Ok(size) => size,
            Err(err) => return Transfer::failed(err.into()),
        };
        if !spec.is_empty() && self.cursor >= size {
            return Transfer::failed(UnfError::Eof);
        }

        let mut source = StorageSource::new(storage, self.cursor, size);
        let transfer = decode(spec, &mut source, dests);
        self.cursor = source.offset();
        transfer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_no_framing_overhead() {
        let mut storage = MemoryStorage::new();
        let mut stream = StreamAccess::new();
        stream.write(&mut storage, &1i32.to_ne_bytes()).unwrap();
        stream.write(&mut storage, &2.5f64.to_ne_bytes()).unwrap();
        assert_eq!(stream.position(), 12);
        assert_eq!(storage.as_bytes().len(), 12);
    }

    #[test]
    fn test_reads_continue_across_writes() {
        let mut storage = MemoryStorage::new();
        let mut writer = StreamAccess::new();
        for v in [10i16, 20, 30] {
            writer.write(&mut storage, &v.to_ne_bytes()).unwrap();
        }

        let spec = FormatSpec::compile("2i2").unwrap();
        let mut reader = StreamAccess::new();
        let (mut a, mut b) = (0i16, 0i16);
        let transfer = reader.read(
            &mut storage,
            &spec,
            &mut [Dest::from(&mut a), Dest::from(&mut b)],
        );
        assert_eq!(transfer.fields, 2);
        assert_eq!((a, b), (10, 20));

        let transfer = reader.read(
            &mut storage,
            &spec,
            &mut [Dest::from(&mut a), Dest::from(&mut b)],
        );
        assert_eq!(transfer.fields, 1);
        assert_eq!(a, 30);
        assert!(matches!(transfer.result, Err(UnfError::ShortRecord { .. })));
        assert_eq!(reader.position(), 6);

        let transfer = reader.read(&mut storage, &spec, &mut [Dest::Skip, Dest::Skip]);
        assert!(matches!(transfer.result, Err(UnfError::Eof)));
    }
}
