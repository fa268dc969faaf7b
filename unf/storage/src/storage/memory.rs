use std::io;

use super::Storage;

/// In-memory storage.
///
/// This implementation keeps the whole file image in a `Vec<u8>` without any
/// disk I/O, so tests can inspect the exact bytes a session produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    data: Vec<u8>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

fn to_index(offset: u64) -> io::Result<usize> {
    usize::try_from(offset).map_err(|_| io::Error::other("offset exceeds address space"))
}

impl Storage for MemoryStorage {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = to_index(offset)?.min(self.data.len());
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        let start = to_index(offset)?;
        let end = start
            .checked_add(data.len())
            .ok_or_else(|| io::Error::other("write extends past the address space"))?;
        if self.data.len() < end {
            self.data
                .try_reserve(end - self.data.len())
                .map_err(|err| io::Error::other(format!("cannot grow to {end} bytes: {err}")))?;
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(data);
        Ok(())
    }

    fn size(&mut self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.data.truncate(to_index(size)?);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}
