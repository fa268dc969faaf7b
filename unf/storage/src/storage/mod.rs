//! Byte storage backends for sessions.
//!
//! Access strategies address storage by absolute offset and keep their own
//! cursor, so this trait exposes positional I/O only:
//! - `FileStorage`: a file on disk
//! - `MemoryStorage`: a growable in-memory image, for tests and hosts that
//!   assemble files in memory

pub mod file;
pub mod memory;

use std::io;
use std::path::Path;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Positional byte storage underneath a session.
pub trait Storage {
    /// Reads into `buf` starting at `offset`, returning how many bytes were
    /// read. Fewer than `buf.len()` bytes means the end of storage was reached.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes all of `data` at `offset`, extending the storage if needed.
    fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()>;

    /// Current size in bytes.
    fn size(&mut self) -> io::Result<u64>;

    /// Cuts the storage to `size` bytes.
    fn truncate(&mut self, size: u64) -> io::Result<()>;

    /// Pushes buffered writes to the backend.
    fn flush(&mut self) -> io::Result<()>;

    /// Syncs data and metadata to durable storage.
    fn sync(&mut self) -> io::Result<()>;

    /// Path of the backing file, if any.
    fn path(&self) -> Option<&Path> {
        None
    }

    /// Fills `buf` from `offset`; returns `false` if storage ended first.
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<bool> {
        Ok(self.read_at(offset, buf)? == buf.len())
    }
}
