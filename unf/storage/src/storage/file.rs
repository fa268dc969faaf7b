use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use unf_common::{OpenMode, SessionConfig};

use super::Storage;
use crate::error::{UnfError, UnfResult};

/// File-backed storage.
///
/// Read mode opens an existing file read-only. Write mode creates or
/// truncates the file and keeps it readable, since backspacing over written
/// records has to inspect their markers.
#[derive(Debug)]
pub struct FileStorage {
    file: File,
    path: PathBuf,
}

impl FileStorage {
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode, config: &SessionConfig) -> UnfResult<Self> {
        let path = path.as_ref().to_path_buf();
        let open_error = |e: io::Error| UnfError::Open(format!("{}: {e}", path.display()));

        let file = match mode {
            OpenMode::Read => OpenOptions::new().read(true).open(&path),
            OpenMode::Write => {
                if config.create_dirs {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        fs::create_dir_all(parent).map_err(open_error)?;
                    }
                }
                OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&path)
            }
        }
        .map_err(open_error)?;

        debug!(path = %path.display(), %mode, "opened file storage");
        Ok(Self { file, path })
    }
}

impl Storage for FileStorage {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)
    }

    fn size(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.file.set_len(size)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn sync(&mut self) -> io::Result<()> {
        self.file.sync_all()
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
