//! The open-file session.
//!
//! A session owns its storage and the cursor of one access strategy. Every
//! transfer or positioning call clears the error and end-of-file flags on
//! entry and sets them from that call's own outcome only, so callers inspect
//! `error()` / `eof()` right after the call they care about.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use unf_common::{AccessMode, OpenMode, SeekOrigin, SessionConfig};

use super::seek::{SeekEngine, SeekOutcome};
use crate::access::{Access, DirectAccess, SequentialAccess, StreamAccess};
use crate::codec::{Dest, Transfer, Value, encode};
use crate::error::{ErrorCode, Status, UnfError, UnfResult};
use crate::format::FormatSpec;
use crate::storage::{FileStorage, Storage};

/// Snapshot of a session's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub path: Option<PathBuf>,
    pub open_mode: OpenMode,
    pub access_mode: AccessMode,
    /// Cursor offset in bytes; `None` for direct access.
    pub position: Option<u64>,
    /// Current storage size in bytes.
    pub size: u64,
}

/// An open unformatted file.
///
/// Transfers return the number of fields moved; positioning returns a
/// [`Status`]. Failures never escape as `Err` past `open`: they are recorded
/// on the session and read back through [`FileSession::error`],
/// [`FileSession::eof`] and [`FileSession::last_error`].
#[derive(Debug)]
pub struct FileSession<S: Storage = FileStorage> {
    /// `None` once the session is closed.
    storage: Option<S>,
    open_mode: OpenMode,
    access: Access,
    config: SessionConfig,
    error: Option<UnfError>,
    eof: bool,
}

impl FileSession<FileStorage> {
    /// Opens `path` with the default configuration.
    ///
    /// `record_length` is required for direct access and rejected otherwise.
    pub fn open<P: AsRef<Path>>(
        path: P,
        mode: OpenMode,
        access: AccessMode,
        record_length: Option<u64>,
    ) -> UnfResult<Self> {
        Self::open_with_config(path, mode, access, record_length, SessionConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        mode: OpenMode,
        access: AccessMode,
        record_length: Option<u64>,
        config: SessionConfig,
    ) -> UnfResult<Self> {
        // Arguments are validated before a write-mode open truncates the file.
        let access = build_access(access, record_length, &config)?;
        let storage = FileStorage::open(path, mode, &config)?;
        Ok(Self::with_access(storage, mode, access, config))
    }
}

impl<S: Storage> FileSession<S> {
    /// Opens a session over an existing storage backend, positioned at its start.
    pub fn from_storage(
        storage: S,
        mode: OpenMode,
        access: AccessMode,
        record_length: Option<u64>,
        config: SessionConfig,
    ) -> UnfResult<Self> {
        let access = build_access(access, record_length, &config)?;
        Ok(Self::with_access(storage, mode, access, config))
    }

    fn with_access(storage: S, open_mode: OpenMode, access: Access, config: SessionConfig) -> Self {
        debug!(
            path = ?storage.path(),
            %open_mode,
            access = %access.mode(),
            record_length = ?access.record_length(),
            "opened session"
        );
        Self {
            storage: Some(storage),
            open_mode,
            access,
            config,
            error: None,
            eof: false,
        }
    }

    /// Reads one record (sequential) or the next fields (stream) into `dests`.
    pub fn read(&mut self, format: &str, dests: &mut [Dest<'_>]) -> usize {
        self.begin();
        let transfer = self
            .try_read(format, dests)
            .unwrap_or_else(Transfer::failed);
        self.settle("read", transfer)
    }

    fn try_read(&mut self, format: &str, dests: &mut [Dest<'_>]) -> UnfResult<Transfer> {
        self.require(OpenMode::Read, "read")?;
        let spec = FormatSpec::compile(format)?;
        let (storage, access) = self.parts()?;
        match access {
            Access::Sequential(seq) => Ok(seq.read_record(storage, &spec, dests)),
            Access::Stream(stream) => Ok(stream.read(storage, &spec, dests)),
            Access::Direct(_) => Err(UnfError::Mode(
                "direct access sessions are read with read_rec".to_string(),
            )),
        }
    }

    /// Writes `values` as one record (sequential) or raw bytes (stream).
    ///
    /// Either every field is written or none is.
    pub fn write(&mut self, format: &str, values: &[Value<'_>]) -> usize {
        self.begin();
        let result = self
            .require(OpenMode::Write, "write")
            .and_then(|()| FormatSpec::compile(format))
            .and_then(|spec| self.write_payload(&spec, values));
        self.finish("write", result)
    }

    /// Like [`FileSession::write`], with the format derived from the values.
    pub fn write_values(&mut self, values: &[Value<'_>]) -> usize {
        self.begin();
        let spec = FormatSpec::of_values(values);
        let result = self
            .require(OpenMode::Write, "write")
            .and_then(|()| self.write_payload(&spec, values));
        self.finish("write", result)
    }

    fn write_payload(&mut self, spec: &FormatSpec, values: &[Value<'_>]) -> UnfResult<usize> {
        let payload = encode(spec, values)?;
        let (storage, access) = self.parts()?;
        match access {
            Access::Sequential(seq) => seq.write_record(storage, &payload)?,
            Access::Stream(stream) => stream.write(storage, &payload)?,
            Access::Direct(_) => {
                return Err(UnfError::Mode(
                    "direct access sessions are written with write_rec".to_string(),
                ));
            }
        }
        Ok(spec.len())
    }

    /// Reads direct-access record `record` (1-based) into `dests`.
    pub fn read_rec(&mut self, record: u64, format: &str, dests: &mut [Dest<'_>]) -> usize {
        self.begin();
        let transfer = self
            .try_read_rec(record, format, dests)
            .unwrap_or_else(Transfer::failed);
        self.settle("read_rec", transfer)
    }

    fn try_read_rec(
        &mut self,
        record: u64,
        format: &str,
        dests: &mut [Dest<'_>],
    ) -> UnfResult<Transfer> {
        self.require(OpenMode::Read, "read_rec")?;
        let spec = FormatSpec::compile(format)?;
        let (storage, access) = self.parts()?;
        let direct = direct_only(access, "read_rec")?;
        Ok(direct.read_record(storage, record, &spec, dests))
    }

    /// Writes `values` into direct-access record `record` (1-based).
    pub fn write_rec(&mut self, record: u64, format: &str, values: &[Value<'_>]) -> usize {
        self.begin();
        let result = self
            .require(OpenMode::Write, "write_rec")
            .and_then(|()| FormatSpec::compile(format))
            .and_then(|spec| {
                let payload = encode(&spec, values)?;
                let (storage, access) = self.parts()?;
                direct_only(access, "write_rec")?.write_record(storage, record, &payload)?;
                Ok(spec.len())
            });
        self.finish("write_rec", result)
    }

    /// Moves `delta` records relative to `origin`.
    ///
    /// Landing exactly at the end of the data after skipping forward succeeds
    /// with the end-of-file flag set; trying to skip beyond it fails.
    pub fn seek(&mut self, origin: SeekOrigin, delta: i64) -> Status {
        self.begin();
        let result = self
            .seek_engine("seek")
            .and_then(|mut engine| engine.seek(origin, delta));
        self.land("seek", result)
    }

    /// Moves to the start of the previous record.
    pub fn backspace(&mut self) -> Status {
        self.begin();
        let result = self
            .seek_engine("backspace")
            .and_then(|mut engine| engine.backspace());
        self.land("backspace", result)
    }

    /// Code of the failure recorded by the last call, or `Success`.
    pub fn error(&self) -> ErrorCode {
        self.error.as_ref().map_or(ErrorCode::Success, UnfError::code)
    }

    /// Whether the last call ran out of input.
    pub fn eof(&self) -> bool {
        self.eof
    }

    pub fn last_error(&self) -> Option<&UnfError> {
        self.error.as_ref()
    }

    /// Flushes pending writes and releases the storage.
    ///
    /// Any further call on the session fails with a closed error.
    pub fn close(&mut self) -> Status {
        self.begin();
        let result = match self.storage.take() {
            Some(mut storage) => {
                let result = release(&mut storage, &self.config);
                debug!(path = ?storage.path(), "closed session");
                result
            }
            None => Err(UnfError::Closed),
        };
        self.status("close", result)
    }

    /// Flushes and hands the storage back, ending the session.
    pub fn into_storage(mut self) -> UnfResult<S> {
        let mut storage = self.storage.take().ok_or(UnfError::Closed)?;
        storage.flush()?;
        Ok(storage)
    }

    pub fn is_closed(&self) -> bool {
        self.storage.is_none()
    }

    pub fn path(&self) -> Option<&Path> {
        self.storage.as_ref().and_then(|storage| storage.path())
    }

    pub fn open_mode(&self) -> OpenMode {
        self.open_mode
    }

    pub fn access_mode(&self) -> AccessMode {
        self.access.mode()
    }

    /// Slot size of a direct-access session.
    pub fn record_length(&self) -> Option<u64> {
        self.access.record_length()
    }

    /// Cursor offset in bytes; `None` for direct access.
    pub fn position(&self) -> Option<u64> {
        self.access.position()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&mut self) -> UnfResult<SessionStats> {
        let storage = self.storage.as_mut().ok_or(UnfError::Closed)?;
        Ok(SessionStats {
            path: storage.path().map(Path::to_path_buf),
            open_mode: self.open_mode,
            access_mode: self.access.mode(),
            position: self.access.position(),
            size: storage.size()?,
        })
    }

    fn begin(&mut self) {
        self.error = None;
        self.eof = false;
    }

    fn record(&mut self, op: &'static str, err: UnfError) {
        match &err {
            UnfError::Eof => {
                debug!(op, "end of file");
                self.eof = true;
            }
            UnfError::MarkerMismatch { .. } | UnfError::ShortRecord { .. } => {
                warn!(op, error = %err, "record transfer failed");
            }
            _ => debug!(op, error = %err, "operation failed"),
        }
        self.error = Some(err);
    }

    fn settle(&mut self, op: &'static str, transfer: Transfer) -> usize {
        if let Err(err) = transfer.result {
            self.record(op, err);
        }
        transfer.fields
    }

    fn finish(&mut self, op: &'static str, result: UnfResult<usize>) -> usize {
        result.unwrap_or_else(|err| {
            self.record(op, err);
            0
        })
    }

    fn status(&mut self, op: &'static str, result: UnfResult<()>) -> Status {
        match result {
            Ok(()) => Status::Success,
            Err(err) => {
                self.record(op, err);
                Status::Error
            }
        }
    }

    fn land(&mut self, op: &'static str, result: UnfResult<SeekOutcome>) -> Status {
        let result = result.map(|outcome| {
            self.eof = outcome.at_end;
        });
        self.status(op, result)
    }

    fn require(&self, mode: OpenMode, op: &str) -> UnfResult<()> {
        if self.storage.is_none() {
            return Err(UnfError::Closed);
        }
        if self.open_mode != mode {
            let direction = if mode.is_read() { "reading" } else { "writing" };
            return Err(UnfError::Mode(format!(
                "{op} needs a session opened for {direction}, this one was opened with \"{}\"",
                self.open_mode
            )));
        }
        Ok(())
    }

    fn parts(&mut self) -> UnfResult<(&mut S, &mut Access)> {
        let storage = self.storage.as_mut().ok_or(UnfError::Closed)?;
        Ok((storage, &mut self.access))
    }

    fn seek_engine(&mut self, op: &str) -> UnfResult<SeekEngine<'_, S>> {
        let (storage, access) = self.parts()?;
        match access {
            Access::Sequential(seq) => Ok(SeekEngine::new(storage, seq)),
            other => Err(UnfError::Mode(format!(
                "{op} needs sequential access, this session uses {} access",
                other.mode()
            ))),
        }
    }
}

impl<S: Storage> Drop for FileSession<S> {
    fn drop(&mut self) {
        if let Some(storage) = self.storage.as_mut() {
            if let Err(err) = storage.flush() {
                warn!(error = %err, "failed to flush session on drop");
            }
        }
    }
}

fn build_access(
    access: AccessMode,
    record_length: Option<u64>,
    config: &SessionConfig,
) -> UnfResult<Access> {
    match (access, record_length) {
        (AccessMode::Direct, Some(length)) => {
            Ok(Access::Direct(DirectAccess::new(length, config.direct_fill)?))
        }
        (AccessMode::Direct, None) => Err(UnfError::Open(
            "direct access requires a record length".to_string(),
        )),
        (AccessMode::Sequential, None) => Ok(Access::Sequential(SequentialAccess::new())),
        (AccessMode::Stream, None) => Ok(Access::Stream(StreamAccess::new())),
        (mode, Some(_)) => Err(UnfError::Open(format!(
            "record length only applies to direct access, not {mode}"
        ))),
    }
}

fn direct_only<'a>(access: &'a mut Access, op: &str) -> UnfResult<&'a mut DirectAccess> {
    match access {
        Access::Direct(direct) => Ok(direct),
        other => Err(UnfError::Mode(format!(
            "{op} needs direct access, this session uses {} access",
            other.mode()
        ))),
    }
}

fn release<S: Storage>(storage: &mut S, config: &SessionConfig) -> UnfResult<()> {
    storage.flush()?;
    if config.sync_on_close {
        storage.sync()?;
    }
    Ok(())
}
