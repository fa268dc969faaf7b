use std::fs;
use std::path::{Path, PathBuf};

use temp_dir::TempDir;

/// A scratch directory holding one data file, removed on drop.
pub struct Scratch {
    // Keeps the directory alive for the duration of the test.
    #[allow(dead_code)]
    dir: TempDir,
    path: PathBuf,
}

#[allow(dead_code)]
impl Scratch {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.child("numbers.unf");
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> Vec<u8> {
        fs::read(&self.path).unwrap()
    }

    pub fn len(&self) -> u64 {
        fs::metadata(&self.path).unwrap().len()
    }
}

/// Path shared by tests that reuse one fixed file name; such tests run `#[serial]`.
#[allow(dead_code)]
pub fn shared_path() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("unf_storage_test_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join("numbers.unf")
}

/// Writes `payloads` as marker-framed records, byte by byte.
#[allow(dead_code)]
pub fn write_frames(path: &Path, payloads: &[Vec<u8>]) {
    let mut bytes = Vec::new();
    for payload in payloads {
        let marker = (payload.len() as u32).to_ne_bytes();
        bytes.extend_from_slice(&marker);
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(&marker);
    }
    fs::write(path, bytes).unwrap();
}

/// Concatenates the native-order bytes of a sequence of values.
#[allow(unused_macros)]
macro_rules! ne_bytes {
    ($($v:expr),* $(,)?) => {{
        let mut out: Vec<u8> = Vec::new();
        $(out.extend_from_slice(&$v.to_ne_bytes());)*
        out
    }};
}
