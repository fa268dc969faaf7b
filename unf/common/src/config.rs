use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DIRECT_FILL;

/// Per-session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Byte written into the unused tail of a direct-access slot.
    pub direct_fill: u8,

    /// Whether `close` syncs data and metadata to disk after flushing.
    pub sync_on_close: bool,

    /// Whether opening for write creates missing parent directories.
    pub create_dirs: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            direct_fill: DEFAULT_DIRECT_FILL,
            sync_on_close: true,
            create_dirs: false,
        }
    }
}

impl SessionConfig {
    /// Sets the filler byte for direct-access slots.
    pub fn with_direct_fill(mut self, fill: u8) -> Self {
        self.direct_fill = fill;
        self
    }

    /// Sets whether `close` syncs to disk.
    pub fn with_sync_on_close(mut self, sync: bool) -> Self {
        self.sync_on_close = sync;
        self
    }

    /// Sets whether write-mode opens create parent directories.
    pub fn with_create_dirs(mut self, create: bool) -> Self {
        self.create_dirs = create;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = SessionConfig::default()
            .with_direct_fill(0xAB)
            .with_sync_on_close(false)
            .with_create_dirs(true);
        assert_eq!(config.direct_fill, 0xAB);
        assert!(!config.sync_on_close);
        assert!(config.create_dirs);
    }

    #[test]
    fn test_default_fill_is_zero() {
        assert_eq!(SessionConfig::default().direct_fill, 0);
    }
}
