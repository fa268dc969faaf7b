/// Size in bytes of a sequential record marker.
pub const MARKER_SIZE: usize = 4;

/// Framing overhead of one sequential record (leading and trailing marker).
pub const FRAME_OVERHEAD: u64 = 2 * MARKER_SIZE as u64;

/// Largest payload a single sequential record may carry.
///
/// Markers are read back as signed 32-bit lengths by the numerical runtimes,
/// so anything above `i32::MAX` would be misread as a continuation marker.
pub const MAX_RECORD_PAYLOAD: usize = i32::MAX as usize;

/// Filler byte for the unwritten tail of a direct-access slot.
pub const DEFAULT_DIRECT_FILL: u8 = 0x00;

/// Padding byte for character fields shorter than their declared width.
pub const CHAR_PAD: u8 = b' ';

/// Largest number of fields one compiled format may expand to.
pub const MAX_FIELDS: usize = 1 << 20;

/// Largest slot size accepted for direct access.
pub const MAX_RECORD_LENGTH: u64 = i32::MAX as u64;
