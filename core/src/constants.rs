//! Wire constants for the PX frame format.

/// Magic marker at offset 0 of every frame.
/// - Typed as `[u8; 2]` so the type itself enforces the field width.
pub const FRAME_MAGIC: [u8; 2] = *b"PX";

/// Version written by default and the only one the decoder accepts.
pub const FRAME_VERSION: u8 = 1;

/// Fixed header size in bytes.
pub const HEADER_LEN: usize = 2 // magic
    + 1                         // version
    + 4;                        // record count

/// Fixed record size in bytes.
pub const RECORD_LEN: usize = 4 // timestamp (u32)
    + 2;                        // value (i16)

/// Trailing CRC-32 size in bytes.
pub const CHECKSUM_LEN: usize = 4;

/// Smallest well-formed frame: an empty header plus the checksum trailer.
pub const MIN_FRAME_LEN: usize = HEADER_LEN + CHECKSUM_LEN;

/// Default ceiling on the record count a reader will allocate for
/// (16 Mi records, ~96 MiB of record bytes).
pub const DEFAULT_MAX_RECORDS: u32 = 16 * 1024 * 1024;

