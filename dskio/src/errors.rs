// SPDX-License-Identifier: MIT

use core::fmt;

/// Result type for DiskIO operations.
pub type DiskIOResult<T = ()> = core::result::Result<T, DiskIOError>;

/// Error type for DiskIO operations.
///
/// Every failure is surfaced immediately to the caller; nothing in this
/// crate retries or recovers on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskIOError {
    /// The OS refused to open the device (bad path, missing device,
    /// insufficient privilege).
    DeviceOpen(&'static str),
    /// The OS returned fewer bytes than requested on a read.
    ShortRead { requested: usize, got: usize },
    /// The OS accepted fewer bytes than supplied on a write.
    ShortWrite { requested: usize, written: usize },
    /// Write buffer is not a whole number of sectors.
    Alignment { len: usize },
    /// Access past the end of the backing storage.
    OutOfBounds,
    Other(&'static str),
}

impl From<&'static str> for DiskIOError {
    #[inline]
    fn from(msg: &'static str) -> Self {
        DiskIOError::Other(msg)
    }
}

impl fmt::Display for DiskIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskIOError::DeviceOpen(msg) => write!(f, "Failed to open device: {msg}"),
            DiskIOError::ShortRead { requested, got } => {
                write!(f, "Short read: requested {requested} bytes, got {got}")
            }
            DiskIOError::ShortWrite { requested, written } => {
                write!(f, "Short write: supplied {requested} bytes, wrote {written}")
            }
            DiskIOError::Alignment { len } => {
                write!(f, "Buffer length {len} is not a multiple of the sector size")
            }
            DiskIOError::OutOfBounds => write!(f, "Out of bounds"),
            DiskIOError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for DiskIOError {}
