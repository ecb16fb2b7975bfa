// SPDX-License-Identifier: MIT

use core::fmt;

use dskio::errors::DiskIOError;

/// Result type for boot-sector operations.
pub type BootResult<T = ()> = core::result::Result<T, BootError>;

/// Error type for boot-sector operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    IO(DiskIOError),
    /// MBR code image does not fit ahead of the disk signature.
    CodeTooLarge { len: usize, max: usize },
    /// Boot sector template is not exactly one sector.
    BadTemplate { len: usize },
    /// Backup file is not exactly one sector.
    BadBackupFile { len: usize },
    /// Filesystem error on a backup file.
    File(&'static str),
    Unsupported(&'static str),
}

impl From<DiskIOError> for BootError {
    #[inline]
    fn from(e: DiskIOError) -> Self {
        BootError::IO(e)
    }
}

impl From<std::io::Error> for BootError {
    fn from(e: std::io::Error) -> Self {
        BootError::File(Box::leak(e.to_string().into_boxed_str()))
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootError::IO(e) => write!(f, "{e}"),
            BootError::CodeTooLarge { len, max } => {
                write!(f, "Boot code is {len} bytes, at most {max} fit")
            }
            BootError::BadTemplate { len } => {
                write!(f, "Boot sector template must be 512 bytes, got {len}")
            }
            BootError::BadBackupFile { len } => {
                write!(f, "Backup file must be exactly 512 bytes, got {len}")
            }
            BootError::File(msg) => write!(f, "Backup file error: {msg}"),
            BootError::Unsupported(msg) => write!(f, "Unsupported: {msg}"),
        }
    }
}

impl std::error::Error for BootError {}
