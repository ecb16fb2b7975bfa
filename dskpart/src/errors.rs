// SPDX-License-Identifier: MIT

use core::fmt;

use dskio::errors::*;

/// Unified error type for the partition engine (GPT, MBR, model ops).
///
/// A save aborts on the first error: a partial write of a corrupt table
/// is worse than no write, so no mid-save recovery is attempted.
#[derive(Debug, Clone)]
pub enum PartError {
    IO(DiskIOError),
    /// GPT signature (or another fixed on-disk magic) did not match.
    InvalidSignature(&'static str),
    /// Partition index beyond the capacity of the on-disk table.
    IndexOutOfRange { index: usize, capacity: usize },
    /// Operation not expressible in the target format (hide of an
    /// unmapped type code, >32-bit LBA in MBR, activate on GPT, ...).
    Unsupported(&'static str),
    Invalid(&'static str),
    Other(&'static str),
}

impl From<DiskIOError> for PartError {
    fn from(e: DiskIOError) -> Self {
        PartError::IO(e)
    }
}

impl From<&'static str> for PartError {
    fn from(s: &'static str) -> Self {
        PartError::Other(s)
    }
}

impl fmt::Display for PartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartError::IO(e) => write!(f, "{e}"),
            PartError::InvalidSignature(msg) => write!(f, "Invalid signature: {msg}"),
            PartError::IndexOutOfRange { index, capacity } => {
                write!(f, "Partition index {index} out of range (table holds {capacity})")
            }
            PartError::Unsupported(msg) => write!(f, "Unsupported: {msg}"),
            PartError::Invalid(msg) => write!(f, "{msg}"),
            PartError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PartError {}

pub type PartResult<T = ()> = Result<T, PartError>;
