// SPDX-License-Identifier: MIT

//! Sector-addressed block device IO.
//!
//! Everything above this crate speaks in 512-byte sectors and absolute
//! LBAs. Backends may target RAM buffers (tests, image files already in
//! memory) or real files/devices via `std::fs::File`.

pub mod errors;

mod device;
mod mem;

pub mod prelude {
    pub use super::DiskIO;
    pub use super::DiskIOSectorExt;
    pub use super::DiskIOStructExt;
    pub use super::SECTOR_SIZE;
    pub use super::device::{DiskGeometry, FileDiskIO, probe_physical_disks};
    pub use super::errors::*;
    pub use super::mem::MemDiskIO;
}

use errors::*;

/// Logical sector size, fixed for the whole toolset. Devices reporting a
/// different physical sector size are out of scope.
pub const SECTOR_SIZE: u64 = 512;

/// Maximum size of the internal scratch buffer used by struct overlays.
pub const BLOCK_BUF_SIZE: usize = 4096;

/// Byte-addressed block IO abstraction.
///
/// Reads and writes are exact: returning fewer bytes than requested is an
/// error, never a partial success. No retries are performed anywhere in
/// the stack; disk IO failures in this domain are not transient and
/// retrying could mask a dying device.
pub trait DiskIO {
    /// Reads `buf.len()` bytes from `offset` (absolute).
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> DiskIOResult;

    /// Writes `data` at `offset` (absolute).
    fn write_at(&mut self, offset: u64, data: &[u8]) -> DiskIOResult;

    /// Flushes any buffered data (may be a no-op).
    fn flush(&mut self) -> DiskIOResult;

    /// Total capacity of the device or image in bytes.
    fn total_bytes(&mut self) -> DiskIOResult<u64>;
}

/// Offset = LBA * SECTOR_SIZE, with overflow check.
#[inline]
fn lba_offset(lba: u64) -> DiskIOResult<u64> {
    lba.checked_mul(SECTOR_SIZE)
        .ok_or(DiskIOError::Other("lba offset overflow"))
}

/// LBA-addressed helpers on top of `DiskIO`.
pub trait DiskIOSectorExt: DiskIO {
    /// Reads `count` whole sectors starting at `lba`.
    fn read_sectors(&mut self, lba: u64, count: usize) -> DiskIOResult<Vec<u8>> {
        let mut buf = vec![0u8; count * SECTOR_SIZE as usize];
        self.read_at(lba_offset(lba)?, &mut buf)?;
        Ok(buf)
    }

    /// Writes whole sectors starting at `lba`. `data` must be a multiple
    /// of the sector size.
    fn write_sectors(&mut self, lba: u64, data: &[u8]) -> DiskIOResult {
        if data.len() % SECTOR_SIZE as usize != 0 {
            return Err(DiskIOError::Alignment { len: data.len() });
        }
        self.write_at(lba_offset(lba)?, data)
    }

    /// Device capacity in whole sectors.
    fn total_sectors(&mut self) -> DiskIOResult<u64> {
        Ok(self.total_bytes()? / SECTOR_SIZE)
    }

    /// Reads a struct `T` starting at `lba`.
    fn read_struct_lba<T>(&mut self, lba: u64) -> DiskIOResult<T>
    where
        T: zerocopy::FromBytes + zerocopy::KnownLayout + zerocopy::Immutable,
    {
        let off = lba_offset(lba)?;
        self.read_struct::<T>(off)
    }

    /// Writes a struct `T` starting at `lba`.
    fn write_struct_lba<T>(&mut self, lba: u64, val: &T) -> DiskIOResult
    where
        T: zerocopy::IntoBytes + zerocopy::KnownLayout + zerocopy::Immutable,
    {
        let off = lba_offset(lba)?;
        self.write_struct::<T>(off, val)
    }
}

impl<T: DiskIO + ?Sized> DiskIOSectorExt for T {}

/// Zerocopy struct overlays at byte offsets.
///
/// All on-disk structs in this workspace are declared little-endian with
/// explicit layouts; nothing relies on the platform's struct ABI.
pub trait DiskIOStructExt: DiskIO {
    /// Reads a struct of type `T` from the given offset.
    fn read_struct<T: zerocopy::FromBytes + zerocopy::KnownLayout + zerocopy::Immutable>(
        &mut self,
        offset: u64,
    ) -> DiskIOResult<T> {
        let size = core::mem::size_of::<T>();
        assert!(size <= BLOCK_BUF_SIZE, "read_struct: type too large");
        let mut buf = [0u8; BLOCK_BUF_SIZE];
        self.read_at(offset, &mut buf[..size])?;
        T::read_from_bytes(&buf[..size]).map_err(|_| DiskIOError::Other("read_struct failed"))
    }

    /// Writes a struct of type `T` at the given offset.
    fn write_struct<T: zerocopy::IntoBytes + zerocopy::KnownLayout + zerocopy::Immutable>(
        &mut self,
        offset: u64,
        val: &T,
    ) -> DiskIOResult {
        let bytes = val.as_bytes();
        self.write_at(offset, bytes)
    }
}

impl<T: DiskIO + ?Sized> DiskIOStructExt for T {}
