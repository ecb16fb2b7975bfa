// SPDX-License-Identifier: MIT

//! `std::fs::File` backend: raw block devices opened by index, plus
//! plain disk-image files.
//!
//! One handle per operation is the rule at the call sites above this
//! crate: open, act, drop. Dropping the value closes the OS handle, so
//! release is guaranteed on every error path and the exclusive-access
//! window stays as small as possible.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::{DiskIO, DiskIOError, DiskIOResult, SECTOR_SIZE};

/// Highest physical drive index probed by `probe_physical_disks`.
pub const MAX_PHYSICAL_DISKS: u32 = 16;

/// Platform path for a whole-disk device by index.
#[cfg(windows)]
pub fn physical_drive_path(index: u32) -> String {
    format!(r"\\.\PhysicalDrive{index}")
}

#[cfg(not(windows))]
pub fn physical_drive_path(index: u32) -> String {
    // sda, sdb, ... keeps the same zero-based indexing as the Windows
    // device namespace.
    format!("/dev/sd{}", drive_suffix(index))
}

/// Letter suffix for a zero-based drive index: a..z, then aa, ab, ...
/// the way the kernel names disks past `sdz`.
#[cfg(not(windows))]
fn drive_suffix(index: u32) -> String {
    let mut suffix = String::new();
    let mut n = u64::from(index) + 1;
    while n > 0 {
        n -= 1;
        suffix.insert(0, char::from(b'a' + (n % 26) as u8));
        n /= 26;
    }
    suffix
}

/// Legacy geometry and identity of one physical disk.
#[derive(Debug, Clone)]
pub struct DiskGeometry {
    pub index: u32,
    pub device_path: String,
    pub model: String,
    pub total_bytes: u64,
    pub cylinders: u64,
    pub heads: u32,
    pub sectors_per_track: u32,
    pub bytes_per_sector: u32,
}

impl DiskGeometry {
    pub fn total_sectors(&self) -> u64 {
        self.total_bytes / SECTOR_SIZE
    }
}

/// File-backed `DiskIO` over a raw device or image file.
#[derive(Debug)]
pub struct FileDiskIO {
    file: File,
    path: String,
}

impl FileDiskIO {
    /// Opens an arbitrary path (typically a flat disk image).
    pub fn open_path<P: AsRef<Path>>(path: P, write: bool) -> DiskIOResult<Self> {
        let path_str = path.as_ref().display().to_string();
        let file = OpenOptions::new()
            .read(true)
            .write(write)
            .open(path.as_ref())
            .map_err(|e| DiskIOError::DeviceOpen(leak_io_error(&path_str, e)))?;
        Ok(Self {
            file,
            path: path_str,
        })
    }

    /// Opens a whole-disk device by index.
    ///
    /// Fails fast with `DeviceOpen` when the OS denies access; opening a
    /// block device for writing usually requires elevated privileges.
    pub fn open_physical(index: u32, write: bool) -> DiskIOResult<Self> {
        Self::open_path(physical_drive_path(index), write)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Queries size and (synthetic) legacy CHS geometry for this device.
    pub fn geometry(&mut self, index: u32) -> DiskIOResult<DiskGeometry> {
        let total_bytes = self.total_bytes()?;
        let total_sectors = total_bytes / SECTOR_SIZE;

        // Classic 255/63 translation; only reported for display, LBA is
        // authoritative everywhere else.
        let heads = 255u32;
        let sectors_per_track = 63u32;
        let cylinders = total_sectors / (heads as u64 * sectors_per_track as u64);

        Ok(DiskGeometry {
            index,
            device_path: self.path.clone(),
            model: read_model(index),
            total_bytes,
            cylinders,
            heads,
            sectors_per_track,
            bytes_per_sector: SECTOR_SIZE as u32,
        })
    }
}

impl DiskIO for FileDiskIO {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> DiskIOResult {
        self.file.seek(SeekFrom::Start(offset))?;
        let requested = buf.len();
        let mut got = 0usize;
        while got < requested {
            match self.file.read(&mut buf[got..])? {
                0 => return Err(DiskIOError::ShortRead { requested, got }),
                n => got += n,
            }
        }
        Ok(())
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> DiskIOResult {
        self.file.seek(SeekFrom::Start(offset))?;
        let requested = data.len();
        let mut written = 0usize;
        while written < requested {
            match self.file.write(&data[written..])? {
                0 => return Err(DiskIOError::ShortWrite { requested, written }),
                n => written += n,
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> DiskIOResult {
        self.file.flush()?;
        Ok(())
    }

    fn total_bytes(&mut self) -> DiskIOResult<u64> {
        // Seek to the end rather than stat: block device inodes report a
        // zero length on some platforms.
        let size = self.file.seek(SeekFrom::End(0))?;
        self.file.seek(SeekFrom::Start(0))?;
        Ok(size)
    }
}

/// Enumerates physical disks by probing drive 0 upward.
///
/// Indices that fail to open (absent device, no privilege) are skipped.
pub fn probe_physical_disks() -> Vec<DiskGeometry> {
    let mut disks = Vec::new();
    for index in 0..MAX_PHYSICAL_DISKS {
        let Ok(mut dev) = FileDiskIO::open_physical(index, false) else {
            continue;
        };
        if let Ok(geo) = dev.geometry(index) {
            disks.push(geo);
        }
    }
    disks
}

#[cfg(target_os = "linux")]
fn read_model(index: u32) -> String {
    let name = format!("sd{}", drive_suffix(index));
    std::fs::read_to_string(format!("/sys/block/{name}/device/model"))
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| "Unknown Disk".to_string())
}

#[cfg(not(target_os = "linux"))]
fn read_model(_index: u32) -> String {
    "Unknown Disk".to_string()
}

impl From<std::io::Error> for DiskIOError {
    #[cold]
    #[inline(never)]
    fn from(e: std::io::Error) -> Self {
        // Leak the string to produce a 'static str. Acceptable for error mapping.
        let leaked: &'static str = Box::leak(e.to_string().into_boxed_str());
        DiskIOError::Other(leaked)
    }
}

#[cold]
#[inline(never)]
fn leak_io_error(path: &str, e: std::io::Error) -> &'static str {
    Box::leak(format!("{path}: {e}").into_boxed_str())
}
