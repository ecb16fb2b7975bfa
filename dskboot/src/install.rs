// SPDX-License-Identifier: MIT

use dskio::prelude::*;

use crate::errors::*;

/// Bytes of sector 0 available for executable code, ahead of the
/// Windows disk signature at 0x1B8.
pub const MBR_CODE_SIZE: usize = 440;

const NTFS_OEM: &[u8; 8] = b"NTFS    ";

/// BPB byte range of a partition boot sector, keyed on its OEM name.
///
/// NTFS keeps its parameter block in 0x03..=0x53; everything else is
/// treated as the FAT32 layout, 0x03..=0x59. The jump instruction at
/// 0x00..0x03 and all code belong to the boot code, not the BPB.
pub fn bpb_range(sector: &[u8]) -> core::ops::Range<usize> {
    if &sector[0x03..0x0B] == NTFS_OEM {
        0x03..0x54
    } else {
        0x03..0x5A
    }
}

/// Installs MBR boot code into sector 0.
///
/// Only the leading code bytes and the `55 AA` signature are touched;
/// the disk signature (0x1B8) and the partition table (0x1BE) survive.
pub fn write_mbr_code<IO: DiskIO + ?Sized>(io: &mut IO, code: &[u8]) -> BootResult<()> {
    if code.len() > MBR_CODE_SIZE {
        return Err(BootError::CodeTooLarge {
            len: code.len(),
            max: MBR_CODE_SIZE,
        });
    }

    let mut sector = io.read_sectors(0, 1)?;
    sector[..code.len()].copy_from_slice(code);
    sector[510] = 0x55;
    sector[511] = 0xAA;
    io.write_sectors(0, &sector)?;
    io.flush()?;
    Ok(())
}

/// Installs partition boot code at `start_lba`, keeping the BPB.
///
/// The template supplies the jump instruction and the code; the
/// parameter block of the filesystem already on disk is copied over the
/// template's placeholder BPB before the merged sector is written.
pub fn write_pbr_code<IO: DiskIO + ?Sized>(
    io: &mut IO,
    start_lba: u64,
    template: &[u8],
) -> BootResult<()> {
    if template.len() != SECTOR_SIZE as usize {
        return Err(BootError::BadTemplate {
            len: template.len(),
        });
    }

    let current = io.read_sectors(start_lba, 1)?;
    let mut merged = template.to_vec();
    let range = bpb_range(&current);
    merged[range.clone()].copy_from_slice(&current[range]);

    io.write_sectors(start_lba, &merged)?;
    io.flush()?;
    Ok(())
}

/// BOOTMGR boot code is only installed onto FAT32-typed partitions
/// (visible or hidden) in this version.
pub fn ensure_bootmgr_target(fs_type: u8) -> BootResult<()> {
    match fs_type {
        0x0B | 0x0C | 0x1B | 0x1C => Ok(()),
        _ => Err(BootError::Unsupported(
            "BOOTMGR boot code requires a FAT32 partition",
        )),
    }
}
