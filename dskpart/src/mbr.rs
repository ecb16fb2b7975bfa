// SPDX-License-Identifier: MIT

use dskio::prelude::*;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::errors::*;
use crate::guids::GUID_EMPTY;
use crate::model::PartitionEntry;

pub const MBR_SIGNATURE: [u8; 2] = [0x55, 0xAA];
pub const PROTECTIVE_GPT: u8 = 0xEE;
/// Number of primary slots in the legacy table.
pub const MBR_SLOTS: usize = 4;
/// Synthetic CHS bytes meaning "use the LBA fields".
pub const CHS_LBA_PLACEHOLDER: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// One 16-byte table entry, aligned for convenient access.
#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct MbrEntry {
    pub boot_flag: u8,
    pub starting_chs: [u8; 3],
    pub part_type: u8,
    pub end_chs: [u8; 3],
    pub start_lba: u32,
    pub sectors: u32,
}

impl MbrEntry {
    #[inline]
    pub fn new_empty() -> Self {
        Self {
            boot_flag: 0,
            starting_chs: [0, 0, 0],
            part_type: 0,
            end_chs: [0, 0, 0],
            start_lba: 0,
            sectors: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.part_type == 0
    }

    #[inline]
    pub fn is_protective(&self) -> bool {
        self.part_type == PROTECTIVE_GPT
    }
}

/// On-disk form of an entry (packed, little-endian LBA fields).
#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug)]
#[repr(C, packed)]
pub struct MbrEntryPacked {
    pub boot_flag: u8,
    pub starting_chs: [u8; 3],
    pub part_type: u8,
    pub end_chs: [u8; 3],
    pub start_lba: u32,
    pub sectors: u32,
}

impl MbrEntryPacked {
    #[inline]
    pub fn to_aligned(self) -> MbrEntry {
        MbrEntry {
            boot_flag: self.boot_flag,
            starting_chs: self.starting_chs,
            part_type: self.part_type,
            end_chs: self.end_chs,
            start_lba: u32::from_le(self.start_lba),
            sectors: u32::from_le(self.sectors),
        }
    }

    #[inline]
    pub fn from_aligned(e: &MbrEntry) -> Self {
        Self {
            boot_flag: e.boot_flag,
            starting_chs: e.starting_chs,
            part_type: e.part_type,
            end_chs: e.end_chs,
            start_lba: e.start_lba.to_le(),
            sectors: e.sectors.to_le(),
        }
    }
}

/// Sector 0 overlay.
///
/// The 446 bytes ahead of the table split into executable code (440),
/// the Windows disk signature (4, at 0x1B8) and two reserved bytes; the
/// boot-code installer relies on this split to leave the signature
/// alone.
#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug)]
#[repr(C, packed)]
pub struct Mbr {
    pub boot_code: [u8; 440],
    pub disk_signature: [u8; 4],
    pub reserved: [u8; 2],
    pub entries: [MbrEntryPacked; 4],
    pub signature: [u8; 2],
}

impl Mbr {
    #[inline]
    pub fn has_valid_signature(&self) -> bool {
        self.signature == MBR_SIGNATURE
    }

    #[inline]
    pub fn aligned_entries(&self) -> [MbrEntry; 4] {
        [
            self.entries[0].to_aligned(),
            self.entries[1].to_aligned(),
            self.entries[2].to_aligned(),
            self.entries[3].to_aligned(),
        ]
    }

    /// A type byte of 0xEE in any slot marks the disk as GPT.
    #[inline]
    pub fn is_gpt_protective(&self) -> bool {
        self.aligned_entries().iter().any(|e| e.is_protective())
    }

    /// Decodes the table into the unified model.
    ///
    /// Only slots with a nonzero type byte are emitted. CHS fields are
    /// ignored; the LBA fields are authoritative.
    pub fn decode(&self) -> Vec<PartitionEntry> {
        let mut out = Vec::new();
        for (index, e) in self.aligned_entries().into_iter().enumerate() {
            if e.is_empty() {
                continue;
            }
            out.push(PartitionEntry {
                index,
                is_active: e.boot_flag == 0x80,
                fs_type: e.part_type,
                type_guid: GUID_EMPTY,
                unique_guid: GUID_EMPTY,
                attributes: 0,
                start_lba: e.start_lba as u64,
                sector_count: e.sectors as u64,
                name: String::new(),
                is_gpt: false,
            });
        }
        out
    }

    /// Replaces the 64-byte table region with the supplied entries.
    ///
    /// Boot code, disk signature and trailing signature are untouched.
    /// Entries with `index > 3` are silently dropped (the legacy table
    /// has exactly four primary slots); LBA values that do not fit the
    /// 32-bit on-disk fields are rejected before any slot is written.
    pub fn apply_entries(&mut self, parts: &[PartitionEntry]) -> PartResult<()> {
        for p in parts.iter().filter(|p| p.index < MBR_SLOTS) {
            if p.start_lba > u32::MAX as u64 || p.sector_count > u32::MAX as u64 {
                return Err(PartError::Unsupported(
                    "partition extent exceeds the 32-bit MBR LBA fields",
                ));
            }
        }

        self.entries = [MbrEntryPacked::from_aligned(&MbrEntry::new_empty()); 4];
        for p in parts.iter().filter(|p| p.index < MBR_SLOTS) {
            self.entries[p.index] = MbrEntryPacked::from_aligned(&MbrEntry {
                boot_flag: if p.is_active { 0x80 } else { 0x00 },
                starting_chs: CHS_LBA_PLACEHOLDER,
                part_type: p.fs_type,
                end_chs: CHS_LBA_PLACEHOLDER,
                start_lba: p.start_lba as u32,
                sectors: p.sector_count as u32,
            });
        }
        Ok(())
    }
}

pub fn read_mbr<IO: DiskIO + ?Sized>(io: &mut IO) -> PartResult<Mbr> {
    let mbr: Mbr = io.read_struct(0)?;
    Ok(mbr)
}

pub fn write_mbr<IO: DiskIO + ?Sized>(io: &mut IO, mbr: &Mbr) -> PartResult<()> {
    io.write_struct(0, mbr)?;
    io.flush()?;
    Ok(())
}
