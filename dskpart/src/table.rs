// SPDX-License-Identifier: MIT

use dskio::prelude::*;

use crate::errors::*;
use crate::gpt;
use crate::mbr;
use crate::model::PartitionEntry;

/// Partitioning scheme of a disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Mbr,
    Gpt,
}

impl core::fmt::Display for TableKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TableKind::Mbr => write!(f, "MBR"),
            TableKind::Gpt => write!(f, "GPT"),
        }
    }
}

/// Classifies a disk by its sector 0: a protective type byte (0xEE) in
/// any of the four legacy slots marks it GPT, anything else is treated
/// as MBR (including an all-zero table).
pub fn detect_table_kind<IO: DiskIO + ?Sized>(io: &mut IO) -> PartResult<TableKind> {
    let m = mbr::read_mbr(io)?;
    if m.is_gpt_protective() {
        Ok(TableKind::Gpt)
    } else {
        Ok(TableKind::Mbr)
    }
}

/// Loads the partition table into the unified model, whichever scheme
/// the disk uses. The returned list is a snapshot owned by the caller.
pub fn read_partitions<IO: DiskIO + ?Sized>(io: &mut IO) -> PartResult<Vec<PartitionEntry>> {
    match detect_table_kind(io)? {
        TableKind::Gpt => {
            let (_, parts) = gpt::read_gpt(io)?;
            Ok(parts)
        }
        TableKind::Mbr => Ok(mbr::read_mbr(io)?.decode()),
    }
}

/// Serializes a modified entry list back to disk.
///
/// The list must be homogeneous (all-MBR or all-GPT). Extents are
/// checked against the device's reported capacity here, at write time;
/// an entry reaching past the last addressable sector aborts the save
/// before anything is written.
pub fn write_partitions<IO: DiskIO + ?Sized>(
    io: &mut IO,
    parts: &[PartitionEntry],
) -> PartResult<()> {
    let Some(first) = parts.first() else {
        return Ok(());
    };
    if parts.iter().any(|p| p.is_gpt != first.is_gpt) {
        return Err(PartError::Invalid("mixed MBR/GPT entries in one table"));
    }

    let total_sectors = io.total_sectors()?;
    for p in parts {
        if p.sector_count > 0 && p.end_lba() >= total_sectors {
            return Err(PartError::Invalid(
                "partition extends past the end of the device",
            ));
        }
    }

    if first.is_gpt {
        gpt::save_gpt(io, parts)
    } else {
        let mut m = mbr::read_mbr(io)?;
        m.apply_entries(parts)?;
        mbr::write_mbr(io, &m)
    }
}
