// SPDX-License-Identifier: MIT

use dskio::SECTOR_SIZE;

use crate::errors::*;
use crate::guids::{self, GptPartitionKind};

/// One partition slot in the unified, format-agnostic model.
///
/// A decoded list is a snapshot owned by the caller; mutations happen on
/// that copy and reach the disk only through an explicit
/// [`crate::write_partitions`]. Lists are homogeneous: all-MBR or
/// all-GPT, never mixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionEntry {
    /// Slot position: 0-3 for MBR primary slots, 0..N-1 for the GPT array.
    pub index: usize,
    /// Legacy boot flag. MBR only; always false for GPT.
    pub is_active: bool,
    /// One-byte MBR type code, 0 = empty slot. MBR only.
    pub fs_type: u8,
    /// GPT partition type GUID, all-zero = unused. GPT only.
    pub type_guid: [u8; 16],
    /// GPT unique partition GUID, retained so a save round-trips it
    /// instead of inventing a new identity for an untouched partition.
    pub unique_guid: [u8; 16],
    /// GPT attribute bitmask, likewise round-tripped.
    pub attributes: u64,
    pub start_lba: u64,
    pub sector_count: u64,
    /// UTF-16 label, GPT only (decoded lossily, trimmed at the first NUL).
    pub name: String,
    pub is_gpt: bool,
}

impl PartitionEntry {
    /// Last sector of the partition, inclusive.
    pub fn end_lba(&self) -> u64 {
        self.start_lba + self.sector_count.saturating_sub(1)
    }

    pub fn size_bytes(&self) -> u64 {
        self.sector_count.saturating_mul(SECTOR_SIZE)
    }

    /// Human description of the slot's type.
    pub fn description(&self) -> String {
        if self.is_gpt {
            GptPartitionKind::from_guid(&self.type_guid).to_string()
        } else {
            mbr_type_description(self.fs_type)
        }
    }

    pub fn is_hidden(&self) -> bool {
        !self.is_gpt && unhide_type(self.fs_type).is_some()
    }

    /// Swaps the MBR type code for its hidden counterpart.
    ///
    /// A type with no hidden counterpart cannot be hidden; the entry is
    /// left untouched and the failure is reported, never swallowed.
    pub fn hide(&mut self) -> PartResult<()> {
        if self.is_gpt {
            return Err(PartError::Unsupported("hide applies to MBR type codes only"));
        }
        match hide_type(self.fs_type) {
            Some(hidden) => {
                self.fs_type = hidden;
                Ok(())
            }
            None => Err(PartError::Unsupported(
                "no hidden counterpart for this partition type",
            )),
        }
    }

    /// Exact inverse of [`Self::hide`].
    pub fn unhide(&mut self) -> PartResult<()> {
        if self.is_gpt {
            return Err(PartError::Unsupported("unhide applies to MBR type codes only"));
        }
        match unhide_type(self.fs_type) {
            Some(visible) => {
                self.fs_type = visible;
                Ok(())
            }
            None => Err(PartError::Unsupported("partition type is not a hidden type")),
        }
    }

    /// Resets the slot to empty.
    pub fn clear(&mut self) {
        self.is_active = false;
        self.fs_type = 0;
        self.type_guid = guids::GUID_EMPTY;
        self.unique_guid = guids::GUID_EMPTY;
        self.attributes = 0;
        self.start_lba = 0;
        self.sector_count = 0;
        self.name.clear();
    }
}

/// Toggles the active flag on slot `index` of an MBR list.
///
/// At most one partition may carry the flag: activating one entry clears
/// it on all others first. Toggling an already-active entry deactivates
/// it, leaving zero active entries, which is legal.
pub fn activate(entries: &mut [PartitionEntry], index: usize) -> PartResult<()> {
    if entries.iter().any(|e| e.is_gpt) {
        return Err(PartError::Unsupported("GPT does not use the legacy active flag"));
    }
    let pos = entries
        .iter()
        .position(|e| e.index == index)
        .ok_or(PartError::IndexOutOfRange {
            index,
            capacity: entries.len(),
        })?;

    let was_active = entries[pos].is_active;
    for e in entries.iter_mut() {
        e.is_active = false;
    }
    entries[pos].is_active = !was_active;
    Ok(())
}

/// Human description for an MBR partition type byte.
pub fn mbr_type_description(fs_type: u8) -> String {
    let desc = match fs_type {
        0x00 => "Empty",
        0x01 => "FAT12",
        0x04 => "FAT16 <32M",
        0x05 => "Extended",
        0x06 => "FAT16",
        0x07 => "NTFS / exFAT",
        0x0B => "FAT32",
        0x0C => "FAT32 LBA",
        0x0E => "FAT16 LBA",
        0x0F => "Extended LBA",
        0x82 => "Linux Swap",
        0x83 => "Linux",
        0xEE => "GPT Protective",
        0xEF => "EFI System",
        _ => return format!("Unknown (0x{fs_type:02X})"),
    };
    desc.to_string()
}

/// Visible-to-hidden MBR type code pairs. Hiding sets bit 4 for the
/// classic DOS/Windows types; anything not listed here has no hidden
/// counterpart.
const HIDDEN_TYPE_PAIRS: [(u8, u8); 8] = [
    (0x01, 0x11),
    (0x04, 0x14),
    (0x06, 0x16),
    (0x07, 0x17),
    (0x0B, 0x1B),
    (0x0C, 0x1C),
    (0x0E, 0x1E),
    (0x0F, 0x1F),
];

/// Hidden counterpart of a visible MBR type code, if one exists.
pub fn hide_type(fs_type: u8) -> Option<u8> {
    HIDDEN_TYPE_PAIRS
        .iter()
        .find(|(visible, _)| *visible == fs_type)
        .map(|(_, hidden)| *hidden)
}

/// Visible counterpart of a hidden MBR type code, if one exists.
pub fn unhide_type(fs_type: u8) -> Option<u8> {
    HIDDEN_TYPE_PAIRS
        .iter()
        .find(|(_, hidden)| *hidden == fs_type)
        .map(|(visible, _)| *visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mbr_entry(index: usize, fs_type: u8, active: bool) -> PartitionEntry {
        PartitionEntry {
            index,
            is_active: active,
            fs_type,
            type_guid: guids::GUID_EMPTY,
            unique_guid: guids::GUID_EMPTY,
            attributes: 0,
            start_lba: 2048,
            sector_count: 204800,
            name: String::new(),
            is_gpt: false,
        }
    }

    #[test]
    fn hide_unhide_involution() {
        for (visible, hidden) in HIDDEN_TYPE_PAIRS {
            assert_eq!(hide_type(visible), Some(hidden));
            assert_eq!(unhide_type(hidden), Some(visible));
            assert_eq!(unhide_type(hide_type(visible).unwrap()), Some(visible));
        }
    }

    #[test]
    fn hide_unmapped_type_fails_without_mutating() {
        let mut e = mbr_entry(0, 0x83, false);
        assert!(matches!(e.hide(), Err(PartError::Unsupported(_))));
        assert_eq!(e.fs_type, 0x83);
    }

    #[test]
    fn hide_then_unhide_roundtrip() {
        let mut e = mbr_entry(0, 0x0B, false);
        e.hide().unwrap();
        assert_eq!(e.fs_type, 0x1B);
        assert!(e.is_hidden());
        e.unhide().unwrap();
        assert_eq!(e.fs_type, 0x0B);
    }

    #[test]
    fn activate_enforces_single_active() {
        let mut entries = vec![
            mbr_entry(0, 0x0B, true),
            mbr_entry(1, 0x07, false),
            mbr_entry(2, 0x83, false),
        ];

        activate(&mut entries, 2).unwrap();
        let active: Vec<usize> = entries
            .iter()
            .filter(|e| e.is_active)
            .map(|e| e.index)
            .collect();
        assert_eq!(active, vec![2]);

        // Toggling the active one off leaves zero active entries.
        activate(&mut entries, 2).unwrap();
        assert!(entries.iter().all(|e| !e.is_active));
    }

    #[test]
    fn activate_rejects_gpt() {
        let mut entries = vec![mbr_entry(0, 0, false)];
        entries[0].is_gpt = true;
        assert!(matches!(
            activate(&mut entries, 0),
            Err(PartError::Unsupported(_))
        ));
    }

    #[test]
    fn activate_unknown_index() {
        let mut entries = vec![mbr_entry(0, 0x0B, false)];
        assert!(matches!(
            activate(&mut entries, 3),
            Err(PartError::IndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn descriptions() {
        assert_eq!(mbr_type_description(0x0B), "FAT32");
        assert_eq!(mbr_type_description(0x07), "NTFS / exFAT");
        assert_eq!(mbr_type_description(0xA9), "Unknown (0xA9)");
    }

    #[test]
    fn clear_resets_slot() {
        let mut e = mbr_entry(1, 0x0B, true);
        e.clear();
        assert_eq!(e.fs_type, 0);
        assert_eq!(e.sector_count, 0);
        assert!(!e.is_active);
    }
}
