// SPDX-License-Identifier: MIT

//! Heuristic identification of the boot code already on disk.
//!
//! These checks only look at a handful of well-known byte patterns; an
//! unrecognized sector is reported as such, never guessed at.

use core::fmt;

/// Boot code flavor of sector 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbrCodeKind {
    /// Windows NT 6.x (Vista and later) MBR.
    WindowsNt6,
    /// Pre-NT6 style MBR (DOS through Windows XP).
    Legacy,
    Unknown,
}

impl fmt::Display for MbrCodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MbrCodeKind::WindowsNt6 => write!(f, "Windows NT 6.x MBR"),
            MbrCodeKind::Legacy => write!(f, "Legacy MBR"),
            MbrCodeKind::Unknown => write!(f, "Unknown MBR code"),
        }
    }
}

/// Boot code flavor of a partition's first sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PbrCodeKind {
    Bootmgr,
    MsDos,
    Ntfs,
    /// Unrecognized; carries the OEM name for display.
    Unknown(String),
}

impl fmt::Display for PbrCodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PbrCodeKind::Bootmgr => write!(f, "BOOTMGR boot record"),
            PbrCodeKind::MsDos => write!(f, "MS-DOS / Windows 9x boot record"),
            PbrCodeKind::Ntfs => write!(f, "NTFS boot record"),
            PbrCodeKind::Unknown(oem) => write!(f, "Unknown boot record (OEM \"{oem}\")"),
        }
    }
}

/// Classifies MBR code by its opening instruction sequence.
pub fn detect_mbr_code(boot_code: &[u8]) -> MbrCodeKind {
    if boot_code.starts_with(&[0x33, 0xC0, 0x8E, 0xD0]) {
        MbrCodeKind::WindowsNt6
    } else if boot_code.starts_with(&[0xFA, 0x33, 0xC0]) {
        MbrCodeKind::Legacy
    } else {
        MbrCodeKind::Unknown
    }
}

/// Classifies a partition boot sector.
///
/// A `BOOTMGR` string anywhere in the sector wins; otherwise the OEM
/// name at offset 0x03 decides.
pub fn detect_pbr_code(sector: &[u8]) -> PbrCodeKind {
    if sector.windows(7).any(|w| w == b"BOOTMGR") {
        return PbrCodeKind::Bootmgr;
    }
    let Some(oem) = sector.get(0x03..0x0B) else {
        return PbrCodeKind::Unknown(String::new());
    };
    if oem.starts_with(b"MSDOS") {
        PbrCodeKind::MsDos
    } else if oem.starts_with(b"NTFS") {
        PbrCodeKind::Ntfs
    } else {
        let text: String = oem
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        PbrCodeKind::Unknown(text.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mbr_code_kinds() {
        assert_eq!(
            detect_mbr_code(&[0x33, 0xC0, 0x8E, 0xD0, 0xBC, 0x00]),
            MbrCodeKind::WindowsNt6
        );
        assert_eq!(
            detect_mbr_code(&[0xFA, 0x33, 0xC0, 0x8E]),
            MbrCodeKind::Legacy
        );
        assert_eq!(detect_mbr_code(&[0x00; 8]), MbrCodeKind::Unknown);
    }

    fn sector_with_oem(oem: &[u8; 8]) -> Vec<u8> {
        let mut s = vec![0u8; 512];
        s[3..11].copy_from_slice(oem);
        s
    }

    #[test]
    fn pbr_bootmgr_string_wins() {
        let mut s = sector_with_oem(b"NTFS    ");
        s[200..207].copy_from_slice(b"BOOTMGR");
        assert_eq!(detect_pbr_code(&s), PbrCodeKind::Bootmgr);
    }

    #[test]
    fn pbr_oem_names() {
        assert_eq!(
            detect_pbr_code(&sector_with_oem(b"MSDOS5.0")),
            PbrCodeKind::MsDos
        );
        assert_eq!(
            detect_pbr_code(&sector_with_oem(b"NTFS    ")),
            PbrCodeKind::Ntfs
        );
        assert_eq!(
            detect_pbr_code(&sector_with_oem(b"mkfs.fat")),
            PbrCodeKind::Unknown("mkfs.fat".to_string())
        );
    }

    #[test]
    fn pbr_unknown_oem_sanitized() {
        let kind = detect_pbr_code(&sector_with_oem(&[0x00, 0xFF, b'X', b' ', b' ', b' ', b' ', b' ']));
        assert_eq!(kind, PbrCodeKind::Unknown("..X".to_string()));
    }
}
