// SPDX-License-Identifier: MIT

//! Known GPT partition type GUIDs and GUID text formatting.
//!
//! All constants are in the on-disk mixed-endian layout: the first three
//! groups little-endian, the last two big-endian, exactly as the 16
//! bytes appear in a partition entry.

define_partition_types! {
    BASIC_DATA => "Microsoft Basic Data",
        // EBD0A0A2-B9E5-4433-87C0-68B6B72699C7
        [0xA2, 0xA0, 0xD0, 0xEB, 0xE5, 0xB9, 0x33, 0x44,
         0x87, 0xC0, 0x68, 0xB6, 0xB7, 0x26, 0x99, 0xC7],
    EFI_SYSTEM => "EFI System Partition",
        // C12A7328-F81F-11D2-BA4B-00A0C93EC93B
        [0x28, 0x73, 0x2A, 0xC1, 0x1F, 0xF8, 0xD2, 0x11,
         0xBA, 0x4B, 0x00, 0xA0, 0xC9, 0x3E, 0xC9, 0x3B],
    MSFT_RESERVED => "Microsoft Reserved",
        // E3C9E316-0B5C-4DB8-817D-F92DF00215AE
        [0x16, 0xE3, 0xC9, 0xE3, 0x5C, 0x0B, 0xB8, 0x4D,
         0x81, 0x7D, 0xF9, 0x2D, 0xF0, 0x02, 0x15, 0xAE],
    WIN_RECOVERY => "Windows Recovery",
        // DE94BBA4-06D1-4D40-A16A-BFD50179D6AC
        [0xA4, 0xBB, 0x94, 0xDE, 0xD1, 0x06, 0x40, 0x4D,
         0xA1, 0x6A, 0xBF, 0xD5, 0x01, 0x79, 0xD6, 0xAC],
    LINUX_FS => "Linux Filesystem",
        // 0FC63DAF-8483-4772-8E79-3D69D8477DE4
        [0xAF, 0x3D, 0xC6, 0x0F, 0x83, 0x84, 0x72, 0x47,
         0x8E, 0x79, 0x3D, 0x69, 0xD8, 0x47, 0x7D, 0xE4],
    LINUX_SWAP => "Linux Swap",
        // 0657FD6D-A4AB-43C4-84E5-0933C84B4F4F
        [0x6D, 0xFD, 0x57, 0x06, 0xAB, 0xA4, 0xC4, 0x43,
         0x84, 0xE5, 0x09, 0x33, 0xC8, 0x4B, 0x4F, 0x4F],
}

/// The all-zero GUID marks an unused GPT entry slot.
pub const GUID_EMPTY: [u8; 16] = [0u8; 16];

/// Renders an on-disk (mixed-endian) GUID in canonical text form.
pub fn format_guid(guid: &[u8; 16]) -> String {
    let d1 = u32::from_le_bytes([guid[0], guid[1], guid[2], guid[3]]);
    let d2 = u16::from_le_bytes([guid[4], guid[5]]);
    let d3 = u16::from_le_bytes([guid[6], guid[7]]);
    format!(
        "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
        d1, d2, d3, guid[8], guid[9], guid[10], guid[11], guid[12], guid[13], guid[14], guid[15]
    )
}

/// Generates a fresh random unique-partition GUID in on-disk layout.
pub fn new_unique_guid() -> [u8; 16] {
    uuid::Uuid::new_v4().to_bytes_le()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_guid_descriptions() {
        assert_eq!(
            GptPartitionKind::from_guid(&GPT_PARTITION_TYPE_BASIC_DATA).to_string(),
            "Microsoft Basic Data"
        );
        assert_eq!(
            GptPartitionKind::from_guid(&GPT_PARTITION_TYPE_EFI_SYSTEM).to_string(),
            "EFI System Partition"
        );
        assert_eq!(
            GptPartitionKind::from_guid(&GPT_PARTITION_TYPE_LINUX_SWAP).to_string(),
            "Linux Swap"
        );
    }

    #[test]
    fn unknown_guid_renders_canonical_text() {
        let kind = GptPartitionKind::from_guid(&[0x11; 16]);
        assert_eq!(kind.to_string(), "11111111-1111-1111-1111-111111111111");
        assert_eq!(kind.as_guid(), None);
    }

    #[test]
    fn format_guid_mixed_endian() {
        // EFI System: text form swaps the first three groups back.
        assert_eq!(
            format_guid(&GPT_PARTITION_TYPE_EFI_SYSTEM),
            "C12A7328-F81F-11D2-BA4B-00A0C93EC93B"
        );
    }

    #[test]
    fn fresh_unique_guid_is_nonzero_and_random() {
        let a = new_unique_guid();
        let b = new_unique_guid();
        assert_ne!(a, GUID_EMPTY);
        assert_ne!(a, b);
    }
}
