// SPDX-License-Identifier: MIT

use dskio::prelude::*;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::checksum::crc32;
use crate::errors::*;
use crate::guids::{self, GUID_EMPTY, GptPartitionKind};
use crate::model::PartitionEntry;

pub const GPT_SIGNATURE: &[u8; 8] = b"EFI PART";
pub const GPT_PRIMARY_HEADER_LBA: u64 = 1;
/// Size of one on-disk entry record as declared by every mainstream
/// implementation. Headers may declare a larger size; the surplus bytes
/// are reserved and kept zero.
pub const GPT_ENTRY_SIZE: usize = 128;

pub fn encode_gpt_name(name: &str) -> [u16; 36] {
    let mut buf = [0u16; 36];
    for (i, c) in name.encode_utf16().take(36).enumerate() {
        buf[i] = c;
    }
    buf
}

/// Decodes a GPT name (UTF-16LE, 36 units), stopping at the first NUL.
pub fn decode_gpt_name(name: &[u16; 36]) -> String {
    let end = name.iter().position(|&c| c == 0).unwrap_or(36);
    String::from_utf16_lossy(&name[..end])
}

#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug)]
#[repr(C)]
pub struct GptEntry {
    pub type_guid: [u8; 16],
    pub unique_guid: [u8; 16],
    pub start_lba: u64,
    pub end_lba: u64,
    pub attributes: u64,
    pub name: [u16; 36],
}

impl GptEntry {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.type_guid == GUID_EMPTY
    }

    #[inline]
    pub fn kind(&self) -> GptPartitionKind {
        GptPartitionKind::from_guid(&self.type_guid)
    }
}

#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug)]
#[repr(C)]
pub struct GptHeader {
    pub signature: [u8; 8],
    pub revision: u32,
    pub header_size: u32,
    pub header_crc: u32,
    pub reserved: u32,
    pub current_lba: u64,
    pub backup_lba: u64,
    pub first_usable_lba: u64,
    pub last_usable_lba: u64,
    pub disk_guid: [u8; 16],
    pub entries_lba: u64,
    pub num_entries: u32,
    pub entry_size: u32,
    pub entries_crc: u32,
    pub reserved2: [u8; 420],
}

impl GptHeader {
    pub fn validate(&self) -> PartResult<()> {
        if &self.signature != GPT_SIGNATURE {
            return Err(PartError::InvalidSignature("GPT header at LBA 1"));
        }
        if self.header_size < 92 || self.header_size as usize > dskio::SECTOR_SIZE as usize {
            return Err(PartError::Invalid("GPT: header_size out of range"));
        }
        let es = self.entry_size as usize;
        if es < GPT_ENTRY_SIZE || es > 512 || !es.is_multiple_of(8) {
            return Err(PartError::Invalid("GPT: invalid entry_size"));
        }
        let ne = self.num_entries as usize;
        if ne == 0 || ne > 16_384 {
            return Err(PartError::Invalid("GPT: num_entries out of range"));
        }
        Ok(())
    }

    /// Byte length of the full entry array.
    #[inline]
    pub fn entry_array_len(&self) -> usize {
        self.num_entries as usize * self.entry_size as usize
    }

    /// Whole sectors the entry array occupies on disk.
    #[inline]
    pub fn entry_array_sectors(&self) -> u64 {
        (self.entry_array_len() as u64).div_ceil(dskio::SECTOR_SIZE)
    }

    /// Recomputes both CRC fields from the given entry-array bytes.
    ///
    /// The header CRC covers the first `header_size` bytes with the CRC
    /// field itself zeroed, so the header is serialized twice: once to
    /// hash, once with the real value in place.
    pub fn compute_crcs(&mut self, entry_array: &[u8]) {
        self.entries_crc = crc32(entry_array);
        self.header_crc = 0;
        let crc = crc32(&self.as_bytes()[..self.header_size as usize]);
        self.header_crc = crc;
    }
}

/// Reads and validates the primary header at LBA 1.
///
/// The header is never cached across operations: the disk may have been
/// modified externally between engine invocations, so every load and
/// every save starts from a fresh read.
pub fn read_gpt_header<IO: DiskIO + ?Sized>(io: &mut IO) -> PartResult<GptHeader> {
    let header: GptHeader = io.read_struct_lba(GPT_PRIMARY_HEADER_LBA)?;
    header.validate()?;
    Ok(header)
}

/// Loads the primary header and decodes the entry array into the
/// unified model. Unused slots (zero type GUID) are skipped.
pub fn read_gpt<IO: DiskIO + ?Sized>(io: &mut IO) -> PartResult<(GptHeader, Vec<PartitionEntry>)> {
    let header = read_gpt_header(io)?;

    let buf = io.read_sectors(header.entries_lba, header.entry_array_sectors() as usize)?;
    let entries = decode_entries(&header, &buf[..header.entry_array_len()])?;

    Ok((header, entries))
}

fn decode_entries(header: &GptHeader, buf: &[u8]) -> PartResult<Vec<PartitionEntry>> {
    let es = header.entry_size as usize;
    let mut out = Vec::new();

    for index in 0..header.num_entries as usize {
        let slot = &buf[index * es..index * es + GPT_ENTRY_SIZE];
        let e = GptEntry::read_from_bytes(slot)
            .map_err(|_| PartError::Invalid("GPT: malformed entry record"))?;
        if e.is_empty() {
            continue;
        }
        out.push(PartitionEntry {
            index,
            is_active: false,
            fs_type: 0,
            type_guid: e.type_guid,
            unique_guid: e.unique_guid,
            attributes: e.attributes,
            start_lba: e.start_lba,
            sector_count: e
                .end_lba
                .checked_sub(e.start_lba)
                .and_then(|n| n.checked_add(1))
                .ok_or(PartError::Invalid("GPT: entry ends before it starts"))?,
            name: decode_gpt_name(&e.name),
            is_gpt: true,
        });
    }
    Ok(out)
}

/// Serializes the supplied entries back to the primary GPT.
///
/// The header is re-read from LBA 1 first; a stale in-memory header is
/// never trusted. The full entry array is rebuilt zero-filled, both
/// CRCs are recomputed, and the array and header are written in that
/// order.
///
/// Known limitation, kept deliberately: only the primary header and
/// entry array are updated. The backup copies at the end of the disk
/// are left stale, and firmware or OS tools may flag or repair the
/// mismatch. Take a backup before saving.
pub fn save_gpt<IO: DiskIO + ?Sized>(io: &mut IO, parts: &[PartitionEntry]) -> PartResult<()> {
    let mut header = read_gpt_header(io)?;

    let num = header.num_entries as usize;
    let es = header.entry_size as usize;

    // Out-of-range index aborts the whole save before any byte is
    // written: a partially updated table is worse than no update.
    for p in parts {
        if p.index >= num {
            return Err(PartError::IndexOutOfRange {
                index: p.index,
                capacity: num,
            });
        }
    }

    let mut array = vec![0u8; (header.entry_array_sectors() * dskio::SECTOR_SIZE) as usize];
    for p in parts {
        let record = GptEntry {
            type_guid: p.type_guid,
            // Entries created in memory have no identity yet; everything
            // decoded from disk keeps its original unique GUID.
            unique_guid: if p.unique_guid == GUID_EMPTY {
                guids::new_unique_guid()
            } else {
                p.unique_guid
            },
            start_lba: p.start_lba,
            end_lba: p.end_lba(),
            attributes: p.attributes,
            name: encode_gpt_name(&p.name),
        };
        let off = p.index * es;
        array[off..off + GPT_ENTRY_SIZE].copy_from_slice(record.as_bytes());
    }

    header.compute_crcs(&array[..header.entry_array_len()]);

    io.write_sectors(header.entries_lba, &array)?;
    io.write_struct_lba(GPT_PRIMARY_HEADER_LBA, &header)?;
    io.flush()?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::guids::GPT_PARTITION_TYPE_BASIC_DATA;
    use crate::guids::GPT_PARTITION_TYPE_EFI_SYSTEM;

    pub(crate) const TEST_SECTORS: u64 = 20_000;

    fn blank_header() -> GptHeader {
        GptHeader {
            signature: *GPT_SIGNATURE,
            revision: 0x0001_0000,
            header_size: 92,
            header_crc: 0,
            reserved: 0,
            current_lba: GPT_PRIMARY_HEADER_LBA,
            backup_lba: TEST_SECTORS - 1,
            first_usable_lba: 34,
            last_usable_lba: TEST_SECTORS - 34,
            disk_guid: [0xAB; 16],
            entries_lba: 2,
            num_entries: 128,
            entry_size: 128,
            entries_crc: 0,
            reserved2: [0u8; 420],
        }
    }

    /// Builds a disk image with a protective MBR, a primary header and
    /// the given entries, checksummed the way a formatter would leave it.
    pub(crate) fn gpt_image(records: &[(usize, GptEntry)]) -> Vec<u8> {
        let mut img = vec![0u8; (TEST_SECTORS * 512) as usize];

        // Protective MBR entry in slot 0 of sector 0.
        img[0x1BE + 4] = 0xEE;
        img[0x1BE + 8..0x1BE + 12].copy_from_slice(&1u32.to_le_bytes());
        img[0x1BE + 12..0x1BE + 16]
            .copy_from_slice(&((TEST_SECTORS - 1) as u32).to_le_bytes());
        img[510] = 0x55;
        img[511] = 0xAA;

        let mut header = blank_header();
        let mut array = vec![0u8; header.entry_array_len()];
        for (index, record) in records {
            let off = index * 128;
            array[off..off + 128].copy_from_slice(record.as_bytes());
        }
        header.compute_crcs(&array);

        {
            let mut io = MemDiskIO::new(&mut img);
            io.write_sectors(2, &array).unwrap();
            io.write_struct_lba(1, &header).unwrap();
        }
        img
    }

    pub(crate) fn data_record(start: u64, end: u64, name: &str) -> GptEntry {
        GptEntry {
            type_guid: GPT_PARTITION_TYPE_BASIC_DATA,
            unique_guid: [0x42; 16],
            start_lba: start,
            end_lba: end,
            attributes: 0x8000_0000_0000_0001,
            name: encode_gpt_name(name),
        }
    }

    #[test]
    fn read_decodes_nonempty_slots() {
        let mut img = gpt_image(&[
            (0, data_record(2048, 4095, "data")),
            (3, {
                let mut r = data_record(8192, 16383, "esp");
                r.type_guid = GPT_PARTITION_TYPE_EFI_SYSTEM;
                r
            }),
        ]);
        let mut io = MemDiskIO::new(&mut img);
        let (header, parts) = read_gpt(&mut io).unwrap();

        assert_eq!(header.disk_guid, [0xAB; 16]);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].index, 0);
        assert_eq!(parts[0].sector_count, 2048);
        assert_eq!(parts[0].name, "data");
        assert_eq!(parts[0].description(), "Microsoft Basic Data");
        assert_eq!(parts[1].index, 3);
        assert_eq!(parts[1].description(), "EFI System Partition");
    }

    #[test]
    fn invalid_signature_rejected() {
        let mut img = gpt_image(&[]);
        img[512] = b'X';
        let mut io = MemDiskIO::new(&mut img);
        assert!(matches!(
            read_gpt(&mut io),
            Err(PartError::InvalidSignature(_))
        ));
    }

    #[test]
    fn entry_array_sector_count_at_boundary() {
        // 128 entries of 128 bytes: exactly 32 sectors, no rounding up.
        let header = blank_header();
        assert_eq!(header.entry_array_sectors(), 32);
        assert_eq!(header.entry_array_len(), 16384);
    }

    #[test]
    fn save_roundtrip_is_byte_exact() {
        let mut img = gpt_image(&[(0, data_record(2048, 18_431, "payload"))]);
        let original = img.clone();

        let mut io = MemDiskIO::new(&mut img);
        let (_, parts) = read_gpt(&mut io).unwrap();
        save_gpt(&mut io, &parts).unwrap();

        // Header sector and full entry array reproduce the source image.
        assert_eq!(img[512..1024], original[512..1024]);
        assert_eq!(img[1024..1024 + 16384], original[1024..1024 + 16384]);
    }

    #[test]
    fn unique_guid_and_attributes_roundtrip() {
        let mut img = gpt_image(&[(1, data_record(2048, 4095, "keep-me"))]);
        let mut io = MemDiskIO::new(&mut img);

        let (_, mut parts) = read_gpt(&mut io).unwrap();
        parts[0].name = "renamed".to_string();
        save_gpt(&mut io, &parts).unwrap();

        let (_, again) = read_gpt(&mut io).unwrap();
        assert_eq!(again[0].unique_guid, [0x42; 16]);
        assert_eq!(again[0].attributes, 0x8000_0000_0000_0001);
        assert_eq!(again[0].name, "renamed");
    }

    #[test]
    fn zero_unique_guid_gets_fresh_identity() {
        let mut img = gpt_image(&[]);
        let mut io = MemDiskIO::new(&mut img);

        let fresh = PartitionEntry {
            index: 0,
            is_active: false,
            fs_type: 0,
            type_guid: GPT_PARTITION_TYPE_BASIC_DATA,
            unique_guid: GUID_EMPTY,
            attributes: 0,
            start_lba: 2048,
            sector_count: 2048,
            name: "new".to_string(),
            is_gpt: true,
        };
        save_gpt(&mut io, &[fresh]).unwrap();

        let (_, parts) = read_gpt(&mut io).unwrap();
        assert_ne!(parts[0].unique_guid, GUID_EMPTY);
    }

    #[test]
    fn out_of_range_index_aborts_before_writing() {
        let mut img = gpt_image(&[(0, data_record(2048, 4095, "data"))]);
        let original = img.clone();

        let mut io = MemDiskIO::new(&mut img);
        let (_, mut parts) = read_gpt(&mut io).unwrap();
        parts[0].index = 128;

        assert!(matches!(
            save_gpt(&mut io, &parts),
            Err(PartError::IndexOutOfRange {
                index: 128,
                capacity: 128
            })
        ));
        assert_eq!(img, original);
    }

    #[test]
    fn name_is_trimmed_at_first_nul() {
        let mut name = encode_gpt_name("ab");
        name[3] = b'x' as u16; // garbage after the terminator stays hidden
        let decoded = decode_gpt_name(&name);
        assert_eq!(decoded, "ab");
    }
}
