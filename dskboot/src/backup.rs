// SPDX-License-Identifier: MIT

use std::path::Path;

use dskio::prelude::*;

use crate::errors::*;

/// Dumps one raw sector into a flat file (exactly 512 bytes).
pub fn backup_sector<IO: DiskIO + ?Sized>(
    io: &mut IO,
    lba: u64,
    path: &Path,
) -> BootResult<()> {
    let sector = io.read_sectors(lba, 1)?;
    std::fs::write(path, &sector)?;
    Ok(())
}

/// Writes a previously dumped sector back to disk.
///
/// The file must be exactly one sector long. Anything else is rejected
/// before the disk is touched; a truncated or concatenated backup must
/// never be half-applied.
pub fn restore_sector<IO: DiskIO + ?Sized>(
    io: &mut IO,
    lba: u64,
    path: &Path,
) -> BootResult<()> {
    let data = std::fs::read(path)?;
    if data.len() != SECTOR_SIZE as usize {
        return Err(BootError::BadBackupFile { len: data.len() });
    }
    io.write_sectors(lba, &data)?;
    io.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_emits_exactly_one_sector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mbr.bin");

        let mut img = vec![0u8; 512 * 4];
        img[512..1024].fill(0x5A);
        let mut io = MemDiskIO::new(&mut img);
        backup_sector(&mut io, 1, &path).unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(data.len(), 512);
        assert!(data.iter().all(|&b| b == 0x5A));
    }

    #[test]
    fn backup_restore_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sector.bin");

        let mut img = vec![0u8; 512 * 4];
        img[..512].fill(0xA5);
        {
            let mut io = MemDiskIO::new(&mut img);
            backup_sector(&mut io, 0, &path).unwrap();
        }

        img[..512].fill(0x00);
        let mut io = MemDiskIO::new(&mut img);
        restore_sector(&mut io, 0, &path).unwrap();
        assert!(img[..512].iter().all(|&b| b == 0xA5));
    }

    #[test]
    fn restore_rejects_wrong_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.bin");
        std::fs::write(&path, [0u8; 513]).unwrap();

        let mut img = vec![0u8; 512 * 4];
        let before = img.clone();
        let mut io = MemDiskIO::new(&mut img);
        assert!(matches!(
            restore_sector(&mut io, 0, &path),
            Err(BootError::BadBackupFile { len: 513 })
        ));
        assert_eq!(img, before);
    }

    #[test]
    fn restore_missing_file_is_a_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut img = vec![0u8; 512];
        let mut io = MemDiskIO::new(&mut img);
        assert!(matches!(
            restore_sector(&mut io, 0, &dir.path().join("nope.bin")),
            Err(BootError::File(_))
        ));
    }
}
