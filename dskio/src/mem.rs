// SPDX-License-Identifier: MIT

use crate::{DiskIO, DiskIOError, DiskIOResult};

/// In-memory implementation of `DiskIO`.
///
/// Useful for tests and for manipulating whole disk images held in RAM.
#[derive(Debug)]
pub struct MemDiskIO<'a> {
    buffer: &'a mut [u8],
}

impl<'a> MemDiskIO<'a> {
    #[inline]
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer }
    }

    #[inline]
    fn check_bounds(&self, offset: u64, len: usize) -> DiskIOResult {
        let end = offset
            .checked_add(len as u64)
            .ok_or(DiskIOError::OutOfBounds)?;
        if end > self.buffer.len() as u64 {
            return Err(DiskIOError::OutOfBounds);
        }
        Ok(())
    }
}

impl<'a> DiskIO for MemDiskIO<'a> {
    #[inline(always)]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> DiskIOResult {
        self.check_bounds(offset, buf.len())?;
        let src = &self.buffer[offset as usize..offset as usize + buf.len()];
        buf.copy_from_slice(src);
        Ok(())
    }

    #[inline(always)]
    fn write_at(&mut self, offset: u64, data: &[u8]) -> DiskIOResult {
        self.check_bounds(offset, data.len())?;
        let dst = &mut self.buffer[offset as usize..offset as usize + data.len()];
        dst.copy_from_slice(data);
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> DiskIOResult {
        Ok(())
    }

    #[inline]
    fn total_bytes(&mut self) -> DiskIOResult<u64> {
        Ok(self.buffer.len() as u64)
    }
}

#[cfg(test)]
mod test {
    use crate::prelude::*;

    #[test]
    fn test_rw() {
        let mut buf = [0u8; 256];
        let mut io = MemDiskIO::new(&mut buf);
        io.write_at(10, &[1, 2, 3, 4]).unwrap();

        let mut output = [0u8; 4];
        io.read_at(10, &mut output).unwrap();
        assert_eq!(output, [1, 2, 3, 4]);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buf = [0u8; 64];
        let mut io = MemDiskIO::new(&mut buf);
        assert_eq!(
            io.write_at(60, &[0u8; 8]).unwrap_err(),
            DiskIOError::OutOfBounds
        );
        let mut out = [0u8; 8];
        assert_eq!(io.read_at(60, &mut out).unwrap_err(), DiskIOError::OutOfBounds);
    }

    #[test]
    fn test_sector_rw() {
        let mut buf = vec![0u8; 512 * 4];
        let mut io = MemDiskIO::new(&mut buf);

        io.write_sectors(2, &[0xAB; 512]).unwrap();
        let back = io.read_sectors(2, 1).unwrap();
        assert_eq!(back, vec![0xAB; 512]);
        assert_eq!(io.total_sectors().unwrap(), 4);
    }

    #[test]
    fn test_write_sectors_unaligned_rejected() {
        let mut buf = vec![0u8; 512 * 4];
        let mut io = MemDiskIO::new(&mut buf);

        let err = io.write_sectors(0, &[0u8; 100]).unwrap_err();
        assert_eq!(err, DiskIOError::Alignment { len: 100 });
    }
}
