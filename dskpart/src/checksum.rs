// SPDX-License-Identifier: MIT

//! CRC-32 over arbitrary byte ranges, as used by the GPT header and
//! entry array (IEEE 802.3: polynomial 0xEDB88320, reflected, initial
//! 0xFFFFFFFF, final inversion).

/// One-shot CRC-32 of a byte slice.
#[inline]
pub fn crc32(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}
