// SPDX-License-Identifier: MIT

//! Partition table engine: detection, MBR/GPT codecs, and the unified
//! in-memory partition model.
//!
//! Decoding returns immutable snapshots owned by the caller; nothing is
//! written back until an explicit save, and every save re-reads the
//! on-disk state it depends on instead of trusting a cached copy.

#[macro_use]
mod macros;

pub mod checksum;
pub mod errors;
/// GUID Partition Table (GPT) codec.
pub mod gpt;
/// Common GPT partition type GUIDs.
pub mod guids;
/// Master Boot Record (MBR) codec.
pub mod mbr;
/// Unified, format-agnostic partition model and slot mutations.
pub mod model;
/// MBR-vs-GPT detection and the unified load/save entry points.
pub mod table;

pub use model::{PartitionEntry, activate};
pub use table::{TableKind, detect_table_kind, read_partitions, write_partitions};
