// SPDX-License-Identifier: MIT

//! Boot sector installation, identification and backup.
//!
//! Works on any [`dskio::DiskIO`] backend. Installation merges new boot
//! code with whatever filesystem metadata is already on disk: the MBR
//! installer keeps the disk signature and partition table, the PBR
//! installer keeps the BIOS parameter block.

pub mod errors;

mod backup;
mod detect;
mod install;

pub use backup::{backup_sector, restore_sector};
pub use detect::{MbrCodeKind, PbrCodeKind, detect_mbr_code, detect_pbr_code};
pub use errors::{BootError, BootResult};
pub use install::{
    MBR_CODE_SIZE, bpb_range, ensure_bootmgr_target, write_mbr_code, write_pbr_code,
};
