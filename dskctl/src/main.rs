// SPDX-License-Identifier: MIT

mod render;

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use dskboot::{PbrCodeKind, detect_mbr_code, detect_pbr_code};
use dskio::prelude::*;
use dskpart::{PartitionEntry, activate, detect_table_kind, read_partitions, write_partitions};

#[derive(Parser)]
#[command(name = "dskctl", version, about = "Raw MBR/GPT partition table and boot sector tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Device selection shared by every command that touches a disk. One
/// handle is opened per operation and dropped when the command ends.
#[derive(Args)]
struct Target {
    /// Physical disk index (0-based)
    #[arg(short, long, conflicts_with = "image")]
    disk: Option<u32>,

    /// Flat disk image path
    #[arg(short, long)]
    image: Option<PathBuf>,
}

impl Target {
    fn open(&self, write: bool) -> anyhow::Result<FileDiskIO> {
        match (self.disk, &self.image) {
            (Some(index), None) => Ok(FileDiskIO::open_physical(index, write)?),
            (None, Some(path)) => Ok(FileDiskIO::open_path(path, write)?),
            _ => bail!("select a target with --disk N or --image PATH"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List accessible physical disks
    List,
    /// Show the partition table and boot code of one disk
    Show {
        #[command(flatten)]
        target: Target,
    },
    /// Switch a partition's type code to its hidden counterpart
    Hide {
        #[command(flatten)]
        target: Target,
        /// Partition slot index
        index: usize,
    },
    /// Switch a hidden type code back to its visible counterpart
    Unhide {
        #[command(flatten)]
        target: Target,
        index: usize,
    },
    /// Toggle the active (boot) flag of an MBR partition
    Activate {
        #[command(flatten)]
        target: Target,
        index: usize,
    },
    /// Clear a partition slot
    Delete {
        #[command(flatten)]
        target: Target,
        index: usize,
    },
    /// Dump sector 0 to a file
    BackupMbr {
        #[command(flatten)]
        target: Target,
        /// Output file (512 bytes)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write a 512-byte backup file back to sector 0
    RestoreMbr {
        #[command(flatten)]
        target: Target,
        /// Backup file (must be exactly 512 bytes)
        #[arg(short = 'f', long)]
        input: PathBuf,
    },
    /// Install MBR boot code, keeping the disk signature and table
    InstallMbr {
        #[command(flatten)]
        target: Target,
        /// Boot code image (at most 440 bytes)
        #[arg(short, long)]
        code: PathBuf,
    },
    /// Dump a partition's boot sector to a file
    BackupPbr {
        #[command(flatten)]
        target: Target,
        index: usize,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write a 512-byte backup file back to a partition's boot sector
    RestorePbr {
        #[command(flatten)]
        target: Target,
        index: usize,
        #[arg(short = 'f', long)]
        input: PathBuf,
    },
    /// Install partition boot code, keeping the BPB
    InstallPbr {
        #[command(flatten)]
        target: Target,
        index: usize,
        /// Boot sector template (exactly 512 bytes)
        #[arg(short, long)]
        code: PathBuf,
    },
}

/// Finds the slot with the given index in a decoded list.
fn slot(parts: &[PartitionEntry], index: usize) -> anyhow::Result<usize> {
    parts
        .iter()
        .position(|p| p.index == index)
        .with_context(|| format!("no partition at index {index}"))
}

/// Load, mutate one slot, save.
fn mutate_slot(
    target: &Target,
    index: usize,
    op: impl FnOnce(&mut PartitionEntry) -> dskpart::errors::PartResult<()>,
) -> anyhow::Result<()> {
    let mut io = target.open(true)?;
    let mut parts = read_partitions(&mut io)?;
    let pos = slot(&parts, index)?;
    op(&mut parts[pos])?;
    write_partitions(&mut io, &parts)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            let disks = probe_physical_disks();
            render::print_disk_list(&disks);
        }
        Commands::Show { target } => {
            let mut io = target.open(false)?;
            let kind = detect_table_kind(&mut io)?;
            let parts = read_partitions(&mut io)?;
            let total = io.total_sectors()?;

            let sector0 = io.read_sectors(0, 1)?;
            println!("[dskctl] Boot code: {}", detect_mbr_code(&sector0[..440]));
            render::print_partitions(kind, total, &parts);
        }
        Commands::Hide { target, index } => {
            mutate_slot(&target, index, |p| p.hide())?;
            println!("[dskctl] Partition {index} hidden.");
        }
        Commands::Unhide { target, index } => {
            mutate_slot(&target, index, |p| p.unhide())?;
            println!("[dskctl] Partition {index} visible.");
        }
        Commands::Activate { target, index } => {
            let mut io = target.open(true)?;
            let mut parts = read_partitions(&mut io)?;
            activate(&mut parts, index)?;
            write_partitions(&mut io, &parts)?;
            let state = if parts.iter().any(|p| p.is_active) {
                "active"
            } else {
                "inactive"
            };
            println!("[dskctl] Partition {index} is now {state}.");
        }
        Commands::Delete { target, index } => {
            let mut io = target.open(true)?;
            let mut parts = read_partitions(&mut io)?;
            let pos = slot(&parts, index)?;
            parts[pos].clear();
            write_partitions(&mut io, &parts)?;
            println!("[dskctl] Partition {index} deleted.");
        }
        Commands::BackupMbr { target, output } => {
            let mut io = target.open(false)?;
            dskboot::backup_sector(&mut io, 0, &output)?;
            println!("[dskctl] MBR saved to: {}", output.display());
        }
        Commands::RestoreMbr { target, input } => {
            let mut io = target.open(true)?;
            dskboot::restore_sector(&mut io, 0, &input)?;
            println!("[dskctl] MBR restored from: {}", input.display());
        }
        Commands::InstallMbr { target, code } => {
            let code = std::fs::read(&code)
                .with_context(|| format!("reading boot code {}", code.display()))?;
            let mut io = target.open(true)?;
            dskboot::write_mbr_code(&mut io, &code)?;
            println!("[dskctl] Installed MBR code: {}", detect_mbr_code(&code));
        }
        Commands::BackupPbr {
            target,
            index,
            output,
        } => {
            let mut io = target.open(false)?;
            let parts = read_partitions(&mut io)?;
            let pos = slot(&parts, index)?;
            dskboot::backup_sector(&mut io, parts[pos].start_lba, &output)?;
            println!("[dskctl] Boot sector saved to: {}", output.display());
        }
        Commands::RestorePbr {
            target,
            index,
            input,
        } => {
            let mut io = target.open(true)?;
            let parts = read_partitions(&mut io)?;
            let pos = slot(&parts, index)?;
            dskboot::restore_sector(&mut io, parts[pos].start_lba, &input)?;
            println!("[dskctl] Boot sector restored from: {}", input.display());
        }
        Commands::InstallPbr {
            target,
            index,
            code,
        } => {
            let template = std::fs::read(&code)
                .with_context(|| format!("reading boot sector template {}", code.display()))?;
            let mut io = target.open(true)?;
            let parts = read_partitions(&mut io)?;
            let pos = slot(&parts, index)?;

            let kind = detect_pbr_code(&template);
            if kind == PbrCodeKind::Bootmgr {
                dskboot::ensure_bootmgr_target(parts[pos].fs_type)?;
            }
            dskboot::write_pbr_code(&mut io, parts[pos].start_lba, &template)?;
            println!("[dskctl] Installed boot sector on partition {index}: {kind}");
        }
    }

    Ok(())
}
