// SPDX-License-Identifier: MIT

use colored::Colorize;
use dskio::prelude::*;
use dskpart::{PartitionEntry, TableKind};

/// Physical disk overview for `list`.
pub fn print_disk_list(disks: &[DiskGeometry]) {
    if disks.is_empty() {
        println!("[dskctl] No accessible physical disks found.");
        return;
    }

    println!(
        "  ┌────┬──────────────────────────────┬──────────────────────────┬───────────────┐"
    );
    println!(
        "  | Id | Device                       | Model                    | Size          |"
    );
    println!(
        "  ├────┼──────────────────────────────┼──────────────────────────┼───────────────┤"
    );
    for d in disks {
        println!(
            "  | {:<2} | {:<28} | {:<24} | {:>13} |",
            d.index,
            truncate(&d.device_path, 28),
            truncate(&d.model, 24),
            pretty_bytes(d.total_bytes),
        );
    }
    println!(
        "  └────┴──────────────────────────────┴──────────────────────────┴───────────────┘"
    );
}

/// Partition table for `show`.
pub fn print_partitions(kind: TableKind, total_sectors: u64, parts: &[PartitionEntry]) {
    println!(
        "Partition table • scheme: {} • capacity: {} sectors",
        kind.to_string().cyan(),
        sep_u64(total_sectors)
    );

    if parts.is_empty() {
        println!("  (no partitions)");
        return;
    }

    println!(
        "  ┌────┬──────┬──────────────────────────────┬────────────┬────────────┬───────────────┬──────────────────────┐"
    );
    println!(
        "  | Id | Boot | Type                         | Start LBA  | End LBA    | Size          | Name                 |"
    );
    println!(
        "  ├────┼──────┼──────────────────────────────┼────────────┼────────────┼───────────────┼──────────────────────┤"
    );
    for p in parts {
        let boot = if p.is_active { "*" } else { "" };
        println!(
            "  | {:<2} | {:<4} | {:<28} | {:>10} | {:>10} | {:>13} | {:<20} |",
            p.index,
            boot,
            truncate(&p.description(), 28),
            sep_u64(p.start_lba),
            sep_u64(p.end_lba()),
            pretty_bytes(p.size_bytes()),
            truncate(&p.name, 20),
        );
    }
    println!(
        "  └────┴──────┴──────────────────────────────┴────────────┴────────────┴───────────────┴──────────────────────┘"
    );
}

/// Cuts on a char boundary: GPT labels are arbitrary UTF-16 and may
/// put a multibyte character right at the column width.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn pretty_bytes(n: u64) -> String {
    const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
    let mut val = n as f64;
    let mut idx = 0usize;
    while val >= 1024.0 && idx + 1 < UNITS.len() {
        val /= 1024.0;
        idx += 1;
    }
    if idx == 0 {
        format!("{} {}", sep_u64(n), UNITS[idx])
    } else {
        format!("{:.1} {}", val, UNITS[idx])
    }
}

fn sep_u64(mut n: u64) -> String {
    if n < 1_000 {
        return n.to_string();
    }
    let mut parts: Vec<String> = Vec::new();
    while n >= 1_000 {
        parts.push(format!("{:03}", n % 1_000));
        n /= 1_000;
    }
    parts.push(n.to_string());
    parts.reverse();
    parts.join(" ")
}
