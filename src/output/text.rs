//! Human-readable terminal output.
//!
//! Sizes are formatted with bytesize and headings are painted with yansi.
//! Colors follow yansi's global switch, which the binary turns off for
//! `--no-color`.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::duplicates::{DuplicateGroup, Statistics};
use crate::report::DeletionReport;

/// Format a byte count with binary units.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

/// Write duplicate groups, one block per group.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_groups<W: Write>(writer: &mut W, groups: &[DuplicateGroup]) -> io::Result<()> {
    for (idx, group) in groups.iter().enumerate() {
        writeln!(
            writer,
            "{} {} files, {} each, {} reclaimable",
            format!("Group {}:", idx + 1).bold(),
            group.len(),
            format_size(group.size),
            format_size(group.wasted_space()).yellow()
        )?;
        writeln!(writer, "  hash: {}", group.hash.dim())?;
        for file in &group.files {
            writeln!(writer, "  {}", file.path.display())?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write the scan statistics block.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_scan_summary<W: Write>(
    writer: &mut W,
    groups: &[DuplicateGroup],
    stats: &Statistics,
) -> io::Result<()> {
    writeln!(writer, "{}", "Scan summary".bold().underline())?;
    writeln!(writer, "  Files scanned:     {}", stats.total_files)?;
    writeln!(writer, "  Duplicate groups:  {}", groups.len())?;
    writeln!(writer, "  Duplicate files:   {}", stats.duplicate_files)?;
    writeln!(
        writer,
        "  Duplicate volume:  {}",
        format_size(stats.duplicate_size).yellow()
    )?;
    if stats.hardlinks_skipped > 0 {
        writeln!(writer, "  Hardlinks skipped: {}", stats.hardlinks_skipped)?;
    }
    if stats.errors > 0 {
        writeln!(writer, "  Errors:            {}", stats.errors.red())?;
    }
    writeln!(writer, "  Elapsed:           {:.2?}", stats.scan_duration)?;
    Ok(())
}

/// Write the outcome of a deletion run.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_deletion_summary<W: Write>(writer: &mut W, report: &DeletionReport) -> io::Result<()> {
    let stats = &report.stats;
    writeln!(writer, "{}", "Deletion summary".bold().underline())?;
    writeln!(writer, "  Deleted files:     {}", stats.deleted_files.green())?;
    writeln!(writer, "  Backed up files:   {}", stats.backed_up_files)?;
    writeln!(
        writer,
        "  Space freed:       {}",
        format_size(report.bytes_freed())
    )?;
    if stats.errors > 0 {
        writeln!(writer, "  Errors:            {}", stats.errors.red())?;
    }
    if report.interrupted {
        writeln!(writer, "  {}", "Interrupted before all groups were processed".red())?;
    }
    Ok(())
}

/// Write a loaded deletion report in full.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_report<W: Write>(writer: &mut W, report: &DeletionReport) -> io::Result<()> {
    let settings = &report.settings;
    writeln!(writer, "{} {}", "Deletion report".bold(), report.timestamp.to_rfc3339())?;
    for root in &settings.root_paths {
        writeln!(writer, "  Root:      {}", root.display())?;
    }
    writeln!(writer, "  Algorithm: {}", settings.hash_algorithm)?;
    writeln!(writer, "  Strategy:  {}", settings.strategy)?;
    writeln!(writer, "  Mode:      {}", settings.delete_mode)?;
    match settings.backup_dir {
        Some(ref dir) => writeln!(writer, "  Backup:    {}", dir.display())?,
        None => writeln!(writer, "  Backup:    none")?,
    }
    writeln!(writer)?;

    for file in &report.deleted_files {
        match file.backup_path {
            Some(ref backup) => writeln!(
                writer,
                "  {} ({}) -> {}",
                file.original_path.display(),
                format_size(file.size),
                backup.display()
            )?,
            None => writeln!(
                writer,
                "  {} ({})",
                file.original_path.display(),
                format_size(file.size)
            )?,
        }
    }
    writeln!(writer)?;
    write_deletion_summary(writer, report)
}
