//! File writing utilities for exported tables.
//!
//! Transcripts and the contact export are both "a header plus rows of
//! strings"; this module writes such a table as CSV, JSON or plain text.
//! Every writer syncs the file before returning.

use crate::error::Result;
use crate::models::OutputFormat;
use csv::Writer;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Path of `stem` in `dir` with the extension of `format`
#[must_use]
pub fn table_path(dir: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{stem}.{}", format.extension()))
}

/// Write a table to `file_path` in the specified format.
///
/// # Arguments
///
/// * `file_path` - Path to the output file (created or truncated)
/// * `format` - Output format (CSV, TXT, or JSON)
/// * `header` - Column names
/// * `rows` - Cells, one `Vec` per row, in header order
pub fn write_table(
    file_path: &Path,
    format: OutputFormat,
    header: &[&str],
    rows: &[Vec<String>],
) -> Result<()> {
    let file = File::create(file_path)?;

    match format {
        OutputFormat::Csv => write_csv(&file, header, rows)?,
        OutputFormat::Txt => write_txt(&file, header, rows)?,
        OutputFormat::Json => write_json(&file, header, rows)?,
    }

    file.sync_all()?;
    Ok(())
}

/// Header row first, then one record per row.
fn write_csv(file: &File, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = Writer::from_writer(file);

    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Format: header line, then `cell, cell, ...` per row with a blank line between rows
fn write_txt(file: &File, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", header.join(", "))?;
    for row in rows {
        writeln!(writer)?;
        writeln!(writer, "{}", row.join(", "))?;
    }

    writer.flush()?;
    Ok(())
}

/// Outputs a JSON array of objects keyed by header name.
fn write_json(file: &File, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = BufWriter::new(file);

    let objects: Vec<Map<String, Value>> = rows
        .iter()
        .map(|row| {
            header
                .iter()
                .zip(row)
                .map(|(key, cell)| ((*key).to_string(), Value::String(cell.clone())))
                .collect()
        })
        .collect();

    serde_json::to_writer_pretty(&mut writer, &objects)?;
    writer.flush()?;
    Ok(())
}
