// Writers for the collected listing records

use crate::error::Result;
use paperhound_scraper::ListingRecord;
use rust_xlsxwriter::Workbook;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_OUTPUT: &str = "exam_listings.xlsx";
pub const SHEET_NAME: &str = "Listings";

/// Most characters a single xlsx cell can hold.
pub const XLSX_CELL_LIMIT: usize = 32_767;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Jsonl,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Some(ExportFormat::Xlsx),
            "csv" => Some(ExportFormat::Csv),
            "jsonl" | "ndjson" => Some(ExportFormat::Jsonl),
            _ => None,
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_str)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Jsonl => "jsonl",
        }
    }
}

/// Write all records to `path` in `format`, replacing any existing file.
pub fn export_records(records: &[ListingRecord], path: &Path, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Xlsx => export_xlsx(records, path)?,
        ExportFormat::Csv => export_csv(records, path)?,
        ExportFormat::Jsonl => export_jsonl(records, path)?,
    }
    info!(
        "Wrote {} records to {} ({})",
        records.len(),
        path.display(),
        format.extension()
    );
    Ok(())
}

/// Single-sheet workbook: header row of field names, then one row per record.
pub fn export_xlsx(records: &[ListingRecord], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, field) in ListingRecord::FIELDS.iter().enumerate() {
        sheet.write_string(0, col as u16, *field)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, value) in record.values().into_iter().enumerate() {
            let cell = clip_cell(value);
            if cell.len() < value.len() {
                warn!(
                    "Row {} {}: clipped {} characters to {}",
                    row,
                    ListingRecord::FIELDS[col],
                    value.chars().count(),
                    XLSX_CELL_LIMIT
                );
            }
            sheet.write_string(row, col as u16, cell)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn clip_cell(value: &str) -> &str {
    match value.char_indices().nth(XLSX_CELL_LIMIT) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

pub fn export_csv(records: &[ListingRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(ListingRecord::FIELDS)?;
    for record in records {
        writer.write_record(record.values())?;
    }
    writer.flush()?;
    Ok(())
}

/// One JSON object per line. No records means an empty file.
pub fn export_jsonl(records: &[ListingRecord], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
