// Index spreadsheet: one row per chart, mapping file name to question

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use crate::ir::{Artifact, IndexEntry};

pub const INDEX_FILE_NAME: &str = "file_name.xlsx";
pub const INDEX_HEADERS: [&str; 2] = ["file_name", "question"];

/// Serialize the index rows as an xlsx artifact
pub fn build_index(entries: &[IndexEntry]) -> Result<Artifact> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in INDEX_HEADERS.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *header)
            .context("Failed to write index header")?;
    }

    for (i, entry) in entries.iter().enumerate() {
        let row = i as u32 + 1;
        sheet
            .write_string(row, 0, &entry.file_name)
            .context("Failed to write index row")?;
        sheet
            .write_string(row, 1, &entry.question)
            .context("Failed to write index row")?;
    }

    let bytes = workbook
        .save_to_buffer()
        .context("Failed to serialize index workbook")?;

    Ok(Artifact {
        name: INDEX_FILE_NAME.to_string(),
        bytes,
    })
}
