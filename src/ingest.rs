// Table ingestion for csv and xlsx uploads

use crate::data::{format_number, SurveyTable};
use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use tracing::debug;

/// Recognized input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Xlsx,
}

impl InputFormat {
    /// Detect the format from the file name extension (case-insensitive)
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = name.rsplit('.').next()?;
        if ext.len() == name.len() {
            return None;
        }
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(InputFormat::Csv),
            "xlsx" => Some(InputFormat::Xlsx),
            _ => None,
        }
    }
}

/// Load a table from disk.
///
/// Returns `Ok(None)` when the extension is neither `csv` nor `xlsx`; the
/// caller decides how to report that.
pub fn load_table(path: &Path) -> Result<Option<SurveyTable>> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid input path '{}'", path.display()))?;

    if InputFormat::from_file_name(name).is_none() {
        return Ok(None);
    }

    let file = File::open(path).context(format!("Failed to open '{}'", path.display()))?;
    load_table_from_reader(name, BufReader::new(file))
}

/// Load a table from any reader, using `file_name` only to pick the format
pub fn load_table_from_reader<R: Read>(file_name: &str, reader: R) -> Result<Option<SurveyTable>> {
    let table = match InputFormat::from_file_name(file_name) {
        Some(InputFormat::Csv) => read_csv(reader)?,
        Some(InputFormat::Xlsx) => read_xlsx(reader)?,
        None => return Ok(None),
    };
    debug!(
        file = file_name,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "Loaded table"
    );
    Ok(Some(table))
}

/// Parse CSV with a header row
pub fn read_csv<R: Read>(reader: R) -> Result<SurveyTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() {
        anyhow::bail!("CSV must have a header row");
    }

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.context(format!("Failed to parse CSV record {}", i + 1))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(SurveyTable::new(headers, rows))
}

/// Parse the first worksheet of an xlsx workbook; its first row is the header
pub fn read_xlsx<R: Read>(mut reader: R) -> Result<SurveyTable> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .context("Failed to read xlsx input")?;

    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(Cursor::new(bytes)).context("Failed to open xlsx workbook")?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook has no worksheets"))?
        .context("Failed to read first worksheet")?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(first) => first.iter().map(|c| cell_to_string(c).trim().to_string()).collect(),
        None => return Ok(SurveyTable::default()),
    };

    let rows = rows
        .map(|r| r.iter().map(cell_to_string).collect())
        .collect();

    Ok(SurveyTable::new(headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
