//! Local pre-flight read of uploaded spreadsheets.
//!
//! Only the first sheet matters: it must have a `query` header and at least
//! one non-blank query below it.

use calamine::{open_workbook_auto_from_rs, Reader};
use serde::Serialize;
use std::fmt;
use std::io::Cursor;
use std::path::Path;

use crate::error::{Result, WorkflowError};

const QUERY_HEADER: &str = "query";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SpreadsheetFormat {
    /// Format implied by the file extension, if it is an accepted one
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name).extension()?.to_str()?;
        match extension.to_ascii_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Format recognised from the leading bytes; anything that is not a
    /// zip or OLE container is treated as CSV
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) {
            Self::Xlsx
        } else if bytes.starts_with(OLE_MAGIC) {
            Self::Xls
        } else {
            Self::Csv
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for SpreadsheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Result of the pre-flight read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadsheetSummary {
    pub format: SpreadsheetFormat,
    /// Zero-based index of the `query` column
    pub query_column: usize,
    /// Non-blank queries in row order
    pub queries: Vec<String>,
}

/// Read `bytes` as `format` and extract the `query` column
pub fn inspect(format: SpreadsheetFormat, bytes: &[u8]) -> Result<SpreadsheetSummary> {
    let rows = match format {
        SpreadsheetFormat::Csv => read_csv(bytes)?,
        SpreadsheetFormat::Xlsx | SpreadsheetFormat::Xls => read_workbook(bytes)?,
    };

    let mut rows = rows.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| WorkflowError::validation("The spreadsheet is empty"))?;
    let query_column = header
        .iter()
        .position(|cell| is_query_header(cell))
        .ok_or_else(|| {
            WorkflowError::validation("The first sheet has no 'query' column")
        })?;

    let queries: Vec<String> = rows
        .filter_map(|row| row.get(query_column).map(|cell| cell.trim().to_string()))
        .filter(|query| !query.is_empty())
        .collect();

    if queries.is_empty() {
        return Err(WorkflowError::validation(
            "The 'query' column does not contain any questions",
        ));
    }

    Ok(SpreadsheetSummary {
        format,
        query_column,
        queries,
    })
}

fn is_query_header(cell: &str) -> bool {
    cell.trim_start_matches('\u{feff}')
        .trim()
        .eq_ignore_ascii_case(QUERY_HEADER)
}

fn read_csv(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| WorkflowError::validation(format!("Unable to read CSV file: {e}")))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_workbook(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| WorkflowError::validation(format!("Unable to read spreadsheet: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| WorkflowError::validation("The spreadsheet has no sheets"))?
        .map_err(|e| WorkflowError::validation(format!("Unable to read first sheet: {e}")))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect())
}
