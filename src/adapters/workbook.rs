use crate::domain::model::{CellValue, SourceTable};
use crate::utils::error::{ReportError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use std::path::Path;

pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"];

/// Decodes the first worksheet of `file_name` from its raw bytes.
pub fn read_table(file_name: &str, bytes: Vec<u8>) -> Result<SourceTable> {
    let path = Path::new(file_name);
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let label = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
        .to_string();

    let grid = if extension == "csv" {
        read_csv_grid(&bytes)?
    } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        read_spreadsheet_grid(file_name, bytes)?
    } else {
        return Err(ReportError::UnsupportedFile {
            file: file_name.to_string(),
        });
    };

    let mut rows = grid
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()));

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.as_text().unwrap_or_default())
            .collect(),
        None => Vec::new(),
    };

    let width = headers.len();
    let rows: Vec<Vec<CellValue>> = rows
        .map(|mut row| {
            if row.len() < width {
                row.resize(width, CellValue::Empty);
            }
            row
        })
        .collect();

    tracing::debug!(
        "Read {} rows x {} columns from {}",
        rows.len(),
        width,
        file_name
    );

    Ok(SourceTable {
        source: file_name.to_string(),
        label,
        headers,
        rows,
    })
}

fn read_spreadsheet_grid(file_name: &str, bytes: Vec<u8>) -> Result<Vec<Vec<CellValue>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReportError::SourceFileError {
            file: file_name.to_string(),
            message: "workbook has no worksheets".to_string(),
        })?;

    let range = workbook.worksheet_range(&sheet)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect())
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

fn read_csv_grid(bytes: &[u8]) -> Result<Vec<Vec<CellValue>>> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{feff}');

    let header_line = text.lines().next().unwrap_or_default();
    let delimiter = if header_line.matches(';').count() > header_line.matches(',').count() {
        b';'
    } else {
        b','
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(grid)
}
