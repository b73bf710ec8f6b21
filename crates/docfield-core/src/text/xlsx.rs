//! Spreadsheet text extraction.
//!
//! Uses the calamine crate, which reads XLSX, XLSM, XLSB, legacy XLS and ODS.
//! Every sheet is flattened row by row; cell types and formats are dropped.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader, SheetType};
use tracing::debug;

use super::{Result, TextStrategy};
use crate::error::ExtractionError;
use crate::models::config::SpreadsheetConfig;

const FORMAT: &str = "spreadsheet";

/// Row-by-row flattening of a workbook.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetStrategy {
    config: SpreadsheetConfig,
}

impl SpreadsheetStrategy {
    pub fn new(config: SpreadsheetConfig) -> Self {
        Self { config }
    }
}

impl TextStrategy for SpreadsheetStrategy {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))
            .map_err(|e| ExtractionError::corrupt(FORMAT, format!("failed to open workbook: {}", e)))?;

        let sheet_names: Vec<String> = workbook
            .sheets_metadata()
            .iter()
            .filter(|sheet| sheet.typ == SheetType::WorkSheet)
            .map(|sheet| sheet.name.clone())
            .collect();

        let mut output = String::new();

        for name in &sheet_names {
            let range = workbook.worksheet_range(name).map_err(|e| {
                ExtractionError::corrupt(FORMAT, format!("failed to read sheet '{}': {}", name, e))
            })?;

            let mut row_count = 0;
            for row in range.rows() {
                if self.config.skip_empty_cells && row.iter().all(|cell| matches!(cell, Data::Empty)) {
                    continue;
                }

                for cell in row {
                    if self.config.skip_empty_cells && matches!(cell, Data::Empty) {
                        continue;
                    }
                    output.push_str(&render_cell(cell));
                    output.push_str(&self.config.cell_separator);
                }
                output.push('\n');
                row_count += 1;
            }

            debug!("Flattened sheet '{}' ({} rows)", name, row_count);
        }

        Ok(output)
    }
}

/// Textual form of a cell value.
fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // f64 Display drops a zero fraction: 750.0 renders as "750"
        Data::Float(f) => f.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if datetime.time() == chrono::NaiveTime::MIN => datetime.date().to_string(),
            Some(datetime) => datetime.to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::Error(e) => e.to_string(),
    }
}
