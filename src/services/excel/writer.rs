use super::types::*;
use rust_xlsxwriter::{Workbook, Worksheet};
use crate::error::AppError;
use crate::models::{format_number, CellValue, Row, Table};
use crate::services::stats::{Report, ReportRecord};

/// Encodes the uploaded rows and their report into a two-sheet workbook.
pub struct SheetWriter;

impl SheetWriter {
    pub fn write_report(&self, table: &Table, report: &Report) -> Result<Vec<u8>, AppError> {
        let start = std::time::Instant::now();
        let mut workbook = Workbook::new();

        let raw_sheet = workbook.add_worksheet();
        raw_sheet.set_name(REQUIRED_SHEET_NAME)?;
        write_records(raw_sheet, table.rows())?;

        let report_sheet = workbook.add_worksheet();
        report_sheet.set_name(REPORT_SHEET_NAME)?;
        write_records(report_sheet, &report_rows(report))?;

        let buffer = workbook.save_to_buffer()?;
        tracing::info!(
            "Report workbook written ({} rows, {} report records, {}KB) in {:?}",
            table.len(),
            report.len(),
            buffer.len() / 1024,
            start.elapsed()
        );
        Ok(buffer)
    }
}

/// Report records as sheet rows under the report column labels.
pub fn report_rows(report: &Report) -> Vec<Row> {
    report.records()
        .iter()
        .map(|record| {
            let mut row = Row::new();
            match record {
                ReportRecord::Summary(summary) => {
                    row.insert(LABEL_COLUMN, summary.column.as_str());
                    row.insert(LABEL_TOTAL, summary.total_count as f64);
                    row.insert(LABEL_DISTINCT, summary.distinct_count as f64);
                    row.insert(LABEL_EMPTY, summary.empty_count as f64);
                    if let Some(stats) = &summary.numeric {
                        row.insert(LABEL_MIN, stats.min.as_str());
                        row.insert(LABEL_MAX, stats.max.as_str());
                        row.insert(LABEL_MEAN, stats.mean.as_str());
                        row.insert(LABEL_SUM, stats.sum.as_str());
                    }
                }
                ReportRecord::Frequency { record, top_values } => {
                    row.insert(LABEL_COLUMN, record.column.as_str());
                    row.insert(LABEL_TOP_VALUES, top_values.as_str());
                }
            }
            row
        })
        .collect()
}

/// Header row = every key in first-seen order across all records.
fn sheet_headers(records: &[Row]) -> Vec<&str> {
    let mut headers: Vec<&str> = Vec::new();
    for key in records.iter().flat_map(|row| row.keys()) {
        if !headers.contains(&key) {
            headers.push(key);
        }
    }
    headers
}

fn write_records(sheet: &mut Worksheet, records: &[Row]) -> Result<(), AppError> {
    let headers = sheet_headers(records);

    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = idx as u32 + 1;
        for (col, header) in headers.iter().enumerate() {
            let col = col as u16;
            match record.get(header) {
                None | Some(CellValue::Empty) => {}
                Some(CellValue::Text(s)) if s.is_empty() => {}
                Some(CellValue::Text(s)) => {
                    sheet.write_string(row, col, s)?;
                }
                Some(CellValue::Number(n)) if n.is_finite() => {
                    sheet.write_number(row, col, *n)?;
                }
                Some(CellValue::Number(n)) => {
                    sheet.write_string(row, col, format_number(*n))?;
                }
                Some(CellValue::Bool(b)) => {
                    sheet.write_boolean(row, col, *b)?;
                }
            }
        }
    }

    Ok(())
}
