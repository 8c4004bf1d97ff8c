use super::types::*;
use super::utils::*;
use std::io::Cursor;
use bytes::Bytes;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use crate::error::AppError;
use crate::models::{Row, Table};

/// Decodes the required sheet of an uploaded workbook into a [`Table`].
pub struct SheetReader;

impl SheetReader {
    pub fn read_required_sheet(&self, file_data: Bytes) -> Result<Table, AppError> {
        let start = std::time::Instant::now();
        let cursor = Cursor::new(file_data);

        let mut workbook = open_workbook_auto_from_rs(cursor)
            .map_err(|e| {
                tracing::error!("Failed to open workbook: {}", e);
                AppError::from(e)
            })?;

        let sheet_names = workbook.sheet_names().to_vec();
        tracing::info!("Found {} sheets: {:?}", sheet_names.len(), sheet_names);

        if !sheet_names.iter().any(|name| name == REQUIRED_SHEET_NAME) {
            return Err(AppError::MissingRequiredSheet {
                required: REQUIRED_SHEET_NAME.to_string(),
                available: sheet_names.join(", "),
            });
        }

        let range = workbook.worksheet_range(REQUIRED_SHEET_NAME)?;
        let table = decode_rows(range.rows())?;

        tracing::info!(
            "Read {} rows x {} columns from {} in {:?}",
            table.len(),
            table.headers().len(),
            REQUIRED_SHEET_NAME,
            start.elapsed()
        );
        Ok(table)
    }
}

/// First row names the columns; blank rows are dropped and short rows
/// padded with `""`. A sheet without data rows is an error.
fn decode_rows<'a>(mut rows: impl Iterator<Item = &'a [Data]>) -> Result<Table, AppError> {
    let headers = match rows.next() {
        Some(first) => header_names(first),
        None => return Err(AppError::EmptySheet(REQUIRED_SHEET_NAME.to_string())),
    };

    let table: Table = rows
        .filter(|row| !is_blank_row(row))
        .map(|row| {
            headers.iter()
                .enumerate()
                .map(|(idx, header)| {
                    let value = row.get(idx).map(cell_value).unwrap_or_else(|| "".into());
                    (header.as_str(), value)
                })
                .collect::<Row>()
        })
        .collect();

    if table.is_empty() {
        return Err(AppError::EmptySheet(REQUIRED_SHEET_NAME.to_string()));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;
    use calamine::CellErrorType;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(build: impl FnOnce(&mut Workbook)) -> Bytes {
        let mut workbook = Workbook::new();
        build(&mut workbook);
        Bytes::from(workbook.save_to_buffer().unwrap())
    }

    #[test]
    fn reads_rows_keyed_by_header() {
        let data = workbook_bytes(|wb| {
            let ws = wb.add_worksheet();
            ws.set_name("Rawdata").unwrap();
            ws.write_string(0, 0, "Name").unwrap();
            ws.write_string(0, 1, "Age").unwrap();
            ws.write_string(1, 0, "Al").unwrap();
            ws.write_number(1, 1, 30.0).unwrap();
            ws.write_string(2, 0, "Bo").unwrap();
            // row 3 left blank, row 4 has only a name
            ws.write_string(4, 0, "Cy").unwrap();
        });

        let table = SheetReader.read_required_sheet(data).unwrap();
        assert_eq!(table.headers(), vec!["Name", "Age"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0].get("Age"), Some(&CellValue::Number(30.0)));
        assert_eq!(table.rows()[1].get("Age"), Some(&CellValue::text("")));
        assert_eq!(table.rows()[2].get("Name"), Some(&CellValue::text("Cy")));
    }

    #[test]
    fn missing_sheet_is_reported_with_available_names() {
        let data = workbook_bytes(|wb| {
            let ws = wb.add_worksheet();
            ws.set_name("rawdata").unwrap();
            ws.write_string(0, 0, "x").unwrap();
        });

        match SheetReader.read_required_sheet(data) {
            Err(AppError::MissingRequiredSheet { available, .. }) => assert_eq!(available, "rawdata"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn header_only_sheet_is_empty() {
        let data = workbook_bytes(|wb| {
            let ws = wb.add_worksheet();
            ws.set_name("Rawdata").unwrap();
            ws.write_string(0, 0, "Name").unwrap();
        });

        assert!(matches!(
            SheetReader.read_required_sheet(data),
            Err(AppError::EmptySheet(_))
        ));
    }

    #[test]
    fn error_cells_decode_as_blanks() {
        let sheet: Vec<Vec<Data>> = vec![
            vec![Data::String("Name".into()), Data::String("Score".into())],
            vec![Data::Error(CellErrorType::Div0), Data::Error(CellErrorType::NA)],
            vec![Data::String("Al".into()), Data::Error(CellErrorType::Value)],
            vec![Data::String("Bo".into()), Data::Float(7.0)],
        ];

        let table = decode_rows(sheet.iter().map(|row| row.as_slice())).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get("Score"), Some(&CellValue::text("")));
        assert_eq!(table.column_values("Score").count(), 1);
    }

    #[test]
    fn error_only_rows_leave_the_sheet_empty() {
        let sheet: Vec<Vec<Data>> = vec![
            vec![Data::String("Name".into())],
            vec![Data::Error(CellErrorType::Ref)],
        ];

        assert!(matches!(
            decode_rows(sheet.iter().map(|row| row.as_slice())),
            Err(AppError::EmptySheet(_))
        ));
    }

    #[test]
    fn garbage_bytes_are_a_codec_failure() {
        let result = SheetReader.read_required_sheet(Bytes::from_static(b"not a workbook"));
        assert!(matches!(result, Err(AppError::Codec(_))));
    }
}
