use std::collections::HashMap;
use calamine::{CellErrorType, Data};
use chrono::{DateTime, Utc};
use crate::error::AppError;
use crate::models::CellValue;
use super::types::{EMPTY_HEADER, VALID_FILE_EXTENSIONS};

/// Header names from the first sheet row. Blank cells become `__EMPTY`,
/// repeated names get `_1`, `_2`, ... appended.
pub fn header_names(cells: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    cells.iter()
        .map(|cell| {
            let base = match cell {
                Data::Empty => EMPTY_HEADER.to_string(),
                other => match cell_value(other).to_string() {
                    s if s.is_empty() => EMPTY_HEADER.to_string(),
                    s => s,
                },
            };
            unique_name(base, &mut seen)
        })
        .collect()
}

fn unique_name(base: String, seen: &mut HashMap<String, usize>) -> String {
    let mut counter = match seen.get(&base) {
        None => {
            seen.insert(base.clone(), 1);
            return base;
        }
        Some(&n) => n,
    };

    let mut candidate = format!("{}_{}", base, counter);
    while seen.contains_key(&candidate) {
        counter += 1;
        candidate = format!("{}_{}", base, counter);
    }
    seen.insert(base, counter + 1);
    seen.insert(candidate.clone(), 1);
    candidate
}

pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::text(""),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // date serial number, as the sheet stores it
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        // error cells carry no value; `#NULL!` reads as null, the rest as ""
        Data::Error(CellErrorType::Null) => CellValue::Empty,
        Data::Error(_) => CellValue::text(""),
    }
}

/// A row with nothing but empty or error cells is skipped on decode.
pub fn is_blank_row(row: &[Data]) -> bool {
    row.iter().all(|cell| matches!(cell, Data::Empty | Data::Error(_)))
}

pub fn validate_file_name(file_name: &str) -> Result<(), AppError> {
    let lower = file_name.to_lowercase();
    if VALID_FILE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        Ok(())
    } else {
        Err(AppError::InvalidFileType(file_name.to_string()))
    }
}

/// `Report_2024-05-01T09-30-00.xlsx`
pub fn report_file_name(now: DateTime<Utc>) -> String {
    format!("Report_{}.xlsx", now.format("%Y-%m-%dT%H-%M-%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn headers_are_made_unique() {
        let cells = vec![text("Name"), text("Name"), Data::Empty, text("Name_1"), Data::Empty, Data::Float(2024.0)];
        assert_eq!(
            header_names(&cells),
            vec!["Name", "Name_1", "__EMPTY", "Name_1_1", "__EMPTY_1", "2024"]
        );
    }

    #[test]
    fn repeated_duplicates_keep_counting() {
        let cells = vec![text("a"), text("a"), text("a")];
        assert_eq!(header_names(&cells), vec!["a", "a_1", "a_2"]);
    }

    #[test]
    fn cells_convert_by_kind() {
        assert_eq!(cell_value(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(cell_value(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(cell_value(&Data::Empty), CellValue::text(""));
        assert_eq!(cell_value(&text("x")), CellValue::text("x"));
    }

    #[test]
    fn error_cells_are_blank() {
        assert_eq!(cell_value(&Data::Error(CellErrorType::Div0)), CellValue::text(""));
        assert_eq!(cell_value(&Data::Error(CellErrorType::NA)), CellValue::text(""));
        assert_eq!(cell_value(&Data::Error(CellErrorType::Null)), CellValue::Empty);
        assert!(cell_value(&Data::Error(CellErrorType::Value)).is_blank());

        assert!(is_blank_row(&[Data::Empty, Data::Error(CellErrorType::Ref)]));
        assert!(!is_blank_row(&[Data::Error(CellErrorType::Ref), Data::Int(0)]));
    }

    #[test]
    fn file_extensions_are_case_insensitive() {
        assert!(validate_file_name("data.xlsx").is_ok());
        assert!(validate_file_name("DATA.XLS").is_ok());
        assert!(matches!(validate_file_name("data.csv"), Err(AppError::InvalidFileType(_))));
        assert!(validate_file_name("xlsx").is_err());
    }

    #[test]
    fn report_name_uses_hyphenated_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 7).unwrap();
        assert_eq!(report_file_name(now), "Report_2024-05-01T09-30-07.xlsx");
    }
}
