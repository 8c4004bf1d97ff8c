/// The only sheet read from an upload. Exact, case-sensitive match.
pub const REQUIRED_SHEET_NAME: &str = "Rawdata";
pub const REPORT_SHEET_NAME: &str = "Report";

pub const VALID_FILE_EXTENSIONS: [&str; 2] = [".xlsx", ".xls"];
pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const EMPTY_HEADER: &str = "__EMPTY";

// Column labels of the exported Report sheet
pub const LABEL_COLUMN: &str = "컬럼명";
pub const LABEL_TOTAL: &str = "총 데이터 수";
pub const LABEL_DISTINCT: &str = "고유값 수";
pub const LABEL_EMPTY: &str = "빈값 수";
pub const LABEL_MIN: &str = "최솟값";
pub const LABEL_MAX: &str = "최댓값";
pub const LABEL_MEAN: &str = "평균";
pub const LABEL_SUM: &str = "합계";
pub const LABEL_TOP_VALUES: &str = "상위 빈도값";
