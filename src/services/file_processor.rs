use bytes::Bytes;
use serde::Serialize;
use crate::error::AppError;
use crate::models::{Row, Table};
use crate::services::excel::{validate_file_name, SheetReader};
use crate::services::stats::{AnalyzerOptions, ColumnTypeCounts, Report, TableAnalyzer};

pub const MAX_PREVIEW_ROWS: usize = 100;

/// The four numbers shown on the stat cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SheetStats {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: usize,
    pub text_columns: usize,
}

impl SheetStats {
    fn new(table: &Table, types: ColumnTypeCounts) -> Self {
        Self {
            total_rows: table.len(),
            total_columns: table.headers().len(),
            numeric_columns: types.numeric_columns,
            text_columns: types.text_columns,
        }
    }
}

/// Everything derived from one upload.
#[derive(Debug, Clone)]
pub struct ProcessedUpload {
    pub file_name: String,
    pub table: Table,
    pub report: Report,
    pub stats: SheetStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct RawPreview {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub total_rows: usize,
    pub truncated: bool,
}

impl RawPreview {
    /// First `limit` rows, in header order of the first row.
    pub fn from_table(table: &Table, limit: usize) -> Self {
        Self {
            headers: table.headers().into_iter().map(String::from).collect(),
            rows: table.rows().iter().take(limit).cloned().collect(),
            total_rows: table.len(),
            truncated: table.len() > limit,
        }
    }
}

/// Decodes the required sheet and runs the statistics over it. Blocking.
pub fn analyze_upload(
    file_name: &str,
    file_data: Bytes,
    options: AnalyzerOptions,
) -> Result<ProcessedUpload, AppError> {
    validate_file_name(file_name)?;

    let table = SheetReader.read_required_sheet(file_data)?;

    let analysis_start = std::time::Instant::now();
    let analyzer = TableAnalyzer::new(options);
    let report = analyzer.generate_report(&table);
    let stats = SheetStats::new(&table, analyzer.classify_column_types(&table));
    tracing::info!(
        "Analyzed {}: {} rows, {} columns ({} numeric, {} text), {} report records in {:?}",
        file_name,
        stats.total_rows,
        stats.total_columns,
        stats.numeric_columns,
        stats.text_columns,
        report.len(),
        analysis_start.elapsed()
    );

    Ok(ProcessedUpload {
        file_name: file_name.to_string(),
        table,
        report,
        stats,
    })
}

pub async fn process_upload(
    file_name: String,
    file_data: Bytes,
    options: AnalyzerOptions,
) -> Result<ProcessedUpload, AppError> {
    // reject before handing the bytes to the blocking pool
    validate_file_name(&file_name)?;
    tracing::info!("Processing upload {} ({}KB)", file_name, file_data.len() / 1024);

    tokio::task::spawn_blocking(move || analyze_upload(&file_name, file_data, options)).await?
}
