pub mod analyzer;
pub mod types;
pub mod utils;

pub use analyzer::TableAnalyzer;
pub use types::{
    AnalyzerOptions, ColumnSummary, ColumnTypeCounts, DistinctMode, FrequencyEntry,
    FrequencyRecord, NumericStats, Report, ReportRecord,
};
