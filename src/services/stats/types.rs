use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub const TOP_FREQUENCY_COUNT: usize = 5;

/// How distinct values are compared when counting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistinctMode {
    /// By string form only: the number `5` and the text `"5"` are one value.
    #[default]
    Loose,
    /// By kind and string form: the number `5` and the text `"5"` differ.
    TypeAware,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerOptions {
    pub top_k: usize,
    pub distinct_mode: DistinctMode,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            top_k: TOP_FREQUENCY_COUNT,
            distinct_mode: DistinctMode::Loose,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub min: String,
    pub max: String,
    pub mean: String,
    pub sum: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub total_count: usize,
    pub distinct_count: usize,
    pub empty_count: usize,
    /// Present only when at least one value coerces to a number.
    #[serde(flatten)]
    pub numeric: Option<NumericStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyRecord {
    pub column: String,
    pub entries: SmallVec<[FrequencyEntry; TOP_FREQUENCY_COUNT]>,
}

impl FrequencyRecord {
    /// `"a (3), b (2), c (1)"`
    pub fn top_values(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{} ({})", e.value, e.count))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportRecord {
    Summary(ColumnSummary),
    Frequency {
        #[serde(flatten)]
        record: FrequencyRecord,
        top_values: String,
    },
}

impl ReportRecord {
    pub fn column(&self) -> &str {
        match self {
            ReportRecord::Summary(s) => &s.column,
            ReportRecord::Frequency { record, .. } => &record.column,
        }
    }
}

impl From<ColumnSummary> for ReportRecord {
    fn from(summary: ColumnSummary) -> Self {
        ReportRecord::Summary(summary)
    }
}

impl From<FrequencyRecord> for ReportRecord {
    fn from(record: FrequencyRecord) -> Self {
        let top_values = record.top_values();
        ReportRecord::Frequency { record, top_values }
    }
}

/// Column summaries in header order, then frequency records in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Report {
    records: Vec<ReportRecord>,
}

impl Report {
    pub fn new(records: Vec<ReportRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ReportRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summaries(&self) -> impl Iterator<Item = &ColumnSummary> {
        self.records.iter().filter_map(|r| match r {
            ReportRecord::Summary(s) => Some(s),
            _ => None,
        })
    }

    pub fn frequencies(&self) -> impl Iterator<Item = &FrequencyRecord> {
        self.records.iter().filter_map(|r| match r {
            ReportRecord::Frequency { record, .. } => Some(record),
            _ => None,
        })
    }

    pub fn summary(&self, column: &str) -> Option<&ColumnSummary> {
        self.summaries().find(|s| s.column == column)
    }

    pub fn frequency(&self, column: &str) -> Option<&FrequencyRecord> {
        self.frequencies().find(|f| f.column == column)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnTypeCounts {
    pub numeric_columns: usize,
    pub text_columns: usize,
}
