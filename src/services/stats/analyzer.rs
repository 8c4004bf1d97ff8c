use super::types::*;
use super::utils::*;
use crate::models::{CellValue, Table};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

/// Column statistics over a decoded table. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableAnalyzer {
    options: AnalyzerOptions,
}

impl TableAnalyzer {
    pub fn new(options: AnalyzerOptions) -> Self {
        Self { options }
    }

    pub fn summarize_column(&self, table: &Table, column: &str) -> ColumnSummary {
        let values: Vec<&CellValue> = table.column_values(column).collect();
        let numeric_values: Vec<f64> = values.iter().filter_map(|v| coerce_number(v)).collect();

        ColumnSummary {
            column: column.to_string(),
            total_count: values.len(),
            distinct_count: self.count_distinct(&values),
            empty_count: table.len() - values.len(),
            numeric: numeric_stats(&numeric_values),
        }
    }

    pub fn frequency_analysis(&self, table: &Table, column: &str) -> Option<FrequencyRecord> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<FrequencyEntry> = Vec::new();

        for value in table.column_values(column) {
            let key = value.to_string();
            match index.get(&key) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(key.clone(), counts.len());
                    counts.push(FrequencyEntry { value: key, count: 1 });
                }
            }
        }

        // sort_by is stable: equal counts stay in first-seen order
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(self.options.top_k);

        if counts.is_empty() {
            return None;
        }

        Some(FrequencyRecord {
            column: column.to_string(),
            entries: SmallVec::from_vec(counts),
        })
    }

    pub fn generate_report(&self, table: &Table) -> Report {
        if table.is_empty() {
            tracing::debug!("Empty table, nothing to report");
            return Report::default();
        }

        let start = std::time::Instant::now();
        let headers = table.headers();

        let summaries = headers
            .iter()
            .map(|header| ReportRecord::from(self.summarize_column(table, header)));
        let frequencies = headers
            .iter()
            .filter_map(|header| self.frequency_analysis(table, header))
            .map(ReportRecord::from);

        let report = Report::new(summaries.chain(frequencies).collect());
        tracing::debug!(
            "Report for {} rows x {} columns built in {:?}",
            table.len(),
            headers.len(),
            start.elapsed()
        );
        report
    }

    pub fn classify_column_types(&self, table: &Table) -> ColumnTypeCounts {
        table
            .headers()
            .iter()
            .fold(ColumnTypeCounts::default(), |mut counts, header| {
                let (total, numeric) = table
                    .column_values(header)
                    .fold((0usize, 0usize), |(total, numeric), value| {
                        (total + 1, numeric + coerce_number(value).is_some() as usize)
                    });

                // strict majority; an all-blank column is text
                if numeric * 2 > total {
                    counts.numeric_columns += 1;
                } else {
                    counts.text_columns += 1;
                }
                counts
            })
    }

    fn count_distinct(&self, values: &[&CellValue]) -> usize {
        match self.options.distinct_mode {
            DistinctMode::Loose => values
                .iter()
                .map(|v| v.to_string())
                .collect::<HashSet<_>>()
                .len(),
            DistinctMode::TypeAware => values
                .iter()
                .map(|v| (v.kind(), v.to_string()))
                .collect::<HashSet<_>>()
                .len(),
        }
    }
}

fn numeric_stats(values: &[f64]) -> Option<NumericStats> {
    let (&first, rest) = values.split_first()?;

    let (min, max, sum) = rest.iter().fold((first, first, first), |(min, max, sum), &v| {
        (min.min(v), max.max(v), sum + v)
    });
    let mean = sum / values.len() as f64;

    Some(NumericStats {
        min: format_fixed2(min),
        max: format_fixed2(max),
        mean: format_fixed2(mean),
        sum: format_fixed2(sum),
    })
}
