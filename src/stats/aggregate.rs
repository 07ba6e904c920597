//! Aggregation Module
//! Value counts, cross-tabulations and headline metrics over the filtered
//! survey frame.

use crate::data::schema::{interest_level_label, SurveySchema};
use polars::prelude::*;
use rayon::prelude::*;
use std::collections::HashMap;

/// Trimmed non-empty string values of a column, in row order.
pub fn clean_column(df: &DataFrame, column: &str) -> Vec<String> {
    let Ok(col) = df.column(column) else {
        return Vec::new();
    };

    (0..col.len())
        .filter_map(|i| {
            let val = col.get(i).ok()?;
            if val.is_null() {
                return None;
            }
            let text = val.to_string().trim_matches('"').trim().to_string();
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        })
        .collect()
}

/// Count occurrences of each answer, ordered by count descending then label.
pub fn value_counts(df: &DataFrame, column: &str) -> Vec<(String, u32)> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for value in clean_column(df, column) {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut out: Vec<(String, u32)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// The most frequent answer of a column, if any.
pub fn predominant(df: &DataFrame, column: &str) -> Option<String> {
    value_counts(df, column)
        .into_iter()
        .next()
        .map(|(label, _)| label)
}

/// Co-occurrence counts of two answer columns.
#[derive(Debug, Clone, Default)]
pub struct CrossTab {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// Indexed [row][col].
    pub counts: Vec<Vec<u32>>,
}

impl CrossTab {
    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty() || self.col_labels.is_empty()
    }

    /// Largest cell count, for heat scaling.
    pub fn max(&self) -> u32 {
        self.counts
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Cross-tabulate two columns. Rows where either side is null/blank are
/// skipped; labels are sorted ascending on both axes.
pub fn crosstab(df: &DataFrame, row_col: &str, col_col: &str) -> CrossTab {
    let (Ok(rows), Ok(cols)) = (df.column(row_col), df.column(col_col)) else {
        return CrossTab::default();
    };

    let clean = |col: &Column, i: usize| -> Option<String> {
        let val = col.get(i).ok()?;
        if val.is_null() {
            return None;
        }
        let text = val.to_string().trim_matches('"').trim().to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    };

    let mut pair_counts: HashMap<(String, String), u32> = HashMap::new();
    for i in 0..df.height() {
        if let (Some(r), Some(c)) = (clean(rows, i), clean(cols, i)) {
            *pair_counts.entry((r, c)).or_insert(0) += 1;
        }
    }

    if pair_counts.is_empty() {
        return CrossTab::default();
    }

    let mut row_labels: Vec<String> = pair_counts.keys().map(|(r, _)| r.clone()).collect();
    let mut col_labels: Vec<String> = pair_counts.keys().map(|(_, c)| c.clone()).collect();
    row_labels.sort();
    row_labels.dedup();
    col_labels.sort();
    col_labels.dedup();

    let counts = row_labels
        .iter()
        .map(|r| {
            col_labels
                .iter()
                .map(|c| {
                    pair_counts
                        .get(&(r.clone(), c.clone()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();

    CrossTab {
        row_labels,
        col_labels,
        counts,
    }
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, Default)]
pub struct SummaryMetrics {
    pub total_rows: usize,
    pub predominant_age: Option<String>,
    pub predominant_education: Option<String>,
    /// Most frequent interest level as (short label, percent of rows).
    pub top_interest: Option<(String, f64)>,
}

impl SummaryMetrics {
    pub fn compute(df: &DataFrame, schema: &SurveySchema) -> Self {
        let total_rows = df.height();

        let column_of = |key: &str| schema.question(key).map(|q| q.column.clone());

        let predominant_age = column_of("age").and_then(|col| predominant(df, &col));
        let predominant_education =
            column_of("education").and_then(|col| predominant(df, &col));

        let top_interest = column_of("interest_level")
            .map(|col| value_counts(df, &col))
            .and_then(|counts| counts.into_iter().next())
            .filter(|_| total_rows > 0)
            .map(|(value, count)| {
                let percent = count as f64 / total_rows as f64 * 100.0;
                (interest_level_label(&value).to_string(), percent)
            });

        Self {
            total_rows,
            predominant_age,
            predominant_education,
            top_interest,
        }
    }
}

/// Everything the dashboard renders, computed once per filter change.
#[derive(Debug, Clone, Default)]
pub struct SurveyAggregates {
    /// Value counts per question, keyed by question key.
    pub counts: HashMap<String, Vec<(String, u32)>>,
    pub age_by_program_interest: CrossTab,
    pub age_by_software_interest: CrossTab,
    pub summary: SummaryMetrics,
}

impl SurveyAggregates {
    pub fn compute(df: &DataFrame, schema: &SurveySchema) -> Self {
        // Per-question counts are independent; fan out across the pool.
        let counts: HashMap<String, Vec<(String, u32)>> = schema
            .questions
            .par_iter()
            .map(|question| (question.key.clone(), value_counts(df, &question.column)))
            .collect();

        let tab = |row_key: &str, col_key: &str| {
            match (schema.question(row_key), schema.question(col_key)) {
                (Some(row_q), Some(col_q)) => crosstab(df, &row_q.column, &col_q.column),
                _ => CrossTab::default(),
            }
        };

        Self {
            counts,
            age_by_program_interest: tab("age", "program_interest"),
            age_by_software_interest: tab("age", "software_eng_interest"),
            summary: SummaryMetrics::compute(df, schema),
        }
    }

    pub fn counts_for(&self, key: &str) -> &[(String, u32)] {
        self.counts
            .get(key)
            .map(|counts| counts.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                "age".into(),
                vec![
                    Some("18-24"),
                    Some(" 18-24 "),
                    Some("25-30"),
                    Some(""),
                    None,
                    Some("25-30"),
                    Some("18-24"),
                ],
            ),
            Column::new(
                "shift".into(),
                vec![
                    Some("Noturno"),
                    Some("Diurno"),
                    Some("Noturno"),
                    Some("Noturno"),
                    Some("Diurno"),
                    None,
                    Some("Noturno"),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn value_counts_ignore_blank_cells_and_trim() {
        let counts = value_counts(&answers_frame(), "age");
        assert_eq!(
            counts,
            vec![("18-24".to_string(), 3), ("25-30".to_string(), 2)]
        );
    }

    #[test]
    fn value_counts_order_is_count_desc_then_label() {
        let df = DataFrame::new(vec![Column::new(
            "q".into(),
            vec!["b", "a", "c", "a", "b"],
        )])
        .unwrap();

        let counts = value_counts(&df, "q");
        assert_eq!(
            counts,
            vec![
                ("a".to_string(), 2),
                ("b".to_string(), 2),
                ("c".to_string(), 1)
            ]
        );
    }

    #[test]
    fn predominant_of_empty_column_is_none() {
        let df = DataFrame::new(vec![Column::new("q".into(), Vec::<Option<&str>>::new())])
            .unwrap();
        assert_eq!(predominant(&df, "q"), None);
        assert_eq!(predominant(&df, "missing"), None);
    }

    #[test]
    fn crosstab_counts_clean_pairs_only() {
        let tab = crosstab(&answers_frame(), "age", "shift");
        assert_eq!(tab.row_labels, vec!["18-24", "25-30"]);
        assert_eq!(tab.col_labels, vec!["Diurno", "Noturno"]);
        // 18-24: 1 Diurno, 2 Noturno; 25-30: 1 Noturno (one row has null shift).
        assert_eq!(tab.counts, vec![vec![1, 2], vec![0, 1]]);
        assert_eq!(tab.max(), 2);
    }

    #[test]
    fn crosstab_with_missing_column_is_empty() {
        let tab = crosstab(&answers_frame(), "age", "missing");
        assert!(tab.is_empty());
        assert_eq!(tab.max(), 0);
    }

    #[test]
    fn summary_uses_interest_label_mapping() {
        let schema = SurveySchema::default();
        let age_col = schema.question("age").unwrap().column.clone();
        let edu_col = schema.question("education").unwrap().column.clone();
        let interest_col = schema.question("interest_level").unwrap().column.clone();

        let df = DataFrame::new(vec![
            Column::new(age_col.into(), vec!["18-24", "18-24", "25-30", "18-24"]),
            Column::new(
                edu_col.into(),
                vec!["Superior", "Ensino médio", "Superior", "Superior"],
            ),
            Column::new(
                interest_col.into(),
                vec![
                    "5 – Tenho muito interesse",
                    "5 – Tenho muito interesse",
                    "1 – Não tenho interesse",
                    "5 – Tenho muito interesse",
                ],
            ),
        ])
        .unwrap();

        let summary = SummaryMetrics::compute(&df, &schema);
        assert_eq!(summary.total_rows, 4);
        assert_eq!(summary.predominant_age.as_deref(), Some("18-24"));
        assert_eq!(summary.predominant_education.as_deref(), Some("Superior"));

        let (label, percent) = summary.top_interest.unwrap();
        assert_eq!(label, "Very high");
        assert!((percent - 75.0).abs() < 1e-9);
    }

    #[test]
    fn summary_of_empty_frame_has_no_headliners() {
        let schema = SurveySchema::default();
        let df = DataFrame::new(vec![Column::new(
            "unrelated".into(),
            Vec::<Option<&str>>::new(),
        )])
        .unwrap();

        let summary = SummaryMetrics::compute(&df, &schema);
        assert_eq!(summary.total_rows, 0);
        assert_eq!(summary.predominant_age, None);
        assert_eq!(summary.top_interest, None);
    }

    #[test]
    fn aggregates_cover_every_schema_question() {
        let schema = SurveySchema::default();
        let age_col = schema.question("age").unwrap().column.clone();
        let df = DataFrame::new(vec![Column::new(
            age_col.into(),
            vec!["18-24", "25-30", "18-24"],
        )])
        .unwrap();

        let aggregates = SurveyAggregates::compute(&df, &schema);
        assert_eq!(aggregates.counts.len(), schema.questions.len());
        assert_eq!(aggregates.counts_for("age").len(), 2);
        // Questions whose columns are absent aggregate to nothing.
        assert!(aggregates.counts_for("shift").is_empty());
        assert!(aggregates.counts_for("unknown key").is_empty());
        assert!(aggregates.age_by_program_interest.is_empty());
    }
}
