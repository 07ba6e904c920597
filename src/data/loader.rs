//! Survey Data Loader Module
//! Handles CSV loading (local file or remote URL) using Polars, plus the
//! cleanup and schema validation that happens right after a load.

use crate::data::schema::SurveySchema;
use polars::prelude::*;
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Failed to fetch dataset: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Missing columns in CSV: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Where the current DataFrame came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// Short description for the status line.
    pub fn display_name(&self) -> String {
        match self {
            DataSource::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.to_string_lossy().to_string()),
            DataSource::Url(url) => url.clone(),
        }
    }
}

/// Handles survey CSV loading with Polars.
#[derive(Default)]
pub struct SurveyLoader {
    df: Option<DataFrame>,
}

impl SurveyLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a local CSV file. Standalone so the GUI can call it from a
    /// background thread without borrowing the loader.
    pub fn read_path(path: &str, schema: &SurveySchema) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Self::install_checks(df, schema)
    }

    /// Fetch a CSV over HTTP and parse it from memory.
    pub fn read_url(url: &str, schema: &SurveySchema) -> Result<DataFrame, LoaderError> {
        info!(url, "fetching survey dataset");
        let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;

        let df = CsvReadOptions::default()
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;

        Self::install_checks(df, schema)
    }

    /// Shared post-load pipeline: validate columns, then drop blank rows.
    fn install_checks(df: DataFrame, schema: &SurveySchema) -> Result<DataFrame, LoaderError> {
        let missing = schema.missing_columns(&df);
        if !missing.is_empty() {
            return Err(LoaderError::MissingColumns(missing));
        }

        let df = Self::drop_blank_rows(df, schema)?;
        info!(rows = df.height(), "survey dataset ready");
        Ok(df)
    }

    /// Remove rows where every answer column is null or whitespace.
    fn drop_blank_rows(df: DataFrame, schema: &SurveySchema) -> Result<DataFrame, LoaderError> {
        let columns: Vec<&Column> = schema
            .columns()
            .iter()
            .filter_map(|name| df.column(name).ok())
            .collect();

        let mut keep: Vec<bool> = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let has_answer = columns.iter().any(|col| {
                col.get(row)
                    .ok()
                    .filter(|val| !val.is_null())
                    .map(|val| !val.to_string().trim_matches('"').trim().is_empty())
                    .unwrap_or(false)
            });
            keep.push(has_answer);
        }

        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        Ok(df.filter(&mask)?)
    }

    /// Install a validated DataFrame (called after background loading).
    pub fn set_dataframe(&mut self, df: DataFrame) {
        self.df = Some(df);
    }

    pub fn dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Sorted unique trimmed values of a column, for the filter widgets.
    pub fn unique_values(&self, column: &str) -> Vec<String> {
        let Some(df) = &self.df else {
            return Vec::new();
        };
        unique_values(df, column)
    }
}

/// Sorted unique trimmed non-empty values of a column.
pub fn unique_values(df: &DataFrame, column: &str) -> Vec<String> {
    df.column(column)
        .ok()
        .and_then(|col| col.unique().ok())
        .map(|unique| {
            let series = unique.as_materialized_series();
            let mut values: Vec<String> = (0..series.len())
                .filter_map(|i| {
                    let val = series.get(i).ok()?;
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
                .collect();
            values.sort();
            values.dedup();
            values
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_column_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                "1 - Qual a sua idade?".into(),
                vec![
                    Some("18-24"),
                    Some("  "),
                    Some("25-30"),
                    None,
                    Some("18-24"),
                ],
            ),
            Column::new(
                "4 - Qual a sua escolaridade:".into(),
                vec![
                    Some("Ensino médio"),
                    None,
                    Some("Superior"),
                    Some(""),
                    Some("Superior"),
                ],
            ),
        ])
        .unwrap()
    }

    fn two_question_schema() -> SurveySchema {
        let full = SurveySchema::default();
        SurveySchema {
            source_url: full.source_url.clone(),
            questions: full
                .questions
                .iter()
                .filter(|q| q.key == "age" || q.key == "education")
                .cloned()
                .collect(),
        }
    }

    #[test]
    fn drop_blank_rows_removes_all_empty_answers() {
        let df = SurveyLoader::drop_blank_rows(two_column_frame(), &two_question_schema()).unwrap();
        // Rows 1 (whitespace + null) and 3 (null + empty) are blank.
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn install_checks_reports_every_missing_column() {
        let df = DataFrame::new(vec![Column::new("unrelated".into(), vec!["x"])]).unwrap();
        let err = SurveyLoader::install_checks(df, &two_question_schema()).unwrap_err();
        match err {
            LoaderError::MissingColumns(cols) => assert_eq!(cols.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unique_values_are_trimmed_sorted_and_deduped() {
        let df = two_column_frame();
        let values = unique_values(&df, "1 - Qual a sua idade?");
        assert_eq!(values, vec!["18-24".to_string(), "25-30".to_string()]);
    }

    #[test]
    fn unique_values_of_unknown_column_is_empty() {
        let df = two_column_frame();
        assert!(unique_values(&df, "no such column").is_empty());
    }
}
