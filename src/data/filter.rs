//! Filter Module
//! Applies the user's per-question value selections to the survey frame as
//! one conjunctive boolean mask.

use polars::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Selected values per answer column. Empty selection means "no constraint"
/// for that column; selections on different columns are ANDed together.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    selections: BTreeMap<String, Vec<String>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no column has an active selection.
    pub fn is_empty(&self) -> bool {
        self.selections.values().all(|values| values.is_empty())
    }

    /// Number of columns with at least one selected value.
    pub fn active_count(&self) -> usize {
        self.selections
            .values()
            .filter(|values| !values.is_empty())
            .count()
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    pub fn is_selected(&self, column: &str, value: &str) -> bool {
        self.selections
            .get(column)
            .map(|values| values.iter().any(|v| v == value))
            .unwrap_or(false)
    }

    /// Add or remove a value from a column's selection.
    pub fn toggle(&mut self, column: &str, value: &str) {
        let values = self.selections.entry(column.to_string()).or_default();
        if let Some(pos) = values.iter().position(|v| v == value) {
            values.remove(pos);
        } else {
            values.push(value.to_string());
        }
    }

    pub fn selected(&self, column: &str) -> &[String] {
        self.selections
            .get(column)
            .map(|values| values.as_slice())
            .unwrap_or(&[])
    }

    /// Filter the frame down to rows matching every active selection.
    /// Cell values are compared after trimming, matching how the filter
    /// options were derived.
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame, FilterError> {
        if self.is_empty() {
            return Ok(df.clone());
        }

        let active: Vec<(&Column, &Vec<String>)> = self
            .selections
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .filter_map(|(column, values)| df.column(column).ok().map(|col| (col, values)))
            .collect();

        let mut keep: Vec<bool> = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let passes = active.iter().all(|(col, values)| {
                col.get(row)
                    .ok()
                    .filter(|val| !val.is_null())
                    .map(|val| {
                        let text = val.to_string().trim_matches('"').trim().to_string();
                        values.iter().any(|v| *v == text)
                    })
                    .unwrap_or(false)
            });
            keep.push(passes);
        }

        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        Ok(df.filter(&mask)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                "age".into(),
                vec![Some("18-24"), Some("25-30 "), Some("18-24"), None],
            ),
            Column::new(
                "shift".into(),
                vec![Some("Noturno"), Some("Noturno"), Some("Diurno"), Some("Noturno")],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn empty_filter_returns_all_rows() {
        let filters = FilterSet::new();
        let out = filters.apply(&survey_frame()).unwrap();
        assert_eq!(out.height(), 4);
    }

    #[test]
    fn single_column_selection_is_membership() {
        let mut filters = FilterSet::new();
        filters.toggle("age", "18-24");
        filters.toggle("age", "25-30");

        let out = filters.apply(&survey_frame()).unwrap();
        // Row 1 matches because cell values are trimmed before comparison.
        assert_eq!(out.height(), 3);
    }

    #[test]
    fn selections_across_columns_are_conjunctive() {
        let mut filters = FilterSet::new();
        filters.toggle("age", "18-24");
        filters.toggle("shift", "Noturno");

        let out = filters.apply(&survey_frame()).unwrap();
        assert_eq!(out.height(), 1);
    }

    #[test]
    fn null_cells_fail_active_filters() {
        let mut filters = FilterSet::new();
        filters.toggle("age", "18-24");
        filters.toggle("age", "25-30");
        filters.toggle("age", "31-40");

        let out = filters.apply(&survey_frame()).unwrap();
        assert_eq!(out.height(), 3); // the null-age row is excluded
    }

    #[test]
    fn toggle_twice_removes_the_value() {
        let mut filters = FilterSet::new();
        filters.toggle("age", "18-24");
        assert!(filters.is_selected("age", "18-24"));
        assert_eq!(filters.active_count(), 1);

        filters.toggle("age", "18-24");
        assert!(!filters.is_selected("age", "18-24"));
        assert!(filters.is_empty());
    }

    #[test]
    fn no_match_yields_empty_frame_not_error() {
        let mut filters = FilterSet::new();
        filters.toggle("age", "60+");

        let out = filters.apply(&survey_frame()).unwrap();
        assert_eq!(out.height(), 0);
    }
}
