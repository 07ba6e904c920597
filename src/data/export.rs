//! Export Module
//! Writes the filtered survey rows back to a CSV file.

use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// Write a DataFrame as UTF-8 CSV with a header row.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<(), ExportError> {
    let mut file = File::create(path)?;
    let mut out = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut out)?;
    info!(rows = out.height(), path = %path.display(), "exported filtered rows");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let df = DataFrame::new(vec![
            Column::new("age".into(), vec!["18-24", "25-30"]),
            Column::new("shift".into(), vec!["Noturno", "Diurno"]),
        ])
        .unwrap();

        let dir = std::env::temp_dir();
        let path = dir.join("pollscope_export_test.csv");
        write_csv(&df, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("age,shift"));
        assert_eq!(lines.next(), Some("18-24,Noturno"));
        assert_eq!(lines.next(), Some("25-30,Diurno"));
    }
}
