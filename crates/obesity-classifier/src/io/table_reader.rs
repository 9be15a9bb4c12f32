//! CSV/TSV reader producing a [`Table`].
use std::path::Path;

use csv::StringRecord;

use crate::data_handling::Table;
use crate::error::{ModelError, Result};

/// Pick the delimiter from the file extension: `.tsv` is tab separated,
/// anything else is comma separated.
pub fn delimiter_for<P: AsRef<Path>>(path: P) -> u8 {
    let is_tsv = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tsv"))
        .unwrap_or(false);
    if is_tsv {
        b'\t'
    } else {
        b','
    }
}

/// Read a CSV or TSV file with a header row into a [`Table`].
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let csv_err = |source| ModelError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record).map_err(csv_err)? {
        rows.push(record.iter().map(str::to_string).collect());
    }

    let table = Table::new(headers, rows)?;
    log::debug!(
        "Read {} rows x {} columns from {}",
        table.nrows(),
        table.ncols(),
        path.display()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_follows_extension() {
        assert_eq!(delimiter_for("data.tsv"), b'\t');
        assert_eq!(delimiter_for("data.TSV"), b'\t');
        assert_eq!(delimiter_for("data.csv"), b',');
        assert_eq!(delimiter_for("data"), b',');
    }

    #[test]
    fn reads_tsv_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tsv");
        std::fs::write(&path, "Gender\tAge\nMale\t21\nFemale\t\n").unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.headers(), &["Gender".to_string(), "Age".to_string()]);
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.rows()[1], vec!["Female".to_string(), String::new()]);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_table("/nonexistent/obesity.csv").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/obesity.csv"));
    }
}
