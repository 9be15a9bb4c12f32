//! In-memory tabular data and the cleaning steps applied before encoding.
//!
//! `Table` keeps every cell as a string so categorical and numeric columns
//! share one representation. Numeric parsing happens only when the encoded
//! feature matrix is built.
use std::collections::HashSet;
use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;

use crate::error::{ModelError, Result};
use crate::features::AGE_COLUMN;

/// Cell values treated as missing, in addition to empty cells.
///
/// The usual CSV null spellings, matched exactly and case-sensitively.
const NA_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn digits_regex() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"(\d+)").expect("static regex"))
}

/// Returns true when a cell should be treated as a missing value.
///
/// Cells are compared as read; surrounding whitespace is not stripped.
pub fn is_missing(cell: &str) -> bool {
    cell.is_empty() || NA_MARKERS.contains(&cell)
}

/// Row counts removed by each cleaning step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningSummary {
    pub missing: usize,
    pub duplicates: usize,
    pub no_digits: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(ModelError::RaggedRow {
                    row: i + 1,
                    found: row.len(),
                    expected: headers.len(),
                });
            }
        }
        Ok(Table { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column_values(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| ModelError::UnknownColumn(name.to_string()))?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Copy of the table without `name`; the remaining columns keep their order.
    pub fn without_column(&self, name: &str) -> Result<Table> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| ModelError::UnknownColumn(name.to_string()))?;
        let headers = self
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, h)| h.clone())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(i, _)| *i != idx)
                    .map(|(_, c)| c.clone())
                    .collect()
            })
            .collect();
        Ok(Table { headers, rows })
    }

    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Drop every row that contains at least one missing cell.
    pub fn drop_missing(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().any(|cell| is_missing(cell)));
        before - self.rows.len()
    }

    /// Drop exact duplicate rows, keeping the first occurrence.
    pub fn drop_duplicates(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(before);
        self.rows.retain(|row| seen.insert(row.clone()));
        before - self.rows.len()
    }

    /// Replace each cell of `column` with its first run of digits.
    ///
    /// `"23.7"` becomes `"23"`. Rows without any digit are removed and counted.
    pub fn extract_digits(&mut self, column: &str) -> Result<usize> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| ModelError::UnknownColumn(column.to_string()))?;
        let re = digits_regex();
        let before = self.rows.len();
        self.rows.retain_mut(|row| {
            let digits = re.captures(&row[idx]).map(|caps| caps[1].to_string());
            match digits {
                Some(digits) => {
                    row[idx] = digits;
                    true
                }
                None => false,
            }
        });
        let dropped = before - self.rows.len();
        if dropped > 0 {
            log::warn!(
                "Dropped {} rows whose '{}' value contains no digits",
                dropped,
                column
            );
        }
        Ok(dropped)
    }

    /// Drop nulls, drop duplicates, then reduce `digit_column` (if given) to its digits.
    pub fn clean_data(&mut self, digit_column: Option<&str>) -> Result<CleaningSummary> {
        let missing = self.drop_missing();
        let duplicates = self.drop_duplicates();
        let no_digits = match digit_column {
            Some(column) => self.extract_digits(column)?,
            None => 0,
        };
        let summary = CleaningSummary {
            missing,
            duplicates,
            no_digits,
            remaining: self.rows.len(),
        };
        log::debug!("Cleaning summary: {:?}", summary);
        Ok(summary)
    }

    /// Shuffle rows with a seeded RNG and split them into `(train, test)`.
    ///
    /// `fraction` is the share of rows kept for training.
    pub fn split(&self, fraction: f32, seed: u64) -> (Table, Table) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut indices: Vec<usize> = (0..self.rows.len()).collect();
        indices.shuffle(&mut rng);

        let fraction = fraction.clamp(0.0, 1.0);
        let n_train = (self.rows.len() as f32 * fraction).round() as usize;
        let (train, test) = indices.split_at(n_train.min(indices.len()));
        (self.select_rows(train), self.select_rows(test))
    }
}

/// Standard cleaning for the obesity dataset: drop nulls and duplicates, then
/// reduce `Age` (when present) to its digits.
pub fn clean_dataset(table: &mut Table) -> Result<CleaningSummary> {
    let digit_column = table.has_column(AGE_COLUMN).then_some(AGE_COLUMN);
    let summary = table.clean_data(digit_column)?;
    log::info!(
        "Cleaned data: dropped {} rows with missing values, {} duplicates, {} without digits; {} rows remain",
        summary.missing,
        summary.duplicates,
        summary.no_digits,
        summary.remaining
    );
    Ok(summary)
}
