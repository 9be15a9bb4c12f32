//! IO utilities for loading tabular datasets.

pub mod table_reader;

pub use table_reader::{delimiter_for, read_table};
