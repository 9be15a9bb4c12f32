//! Categorical encoders and the registry that ties them to columns.
//!
//! Three encodings are supported: one-hot over the sorted training values,
//! a label index over the sorted training values, and an ordinal index over
//! a caller-supplied order. Every encoder is fitted once on training data and
//! then reused unchanged; fitting twice is not possible through the registry.
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderType {
    Label,
    Ordinal,
    OneHot,
}

impl fmt::Display for EncoderType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncoderType::Label => write!(f, "label"),
            EncoderType::Ordinal => write!(f, "ordinal"),
            EncoderType::OneHot => write!(f, "onehot"),
        }
    }
}

/// A categorical encoder for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encoder {
    kind: EncoderType,
    /// Fixed order for ordinal encoders, learned values for the others.
    categories: Option<Vec<String>>,
    fitted: bool,
}

impl Encoder {
    pub fn new(kind: EncoderType, categories: Option<Vec<String>>) -> Result<Self> {
        match kind {
            EncoderType::Ordinal => {
                let categories = categories.ok_or(ModelError::MissingCategories)?;
                validate_categories(&categories)?;
                Ok(Encoder {
                    kind,
                    categories: Some(categories),
                    fitted: false,
                })
            }
            EncoderType::Label | EncoderType::OneHot => Ok(Encoder {
                kind,
                categories: None,
                fitted: false,
            }),
        }
    }

    pub fn kind(&self) -> EncoderType {
        self.kind
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn categories(&self) -> Option<&[String]> {
        self.categories.as_deref()
    }

    /// Learn categories from training values.
    ///
    /// Ordinal encoders keep their configured order but still reject training
    /// values outside it.
    pub fn fit(&mut self, column: &str, values: &[&str]) -> Result<()> {
        if values.is_empty() {
            return Err(ModelError::EmptyFit(column.to_string()));
        }
        match self.kind {
            EncoderType::Ordinal => {
                let categories = self.categories.as_deref().unwrap_or_default();
                if let Some(unknown) = values.iter().find(|v| !categories.iter().any(|c| c == *v)) {
                    return Err(ModelError::UnknownCategory {
                        column: column.to_string(),
                        value: unknown.to_string(),
                    });
                }
            }
            EncoderType::Label | EncoderType::OneHot => {
                let unique: BTreeSet<&str> = values.iter().copied().collect();
                self.categories = Some(unique.into_iter().map(str::to_string).collect());
            }
        }
        self.fitted = true;
        Ok(())
    }

    /// Names of the columns this encoder emits for `column`.
    pub fn output_names(&self, column: &str) -> Result<Vec<String>> {
        let categories = self.fitted_categories(column)?;
        Ok(match self.kind {
            EncoderType::OneHot => categories
                .iter()
                .map(|c| format!("{}_{}", column, c))
                .collect(),
            EncoderType::Label | EncoderType::Ordinal => vec![column.to_string()],
        })
    }

    pub fn width(&self) -> usize {
        match self.kind {
            EncoderType::OneHot => self.categories.as_ref().map_or(0, Vec::len),
            EncoderType::Label | EncoderType::Ordinal => 1,
        }
    }

    /// Index of `value` among the fitted categories.
    pub fn index_of(&self, column: &str, value: &str) -> Result<usize> {
        self.fitted_categories(column)?
            .iter()
            .position(|c| c == value)
            .ok_or_else(|| ModelError::UnknownCategory {
                column: column.to_string(),
                value: value.to_string(),
            })
    }

    /// Append the encoded form of `value` to `out`.
    pub fn encode_into(&self, column: &str, value: &str, out: &mut Vec<f32>) -> Result<()> {
        let idx = self.index_of(column, value)?;
        match self.kind {
            EncoderType::OneHot => {
                let start = out.len();
                out.resize(start + self.width(), 0.0);
                out[start + idx] = 1.0;
            }
            EncoderType::Label | EncoderType::Ordinal => out.push(idx as f32),
        }
        Ok(())
    }

    /// Encode every value, one output row per input value.
    pub fn transform(&self, column: &str, values: &[&str]) -> Result<Vec<Vec<f32>>> {
        values
            .iter()
            .map(|v| {
                let mut row = Vec::with_capacity(self.width());
                self.encode_into(column, v, &mut row)?;
                Ok(row)
            })
            .collect()
    }

    /// Map a class index back to its category.
    pub fn inverse_transform(&self, column: &str, index: usize) -> Result<String> {
        self.fitted_categories(column)?
            .get(index)
            .cloned()
            .ok_or(ModelError::UnknownClass(index))
    }

    fn fitted_categories(&self, column: &str) -> Result<&[String]> {
        match (&self.categories, self.fitted) {
            (Some(categories), true) => Ok(categories),
            _ => Err(ModelError::EncoderNotFitted(column.to_string())),
        }
    }
}

fn validate_categories(categories: &[String]) -> Result<()> {
    if categories.is_empty() {
        return Err(ModelError::InvalidCategories(
            "categories must not be empty".to_string(),
        ));
    }
    let mut seen = BTreeSet::new();
    for c in categories {
        if !seen.insert(c.as_str()) {
            return Err(ModelError::InvalidCategories(format!(
                "duplicate category '{}'",
                c
            )));
        }
    }
    Ok(())
}

/// What an encoder is registered for: a feature column or the target sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderKey {
    Column(String),
    Target,
}

impl fmt::Display for EncoderKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncoderKey::Column(name) => write!(f, "{}", name),
            EncoderKey::Target => write!(f, "target"),
        }
    }
}

/// Insertion-ordered encoders, at most one per key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncoderRegistry {
    entries: Vec<(EncoderKey, Encoder)>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: EncoderKey, encoder: Encoder) -> Result<()> {
        if self.contains(&key) {
            return Err(ModelError::DuplicateEncoder(key.to_string()));
        }
        self.entries.push((key, encoder));
        Ok(())
    }

    pub fn contains(&self, key: &EncoderKey) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &EncoderKey) -> Option<&Encoder> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn get_mut(&mut self, key: &EncoderKey) -> Option<&mut Encoder> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, e)| e)
    }

    pub fn target(&self) -> Option<&Encoder> {
        self.get(&EncoderKey::Target)
    }

    /// Feature-column encoders in registration order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Encoder)> {
        self.entries.iter().filter_map(|(k, e)| match k {
            EncoderKey::Column(name) => Some((name.as_str(), e)),
            EncoderKey::Target => None,
        })
    }

    pub fn encodes_column(&self, name: &str) -> bool {
        self.columns().any(|(c, _)| c == name)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&EncoderKey, &mut Encoder)> {
        self.entries.iter_mut().map(|(k, e)| (&*k, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
