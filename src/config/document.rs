//! Typed access to the settings document.
//!
//! The settings file is an OpenCV-FileStorage-style YAML document: a flat
//! mapping of scalar keys, with rotation/translation fields stored either as
//! `!!opencv-matrix` nodes (`rows`/`cols`/`data`) or as plain nested
//! sequences. [`Document`] parses the text once and exposes typed per-key
//! lookups; every lookup returns a [`FieldError`] on a miss and the caller
//! picks the policy (fail, or fall back to a default).
//!
//! ## Lenient defaults
//!
//! The loader deliberately keeps the lenient policy of the original
//! pipeline: almost every absent or mistyped field resolves to a zero/empty
//! default and loading continues. A settings file full of typos will load
//! "successfully" with physically meaningless parameters - the only
//! backstops are the fatal camera-count check and whatever sanity checks the
//! estimator applies downstream. Callers that want stricter behavior can
//! propagate the [`FieldError`] instead of defaulting.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use super::error::FieldError;

/// A parsed settings document with typed per-key lookups.
#[derive(Debug, Clone, Default)]
pub struct Document {
    root: Mapping,
}

/// Raw 2-D numeric field, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixField {
    /// Declared row count
    pub rows: usize,
    /// Declared column count
    pub cols: usize,
    /// Row-major values, `rows * cols` entries
    pub data: Vec<f64>,
}

/// `!!opencv-matrix` node layout (the `dt` element type tag is ignored).
#[derive(Deserialize)]
struct MatrixNode {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Document {
    /// Parse settings text into a document.
    ///
    /// OpenCV writes a `%YAML:1.0` directive that standard YAML parsers
    /// reject, so leading `%` directive lines are stripped before parsing.
    /// The top level must be a mapping.
    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        let text = if text.trim_start().starts_with('%') {
            text.lines()
                .skip_while(|line| line.trim_start().starts_with('%'))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            text.to_string()
        };
        let root: Mapping = serde_yaml::from_str(&text)?;
        Ok(Self { root })
    }

    /// Document with no keys; every lookup reports `Missing`.
    ///
    /// Used when the settings text is not parseable as structured data, so
    /// that loading can continue on defaults.
    pub fn empty() -> Self {
        Self::default()
    }

    fn get(&self, key: &str) -> Result<&Value, FieldError> {
        self.root
            .get(key)
            .ok_or_else(|| FieldError::Missing(key.to_string()))
    }

    /// Scalar numeric lookup.
    pub fn f64(&self, key: &str) -> Result<f64, FieldError> {
        self.get(key)?.as_f64().ok_or_else(|| FieldError::WrongType {
            key: key.to_string(),
            expected: "number",
        })
    }

    /// Integer lookup.
    pub fn i64(&self, key: &str) -> Result<i64, FieldError> {
        self.get(key)?.as_i64().ok_or_else(|| FieldError::WrongType {
            key: key.to_string(),
            expected: "integer",
        })
    }

    /// Boolean-as-integer lookup (`0` false, anything else true).
    ///
    /// Plain YAML booleans are accepted too.
    pub fn flag(&self, key: &str) -> Result<bool, FieldError> {
        let value = self.get(key)?;
        match value {
            Value::Bool(b) => Ok(*b),
            _ => value
                .as_i64()
                .map(|v| v != 0)
                .ok_or_else(|| FieldError::WrongType {
                    key: key.to_string(),
                    expected: "integer flag",
                }),
        }
    }

    /// String lookup.
    pub fn string(&self, key: &str) -> Result<String, FieldError> {
        self.get(key)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| FieldError::WrongType {
                key: key.to_string(),
                expected: "string",
            })
    }

    /// 2-D numeric matrix lookup.
    ///
    /// Accepts three layouts: a tagged `!!opencv-matrix` mapping, a plain
    /// sequence of row sequences, and a flat sequence (read as a column
    /// vector).
    pub fn matrix(&self, key: &str) -> Result<MatrixField, FieldError> {
        let value = self.get(key)?;
        // Unwrap the !!opencv-matrix (or any other) tag
        let value = match value {
            Value::Tagged(tagged) => &tagged.value,
            other => other,
        };

        let field = match value {
            Value::Mapping(_) => {
                let node: MatrixNode =
                    serde_yaml::from_value(value.clone()).map_err(|_| FieldError::WrongType {
                        key: key.to_string(),
                        expected: "matrix node with rows/cols/data",
                    })?;
                MatrixField {
                    rows: node.rows,
                    cols: node.cols,
                    data: node.data,
                }
            }
            Value::Sequence(items) if items.first().is_some_and(Value::is_sequence) => {
                let rows = items.len();
                let mut cols = 0;
                let mut data = Vec::new();
                for row in items {
                    let row = row.as_sequence().ok_or_else(|| FieldError::WrongType {
                        key: key.to_string(),
                        expected: "matrix rows",
                    })?;
                    cols = row.len();
                    for item in row {
                        data.push(Self::number(key, item)?);
                    }
                }
                MatrixField { rows, cols, data }
            }
            Value::Sequence(items) => {
                let data = items
                    .iter()
                    .map(|item| Self::number(key, item))
                    .collect::<Result<Vec<_>, _>>()?;
                MatrixField {
                    rows: data.len(),
                    cols: 1,
                    data,
                }
            }
            _ => {
                return Err(FieldError::WrongType {
                    key: key.to_string(),
                    expected: "matrix",
                })
            }
        };

        if field.rows * field.cols != field.data.len() {
            return Err(FieldError::BadShape {
                key: key.to_string(),
                rows: field.rows,
                cols: field.cols,
                expected: "rows * cols data entries",
            });
        }
        Ok(field)
    }

    fn number(key: &str, value: &Value) -> Result<f64, FieldError> {
        value.as_f64().ok_or_else(|| FieldError::WrongType {
            key: key.to_string(),
            expected: "numeric matrix entry",
        })
    }
}

impl MatrixField {
    /// Value at `(row, col)`, row-major.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }
}
