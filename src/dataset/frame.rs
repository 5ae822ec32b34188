//! Named-column feature tables.
//!
//! A [`FeatureFrame`] is the tabular input accepted by the model layer: a dense
//! `f64` grid with one name per column and one identifier per row. Models align
//! a frame to the columns they were trained on with [`FeatureFrame::select`],
//! which is where a missing column surfaces as a feature mismatch.

use crate::core::error::{BoostError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::collections::{HashMap, HashSet};

/// Dense feature table with column names and row identifiers.
///
/// Missing values are represented as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<String>,
    index: Vec<String>,
    values: Array2<f64>,
}

impl FeatureFrame {
    /// Create a frame whose rows are identified by their position.
    pub fn new<S: Into<String>>(columns: Vec<S>, values: Array2<f64>) -> Result<Self> {
        let index = (0..values.nrows()).map(|i| i.to_string()).collect();
        Self::with_index(columns, index, values)
    }

    /// Create a frame with explicit row identifiers.
    pub fn with_index<S: Into<String>>(
        columns: Vec<S>,
        index: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();

        if columns.len() != values.ncols() {
            return Err(BoostError::dimension_mismatch(
                format!("{} columns", values.ncols()),
                format!("{} column names", columns.len()),
            ));
        }

        if index.len() != values.nrows() {
            return Err(BoostError::dimension_mismatch(
                format!("{} rows", values.nrows()),
                format!("{} row identifiers", index.len()),
            ));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(duplicate) = columns.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(BoostError::dataset(format!(
                "Duplicate column name '{}'",
                duplicate
            )));
        }

        Ok(FeatureFrame {
            columns,
            index,
            values,
        })
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row identifiers in order.
    pub fn index(&self) -> &[String] {
        &self.index
    }

    /// The value grid.
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Position of the named column.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// View of the named column.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_position(name)
            .map(|position| self.values.column(position))
    }

    /// Re-select columns by name, in the order given.
    ///
    /// Fails with [`BoostError::FeatureMismatch`] listing every requested
    /// column that the frame does not have. Row identifiers are preserved.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<FeatureFrame> {
        let positions: HashMap<&str, usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut selected = Vec::with_capacity(columns.len());
        let mut missing = Vec::new();
        for column in columns {
            match positions.get(column.as_ref()) {
                Some(&position) => selected.push(position),
                None => missing.push(column.as_ref().to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(BoostError::feature_mismatch(missing));
        }

        let values = self.values.select(Axis(1), &selected);
        FeatureFrame::with_index(
            columns.iter().map(|c| c.as_ref().to_string()).collect(),
            self.index.clone(),
            values,
        )
    }

    /// Take the rows at the given positions.
    pub fn take_rows(&self, rows: &[usize]) -> Result<FeatureFrame> {
        if let Some(&row) = rows.iter().find(|&&row| row >= self.nrows()) {
            return Err(BoostError::dataset(format!(
                "Row {} out of bounds for frame with {} rows",
                row,
                self.nrows()
            )));
        }

        let values = self.values.select(Axis(0), rows);
        let index = rows.iter().map(|&row| self.index[row].clone()).collect();
        FeatureFrame::with_index(self.columns.clone(), index, values)
    }

    /// Extract and remove the named column, returning it with the remaining frame.
    ///
    /// Convenient for splitting a target column off a table that holds both.
    pub fn split_off_column(&self, name: &str) -> Result<(Array1<f64>, FeatureFrame)> {
        let position = self
            .column_position(name)
            .ok_or_else(|| BoostError::feature_mismatch(vec![name.to_string()]))?;

        let target = self.values.column(position).to_owned();
        let remaining: Vec<&String> = self
            .columns
            .iter()
            .filter(|column| column.as_str() != name)
            .collect();
        let frame = self.select(&remaining)?;
        Ok((target, frame))
    }

    /// Consume the frame, returning its parts.
    pub fn into_parts(self) -> (Vec<String>, Vec<String>, Array2<f64>) {
        (self.columns, self.index, self.values)
    }
}

#[cfg(feature = "polars")]
mod polars_conversion {
    use super::*;
    use polars::prelude::*;

    impl FeatureFrame {
        /// Build a frame from a Polars DataFrame.
        ///
        /// Every column other than `index_column` is cast to `Float64`; nulls
        /// become `NaN`. When `index_column` is given its values (cast to
        /// strings) become the row identifiers.
        pub fn from_polars(df: &DataFrame, index_column: Option<&str>) -> Result<Self> {
            let feature_columns: Vec<String> = df
                .get_column_names()
                .into_iter()
                .map(|name| name.to_string())
                .filter(|name| Some(name.as_str()) != index_column)
                .collect();

            let mut values = Array2::<f64>::zeros((df.height(), feature_columns.len()));
            for (col_idx, name) in feature_columns.iter().enumerate() {
                let column = df.column(name)?.cast(&DataType::Float64)?;
                let chunked = column.f64()?;
                for (row_idx, value) in chunked.into_iter().enumerate() {
                    values[[row_idx, col_idx]] = value.unwrap_or(f64::NAN);
                }
            }

            let index = match index_column {
                Some(name) => {
                    let column = df.column(name)?.cast(&DataType::String)?;
                    let strings = column.str()?;
                    strings
                        .into_iter()
                        .enumerate()
                        .map(|(row, value)| value.map(str::to_string).unwrap_or_else(|| row.to_string()))
                        .collect()
                }
                None => (0..df.height()).map(|i| i.to_string()).collect(),
            };

            log::debug!(
                "Converted Polars DataFrame with shape {:?} into feature frame",
                df.shape()
            );
            FeatureFrame::with_index(feature_columns, index, values)
        }
    }
}
