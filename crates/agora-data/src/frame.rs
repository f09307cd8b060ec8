//! Conversions between polars frames and ndarray columns.

use crate::error::{DataError, Result};
use crate::formula::{FormulaError, VariableSource};
use crate::label::Label;
use ndarray::{Array1, Array2};
use polars::prelude::*;

impl VariableSource for DataFrame {
    fn rows(&self) -> usize {
        self.height()
    }

    fn variable(&self, name: &str) -> std::result::Result<Array1<f64>, FormulaError> {
        let column = self
            .column(name)
            .map_err(|_| FormulaError::UnknownVariable(name.to_string()))?;
        let not_numeric = |e: PolarsError| FormulaError::NotNumeric {
            name: name.to_string(),
            reason: e.to_string(),
        };

        let series = column
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(not_numeric)?;
        let values = series.f64().map_err(not_numeric)?;

        // Nulls become NaN, matching how missing numeric data is carried downstream
        Ok(values
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }
}

/// Read an identifier column as labels.
///
/// String columns become [`Label::Str`], integer columns become [`Label::Int`].
/// Any other type, or a null anywhere in the column, is rejected.
pub fn label_column(frame: &DataFrame, name: &str) -> Result<Array1<Label>> {
    let column = frame
        .column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?;
    let series = column.as_materialized_series();
    let null_at = |row: usize| DataError::NullIdentifier {
        column: name.to_string(),
        row,
    };

    let labels = match series.dtype() {
        DataType::String => series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| v.map(Label::from).ok_or_else(|| null_at(row)))
            .collect::<Result<Vec<_>>>()?,
        dtype if dtype.is_integer() => series
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| v.map(Label::Int).ok_or_else(|| null_at(row)))
            .collect::<Result<Vec<_>>>()?,
        other => {
            return Err(DataError::UnsupportedIdentifier {
                column: name.to_string(),
                dtype: other.to_string(),
            });
        }
    };

    Ok(Array1::from_vec(labels))
}

/// Read several identifier columns into an `rows x names.len()` label matrix.
pub fn label_columns<S: AsRef<str>>(frame: &DataFrame, names: &[S]) -> Result<Array2<Label>> {
    let columns = names
        .iter()
        .map(|name| label_column(frame, name.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    Ok(Array2::from_shape_fn(
        (frame.height(), columns.len()),
        |(i, j)| columns[j][i].clone(),
    ))
}
