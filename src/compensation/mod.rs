//! # Spillover Compensation
//!
//! Fluorescent dyes leak signal into neighbouring detectors. Given the
//! spillover matrix `S` (row `i` holds how much of dye `i` is seen in each
//! detector), an event's observed row vector is `true · S`, so the true
//! signal is recovered as `observed · S⁻¹`.
//!
//! Compensation runs in two phases:
//!
//! 1. **Validation and inversion** (sequential): the matrix shape, its
//!    diagonal and the parameter names are checked, then `S⁻¹` is computed by
//!    Gauss-Jordan elimination. No column is touched until this succeeds.
//! 2. **Application** (parallel): events are split into fixed-size blocks and
//!    distributed over the Rayon pool. Each worker keeps one scratch row of
//!    length `n`; the full output row is computed before any value of that
//!    event is written back.

mod matrix;

#[cfg(test)]
mod tests;

pub use matrix::{invert_matrix, is_identity};

use log::debug;
use rayon::prelude::*;

use crate::table::{Column, ColumnValues, EventTable, Sample, TableError};

/// Events handed to one worker at a time
const EVENTS_PER_BLOCK: usize = 16 * 1024;

/// Validate and apply a spillover matrix to `table` in place
pub(crate) fn compensate<S: AsRef<str>>(
    table: &mut EventTable,
    parameter_names: &[S],
    matrix: &[f64],
) -> Result<(), TableError> {
    let n = parameter_names.len();
    if n < 2 {
        return Err(TableError::InvalidMatrix(format!(
            "compensation needs at least 2 parameters, got {}",
            n
        )));
    }
    if matrix.len() != n * n {
        return Err(TableError::InvalidMatrix(format!(
            "{} parameters require {} matrix entries, got {}",
            n,
            n * n,
            matrix.len()
        )));
    }
    if let Some(i) = (0..n).find(|&i| matrix[i * n + i] == 0.0) {
        return Err(TableError::InvalidMatrix(format!(
            "diagonal entry for '{}' is zero",
            parameter_names[i].as_ref()
        )));
    }

    let mut indices = Vec::with_capacity(n);
    for name in parameter_names {
        let name = name.as_ref();
        let index = table.index_of(name)?;
        if indices.contains(&index) {
            return Err(TableError::InvalidArgument(format!(
                "parameter '{}' listed more than once",
                name
            )));
        }
        indices.push(index);
    }

    if is_identity(matrix, n) {
        debug!("Spillover matrix is the identity; nothing to compensate");
        return Ok(());
    }

    let inverse = invert_matrix(matrix, n)?;
    let events = table.number_of_events();
    debug!(
        "Compensating {} parameters over {} events",
        n, events
    );

    let columns = select_columns(table.columns_mut(), &indices);
    let mut floats = Vec::with_capacity(n);
    let mut doubles = Vec::with_capacity(n);
    for column in columns {
        match column.values_mut() {
            ColumnValues::Float(v) => floats.push(v.as_mut_slice()),
            ColumnValues::Double(v) => doubles.push(v.as_mut_slice()),
        }
    }
    if !floats.is_empty() {
        unmix(floats, &inverse);
    }
    if !doubles.is_empty() {
        unmix(doubles, &inverse);
    }
    Ok(())
}

/// Disjoint mutable borrows of the columns at `indices`, in that order.
/// `indices` must be distinct and in range.
fn select_columns<'a>(columns: &'a mut [Column], indices: &[usize]) -> Vec<&'a mut Column> {
    let mut slots: Vec<Option<&'a mut Column>> = columns.iter_mut().map(Some).collect();
    indices
        .iter()
        .filter_map(|&index| slots.get_mut(index).and_then(Option::take))
        .collect()
}

/// Multiply every event row (one value from each of `columns`) by `inverse`.
fn unmix<T: Sample>(columns: Vec<&mut [T]>, inverse: &[f64]) {
    let n = columns.len();
    let events = columns.first().map_or(0, |c| c.len());
    let block_count = events.div_ceil(EVENTS_PER_BLOCK);

    // Transpose column-major slices into per-block groups of n sub-slices
    let mut blocks: Vec<Vec<&mut [T]>> = (0..block_count).map(|_| Vec::with_capacity(n)).collect();
    for column in columns {
        for (block, chunk) in blocks.iter_mut().zip(column.chunks_mut(EVENTS_PER_BLOCK)) {
            block.push(chunk);
        }
    }

    blocks.into_par_iter().for_each_init(
        || vec![0.0f64; n],
        |scratch, mut block| {
            let rows = block.first().map_or(0, |c| c.len());
            for row in 0..rows {
                for (j, out) in scratch.iter_mut().enumerate() {
                    *out = block
                        .iter()
                        .enumerate()
                        .map(|(k, values)| values[row].to_f64() * inverse[k * n + j])
                        .sum();
                }
                for (values, &out) in block.iter_mut().zip(scratch.iter()) {
                    values[row] = T::from_f64(out);
                }
            }
        },
    );
}
