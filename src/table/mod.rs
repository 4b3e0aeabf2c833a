//! # Event Table Module
//!
//! In-memory columnar storage for flow-cytometry events.
//!
//! An [`EventTable`] holds one [`Column`] per measured parameter. All columns
//! share the table's event count and value precision, so a whole-parameter
//! scan is a single contiguous slice walk.
//!
//! ## Example
//!
//! ```rust
//! use flowgate_events::table::{EventTable, ValueType};
//!
//! let mut table = EventTable::new(&["FSC-A", "SSC-A"], 3, ValueType::Float)?;
//! table.floats_mut(0)?.copy_from_slice(&[1.0, 2.0, 3.0]);
//! table.floats_mut(1)?.copy_from_slice(&[4.0, 5.0, 6.0]);
//!
//! let fitc = table.append_parameter("FITC-A")?;
//! assert_eq!(table.index_of("FITC-A")?, fitc);
//!
//! table.compensate(&["FSC-A", "SSC-A"], &[1.0, 0.0, 0.0, 1.0])?;
//! assert_eq!(table.floats(0)?, &[1.0, 2.0, 3.0]);
//! # Ok::<(), flowgate_events::table::TableError>(())
//! ```
//!
//! Tables are not internally synchronised. Every mutating call takes
//! `&mut self`; when a table is shared through an `Arc`, use
//! [`std::sync::Arc::make_mut`] to obtain a private copy before mutating.

mod column;
mod error;
mod values;


pub use column::Column;
pub use error::TableError;
pub use values::{ColumnValues, Sample, ValueType};

use std::collections::HashMap;

use rayon::prelude::*;

/// Whether parameter names must be unique within a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// Names are unique; lookups go through a name→index map
    #[default]
    Unique,
    /// Repeated names are allowed; lookups return the first match
    AllowDuplicates,
}

/// Ordered collection of same-length, same-type event columns
#[derive(Debug, Clone, PartialEq)]
pub struct EventTable {
    columns: Vec<Column>,
    number_of_events: usize,
    number_of_original_events: usize,
    value_type: ValueType,
    /// Present only under [`NamePolicy::Unique`]
    name_index: Option<HashMap<String, usize>>,
}

impl EventTable {
    /// Create a table with unique parameter names, every column zero-filled
    /// to `number_of_events`.
    pub fn new<S: AsRef<str>>(
        names: &[S],
        number_of_events: usize,
        value_type: ValueType,
    ) -> Result<Self, TableError> {
        Self::with_policy(names, number_of_events, value_type, NamePolicy::Unique)
    }

    /// Create a table with an explicit naming policy
    pub fn with_policy<S: AsRef<str>>(
        names: &[S],
        number_of_events: usize,
        value_type: ValueType,
        policy: NamePolicy,
    ) -> Result<Self, TableError> {
        let mut table = Self {
            columns: Vec::with_capacity(names.len()),
            number_of_events,
            number_of_original_events: number_of_events,
            value_type,
            name_index: match policy {
                NamePolicy::Unique => Some(HashMap::with_capacity(names.len())),
                NamePolicy::AllowDuplicates => None,
            },
        };
        for name in names {
            table.append_parameter(name.as_ref())?;
        }
        Ok(table)
    }

    // ------------------------------------------------------------------
    // Shape
    // ------------------------------------------------------------------

    /// Number of parameters (columns)
    pub fn number_of_parameters(&self) -> usize {
        self.columns.len()
    }

    /// Number of events (rows) held in memory
    pub fn number_of_events(&self) -> usize {
        self.number_of_events
    }

    /// Number of events in the source this table was read from.
    ///
    /// Larger than [`number_of_events`](Self::number_of_events) when only a
    /// prefix of the source was materialised.
    pub fn number_of_original_events(&self) -> usize {
        self.number_of_original_events
    }

    /// Record the source event count; never lower than the in-memory count
    pub fn set_number_of_original_events(&mut self, count: usize) {
        self.number_of_original_events = count.max(self.number_of_events);
    }

    /// Storage precision shared by every column
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Returns true if values are stored as 32-bit floats
    pub fn is_float(&self) -> bool {
        self.value_type.is_float()
    }

    /// Naming policy fixed at construction
    pub fn name_policy(&self) -> NamePolicy {
        if self.name_index.is_some() {
            NamePolicy::Unique
        } else {
            NamePolicy::AllowDuplicates
        }
    }

    /// Switch the table-wide precision.
    ///
    /// Columns whose type changes are cleared (values zeroed, ranges reset).
    pub fn set_value_type(&mut self, value_type: ValueType) {
        if self.value_type == value_type {
            return;
        }
        for column in &mut self.columns {
            column.set_value_type(value_type);
        }
        self.value_type = value_type;
    }

    /// Resize every column, zero-padding on growth and truncating on shrink
    pub fn resize(&mut self, number_of_events: usize) {
        if number_of_events == self.number_of_events {
            return;
        }
        for column in &mut self.columns {
            column.resize(number_of_events);
        }
        self.number_of_events = number_of_events;
        self.number_of_original_events = self.number_of_original_events.max(number_of_events);
    }

    /// Zero every value and every range
    pub fn clear(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// Add a zero-filled parameter and return its index
    pub fn append_parameter(&mut self, name: &str) -> Result<usize, TableError> {
        self.check_new_name(name, None)?;
        let index = self.columns.len();
        self.columns
            .push(Column::new(name, self.value_type, self.number_of_events));
        if let Some(map) = self.name_index.as_mut() {
            map.insert(name.to_string(), index);
        }
        Ok(index)
    }

    /// Remove the parameter at `index`.
    ///
    /// Every parameter after it moves down by one index.
    pub fn remove_parameter(&mut self, index: usize) -> Result<Column, TableError> {
        if self.columns.is_empty() {
            return Err(TableError::InvalidArgument(
                "cannot remove a parameter from an empty table".to_string(),
            ));
        }
        self.check_parameter(index)?;
        let removed = self.columns.remove(index);
        if let Some(map) = self.name_index.as_mut() {
            map.remove(removed.name());
            for slot in map.values_mut() {
                if *slot > index {
                    *slot -= 1;
                }
            }
        }
        Ok(removed)
    }

    /// Remove the parameter called `name`
    pub fn remove_parameter_by_name(&mut self, name: &str) -> Result<Column, TableError> {
        if self.columns.is_empty() {
            return Err(TableError::InvalidArgument(
                "cannot remove a parameter from an empty table".to_string(),
            ));
        }
        let index = self.index_of(name)?;
        self.remove_parameter(index)
    }

    /// Rename the parameter at `index`
    pub fn rename_parameter(&mut self, index: usize, name: &str) -> Result<(), TableError> {
        self.check_parameter(index)?;
        if self.columns[index].name() == name {
            return Ok(());
        }
        self.check_new_name(name, Some(index))?;
        if let Some(map) = self.name_index.as_mut() {
            map.remove(self.columns[index].name());
            map.insert(name.to_string(), index);
        }
        self.columns[index].set_name(name.to_string());
        Ok(())
    }

    /// Index of the parameter called `name`.
    ///
    /// Without unique names this is the first match in column order.
    pub fn index_of(&self, name: &str) -> Result<usize, TableError> {
        let found = match &self.name_index {
            Some(map) => map.get(name).copied(),
            None => self.columns.iter().position(|c| c.name() == name),
        };
        found.ok_or_else(|| TableError::InvalidArgument(format!("unknown parameter '{}'", name)))
    }

    /// Returns true if some parameter is called `name`
    pub fn contains_parameter(&self, name: &str) -> bool {
        self.index_of(name).is_ok()
    }

    /// Name of the parameter at `index`
    pub fn name(&self, index: usize) -> Result<&str, TableError> {
        Ok(self.column(index)?.name())
    }

    /// All parameter names in column order
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Long name of the parameter at `index`, if any
    pub fn long_name(&self, index: usize) -> Result<Option<&str>, TableError> {
        Ok(self.column(index)?.long_name())
    }

    /// Set or clear (empty string or `None`) the long name at `index`
    pub fn set_long_name(&mut self, index: usize, long_name: Option<&str>) -> Result<(), TableError> {
        self.column_mut(index)?
            .set_long_name(long_name.map(str::to_string));
        Ok(())
    }

    /// Borrow the column at `index`
    pub fn column(&self, index: usize) -> Result<&Column, TableError> {
        self.check_parameter(index)?;
        Ok(&self.columns[index])
    }

    /// Iterate over the columns in order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// 32-bit values of the parameter at `index`
    pub fn floats(&self, index: usize) -> Result<&[f32], TableError> {
        match self.column(index)?.values() {
            ColumnValues::Float(v) => Ok(v.as_slice()),
            ColumnValues::Double(_) => Err(self.mismatch(index, ValueType::Float)),
        }
    }

    /// Mutable 32-bit values of the parameter at `index`
    pub fn floats_mut(&mut self, index: usize) -> Result<&mut [f32], TableError> {
        let mismatch = self.mismatch(index, ValueType::Float);
        match self.column_mut(index)?.values_mut() {
            ColumnValues::Float(v) => Ok(v.as_mut_slice()),
            ColumnValues::Double(_) => Err(mismatch),
        }
    }

    /// 64-bit values of the parameter at `index`
    pub fn doubles(&self, index: usize) -> Result<&[f64], TableError> {
        match self.column(index)?.values() {
            ColumnValues::Double(v) => Ok(v.as_slice()),
            ColumnValues::Float(_) => Err(self.mismatch(index, ValueType::Double)),
        }
    }

    /// Mutable 64-bit values of the parameter at `index`
    pub fn doubles_mut(&mut self, index: usize) -> Result<&mut [f64], TableError> {
        let mismatch = self.mismatch(index, ValueType::Double);
        match self.column_mut(index)?.values_mut() {
            ColumnValues::Double(v) => Ok(v.as_mut_slice()),
            ColumnValues::Float(_) => Err(mismatch),
        }
    }

    /// Value of one event, widened to f64
    pub fn value(&self, parameter: usize, event: usize) -> Result<f64, TableError> {
        let column = self.column(parameter)?;
        self.check_event(event)?;
        Ok(column.get(event))
    }

    /// Store one event value, narrowed to the table precision
    pub fn set_value(&mut self, parameter: usize, event: usize, value: f64) -> Result<(), TableError> {
        self.check_event(event)?;
        self.column_mut(parameter)?.set(event, value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Ranges
    // ------------------------------------------------------------------

    /// Instrument-reported minimum of the parameter at `index`
    pub fn specified_min(&self, index: usize) -> Result<f64, TableError> {
        Ok(self.column(index)?.specified_min())
    }

    /// Instrument-reported maximum of the parameter at `index`
    pub fn specified_max(&self, index: usize) -> Result<f64, TableError> {
        Ok(self.column(index)?.specified_max())
    }

    /// Set the instrument-reported minimum
    pub fn set_specified_min(&mut self, index: usize, value: f64) -> Result<(), TableError> {
        self.column_mut(index)?.set_specified_min(value);
        Ok(())
    }

    /// Set the instrument-reported maximum
    pub fn set_specified_max(&mut self, index: usize, value: f64) -> Result<(), TableError> {
        self.column_mut(index)?.set_specified_max(value);
        Ok(())
    }

    /// Observed minimum from the last scan
    pub fn data_min(&self, index: usize) -> Result<f64, TableError> {
        Ok(self.column(index)?.data_min())
    }

    /// Observed maximum from the last scan
    pub fn data_max(&self, index: usize) -> Result<f64, TableError> {
        Ok(self.column(index)?.data_max())
    }

    /// Override the cached observed minimum
    pub fn set_data_min(&mut self, index: usize, value: f64) -> Result<(), TableError> {
        self.column_mut(index)?.set_data_min(value);
        Ok(())
    }

    /// Override the cached observed maximum
    pub fn set_data_max(&mut self, index: usize, value: f64) -> Result<(), TableError> {
        self.column_mut(index)?.set_data_max(value);
        Ok(())
    }

    /// See [`Column::best_min`]
    pub fn best_min(&self, index: usize) -> Result<f64, TableError> {
        Ok(self.column(index)?.best_min())
    }

    /// See [`Column::best_max`]
    pub fn best_max(&self, index: usize) -> Result<f64, TableError> {
        Ok(self.column(index)?.best_max())
    }

    /// Rescan every column's observed range, one column per worker
    pub fn compute_data_min_max(&mut self) {
        self.columns
            .par_iter_mut()
            .for_each(Column::compute_data_min_max);
    }

    /// Rescan the observed range of a single column
    pub fn compute_data_min_max_at(&mut self, index: usize) -> Result<(), TableError> {
        self.column_mut(index)?.compute_data_min_max();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Copying
    // ------------------------------------------------------------------

    /// Replace this table with a deep copy of `other`
    pub fn copy_from(&mut self, other: &EventTable) {
        self.clone_from(other);
    }

    /// Replace the values and ranges of parameter `index` with a copy of
    /// parameter `source_index` of `source`.
    ///
    /// The source column is converted to this table's precision. Both tables
    /// must hold the same number of events.
    pub fn copy_values(
        &mut self,
        source: &EventTable,
        source_index: usize,
        index: usize,
    ) -> Result<(), TableError> {
        let source_column = source.column(source_index)?;
        self.check_parameter(index)?;
        if source_column.len() != self.number_of_events {
            return Err(TableError::InvalidArgument(format!(
                "source parameter '{}' has {} events, table has {}",
                source_column.name(),
                source_column.len(),
                self.number_of_events
            )));
        }
        let value_type = self.value_type;
        self.columns[index].copy_values_from(source_column, value_type);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Compensation
    // ------------------------------------------------------------------

    /// Remove fluorescence spillover from the named parameters.
    ///
    /// `matrix` is the row-major `n × n` spillover matrix whose rows and
    /// columns correspond to `parameter_names`. Each event's values for those
    /// parameters are multiplied by the inverse matrix in place; all other
    /// parameters are untouched. Nothing is modified when validation fails.
    pub fn compensate<S: AsRef<str>>(
        &mut self,
        parameter_names: &[S],
        matrix: &[f64],
    ) -> Result<(), TableError> {
        crate::compensation::compensate(self, parameter_names, matrix)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    fn column_mut(&mut self, index: usize) -> Result<&mut Column, TableError> {
        self.check_parameter(index)?;
        Ok(&mut self.columns[index])
    }

    fn check_parameter(&self, index: usize) -> Result<(), TableError> {
        if index < self.columns.len() {
            Ok(())
        } else {
            Err(TableError::OutOfRange {
                what: "parameter",
                index,
                len: self.columns.len(),
            })
        }
    }

    fn check_event(&self, index: usize) -> Result<(), TableError> {
        if index < self.number_of_events {
            Ok(())
        } else {
            Err(TableError::OutOfRange {
                what: "event",
                index,
                len: self.number_of_events,
            })
        }
    }

    /// Reject an empty name, or one already used by a column other than `except`
    fn check_new_name(&self, name: &str, except: Option<usize>) -> Result<(), TableError> {
        if name.is_empty() {
            return Err(TableError::InvalidArgument(
                "parameter name must not be empty".to_string(),
            ));
        }
        if let Some(map) = &self.name_index {
            if let Some(&existing) = map.get(name) {
                if Some(existing) != except {
                    return Err(TableError::InvalidArgument(format!(
                        "duplicate parameter name '{}'",
                        name
                    )));
                }
            }
        }
        Ok(())
    }

    fn mismatch(&self, index: usize, requested: ValueType) -> TableError {
        TableError::TypeMismatch {
            index,
            requested,
            actual: self.value_type,
        }
    }
}
