use super::values::{ColumnValues, ValueType};

/// One measured parameter: a named value buffer plus its range metadata.
///
/// The specified range is what the instrument reported; the data range is
/// whatever [`Column::compute_data_min_max`] last observed. Element access here
/// is unchecked by contract (it panics like slice indexing); the owning
/// [`EventTable`](super::EventTable) performs the checked access.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    long_name: Option<String>,
    values: ColumnValues,
    specified_min: f64,
    specified_max: f64,
    data_min: f64,
    data_max: f64,
}

impl Column {
    pub(crate) fn new(name: impl Into<String>, value_type: ValueType, len: usize) -> Self {
        Self {
            name: name.into(),
            long_name: None,
            values: ColumnValues::zeroed(value_type, len),
            specified_min: 0.0,
            specified_max: 0.0,
            data_min: 0.0,
            data_max: 0.0,
        }
    }

    /// Short parameter name (e.g. `FSC-A`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Optional descriptive name (e.g. the stain or marker)
    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    /// Storage precision of this column
    pub fn value_type(&self) -> ValueType {
        self.values.value_type()
    }

    /// Number of events held
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the column holds no events
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the raw value buffer
    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    /// Value of event `index` widened to f64
    pub fn get(&self, index: usize) -> f64 {
        self.values.get(index)
    }

    /// Instrument-reported minimum
    pub fn specified_min(&self) -> f64 {
        self.specified_min
    }

    /// Instrument-reported maximum
    pub fn specified_max(&self) -> f64 {
        self.specified_max
    }

    /// Minimum observed by the last data scan
    pub fn data_min(&self) -> f64 {
        self.data_min
    }

    /// Maximum observed by the last data scan
    pub fn data_max(&self) -> f64 {
        self.data_max
    }

    /// Lower bound to use for display and binning.
    ///
    /// Falls back to the observed minimum when the specified range is degenerate
    /// or the data lies below it.
    pub fn best_min(&self) -> f64 {
        if self.specified_min == self.specified_max || self.data_min < self.specified_min {
            self.data_min
        } else {
            self.specified_min
        }
    }

    /// Upper bound to use for display and binning.
    ///
    /// Falls back to the observed maximum when the specified range is degenerate
    /// or the data lies above it.
    pub fn best_max(&self) -> f64 {
        if self.specified_min == self.specified_max || self.data_max > self.specified_max {
            self.data_max
        } else {
            self.specified_max
        }
    }

    /// Scan the values once and cache the observed range
    pub fn compute_data_min_max(&mut self) {
        let (min, max) = self.values.min_max();
        self.data_min = min;
        self.data_max = max;
    }

    pub(crate) fn set(&mut self, index: usize, value: f64) {
        self.values.set(index, value);
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_long_name(&mut self, long_name: Option<String>) {
        self.long_name = long_name.filter(|s| !s.is_empty());
    }

    pub(crate) fn set_specified_min(&mut self, value: f64) {
        self.specified_min = value;
    }

    pub(crate) fn set_specified_max(&mut self, value: f64) {
        self.specified_max = value;
    }

    pub(crate) fn set_data_min(&mut self, value: f64) {
        self.data_min = value;
    }

    pub(crate) fn set_data_max(&mut self, value: f64) {
        self.data_max = value;
    }

    pub(crate) fn values_mut(&mut self) -> &mut ColumnValues {
        &mut self.values
    }

    pub(crate) fn resize(&mut self, len: usize) {
        self.values.resize(len);
    }

    /// Zero the values and both ranges
    pub(crate) fn clear(&mut self) {
        self.values.fill_zero();
        self.specified_min = 0.0;
        self.specified_max = 0.0;
        self.data_min = 0.0;
        self.data_max = 0.0;
    }

    /// Switch storage precision. Values are discarded (zero-filled at the same
    /// length) when the type actually changes.
    pub(crate) fn set_value_type(&mut self, value_type: ValueType) {
        if self.values.value_type() != value_type {
            let len = self.values.len();
            self.values = ColumnValues::zeroed(value_type, len);
            self.clear();
        }
    }

    /// Take values and ranges from `other`, converting to `value_type`.
    /// Name and long name are kept.
    pub(crate) fn copy_values_from(&mut self, other: &Column, value_type: ValueType) {
        self.values = other.values.converted(value_type);
        self.specified_min = other.specified_min;
        self.specified_max = other.specified_max;
        self.data_min = other.data_min;
        self.data_max = other.data_max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_with(values: &[f64]) -> Column {
        let mut column = Column::new("FSC-A", ValueType::Double, values.len());
        for (i, &v) in values.iter().enumerate() {
            column.set(i, v);
        }
        column
    }

    #[test]
    fn test_data_min_max_scan() {
        let mut column = column_with(&[3.0, -1.5, 7.25, 0.0]);
        column.compute_data_min_max();
        assert_eq!(column.data_min(), -1.5);
        assert_eq!(column.data_max(), 7.25);
    }

    #[test]
    fn test_empty_column_range_is_zero() {
        let mut column = Column::new("SSC-A", ValueType::Float, 0);
        column.set_data_min(4.0);
        column.compute_data_min_max();
        assert_eq!((column.data_min(), column.data_max()), (0.0, 0.0));
    }

    #[test]
    fn test_best_range_prefers_specified() {
        let mut column = column_with(&[10.0, 20.0]);
        column.set_specified_min(0.0);
        column.set_specified_max(1024.0);
        column.compute_data_min_max();
        assert_eq!(column.best_min(), 0.0);
        assert_eq!(column.best_max(), 1024.0);
    }

    #[test]
    fn test_best_range_heals_bad_metadata() {
        let mut column = column_with(&[-5.0, 2000.0]);
        column.compute_data_min_max();

        // Degenerate specified range
        assert_eq!(column.best_min(), -5.0);
        assert_eq!(column.best_max(), 2000.0);

        // Data exceeds both specified bounds
        column.set_specified_min(0.0);
        column.set_specified_max(1024.0);
        assert_eq!(column.best_min(), -5.0);
        assert_eq!(column.best_max(), 2000.0);
    }

    #[test]
    fn test_clear_resets_values_and_ranges() {
        let mut column = column_with(&[1.0, 2.0]);
        column.set_specified_max(10.0);
        column.compute_data_min_max();
        column.clear();
        assert_eq!(column.len(), 2);
        assert_eq!(column.get(1), 0.0);
        assert_eq!(column.specified_max(), 0.0);
        assert_eq!(column.data_max(), 0.0);
    }

    #[test]
    fn test_type_switch_clears_values() {
        let mut column = column_with(&[1.0, 2.0, 3.0]);
        column.set_value_type(ValueType::Double);
        assert_eq!(column.get(2), 3.0);

        column.set_value_type(ValueType::Float);
        assert_eq!(column.value_type(), ValueType::Float);
        assert_eq!(column.len(), 3);
        assert_eq!(column.get(2), 0.0);
    }
}
