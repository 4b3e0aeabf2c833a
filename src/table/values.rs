use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage precision shared by every column of an event table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// 32-bit IEEE floats
    #[default]
    Float,
    /// 64-bit IEEE floats
    Double,
}

impl ValueType {
    /// Name used in the binary event header (`"float"` or `"double"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Float => "float",
            ValueType::Double => "double",
        }
    }

    /// Get the byte size per value
    pub fn byte_size(&self) -> usize {
        match self {
            ValueType::Float => 4,
            ValueType::Double => 8,
        }
    }

    /// Whether values are stored as 32-bit floats
    pub fn is_float(&self) -> bool {
        matches!(self, ValueType::Float)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float" => Ok(ValueType::Float),
            "double" => Ok(ValueType::Double),
            other => Err(format!("unknown value type '{}'", other)),
        }
    }
}

/// Numeric element type a column buffer can hold.
///
/// Implemented for `f32` and `f64` so bulk kernels (compensation, range scans)
/// can be written once and monomorphised per storage type.
pub trait Sample: Copy + Send + Sync + PartialOrd + 'static {
    /// Storage type tag for this element type
    const VALUE_TYPE: ValueType;

    /// Widen to f64
    fn to_f64(self) -> f64;

    /// Narrow from f64 (rounds to nearest for `f32`)
    fn from_f64(value: f64) -> Self;
}

impl Sample for f32 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Sample for f64 {
    const VALUE_TYPE: ValueType = ValueType::Double;

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

/// Owned value buffer of a column. Exactly one precision is populated.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// 32-bit storage
    Float(Vec<f32>),
    /// 64-bit storage
    Double(Vec<f64>),
}

impl ColumnValues {
    /// Zero-filled buffer of `len` values
    pub fn zeroed(value_type: ValueType, len: usize) -> Self {
        match value_type {
            ValueType::Float => ColumnValues::Float(vec![0.0; len]),
            ValueType::Double => ColumnValues::Double(vec![0.0; len]),
        }
    }

    /// Storage type of this buffer
    pub fn value_type(&self) -> ValueType {
        match self {
            ColumnValues::Float(_) => ValueType::Float,
            ColumnValues::Double(_) => ValueType::Double,
        }
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Double(v) => v.len(),
        }
    }

    /// Returns true if the buffer holds no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-pad on growth, truncate on shrink
    pub fn resize(&mut self, len: usize) {
        match self {
            ColumnValues::Float(v) => v.resize(len, 0.0),
            ColumnValues::Double(v) => v.resize(len, 0.0),
        }
    }

    /// Set every value to zero without changing the length
    pub fn fill_zero(&mut self) {
        match self {
            ColumnValues::Float(v) => v.fill(0.0),
            ColumnValues::Double(v) => v.fill(0.0),
        }
    }

    /// Value at `index` widened to f64. Panics when out of bounds.
    pub fn get(&self, index: usize) -> f64 {
        match self {
            ColumnValues::Float(v) => v[index] as f64,
            ColumnValues::Double(v) => v[index],
        }
    }

    /// Store `value` at `index`, narrowing for 32-bit storage. Panics when out of bounds.
    pub fn set(&mut self, index: usize, value: f64) {
        match self {
            ColumnValues::Float(v) => v[index] = value as f32,
            ColumnValues::Double(v) => v[index] = value,
        }
    }

    /// Copy of this buffer converted to `value_type`
    pub fn converted(&self, value_type: ValueType) -> Self {
        match (self, value_type) {
            (ColumnValues::Float(v), ValueType::Float) => ColumnValues::Float(v.clone()),
            (ColumnValues::Double(v), ValueType::Double) => ColumnValues::Double(v.clone()),
            (ColumnValues::Float(v), ValueType::Double) => {
                ColumnValues::Double(v.iter().map(|&x| x as f64).collect())
            }
            (ColumnValues::Double(v), ValueType::Float) => {
                ColumnValues::Float(v.iter().map(|&x| x as f32).collect())
            }
        }
    }

    /// Observed (min, max) in a single pass; `(0.0, 0.0)` when empty
    pub fn min_max(&self) -> (f64, f64) {
        match self {
            ColumnValues::Float(v) => scan_min_max(v),
            ColumnValues::Double(v) => scan_min_max(v),
        }
    }
}

fn scan_min_max<T: Sample>(values: &[T]) -> (f64, f64) {
    let Some((&first, rest)) = values.split_first() else {
        return (0.0, 0.0);
    };
    let (mut min, mut max) = (first, first);
    for &v in rest {
        if v < min {
            min = v;
        } else if v > max {
            max = v;
        }
    }
    (min.to_f64(), max.to_f64())
}
