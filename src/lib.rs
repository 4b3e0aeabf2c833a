//! # flowgate-events - Columnar Flow-Cytometry Event Tables
//!
//! `flowgate-events` stores flow-cytometry measurements as an in-memory
//! columnar table, removes fluorescence spillover from it, and reads and writes
//! it in a compact, byte-order-portable binary event format.
//!
//! ## Key Features
//!
//! - **Columnar Storage**: Each parameter (channel) is one contiguous `f32` or
//!   `f64` buffer, so whole-parameter scans are cache friendly.
//!
//! - **Safe Structural Mutation**: Add, remove and rename parameters, resize
//!   the event count, copy tables or single columns, all with checked indices.
//!
//! - **Parallel Compensation**: Spillover matrices are inverted by
//!   Gauss-Jordan elimination and applied to every event across all cores.
//!
//! - **Partial I/O**: Load or save only the first `N` events of each column
//!   without touching the rest of the file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowgate_events::codec::{BinaryEventCodec, EventLimit};
//! use flowgate_events::table::{EventTable, ValueType};
//!
//! let mut table = EventTable::new(&["FSC-A", "FITC-A", "PE-A"], 3, ValueType::Float)?;
//! table.floats_mut(1)?.copy_from_slice(&[120.0, 340.0, 95.0]);
//! table.floats_mut(2)?.copy_from_slice(&[610.0, 220.0, 80.0]);
//!
//! // FITC spills 15% into PE
//! table.compensate(&["FITC-A", "PE-A"], &[1.0, 0.15, 0.0, 1.0])?;
//!
//! let mut codec = BinaryEventCodec::new();
//! codec.save(table, "compensated.fgbe", EventLimit::All)?;
//!
//! let reloaded = codec.load("compensated.fgbe", EventLimit::First(2))?;
//! assert_eq!(reloaded.number_of_events(), 2);
//! assert_eq!(reloaded.number_of_original_events(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`table`]: `EventTable` and `Column`, the columnar container
//! - [`compensation`]: matrix inversion and parallel per-event unmixing
//! - [`codec`]: the binary event format, `FileLog` and `FileAttributes`
//!
//! ## Binary Event Format
//!
//! | Field | Width | Encoding |
//! |-------|-------|----------|
//! | Format tag | 40 | `FlowGateBinaryEvents_1.0.0` |
//! | Byte order | 20 | `lsbf` or `msbf` |
//! | Value type | 20 | `float` or `double` |
//! | Event count | 20 | decimal |
//! | Parameter count `p` | 20 | decimal |
//! | Names | p × (20 + len) | length, then UTF-8 bytes |
//! | Long names | p × (20 + len) | length (0 = none), then UTF-8 bytes |
//! | Specified minimums | p × 20 | scientific notation |
//! | Specified maximums | p × 20 | scientific notation |
//! | Body | p × events × 4 or 8 | column-major IEEE floats |
//!
//! Fixed fields are ASCII, left-justified and padded with spaces.

// Documentation lints
#![warn(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod codec;
pub mod compensation;
pub mod table;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::codec::{
        BinaryEventCodec, CodecConfig, CodecError, EventLimit, FileAttributes, FileByteOrder,
        FileLog, LogCategory,
    };
    pub use crate::compensation::{invert_matrix, is_identity};
    pub use crate::table::{Column, ColumnValues, EventTable, NamePolicy, TableError, ValueType};
}
