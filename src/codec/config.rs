use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CodecError;

/// Byte order of the binary body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileByteOrder {
    /// Least significant byte first (`lsbf`)
    #[serde(rename = "lsbf")]
    LittleEndian,
    /// Most significant byte first (`msbf`)
    #[serde(rename = "msbf")]
    BigEndian,
}

impl FileByteOrder {
    /// Byte order of the running host
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            FileByteOrder::BigEndian
        } else {
            FileByteOrder::LittleEndian
        }
    }

    /// Header tag (`"lsbf"` or `"msbf"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            FileByteOrder::LittleEndian => "lsbf",
            FileByteOrder::BigEndian => "msbf",
        }
    }

    /// Returns true if values must be byte-swapped on this host
    pub fn needs_swap(&self) -> bool {
        *self != Self::native()
    }
}

impl Default for FileByteOrder {
    fn default() -> Self {
        Self::native()
    }
}

impl fmt::Display for FileByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileByteOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lsbf" => Ok(FileByteOrder::LittleEndian),
            "msbf" => Ok(FileByteOrder::BigEndian),
            other => Err(format!("unknown byte order '{}'", other)),
        }
    }
}

/// How many events of each column a load or save touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventLimit {
    /// Every event
    #[default]
    All,
    /// Header only: schema and ranges, no values
    HeaderOnly,
    /// At most this many leading events
    First(usize),
}

impl EventLimit {
    /// Interpret the conventional integer form: `-1` all, `0` header only,
    /// `N > 0` the first `N` events.
    pub fn from_max_events(max_events: i64) -> Result<Self, CodecError> {
        match max_events {
            -1 => Ok(EventLimit::All),
            0 => Ok(EventLimit::HeaderOnly),
            n if n > 0 => usize::try_from(n)
                .map(EventLimit::First)
                .map_err(|_| CodecError::InvalidArgument(format!("event limit {} too large", n))),
            n => Err(CodecError::InvalidArgument(format!(
                "event limit must be -1, 0 or positive, got {}",
                n
            ))),
        }
    }

    /// Number of events to process when `available` exist
    pub fn resolve(&self, available: usize) -> usize {
        match *self {
            EventLimit::All => available,
            EventLimit::HeaderOnly => 0,
            EventLimit::First(n) => n.min(available),
        }
    }
}

/// Configuration for the binary event codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Byte order used when saving. Loading always honours the file's tag.
    pub byte_order: FileByteOrder,

    /// Take an exclusive lock on the file for the duration of each
    /// path-based load or save
    pub lock_files: bool,

    /// I/O buffer size in bytes
    pub buffer_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            byte_order: FileByteOrder::native(),
            lock_files: true,
            // 1MB buffers keep column-sized reads to a handful of syscalls
            buffer_size: 1024 * 1024,
        }
    }
}

impl CodecConfig {
    /// Save little-endian regardless of host
    pub fn little_endian() -> Self {
        Self {
            byte_order: FileByteOrder::LittleEndian,
            ..Self::default()
        }
    }

    /// Save big-endian regardless of host
    pub fn big_endian() -> Self {
        Self {
            byte_order: FileByteOrder::BigEndian,
            ..Self::default()
        }
    }
}
