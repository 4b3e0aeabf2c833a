//! # Binary Event Codec
//!
//! Loads and saves [`EventTable`]s in the compact binary event format: a
//! fixed-field ASCII header followed by a raw, column-major body of 32-bit or
//! 64-bit IEEE floats in a declared byte order.
//!
//! ## Partial loads and saves
//!
//! Both directions accept an [`EventLimit`]. A limited load reads only the
//! first `N` events of each column and seeks past the rest, recording the
//! file's full event count as the table's original event count. A limited
//! save writes only the first `N` events of each column.
//!
//! ## Diagnostics
//!
//! Every call starts with an empty [`FileLog`] and [`FileAttributes`].
//! Malformed input is recorded in the log as an error before the call fails;
//! recoverable oddities are recorded as warnings. A failed load leaves the
//! codec without a table.
//!
//! ## Example
//!
//! ```rust,no_run
//! use flowgate_events::codec::{BinaryEventCodec, EventLimit};
//!
//! let mut codec = BinaryEventCodec::new();
//! let table = codec.load("sample.fgbe", EventLimit::First(10_000))?;
//! println!(
//!     "{} of {} events, {} parameters",
//!     table.number_of_events(),
//!     table.number_of_original_events(),
//!     table.number_of_parameters()
//! );
//! codec.save(table, "subset.fgbe", EventLimit::All)?;
//! # Ok::<(), flowgate_events::codec::CodecError>(())
//! ```

pub mod attributes;
mod body;
mod config;
mod error;
mod file_log;
pub mod header;


pub use attributes::FileAttributes;
pub use config::{CodecConfig, EventLimit, FileByteOrder};
pub use error::CodecError;
pub use file_log::{FileLog, LogCategory, LogEntry};
pub use header::{BinaryHeader, ParameterHeader, FORMAT_TAG, FORMAT_VERSION};

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use crate::table::{EventTable, NamePolicy};

/// `path` attribute value for reader/writer based calls
const STREAM_SOURCE: &str = "<stream>";

/// Reader and writer for binary event files.
///
/// The codec keeps a shared handle to the last table it loaded or saved, so
/// the caller and the codec can hold the same table without copying.
#[derive(Debug, Default)]
pub struct BinaryEventCodec {
    config: CodecConfig,
    table: Option<Arc<EventTable>>,
    log: FileLog,
    attributes: FileAttributes,
}

impl BinaryEventCodec {
    /// Create a codec with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with an explicit configuration
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active configuration
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Diagnostics from the most recent load or save
    pub fn log(&self) -> &FileLog {
        &self.log
    }

    /// Attributes of the most recently loaded or saved file
    pub fn attributes(&self) -> &FileAttributes {
        &self.attributes
    }

    /// Table from the most recent successful load, or the most recent save
    pub fn event_table(&self) -> Option<&Arc<EventTable>> {
        self.table.as_ref()
    }

    /// Release the codec's handle on its table
    pub fn take_event_table(&mut self) -> Option<Arc<EventTable>> {
        self.table.take()
    }

    /// Load a binary event file.
    ///
    /// The file is locked exclusively for the duration of the call when
    /// [`CodecConfig::lock_files`] is set.
    pub fn load<P: AsRef<Path>>(
        &mut self,
        path: P,
        limit: EventLimit,
    ) -> Result<Arc<EventTable>, CodecError> {
        let path = path.as_ref();
        self.begin();
        info!("Loading binary events from {}", path.display());

        let result = self.open_locked_for_load(path).and_then(|file| {
            let mut reader = BufReader::with_capacity(self.config.buffer_size, &file);
            self.load_inner(&mut reader, limit, &path.display().to_string())
        });
        self.record_failure(result)
    }

    /// Load from any seekable reader positioned at the start of the header
    pub fn load_from_reader<R: Read + Seek>(
        &mut self,
        mut reader: R,
        limit: EventLimit,
    ) -> Result<Arc<EventTable>, CodecError> {
        self.begin();
        let result = self.load_inner(&mut reader, limit, STREAM_SOURCE);
        self.record_failure(result)
    }

    /// Save a table to a binary event file, replacing any existing content.
    ///
    /// Pass an `Arc` to share the table with the codec, or an owned table to
    /// hand it over.
    pub fn save<P: AsRef<Path>>(
        &mut self,
        table: impl Into<Arc<EventTable>>,
        path: P,
        limit: EventLimit,
    ) -> Result<(), CodecError> {
        let path = path.as_ref();
        self.begin();
        let table = table.into();
        self.table = Some(Arc::clone(&table));
        info!("Saving binary events to {}", path.display());

        let result = self.open_locked_for_save(path).and_then(|file| {
            let mut writer = BufWriter::with_capacity(self.config.buffer_size, &file);
            self.save_inner(&mut writer, &table, limit, &path.display().to_string())?;
            writer.flush()?;
            Ok(())
        });
        self.record_failure(result)
    }

    /// Save to any writer
    pub fn save_to_writer<W: Write>(
        &mut self,
        table: impl Into<Arc<EventTable>>,
        mut writer: W,
        limit: EventLimit,
    ) -> Result<(), CodecError> {
        self.begin();
        let table = table.into();
        self.table = Some(Arc::clone(&table));
        let result = self
            .save_inner(&mut writer, &table, limit, STREAM_SOURCE)
            .and_then(|()| writer.flush().map_err(CodecError::from));
        self.record_failure(result)
    }

    fn begin(&mut self) {
        self.table = None;
        self.log.clear();
        self.attributes.clear();
    }

    fn record_failure<T>(&mut self, result: Result<T, CodecError>) -> Result<T, CodecError> {
        if let Err(err) = &result {
            self.log.error(err.to_string());
        }
        result
    }

    fn open_locked_for_load(&mut self, path: &Path) -> Result<File, CodecError> {
        let file = File::open(path)?;
        self.lock(&file)?;
        Ok(file)
    }

    fn open_locked_for_save(&mut self, path: &Path) -> Result<File, CodecError> {
        // Truncate only once the lock is held
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        self.lock(&file)?;
        file.set_len(0)?;
        Ok(file)
    }

    fn lock(&mut self, file: &File) -> Result<(), CodecError> {
        if !self.config.lock_files {
            return Ok(());
        }
        match file.lock() {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::Unsupported => {
                self.log
                    .warning("file locking is not supported here; continuing unlocked");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn load_inner<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        limit: EventLimit,
        source: &str,
    ) -> Result<Arc<EventTable>, CodecError> {
        let start = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(start))?;
        let available = end.saturating_sub(start);

        let header = BinaryHeader::read_from(reader, available, &mut self.log)?;
        let stored = header.number_of_events;
        let loaded = limit.resolve(stored);
        debug!(
            "Header: {} bytes, {} parameters, {} events, {} {}{}",
            header.encoded_len(),
            header.parameters.len(),
            stored,
            header.value_type,
            header.byte_order,
            if header.byte_order.needs_swap() { " (swapped)" } else { "" }
        );

        let body_start = reader.stream_position()?;
        let body_available = end.saturating_sub(body_start);
        let body_len = header
            .body_len()
            .ok_or_else(|| CodecError::Load(format!("event count {} is too large", stored)))?;
        if loaded > 0 && body_available < body_len {
            return Err(CodecError::Load(format!(
                "file truncated: body holds {} bytes but the header declares {}",
                body_available, body_len
            )));
        }
        if body_available > body_len {
            self.log.warning(format!(
                "{} bytes after the declared body were ignored",
                body_available - body_len
            ));
        }

        let names: Vec<&str> = header.parameters.iter().map(|p| p.name.as_str()).collect();
        let mut seen = HashSet::with_capacity(names.len());
        let policy = if names.iter().all(|name| seen.insert(*name)) {
            NamePolicy::Unique
        } else {
            NamePolicy::AllowDuplicates
        };
        let mut table = EventTable::with_policy(&names, loaded, header.value_type, policy)
            .map_err(|err| CodecError::Load(format!("invalid parameter list: {}", err)))?;
        for (index, parameter) in header.parameters.iter().enumerate() {
            table.set_long_name(index, parameter.long_name.as_deref())?;
            table.set_specified_min(index, parameter.specified_min)?;
            table.set_specified_max(index, parameter.specified_max)?;
        }
        table.set_number_of_original_events(stored);

        if loaded > 0 {
            body::read_body(reader, &mut table, stored, header.byte_order)?;
            table.compute_data_min_max();
        }

        self.attributes.set(attributes::PATH, source);
        self.attributes.set(attributes::VERSION_NUMBER, FORMAT_VERSION);
        self.attributes.set(attributes::BYTE_ORDER, header.byte_order);
        self.attributes.set(attributes::DATA_TYPE, header.value_type);
        self.attributes.set(attributes::NUMBER_FORMAT, "binary");
        self.attributes.set(attributes::NUMBER_OF_EVENTS, stored);
        self.attributes
            .set(attributes::NUMBER_OF_PARAMETERS, header.parameters.len());

        info!(
            "Loaded {} of {} events ({} parameters) from {}",
            loaded,
            stored,
            table.number_of_parameters(),
            source
        );

        let table = Arc::new(table);
        self.table = Some(Arc::clone(&table));
        Ok(table)
    }

    fn save_inner<W: Write>(
        &mut self,
        writer: &mut W,
        table: &EventTable,
        limit: EventLimit,
        source: &str,
    ) -> Result<(), CodecError> {
        if table.number_of_parameters() == 0 {
            return Err(CodecError::Save("table has no parameters".to_string()));
        }
        let available = table.number_of_events();
        let events = limit.resolve(available);
        if let EventLimit::First(requested) = limit {
            if requested > available {
                self.log.warning(format!(
                    "requested {} events but the table holds {}; writing {}",
                    requested, available, available
                ));
            }
        }

        let header = BinaryHeader {
            byte_order: self.config.byte_order,
            value_type: table.value_type(),
            number_of_events: events,
            parameters: table
                .columns()
                .map(|column| ParameterHeader {
                    name: column.name().to_string(),
                    long_name: column.long_name().map(str::to_string),
                    specified_min: column.specified_min(),
                    specified_max: column.specified_max(),
                })
                .collect(),
        };
        header.write_to(writer)?;
        body::write_body(writer, table, events, header.byte_order)?;

        self.attributes.set(attributes::PATH, source);
        self.attributes.set(attributes::VERSION_NUMBER, FORMAT_VERSION);
        self.attributes.set(attributes::BYTE_ORDER, header.byte_order);
        self.attributes.set(attributes::DATA_TYPE, header.value_type);
        self.attributes.set(attributes::NUMBER_FORMAT, "binary");
        self.attributes.set(attributes::NUMBER_OF_EVENTS, events);
        self.attributes
            .set(attributes::NUMBER_OF_PARAMETERS, table.number_of_parameters());

        info!(
            "Saved {} of {} events ({} parameters) to {}",
            events,
            available,
            table.number_of_parameters(),
            source
        );
        Ok(())
    }
}
