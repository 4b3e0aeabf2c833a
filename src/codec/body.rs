//! Column-major binary body: all events of column 0, then column 1, ...

use std::io::{Read, Seek, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

use super::config::FileByteOrder;
use super::error::CodecError;
use crate::table::{ColumnValues, EventTable, ValueType};

/// Values encoded per write call
const ENCODE_CHUNK: usize = 64 * 1024;

/// Fill every column of `table` with its first `table.number_of_events()`
/// values, skipping the remaining `stored_events - loaded` values of each
/// column in the input.
pub(crate) fn read_body<R: Read + Seek>(
    reader: &mut R,
    table: &mut EventTable,
    stored_events: usize,
    byte_order: FileByteOrder,
) -> Result<(), CodecError> {
    let loaded = table.number_of_events();
    let width = table.value_type().byte_size();
    let skip = ((stored_events - loaded) * width) as i64;
    let parameters = table.number_of_parameters();

    for index in 0..parameters {
        let result = match table.value_type() {
            ValueType::Float => {
                let values = table.floats_mut(index)?;
                match byte_order {
                    FileByteOrder::LittleEndian => reader.read_f32_into::<LittleEndian>(values),
                    FileByteOrder::BigEndian => reader.read_f32_into::<BigEndian>(values),
                }
            }
            ValueType::Double => {
                let values = table.doubles_mut(index)?;
                match byte_order {
                    FileByteOrder::LittleEndian => reader.read_f64_into::<LittleEndian>(values),
                    FileByteOrder::BigEndian => reader.read_f64_into::<BigEndian>(values),
                }
            }
        };
        result.map_err(|err| truncated(err, index))?;

        // The final column's tail is never needed
        if skip > 0 && index + 1 < parameters {
            reader.seek_relative(skip)?;
        }
    }
    Ok(())
}

/// Write the first `events` values of every column of `table`
pub(crate) fn write_body<W: Write>(
    writer: &mut W,
    table: &EventTable,
    events: usize,
    byte_order: FileByteOrder,
) -> Result<(), CodecError> {
    let width = table.value_type().byte_size();
    let mut buf = vec![0u8; ENCODE_CHUNK.min(events.max(1)) * width];

    for column in table.columns() {
        match column.values() {
            ColumnValues::Float(values) => {
                for chunk in values[..events].chunks(ENCODE_CHUNK) {
                    let out = &mut buf[..chunk.len() * width];
                    match byte_order {
                        FileByteOrder::LittleEndian => LittleEndian::write_f32_into(chunk, out),
                        FileByteOrder::BigEndian => BigEndian::write_f32_into(chunk, out),
                    }
                    writer.write_all(out)?;
                }
            }
            ColumnValues::Double(values) => {
                for chunk in values[..events].chunks(ENCODE_CHUNK) {
                    let out = &mut buf[..chunk.len() * width];
                    match byte_order {
                        FileByteOrder::LittleEndian => LittleEndian::write_f64_into(chunk, out),
                        FileByteOrder::BigEndian => BigEndian::write_f64_into(chunk, out),
                    }
                    writer.write_all(out)?;
                }
            }
        }
    }
    Ok(())
}

fn truncated(err: std::io::Error, index: usize) -> CodecError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        CodecError::Load(format!(
            "file truncated while reading values of parameter {}",
            index + 1
        ))
    } else {
        CodecError::IoError(err)
    }
}
