//! Fixed-field ASCII header of the binary event format.
//!
//! ```text
//! tag(40) byteOrder(20) valueType(20) events(20) parameters(20)
//! { nameLen(20) name }*p  { longNameLen(20) longName }*p
//! { specifiedMin(20) }*p  { specifiedMax(20) }*p
//! ```
//!
//! Every fixed field is ASCII, left-justified and padded with spaces.

use std::io::{Read, Write};

use super::config::FileByteOrder;
use super::error::CodecError;
use super::file_log::FileLog;
use crate::table::ValueType;

/// Format tag opening every binary event file
pub const FORMAT_TAG: &str = "FlowGateBinaryEvents_1.0.0";
/// Version carried by [`FORMAT_TAG`]
pub const FORMAT_VERSION: &str = "1.0.0";
/// Width of the format tag field
pub const TAG_WIDTH: usize = 40;
/// Width of every other fixed field
pub const FIELD_WIDTH: usize = 20;
/// Files shorter than this are rejected outright
pub const MIN_FILE_LEN: u64 = 100;

/// Per-parameter header entry
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterHeader {
    /// Short name
    pub name: String,
    /// Long name, `None` when absent
    pub long_name: Option<String>,
    /// Instrument-reported minimum
    pub specified_min: f64,
    /// Instrument-reported maximum
    pub specified_max: f64,
}

/// Decoded header of a binary event file
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryHeader {
    /// Byte order of the body
    pub byte_order: FileByteOrder,
    /// Precision of the body
    pub value_type: ValueType,
    /// Events stored per column
    pub number_of_events: usize,
    /// Parameters in column order
    pub parameters: Vec<ParameterHeader>,
}

impl BinaryHeader {
    /// Size of the body in bytes for the declared event count
    pub fn body_len(&self) -> Option<u64> {
        (self.parameters.len() as u64)
            .checked_mul(self.number_of_events as u64)?
            .checked_mul(self.value_type.byte_size() as u64)
    }

    /// Serialize the header
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), CodecError> {
        write_field(writer, FORMAT_TAG, TAG_WIDTH, "format tag")?;
        write_field(writer, self.byte_order.as_str(), FIELD_WIDTH, "byte order")?;
        write_field(writer, self.value_type.as_str(), FIELD_WIDTH, "value type")?;
        write_field(
            writer,
            &self.number_of_events.to_string(),
            FIELD_WIDTH,
            "event count",
        )?;
        write_field(
            writer,
            &self.parameters.len().to_string(),
            FIELD_WIDTH,
            "parameter count",
        )?;

        for parameter in &self.parameters {
            write_string(writer, &parameter.name, "parameter name")?;
        }
        for parameter in &self.parameters {
            write_string(
                writer,
                parameter.long_name.as_deref().unwrap_or(""),
                "parameter long name",
            )?;
        }
        for parameter in &self.parameters {
            let text = format_scientific(parameter.specified_min);
            write_field(writer, &text, FIELD_WIDTH, "specified minimum")?;
        }
        for parameter in &self.parameters {
            let text = format_scientific(parameter.specified_max);
            write_field(writer, &text, FIELD_WIDTH, "specified maximum")?;
        }
        Ok(())
    }

    /// Parse a header from `reader`, which holds `available` bytes from the
    /// current position. Non-fatal oddities are recorded as warnings in `log`.
    pub fn read_from<R: Read>(
        reader: &mut R,
        available: u64,
        log: &mut FileLog,
    ) -> Result<Self, CodecError> {
        if available < MIN_FILE_LEN {
            return Err(CodecError::Load(format!(
                "file is {} bytes, too short to be a binary event file (minimum {})",
                available, MIN_FILE_LEN
            )));
        }
        let mut fields = FieldReader {
            reader,
            remaining: available,
        };

        let tag = fields.read_bytes(TAG_WIDTH, "format tag")?;
        if trim_padding(&tag) != FORMAT_TAG.as_bytes() {
            return Err(CodecError::Load(format!(
                "not a binary event file: expected format tag '{}'",
                FORMAT_TAG
            )));
        }

        let byte_order = fields
            .read_text(FIELD_WIDTH, "byte order")?
            .parse::<FileByteOrder>()
            .map_err(CodecError::Load)?;
        let value_type = fields
            .read_text(FIELD_WIDTH, "value type")?
            .parse::<ValueType>()
            .map_err(CodecError::Load)?;
        let number_of_events = fields.read_count("event count")?;
        let parameter_count = fields.read_count("parameter count")?;
        if parameter_count == 0 {
            return Err(CodecError::Load("file declares no parameters".to_string()));
        }
        // Each parameter needs at least four fixed fields plus a 1-byte name
        let minimum_per_parameter = 4 * FIELD_WIDTH as u64 + 1;
        if (parameter_count as u64).saturating_mul(minimum_per_parameter) > fields.remaining {
            return Err(CodecError::Load(format!(
                "parameter count {} exceeds what the file can hold",
                parameter_count
            )));
        }

        let mut names = Vec::with_capacity(parameter_count);
        for i in 0..parameter_count {
            let bytes = fields.read_sized(&format!("name of parameter {}", i + 1))?;
            if bytes.is_empty() {
                return Err(CodecError::Load(format!(
                    "parameter {} has an empty name",
                    i + 1
                )));
            }
            let name = String::from_utf8(bytes).map_err(|_| {
                CodecError::Load(format!("name of parameter {} is not valid UTF-8", i + 1))
            })?;
            names.push(name);
        }

        let mut long_names = Vec::with_capacity(parameter_count);
        for i in 0..parameter_count {
            let bytes = fields.read_sized(&format!("long name of parameter {}", i + 1))?;
            if bytes.is_empty() {
                long_names.push(None);
                continue;
            }
            let long_name = match String::from_utf8(bytes) {
                Ok(s) => s,
                Err(err) => {
                    log.warning(format!(
                        "long name of parameter {} is not valid UTF-8; invalid bytes replaced",
                        i + 1
                    ));
                    String::from_utf8_lossy(err.as_bytes()).into_owned()
                }
            };
            long_names.push(Some(long_name));
        }

        let mut minimums = Vec::with_capacity(parameter_count);
        for i in 0..parameter_count {
            minimums.push(fields.read_number(&format!("minimum of parameter {}", i + 1))?);
        }
        let mut maximums = Vec::with_capacity(parameter_count);
        for i in 0..parameter_count {
            maximums.push(fields.read_number(&format!("maximum of parameter {}", i + 1))?);
        }

        let parameters = names
            .into_iter()
            .zip(long_names)
            .zip(minimums.into_iter().zip(maximums))
            .map(|((name, long_name), (specified_min, specified_max))| ParameterHeader {
                name,
                long_name,
                specified_min,
                specified_max,
            })
            .collect();

        Ok(Self {
            byte_order,
            value_type,
            number_of_events,
            parameters,
        })
    }

    /// Encoded header length in bytes
    pub fn encoded_len(&self) -> u64 {
        let fixed = TAG_WIDTH + 4 * FIELD_WIDTH;
        let per_parameter: usize = self
            .parameters
            .iter()
            .map(|p| {
                4 * FIELD_WIDTH + p.name.len() + p.long_name.as_deref().map_or(0, str::len)
            })
            .sum();
        (fixed + per_parameter) as u64
    }
}

/// Format a value in scientific notation within one fixed field.
///
/// The shortest round-trip representation is used when it fits; otherwise
/// the most fractional digits that fit. 12 digits always fit in 20 bytes.
pub fn format_scientific(value: f64) -> String {
    let shortest = format!("{:e}", value);
    if shortest.len() <= FIELD_WIDTH {
        return shortest;
    }
    (12..16)
        .rev()
        .map(|precision| format!("{:.*e}", precision, value))
        .find(|text| text.len() <= FIELD_WIDTH)
        .unwrap_or_else(|| format!("{:.12e}", value))
}

fn write_field<W: Write>(
    writer: &mut W,
    text: &str,
    width: usize,
    what: &str,
) -> Result<(), CodecError> {
    if text.len() > width {
        return Err(CodecError::Save(format!(
            "{} '{}' does not fit in {} bytes",
            what, text, width
        )));
    }
    writer.write_all(text.as_bytes())?;
    for _ in text.len()..width {
        writer.write_all(b" ")?;
    }
    Ok(())
}

fn write_string<W: Write>(writer: &mut W, text: &str, what: &str) -> Result<(), CodecError> {
    write_field(writer, &text.len().to_string(), FIELD_WIDTH, what)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

fn trim_padding(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |i| i + 1);
    &bytes[..end]
}

/// Reads fixed-width fields while tracking how much of the input is left
struct FieldReader<'a, R> {
    reader: &'a mut R,
    remaining: u64,
}

impl<R: Read> FieldReader<'_, R> {
    fn read_bytes(&mut self, len: usize, what: &str) -> Result<Vec<u8>, CodecError> {
        if len as u64 > self.remaining {
            return Err(CodecError::Load(format!(
                "file truncated while reading {}",
                what
            )));
        }
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf).map_err(|err| {
            if err.kind() == std::io::ErrorKind::UnexpectedEof {
                CodecError::Load(format!("file truncated while reading {}", what))
            } else {
                CodecError::IoError(err)
            }
        })?;
        self.remaining -= len as u64;
        Ok(buf)
    }

    fn read_text(&mut self, width: usize, what: &str) -> Result<String, CodecError> {
        let bytes = self.read_bytes(width, what)?;
        let trimmed = trim_padding(&bytes);
        std::str::from_utf8(trimmed)
            .ok()
            .filter(|s| s.is_ascii())
            .map(|s| s.trim_start().to_string())
            .ok_or_else(|| CodecError::Load(format!("{} field is not ASCII text", what)))
    }

    fn read_count(&mut self, what: &str) -> Result<usize, CodecError> {
        let text = self.read_text(FIELD_WIDTH, what)?;
        text.parse::<usize>()
            .map_err(|_| CodecError::Load(format!("invalid {} '{}'", what, text)))
    }

    fn read_number(&mut self, what: &str) -> Result<f64, CodecError> {
        let text = self.read_text(FIELD_WIDTH, what)?;
        text.parse::<f64>()
            .map_err(|_| CodecError::Load(format!("invalid {} '{}'", what, text)))
    }

    /// A length field followed by that many raw bytes
    fn read_sized(&mut self, what: &str) -> Result<Vec<u8>, CodecError> {
        let len = self.read_count(&format!("length of {}", what))?;
        if len as u64 > self.remaining {
            return Err(CodecError::Load(format!(
                "length of {} ({} bytes) exceeds the remaining file",
                what, len
            )));
        }
        self.read_bytes(len, what)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_header() -> BinaryHeader {
        BinaryHeader {
            byte_order: FileByteOrder::BigEndian,
            value_type: ValueType::Double,
            number_of_events: 12,
            parameters: vec![
                ParameterHeader {
                    name: "FSC-A".to_string(),
                    long_name: None,
                    specified_min: 0.0,
                    specified_max: 262144.0,
                },
                ParameterHeader {
                    name: "FITC-A".to_string(),
                    long_name: Some("CD3 FITC".to_string()),
                    specified_min: -111.0,
                    specified_max: 1.0e-300 / 3.0,
                },
            ],
        }
    }

    #[test]
    fn test_header_layout() {
        let mut buf = Vec::new();
        sample_header().write_to(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, sample_header().encoded_len());

        assert_eq!(&buf[..FORMAT_TAG.len()], FORMAT_TAG.as_bytes());
        assert!(buf[FORMAT_TAG.len()..TAG_WIDTH].iter().all(|&b| b == b' '));
        assert_eq!(&buf[40..60], b"msbf                ");
        assert_eq!(&buf[60..80], b"double              ");
        assert_eq!(&buf[80..100], b"12                  ");
        assert_eq!(&buf[100..120], b"2                   ");
        assert_eq!(&buf[120..140], b"5                   ");
        assert_eq!(&buf[140..145], b"FSC-A");
    }

    #[test]
    fn test_header_read_back() {
        let header = sample_header();
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();

        let mut log = FileLog::new();
        let len = buf.len() as u64;
        let decoded = BinaryHeader::read_from(&mut Cursor::new(buf), len, &mut log).unwrap();
        assert_eq!(decoded.parameters[0], header.parameters[0]);
        assert_eq!(decoded.parameters[1].long_name.as_deref(), Some("CD3 FITC"));
        assert_eq!(decoded.parameters[1].specified_min, -111.0);
        // 12-digit fallback is close but not exact
        let max = decoded.parameters[1].specified_max;
        assert!((max - header.parameters[1].specified_max).abs() <= max.abs() * 1e-11);
        assert!(log.is_empty());
    }

    #[test]
    fn test_format_scientific_fits_field() {
        for value in [0.0, -0.0, 1.0, 262144.0, -1.2345678901234567e-300, f64::MAX, f64::MIN_POSITIVE] {
            let text = format_scientific(value);
            assert!(text.len() <= FIELD_WIDTH, "{} too long", text);
        }
        assert_eq!(format_scientific(262144.0), "2.62144e5");
        assert_eq!("2.62144e5".parse::<f64>().unwrap(), 262144.0);
        assert_eq!("2.621440e+05".parse::<f64>().unwrap(), 262144.0);
    }

    #[test]
    fn test_format_scientific_uses_widest_precision() {
        // Shortest form is 21 bytes, 16 significant digits still fit
        let value = 0.30000000000000004;
        assert_eq!(format!("{:e}", value).len(), 21);
        let text = format_scientific(value);
        assert_eq!(text, "3.000000000000000e-1");
        assert_eq!(text.len(), FIELD_WIDTH);

        let value = 1.2345678901234567e-5;
        let text = format_scientific(value);
        assert_eq!(text, "1.234567890123457e-5");
        let parsed: f64 = text.parse().unwrap();
        assert!((parsed - value).abs() / value < 1e-15);

        let negative = format_scientific(-1.2345678901234567e-300);
        assert_eq!(negative, "-1.234567890123e-300");
    }

    #[test]
    fn test_rejects_short_input() {
        let mut log = FileLog::new();
        let buf = vec![b' '; 99];
        let err = BinaryHeader::read_from(&mut Cursor::new(buf), 99, &mut log).unwrap_err();
        assert!(matches!(err, CodecError::Load(_)));
    }

    #[test]
    fn test_rejects_wrong_tag() {
        let mut buf = Vec::new();
        sample_header().write_to(&mut buf).unwrap();
        buf[25] = b'9';
        let mut log = FileLog::new();
        let len = buf.len() as u64;
        let err = BinaryHeader::read_from(&mut Cursor::new(buf), len, &mut log).unwrap_err();
        assert!(err.to_string().contains("format tag"));
    }

    #[test]
    fn test_rejects_bad_fields() {
        let mut buf = Vec::new();
        sample_header().write_to(&mut buf).unwrap();
        let len = buf.len() as u64;

        let mut bad_order = buf.clone();
        bad_order[40..44].copy_from_slice(b"mixd");
        let mut log = FileLog::new();
        assert!(BinaryHeader::read_from(&mut Cursor::new(bad_order), len, &mut log).is_err());

        let mut bad_count = buf.clone();
        bad_count[80..82].copy_from_slice(b"x2");
        assert!(BinaryHeader::read_from(&mut Cursor::new(bad_count), len, &mut log).is_err());

        let mut huge_name = buf;
        huge_name[120..125].copy_from_slice(b"99999");
        let err = BinaryHeader::read_from(&mut Cursor::new(huge_name), len, &mut log).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }
}
