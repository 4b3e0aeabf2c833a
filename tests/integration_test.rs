//! Integration tests for flowgate-events
//!
//! These tests exercise the full pipeline from table creation through
//! compensation, saving, and loading from disk.

use flowgate_events::codec::attributes;
use flowgate_events::prelude::*;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

/// Build a three-colour table with a simple ramp per channel
fn stained_table(events: usize, value_type: ValueType) -> EventTable {
    let mut table = EventTable::new(&["FSC-A", "FITC-A", "PE-A"], events, value_type).unwrap();
    for event in 0..events {
        let t = event as f64;
        table.set_value(0, event, 1000.0 + t).unwrap();
        table.set_value(1, event, 50.0 + t * 2.0).unwrap();
        table.set_value(2, event, 80.0 + t * 0.5).unwrap();
    }
    table.set_long_name(1, Some("CD3 FITC")).unwrap();
    table.set_specified_min(1, 0.0).unwrap();
    table.set_specified_max(1, 262_144.0).unwrap();
    table
}

/// Test the complete write-read cycle
#[test]
fn test_write_read_cycle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.fgbe");

    let table = stained_table(500, ValueType::Float);
    let mut codec = BinaryEventCodec::new();
    codec.save(table.clone(), &path, EventLimit::All).unwrap();
    assert!(codec.log().is_empty());

    let mut reader = BinaryEventCodec::new();
    let loaded = reader.load(&path, EventLimit::All).unwrap();

    assert_eq!(loaded.names(), vec!["FSC-A", "FITC-A", "PE-A"]);
    assert_eq!(loaded.number_of_events(), 500);
    assert_eq!(loaded.long_name(1).unwrap(), Some("CD3 FITC"));
    assert_eq!(loaded.specified_max(1).unwrap(), 262_144.0);
    assert_eq!(loaded.floats(2).unwrap(), table.floats(2).unwrap());
    assert_eq!(loaded.data_min(0).unwrap(), 1000.0);
    assert_eq!(loaded.data_max(0).unwrap(), 1499.0);

    let attrs = reader.attributes();
    assert_eq!(attrs.get(attributes::NUMBER_OF_EVENTS), Some("500"));
    assert_eq!(attrs.get(attributes::NUMBER_OF_PARAMETERS), Some("3"));
    assert_eq!(attrs.get(attributes::DATA_TYPE), Some("float"));
    assert_eq!(attrs.get(attributes::NUMBER_FORMAT), Some("binary"));
}

/// Compensate, persist in the opposite byte order, reload, and undo
#[test]
fn test_compensate_save_load_restore() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("comp.fgbe");

    let spillover = [1.0, 0.15, 0.05, 1.0];
    let original = stained_table(2_000, ValueType::Double);
    let mut table = original.clone();
    table.compensate(&["FITC-A", "PE-A"], &spillover).unwrap();
    assert_ne!(table.doubles(1).unwrap(), original.doubles(1).unwrap());
    assert_eq!(table.doubles(0).unwrap(), original.doubles(0).unwrap());

    let order = if FileByteOrder::native() == FileByteOrder::LittleEndian {
        FileByteOrder::BigEndian
    } else {
        FileByteOrder::LittleEndian
    };
    let config = CodecConfig {
        byte_order: order,
        ..CodecConfig::default()
    };
    let mut codec = BinaryEventCodec::with_config(config);
    codec.save(table, &path, EventLimit::All).unwrap();

    let mut loaded = codec.load(&path, EventLimit::All).unwrap();
    codec.take_event_table();
    let restored = Arc::make_mut(&mut loaded);

    // Compensating with the inverse reapplies the spillover
    let inverse = invert_matrix(&spillover, 2).unwrap();
    restored.compensate(&["FITC-A", "PE-A"], &inverse).unwrap();

    for parameter in 1..3 {
        let expected = original.doubles(parameter).unwrap();
        let actual = restored.doubles(parameter).unwrap();
        for (e, a) in expected.iter().zip(actual) {
            assert!((e - a).abs() <= 1e-9 * e.abs().max(1.0), "{} vs {}", e, a);
        }
    }
}

/// Truncate a file on load and save the prefix elsewhere
#[test]
fn test_truncate_pipeline() {
    let dir = tempdir().unwrap();
    let full = dir.path().join("full.fgbe");
    let small = dir.path().join("small.fgbe");

    let table = stained_table(1_000, ValueType::Float);
    let mut codec = BinaryEventCodec::new();
    codec.save(table.clone(), &full, EventLimit::All).unwrap();

    let prefix = codec.load(&full, EventLimit::First(100)).unwrap();
    assert_eq!(prefix.number_of_events(), 100);
    assert_eq!(prefix.number_of_original_events(), 1_000);
    for parameter in 0..3 {
        assert_eq!(
            prefix.floats(parameter).unwrap(),
            &table.floats(parameter).unwrap()[..100]
        );
    }

    codec.save(Arc::clone(&prefix), &small, EventLimit::All).unwrap();
    assert!(fs::metadata(&small).unwrap().len() < fs::metadata(&full).unwrap().len());

    let reloaded = codec.load(&small, EventLimit::All).unwrap();
    assert_eq!(reloaded.number_of_events(), 100);
    assert_eq!(reloaded.number_of_original_events(), 100);
    assert_eq!(reloaded.floats(1).unwrap(), prefix.floats(1).unwrap());
}

/// A header-only load reports parameters without reading events
#[test]
fn test_header_only_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("header.fgbe");

    let mut codec = BinaryEventCodec::new();
    codec
        .save(stained_table(64, ValueType::Double), &path, EventLimit::All)
        .unwrap();

    let header = codec.load(&path, EventLimit::HeaderOnly).unwrap();
    assert_eq!(header.number_of_parameters(), 3);
    assert_eq!(header.number_of_events(), 0);
    assert_eq!(header.number_of_original_events(), 64);
    assert_eq!(header.value_type(), ValueType::Double);
    assert_eq!(codec.attributes().get(attributes::NUMBER_OF_EVENTS), Some("64"));
}

/// A corrupted file fails to load and leaves an error in the log
#[test]
fn test_corrupted_file_reports_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.fgbe");

    let mut codec = BinaryEventCodec::new();
    codec
        .save(stained_table(10, ValueType::Float), &path, EventLimit::All)
        .unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes[..4].copy_from_slice(b"XXXX");
    fs::write(&path, &bytes).unwrap();

    assert!(codec.load(&path, EventLimit::All).is_err());
    assert!(codec.log().has_errors());
    assert!(codec.event_table().is_none());
    assert!(codec.attributes().is_empty());
}
