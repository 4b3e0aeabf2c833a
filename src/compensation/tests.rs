use crate::table::{EventTable, TableError, ValueType};

fn fluorescence_table(value_type: ValueType, events: usize) -> EventTable {
    let mut table =
        EventTable::new(&["FSC-A", "FITC-A", "PE-A", "APC-A"], events, value_type).unwrap();
    for event in 0..events {
        let x = event as f64;
        table.set_value(0, event, 1000.0 + x).unwrap();
        table.set_value(1, event, 200.0 + (x * 0.37).sin() * 150.0).unwrap();
        table.set_value(2, event, 500.0 + (x * 0.11).cos() * 300.0).unwrap();
        table.set_value(3, event, 50.0 + x * 0.5).unwrap();
    }
    table
}

const SPILLOVER: [f64; 9] = [
    1.0, 0.18, 0.02, //
    0.05, 1.0, 0.11, //
    0.0, 0.07, 1.0,
];

const CHANNELS: [&str; 3] = ["FITC-A", "PE-A", "APC-A"];

fn assert_close(actual: f64, expected: f64) {
    let scale = expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= 1e-5 * scale,
        "{} != {}",
        actual,
        expected
    );
}

#[test]
fn test_scatter_identity_is_noop() {
    let mut table = EventTable::new(&["FSC", "SSC"], 3, ValueType::Float).unwrap();
    table.floats_mut(0).unwrap().copy_from_slice(&[1.0, 2.0, 3.0]);
    table.floats_mut(1).unwrap().copy_from_slice(&[4.0, 5.0, 6.0]);

    table
        .compensate(&["FSC", "SSC"], &[1.0, 0.0, 0.0, 1.0])
        .unwrap();

    assert_eq!(table.floats(0).unwrap(), &[1.0, 2.0, 3.0]);
    assert_eq!(table.floats(1).unwrap(), &[4.0, 5.0, 6.0]);
}

#[test]
fn test_identity_leaves_all_values() {
    let original = fluorescence_table(ValueType::Double, 257);
    let mut table = original.clone();
    let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
    table.compensate(&CHANNELS, &identity).unwrap();
    assert_eq!(table, original);
}

#[test]
fn test_compensation_matches_manual_solve() {
    let mut table = fluorescence_table(ValueType::Double, 10);
    let original = table.clone();
    table
        .compensate(&["FITC-A", "PE-A"], &[1.0, 0.25, 0.1, 1.0])
        .unwrap();

    // inverse of [[1, .25], [.1, 1]] is [[1, -.25], [-.1, 1]] / 0.975
    for event in 0..10 {
        let fitc = original.value(1, event).unwrap();
        let pe = original.value(2, event).unwrap();
        assert_close(table.value(1, event).unwrap(), (fitc - 0.1 * pe) / 0.975);
        assert_close(table.value(2, event).unwrap(), (pe - 0.25 * fitc) / 0.975);
        // Unlisted parameters untouched
        assert_eq!(table.value(0, event).unwrap(), original.value(0, event).unwrap());
        assert_eq!(table.value(3, event).unwrap(), original.value(3, event).unwrap());
    }
}

#[test]
fn test_compensate_then_inverse_restores() {
    for value_type in [ValueType::Float, ValueType::Double] {
        // Spans several worker blocks
        let original = fluorescence_table(value_type, 40_000);
        let mut table = original.clone();

        table.compensate(&CHANNELS, &SPILLOVER).unwrap();
        assert_ne!(table, original);

        let inverse = super::invert_matrix(&SPILLOVER, 3).unwrap();
        table.compensate(&CHANNELS, &inverse).unwrap();

        for parameter in 0..4 {
            for event in (0..40_000).step_by(97) {
                assert_close(
                    table.value(parameter, event).unwrap(),
                    original.value(parameter, event).unwrap(),
                );
            }
        }
    }
}

#[test]
fn test_parameter_order_follows_matrix() {
    let mut forward = fluorescence_table(ValueType::Double, 5);
    let mut reversed = forward.clone();

    forward
        .compensate(&["FITC-A", "PE-A"], &[1.0, 0.3, 0.0, 1.0])
        .unwrap();
    reversed
        .compensate(&["PE-A", "FITC-A"], &[1.0, 0.0, 0.3, 1.0])
        .unwrap();

    for event in 0..5 {
        assert_close(
            forward.value(1, event).unwrap(),
            reversed.value(1, event).unwrap(),
        );
        assert_close(
            forward.value(2, event).unwrap(),
            reversed.value(2, event).unwrap(),
        );
    }
}

#[test]
fn test_zero_diagonal_rejected_without_mutation() {
    let original = fluorescence_table(ValueType::Float, 20);
    let mut table = original.clone();
    let matrix = [1.0, 0.2, 0.0, 0.1, 0.0, 0.1, 0.0, 0.3, 1.0];
    assert!(matches!(
        table.compensate(&CHANNELS, &matrix),
        Err(TableError::InvalidMatrix(_))
    ));
    assert_eq!(table, original);
}

#[test]
fn test_validation_errors() {
    let mut table = fluorescence_table(ValueType::Float, 4);
    let original = table.clone();

    assert!(matches!(
        table.compensate(&["FITC-A"], &[1.0]),
        Err(TableError::InvalidMatrix(_))
    ));
    assert!(matches!(
        table.compensate(&["FITC-A", "PE-A"], &[1.0, 0.0, 1.0]),
        Err(TableError::InvalidMatrix(_))
    ));
    assert!(matches!(
        table.compensate(&["FITC-A", "BV421-A"], &[1.0, 0.1, 0.1, 1.0]),
        Err(TableError::InvalidArgument(_))
    ));
    assert!(matches!(
        table.compensate(&["FITC-A", "FITC-A"], &[1.0, 0.1, 0.1, 1.0]),
        Err(TableError::InvalidArgument(_))
    ));
    // Singular despite a nonzero diagonal
    assert!(matches!(
        table.compensate(&["FITC-A", "PE-A"], &[1.0, 1.0, 1.0, 1.0]),
        Err(TableError::InvalidMatrix(_))
    ));
    assert_eq!(table, original);
}

#[test]
fn test_unknown_name_checked_even_for_identity() {
    let mut table = fluorescence_table(ValueType::Float, 2);
    assert!(table
        .compensate(&["FITC-A", "nope"], &[1.0, 0.0, 0.0, 1.0])
        .is_err());
}

#[test]
fn test_empty_table_compensates() {
    let mut table = fluorescence_table(ValueType::Double, 0);
    table.compensate(&CHANNELS, &SPILLOVER).unwrap();
    assert_eq!(table.number_of_events(), 0);
}
