use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use flowgate_events::codec::{BinaryEventCodec, EventLimit};
use flowgate_events::compensation::invert_matrix;
use flowgate_events::table::{EventTable, ValueType};

use super::Config;

const CHANNELS: [(&str, &str); 5] = [
    ("FSC-A", "Forward Scatter"),
    ("SSC-A", "Side Scatter"),
    ("FITC-A", "CD3 FITC"),
    ("PE-A", "CD4 PE"),
    ("APC-A", "CD8 APC"),
];

const FLUORESCENCE: [&str; 3] = ["FITC-A", "PE-A", "APC-A"];

/// Spillover between the fluorescence channels, row-major
const SPILLOVER: [f64; 9] = [
    1.0, 0.21, 0.02, //
    0.04, 1.0, 0.09, //
    0.0, 0.03, 1.0,
];

/// Full-scale value of an 18-bit detector
const DETECTOR_MAX: f64 = 262_143.0;

/// Generate a synthetic stained-lymphocyte run with spillover applied
pub fn run(output: PathBuf, events: usize, double: bool, config: &Config) -> Result<()> {
    let value_type = if double {
        ValueType::Double
    } else {
        ValueType::Float
    };
    let names: Vec<&str> = CHANNELS.iter().map(|(name, _)| *name).collect();
    let mut table = EventTable::new(&names, events, value_type)?;

    for (index, (_, long_name)) in CHANNELS.iter().enumerate() {
        table.set_long_name(index, Some(*long_name))?;
        table.set_specified_min(index, 0.0)?;
        table.set_specified_max(index, DETECTOR_MAX)?;
    }

    info!("Generating {} synthetic events...", events);
    for event in 0..events {
        let t = event as f64;
        // Three populations: CD4+ T cells, CD8+ T cells, CD3- cells
        let population = event % 3;
        let fsc = 60_000.0 + (t * 0.013).sin() * 12_000.0;
        let ssc = 25_000.0 + (t * 0.029).cos().abs() * 8_000.0;
        let cd3 = if population < 2 { 40_000.0 } else { 800.0 };
        let cd4 = if population == 0 { 55_000.0 } else { 600.0 };
        let cd8 = if population == 1 { 30_000.0 } else { 400.0 };
        let jitter = 1.0 + (t * 0.371).sin() * 0.08;

        table.set_value(0, event, fsc)?;
        table.set_value(1, event, ssc)?;
        table.set_value(2, event, cd3 * jitter)?;
        table.set_value(3, event, cd4 * jitter)?;
        table.set_value(4, event, cd8 * jitter)?;
    }

    // Compensating with S⁻¹ multiplies each event by S, i.e. adds spillover
    let inverse = invert_matrix(&SPILLOVER, FLUORESCENCE.len())?;
    table.compensate(&FLUORESCENCE, &inverse)?;
    table.compute_data_min_max();

    let mut codec = BinaryEventCodec::with_config(config.codec_config());
    codec
        .save(table, &output, EventLimit::All)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote {} events to {}", events, output.display());
    println!();
    println!("Config to remove the simulated spillover:");
    println!();
    println!("[matrices.demo]");
    println!("parameters = {:?}", FLUORESCENCE);
    println!("rows = [");
    for row in SPILLOVER.chunks(FLUORESCENCE.len()) {
        println!("    {:?},", row);
    }
    println!("]");
    Ok(())
}
