use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use flowgate_events::codec::{BinaryEventCodec, EventLimit};

use super::Config;

/// Apply a configured spillover matrix to every event of a file
pub fn run(input: PathBuf, output: PathBuf, matrix: Option<String>, config: &Config) -> Result<()> {
    let (name, matrix) = config.matrix(matrix.as_deref())?;
    let values = matrix
        .flatten()
        .with_context(|| format!("Matrix '{}' is malformed", name))?;

    let mut codec = BinaryEventCodec::with_config(config.codec_config());
    let mut table = codec
        .load(&input, EventLimit::All)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    // Drop the codec's handle so the table is mutated in place, not copied
    codec.take_event_table();
    let events = Arc::make_mut(&mut table);

    info!(
        "Compensating {} events with matrix '{}' over {}",
        events.number_of_events(),
        name,
        matrix.parameters.join(", ")
    );
    events
        .compensate(&matrix.parameters, &values)
        .with_context(|| format!("Failed to apply matrix '{}'", name))?;
    events.compute_data_min_max();

    codec
        .save(table, &output, EventLimit::All)
        .with_context(|| format!("Failed to save {}", output.display()))?;

    println!(
        "Compensated {} parameters with '{}', wrote {}",
        matrix.parameters.len(),
        name,
        output.display()
    );
    Ok(())
}
