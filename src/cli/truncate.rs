use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use flowgate_events::codec::{BinaryEventCodec, EventLimit};

use super::Config;

/// Copy the first `max_events` events of each parameter into a new file
pub fn run(input: PathBuf, output: PathBuf, max_events: i64, config: &Config) -> Result<()> {
    let limit = EventLimit::from_max_events(max_events)?;
    let mut codec = BinaryEventCodec::with_config(config.codec_config());

    let table = codec
        .load(&input, limit)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    info!(
        "Read {} of {} events from {}",
        table.number_of_events(),
        table.number_of_original_events(),
        input.display()
    );

    codec
        .save(Arc::clone(&table), &output, EventLimit::All)
        .with_context(|| format!("Failed to save {}", output.display()))?;

    println!(
        "Wrote {} of {} events ({} parameters) to {}",
        table.number_of_events(),
        table.number_of_original_events(),
        table.number_of_parameters(),
        output.display()
    );
    Ok(())
}
