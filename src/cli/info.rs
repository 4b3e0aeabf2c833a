use anyhow::{Context, Result};
use std::path::PathBuf;

use flowgate_events::codec::{BinaryEventCodec, EventLimit};

use super::{heading, Config};

/// Display header information about a binary event file
pub fn run(file: PathBuf, json: bool, config: &Config) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let mut codec = BinaryEventCodec::with_config(config.codec_config());
    let table = codec
        .load(&file, EventLimit::HeaderOnly)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    if json {
        let parameters: Vec<_> = table
            .columns()
            .map(|column| {
                serde_json::json!({
                    "name": column.name(),
                    "longName": column.long_name(),
                    "specifiedMin": column.specified_min(),
                    "specifiedMax": column.specified_max(),
                })
            })
            .collect();
        let report = serde_json::json!({
            "attributes": codec.attributes(),
            "parameters": parameters,
            "log": codec.log().entries(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", heading("Binary Event File Information"));
    println!("=============================");
    println!("File: {}", file.display());
    println!();

    println!("{}", heading("Attributes:"));
    for (key, value) in codec.attributes().iter() {
        println!("  {}: {}", key, value);
    }
    println!();

    println!("{}", heading("Parameters:"));
    for (i, column) in table.columns().enumerate() {
        println!(
            "  {:3}. {:<16} {:<24} [{}, {}]",
            i + 1,
            column.name(),
            column.long_name().unwrap_or("-"),
            column.specified_min(),
            column.specified_max()
        );
    }

    let warnings: Vec<_> = codec.log().warnings().collect();
    if !warnings.is_empty() {
        println!();
        println!("{}", heading("Warnings:"));
        for warning in warnings {
            println!("  {}", warning);
        }
    }

    Ok(())
}
