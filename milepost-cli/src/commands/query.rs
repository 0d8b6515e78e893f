use anyhow::{Context, Result};
use milepost::{descriptor, resolver, Milestone, MilepostError};
use serde::Serialize;
use std::path::PathBuf;

use super::load_store;

#[derive(Serialize)]
struct PositionOutput {
    road: String,
    mileage: u32,
    latitude: f32,
    longitude: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    lower: Option<Milestone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upper: Option<Milestone>,
}

#[derive(Serialize)]
struct ErrorOutput {
    error: String,
}

pub fn run(data: Option<PathBuf>, position: &str, debug: bool, json: bool) -> Result<()> {
    let store = load_store(data)?;

    let query = descriptor::parse(position)
        .with_context(|| format!("Failed to parse descriptor {position:?}"))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to create runtime")?;

    match runtime.block_on(resolver::resolve(&store, &query)) {
        Ok(resolved) => {
            if json {
                let (lower, upper) = if debug {
                    (
                        Some(resolved.bracket.lower.clone()),
                        Some(resolved.bracket.upper.clone()),
                    )
                } else {
                    (None, None)
                };
                let output = PositionOutput {
                    road: resolved.road,
                    mileage: resolved.mileage,
                    latitude: resolved.latitude,
                    longitude: resolved.longitude,
                    lower,
                    upper,
                };
                println!("{}", serde_json::to_string(&output)?);
            } else {
                println!(
                    "{} {} -> {}, {}",
                    resolved.road,
                    super::format_chainage(resolved.mileage),
                    resolved.latitude,
                    resolved.longitude
                );
                if debug {
                    let bracket = &resolved.bracket;
                    println!(
                        "  lower: {} ({}, {})",
                        super::format_chainage(bracket.lower.mileage),
                        bracket.lower.latitude,
                        bracket.lower.longitude
                    );
                    println!(
                        "  upper: {} ({}, {})",
                        super::format_chainage(bracket.upper.mileage),
                        bracket.upper.latitude,
                        bracket.upper.longitude
                    );
                }
            }
            Ok(())
        }
        Err(e @ MilepostError::NotFound { .. }) => {
            if json {
                let output = ErrorOutput {
                    error: e.to_string(),
                };
                println!("{}", serde_json::to_string(&output)?);
            } else {
                println!("not found");
            }
            Ok(())
        }
        Err(e) => Err(e).context("Failed to resolve position"),
    }
}
