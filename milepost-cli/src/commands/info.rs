use anyhow::Result;
use std::path::PathBuf;

use super::{format_chainage, load_store};

/// Line-type suffix appended to road names that omit it.
const LINE_SUFFIX: char = '線';

pub fn run(data: Option<PathBuf>, road: &str) -> Result<()> {
    let store = load_store(data)?;

    // Accept suffix-less road names the way descriptors do
    let mut road = road.to_string();
    if !road.ends_with(LINE_SUFFIX) {
        road.push(LINE_SUFFIX);
    }

    let Some(extent) = store.road_extent(&road) else {
        anyhow::bail!("No milestones recorded for {road}");
    };

    println!("Road: {road}");
    println!("  Milestones: {}", extent.milestones);
    println!(
        "  Extent: {} to {}",
        format_chainage(extent.min_mileage),
        format_chainage(extent.max_mileage)
    );
    println!(
        "  Length covered: {:.1} km",
        f64::from(extent.max_mileage - extent.min_mileage) / 1000.0
    );

    Ok(())
}
