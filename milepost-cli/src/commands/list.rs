use anyhow::Result;
use std::path::PathBuf;

use super::{format_chainage, load_store};

pub fn run(data: Option<PathBuf>) -> Result<()> {
    let store = load_store(data)?;

    let roads: Vec<String> = store.roads().map(str::to_string).collect();
    if roads.is_empty() {
        println!("No milestones loaded");
        return Ok(());
    }

    println!("{:<12} {:>10} {:>12} {:>12}", "ROAD", "MILESTONES", "FROM", "TO");
    println!("{}", "-".repeat(50));

    for road in &roads {
        if let Some(extent) = store.road_extent(road) {
            println!(
                "{:<12} {:>10} {:>12} {:>12}",
                road,
                extent.milestones,
                format_chainage(extent.min_mileage),
                format_chainage(extent.max_mileage)
            );
        }
    }

    let stats = store.stats();
    println!();
    println!("Summary:");
    println!("  Roads: {}", stats.roads);
    println!("  Milestones: {}", stats.milestones);

    Ok(())
}
