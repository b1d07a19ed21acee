//! Read-only listing commands backed by the embedded data files.
//!
//! Each handler loads its data set (honouring any override path in the
//! configuration) and prints one entry per line so output can be piped.

use covisearch_core::{
    load_catalog, load_city_directory, load_city_locations, load_sources, nearby_cities,
    AppConfig, Catalog, NearbyCity,
};

/// List cities whose names start with `prefix`.
///
/// # Errors
///
/// Returns an error if an override city file cannot be read.
pub(crate) fn run_cities(config: &AppConfig, prefix: &str) -> anyhow::Result<()> {
    let directory = load_city_directory(config.cities_path.as_deref())?;
    let matches = directory.filter_prefix(prefix);
    if matches.is_empty() {
        println!("no cities match '{}'", prefix.trim());
        return Ok(());
    }
    for name in matches {
        println!("{name}");
    }
    Ok(())
}

/// Print the closest known cities to `city`.
///
/// An unknown city is reported on stdout and is not an error.
///
/// # Errors
///
/// Returns an error if an override locations file cannot be read or parsed.
pub(crate) fn run_nearby(config: &AppConfig, city: &str) -> anyhow::Result<()> {
    let locations = load_city_locations(config.city_locations_path.as_deref())?;
    match nearby_cities(city, &locations) {
        Some(nearby) => {
            for line in nearby_lines(&nearby) {
                println!("{line}");
            }
        }
        None => println!("no location known for '{}'", city.trim()),
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if an override catalog file cannot be read or is invalid.
pub(crate) fn run_resources(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = load_catalog(config.resources_path.as_deref())?;
    for line in resource_lines(&catalog) {
        println!("{line}");
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if an override sources file cannot be read or is invalid.
pub(crate) fn run_sources(config: &AppConfig) -> anyhow::Result<()> {
    let sources = load_sources(config.sources_path.as_deref())?;
    let width = sources.iter().map(|s| s.name.len()).max().unwrap_or(0) + 2;
    for source in &sources {
        println!("{:<width$}{}", source.name, source.url);
    }
    Ok(())
}

pub(crate) fn nearby_lines(nearby: &[NearbyCity]) -> Vec<String> {
    nearby
        .iter()
        .map(|n| format!("{:<20}{:>6.0} mi", n.city, n.distance_miles))
        .collect()
}

/// One line per category: `value` then the display name. Subcategories are
/// indented under their group.
pub(crate) fn resource_lines(catalog: &Catalog) -> Vec<String> {
    let mut lines = Vec::new();
    for resource in catalog.resources() {
        lines.push(format!("{:<22}{}", resource.value, resource.display_name));
        for child in &resource.children {
            lines.push(format!("  {:<20}{}", child.value, child.display_name));
        }
    }
    lines
}
