//! City directory and nearest-city ranking.
//!
//! Two data sets back this module: a line-delimited list of city names used
//! for typeahead filtering, and a JSON list of city coordinates used to
//! suggest nearby cities when a search comes back thin.

use std::collections::HashSet;
use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const EMBEDDED_CITIES: &str = include_str!("../data/cities.txt");
const EMBEDDED_CITY_LOCATIONS: &str = include_str!("../data/city_locations.json");

/// Number of suggestions returned by [`nearby_cities`].
pub const NEARBY_CITY_LIMIT: usize = 5;

/// Statute miles per nautical mile.
const MILES_PER_NAUTICAL_MILE: f64 = 1.1515;

#[derive(Debug, Clone, Default)]
pub struct CityDirectory {
    names: Vec<String>,
}

impl CityDirectory {
    /// Builds a directory from line-delimited text.
    ///
    /// Blank lines are skipped and names are trimmed. Later duplicates
    /// (compared case-insensitively) are dropped; order is otherwise kept.
    #[must_use]
    pub fn from_lines(content: &str) -> Self {
        let mut seen = HashSet::new();
        let names = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| seen.insert(line.to_lowercase()))
            .map(str::to_owned)
            .collect();
        Self { names }
    }

    #[must_use]
    pub fn embedded() -> Self {
        Self::from_lines(EMBEDDED_CITIES)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names starting with `prefix`, case-insensitively. An empty prefix
    /// matches everything.
    #[must_use]
    pub fn filter_prefix(&self, prefix: &str) -> Vec<&str> {
        let prefix = prefix.trim().to_lowercase();
        self.names
            .iter()
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .map(String::as_str)
            .collect()
    }

    /// Exact (case-insensitive) lookup, returning the canonical spelling.
    #[must_use]
    pub fn canonical(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.names
            .iter()
            .find(|n| same_city(n, name))
            .map(String::as_str)
    }
}

/// City names compare by full Unicode lowercase, the same folding
/// [`CityDirectory::filter_prefix`] uses.
fn same_city(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Loads the city list from `path`, or the embedded one when `path` is `None`.
///
/// # Errors
///
/// Returns [`ConfigError::DataFileIo`] if the file cannot be read.
pub fn load_city_directory(path: Option<&Path>) -> Result<CityDirectory, ConfigError> {
    match path {
        Some(path) => {
            let content = read_data_file(path)?;
            Ok(CityDirectory::from_lines(&content))
        }
        None => Ok(CityDirectory::embedded()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityLocation {
    pub city: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
struct CityLocationsFile {
    cities: Vec<CityLocation>,
}

/// Parses `{"cities": [{"city", "lat", "lng"}, ...]}`.
///
/// # Errors
///
/// Returns [`ConfigError::LocationsParse`] on malformed JSON and
/// [`ConfigError::Validation`] for coordinates outside the valid range.
pub fn parse_city_locations(content: &str) -> Result<Vec<CityLocation>, ConfigError> {
    let file: CityLocationsFile =
        serde_json::from_str(content).map_err(ConfigError::LocationsParse)?;
    for loc in &file.cities {
        if !(-90.0..=90.0).contains(&loc.lat) || !(-180.0..=180.0).contains(&loc.lng) {
            return Err(ConfigError::Validation(format!(
                "city '{}' has out-of-range coordinates ({}, {})",
                loc.city, loc.lat, loc.lng
            )));
        }
    }
    Ok(file.cities)
}

/// Loads city coordinates from `path`, or the embedded set when `path` is `None`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_city_locations(path: Option<&Path>) -> Result<Vec<CityLocation>, ConfigError> {
    match path {
        Some(path) => parse_city_locations(&read_data_file(path)?),
        None => parse_city_locations(EMBEDDED_CITY_LOCATIONS),
    }
}

fn read_data_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::DataFileIo {
        path: path.display().to_string(),
        source: e,
    })
}

/// Great-circle distance in statute miles by the spherical law of cosines.
///
/// The cosine term is clamped because coincident points can round to just
/// above 1, which would make `acos` return NaN.
#[must_use]
pub fn distance_miles(a: &CityLocation, b: &CityLocation) -> f64 {
    let lat1 = a.lat * PI / 180.0;
    let lat2 = b.lat * PI / 180.0;
    let theta = (a.lng - b.lng) * PI / 180.0;

    let cos_angle = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * theta.cos();
    let angle = cos_angle.clamp(-1.0, 1.0).acos();

    angle * 180.0 / PI * 60.0 * MILES_PER_NAUTICAL_MILE
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyCity {
    pub city: String,
    pub distance_miles: f64,
}

/// Ranks the cities closest to `target`.
///
/// Returns `None` when `target` has no known coordinates; callers treat that
/// as "no suggestions" rather than an error. The target itself is never
/// included and at most [`NEARBY_CITY_LIMIT`] entries come back, nearest first.
#[must_use]
pub fn nearby_cities(target: &str, locations: &[CityLocation]) -> Option<Vec<NearbyCity>> {
    let target = target.trim();
    let origin = locations
        .iter()
        .find(|loc| same_city(&loc.city, target))?;

    let mut ranked: Vec<NearbyCity> = locations
        .iter()
        .filter(|loc| !same_city(&loc.city, &origin.city))
        .map(|loc| NearbyCity {
            city: loc.city.clone(),
            distance_miles: distance_miles(origin, loc),
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    ranked.truncate(NEARBY_CITY_LIMIT);
    Some(ranked)
}
