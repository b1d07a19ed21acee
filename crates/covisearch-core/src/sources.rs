use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const EMBEDDED_SOURCES: &str = include_str!("../data/sources.yaml");

/// An upstream site whose listings feed the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct SourcesFile {
    sources: Vec<DataSource>,
}

/// Loads the source list from `path`, or the embedded one when `path` is `None`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, or an entry
/// has an empty name or a non-http URL.
pub fn load_sources(path: Option<&Path>) -> Result<Vec<DataSource>, ConfigError> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| ConfigError::DataFileIo {
            path: path.display().to_string(),
            source: e,
        })?,
        None => EMBEDDED_SOURCES.to_owned(),
    };

    let file: SourcesFile = serde_yaml::from_str(&content).map_err(ConfigError::SourcesParse)?;
    for source in &file.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }
        if !(source.url.starts_with("http://") || source.url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "source '{}' has invalid url '{}'",
                source.name, source.url
            )));
        }
    }
    Ok(file.sources)
}
