pub mod app_config;
pub mod catalog;
pub mod cities;
pub mod config;
pub mod lead;
pub mod share;
pub mod sources;
pub mod verified;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, Catalog, ResourceCategory, SearchFilter};
pub use cities::{
    distance_miles, load_city_directory, load_city_locations, nearby_cities,
    parse_city_locations, CityDirectory, CityLocation, NearbyCity, NEARBY_CITY_LIMIT,
};
pub use config::{
    load_app_config, load_app_config_from_env, DEFAULT_API_BASE_URL, DEFAULT_SITE_URL,
};
pub use lead::{LeadRecord, LeadSourceRef, MetaInfo, SearchResponse, SearchResult};
pub use share::{format_lead, whatsapp_link, ShareMode};
pub use sources::{load_sources, DataSource};
pub use verified::{format_relative, format_timestamp};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read data file {path}: {source}")]
    DataFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse resource catalog: {0}")]
    CatalogParse(#[source] serde_yaml::Error),

    #[error("failed to parse source list: {0}")]
    SourcesParse(#[source] serde_yaml::Error),

    #[error("failed to parse city locations: {0}")]
    LocationsParse(#[source] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
