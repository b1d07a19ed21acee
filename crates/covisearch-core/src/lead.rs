//! Lead records as returned by the aggregation API.
//!
//! Every field of a lead is optional: the aggregator merges records scraped
//! from many sites and forwards whatever each one had. Counts use `i64`
//! because sources report "unknown" as a negative number.

use serde::{Deserialize, Serialize};

/// One upstream site a lead was seen on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSourceRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub phones: Option<Vec<String>>,
    #[serde(default)]
    pub litres: Option<f64>,

    #[serde(default)]
    pub available_no_ventilator_beds: Option<i64>,
    #[serde(default)]
    pub available_ventilator_beds: Option<i64>,
    #[serde(default)]
    pub total_available_icu_beds: Option<i64>,
    #[serde(default)]
    pub available_ventilators: Option<i64>,

    #[serde(default)]
    pub available_no_oxygen_beds: Option<i64>,
    #[serde(default)]
    pub available_oxygen_beds: Option<i64>,
    #[serde(default)]
    pub available_covid_beds: Option<i64>,
    #[serde(default)]
    pub total_available_beds: Option<i64>,

    #[serde(default)]
    pub hospital_type: Option<String>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub resource_subtype: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<LeadSourceRef>>,
    #[serde(default)]
    pub card_source_url: Option<String>,
    /// RFC 3339 timestamp of the original post.
    #[serde(default)]
    pub post_time: Option<String>,
    /// RFC 3339 timestamp of the last verification.
    #[serde(default)]
    pub last_verified_utc: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl LeadRecord {
    /// URL of the first listed source, if any.
    #[must_use]
    pub fn first_source_url(&self) -> Option<&str> {
        self.sources
            .as_deref()?
            .first()
            .and_then(|s| s.url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaInfo {
    #[serde(default)]
    pub more_data_available: bool,
}

/// Success body of the query endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub resource_info_data: Vec<LeadRecord>,
    #[serde(default)]
    pub meta_info: MetaInfo,
}

/// One page of leads plus the pagination hint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    pub leads: Vec<LeadRecord>,
    pub has_more_data: bool,
}

impl From<SearchResponse> for SearchResult {
    fn from(response: SearchResponse) -> Self {
        Self {
            leads: response.resource_info_data,
            has_more_data: response.meta_info.more_data_available,
        }
    }
}
