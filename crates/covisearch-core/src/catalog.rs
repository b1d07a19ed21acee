//! Resource catalog: the categories a user can search for.
//!
//! The catalog ships embedded in the binary (`data/resources.yaml`) and may be
//! replaced by a file on disk. A category with children is a grouping only;
//! queries always go out with the value of the selected child. Every such
//! parent carries an "all" child whose value equals its own, so picking "all"
//! queries exactly what the parent would.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const EMBEDDED_RESOURCES: &str = include_str!("../data/resources.yaml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCategory {
    pub display_name: String,
    /// Value sent as `resource_type` on the query endpoint.
    pub value: String,
    pub image: String,
    /// Group label carried by subcategories, e.g. `"Oxygen Equipment"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ResourceCategory>,
}

impl ResourceCategory {
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The child that stands for the whole category.
    #[must_use]
    pub fn all_child(&self) -> Option<&ResourceCategory> {
        self.children.iter().find(|c| c.value == self.value)
    }

    /// Finds a child by value or display name, case-insensitively.
    #[must_use]
    pub fn find_child(&self, key: &str) -> Option<&ResourceCategory> {
        find_by_key(&self.children, key)
    }
}

fn find_by_key<'a>(list: &'a [ResourceCategory], key: &str) -> Option<&'a ResourceCategory> {
    let key = key.trim();
    list.iter()
        .find(|c| c.value.eq_ignore_ascii_case(key))
        .or_else(|| list.iter().find(|c| c.display_name.eq_ignore_ascii_case(key)))
}

/// The user's current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub city: String,
    pub resource: ResourceCategory,
    pub subresource: Option<ResourceCategory>,
}

impl SearchFilter {
    #[must_use]
    pub fn new(
        city: impl Into<String>,
        resource: ResourceCategory,
        subresource: Option<ResourceCategory>,
    ) -> Self {
        Self {
            city: city.into(),
            resource,
            subresource,
        }
    }

    /// Returns the category that is actually queried.
    ///
    /// For a category with children this is the chosen subcategory, and
    /// `None` when none has been chosen yet or the choice is not one of its
    /// children. Otherwise it is the category itself and any stray
    /// `subresource` is ignored.
    #[must_use]
    pub fn resolve(&self) -> Option<&ResourceCategory> {
        if self.resource.has_children() {
            self.subresource
                .as_ref()
                .filter(|sub| self.resource.children.contains(sub))
        } else {
            Some(&self.resource)
        }
    }

    /// Query value of the resolved category.
    #[must_use]
    pub fn query_value(&self) -> Option<&str> {
        self.resolve().map(|r| r.value.as_str())
    }

    /// Display label of the resolved category, falling back to the parent's
    /// name while no subcategory is chosen.
    #[must_use]
    pub fn label(&self) -> &str {
        self.resolve()
            .map_or(self.resource.display_name.as_str(), |r| r.display_name.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    resources: Vec<ResourceCategory>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    resources: Vec<ResourceCategory>,
}

impl Catalog {
    /// Parses and validates a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CatalogParse`] on malformed YAML and
    /// [`ConfigError::Validation`] when the catalog breaks its invariants.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = serde_yaml::from_str(content).map_err(ConfigError::CatalogParse)?;
        validate_catalog(&file.resources)?;
        Ok(Self {
            resources: file.resources,
        })
    }

    /// The catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded file is broken.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_yaml_str(EMBEDDED_RESOURCES)
    }

    #[must_use]
    pub fn resources(&self) -> &[ResourceCategory] {
        &self.resources
    }

    /// Finds a top-level category by value or display name, case-insensitively.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&ResourceCategory> {
        find_by_key(&self.resources, key)
    }
}

/// Loads the catalog from `path`, or the embedded one when `path` is `None`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, ConfigError> {
    match path {
        Some(path) => {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::DataFileIo {
                    path: path.display().to_string(),
                    source: e,
                })?;
            Catalog::from_yaml_str(&content)
        }
        None => Catalog::embedded(),
    }
}

fn validate_catalog(resources: &[ResourceCategory]) -> Result<(), ConfigError> {
    if resources.is_empty() {
        return Err(ConfigError::Validation(
            "resource catalog must list at least one category".to_string(),
        ));
    }

    validate_siblings(resources, "top level")?;

    for parent in resources.iter().filter(|r| r.has_children()) {
        validate_siblings(&parent.children, &parent.display_name)?;

        if parent.children.iter().any(ResourceCategory::has_children) {
            return Err(ConfigError::Validation(format!(
                "category '{}' nests deeper than one level",
                parent.display_name
            )));
        }

        if parent.all_child().is_none() {
            return Err(ConfigError::Validation(format!(
                "category '{}' has children but none with its own value '{}'",
                parent.display_name, parent.value
            )));
        }
    }

    Ok(())
}

fn validate_siblings(list: &[ResourceCategory], scope: &str) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for item in list {
        if item.display_name.trim().is_empty() || item.value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category under {scope} has an empty name or value"
            )));
        }
        if !seen.insert(item.value.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate value '{}' under {scope}",
                item.value
            )));
        }
    }
    Ok(())
}
