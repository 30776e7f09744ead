//! Package recipe (`recipe.toml`) parsing and validation.
//!
//! ```toml
//! [package]
//! name = "h5pp"
//! version = "1.11.1"
//! license = "MIT"
//! standard = 17
//!
//! [options]
//! with_eigen = true
//! with_spdlog = true
//!
//! [requires]
//! hdf5 = { version = "1.14.0", transitive-headers = true, transitive-libs = true }
//! eigen = { version = "3.4.0", option = "with_eigen", transitive-headers = true }
//! ```

use crate::gate::REQUIRED_STANDARD;
use crate::options::FeatureOptionSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// The recipe filename.
pub const RECIPE_FILE: &str = "recipe.toml";

/// Errors that can occur when working with recipes.
#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("failed to read recipe file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse recipe: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid package name '{0}': {1}")]
    InvalidName(String, &'static str),

    #[error("invalid version '{0}': {1}")]
    InvalidVersion(String, String),

    #[error("invalid version '{version}' for requirement '{requirement}': {reason}")]
    InvalidRequirement {
        requirement: String,
        version: String,
        reason: String,
    },

    #[error("requirement '{requirement}' is gated on undeclared option '{option}'")]
    UndeclaredOption { requirement: String, option: String },

    #[error("unsupported language standard level {0}, compiler minimums are only known for C++17")]
    UnsupportedStandard(u16),
}

/// The complete recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recipe {
    /// Package metadata (required).
    pub package: Package,

    /// Declared options with their default values.
    #[serde(default)]
    pub options: BTreeMap<String, bool>,

    /// Third-party requirements.
    #[serde(default)]
    pub requires: BTreeMap<String, Requirement>,
}

/// Package metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Package {
    /// Package name (required).
    pub name: String,

    /// Package version (required, semver).
    pub version: String,

    /// Short description.
    #[serde(default)]
    pub description: Option<String>,

    /// Homepage URL.
    #[serde(default)]
    pub homepage: Option<String>,

    /// Package author.
    #[serde(default)]
    pub author: Option<String>,

    /// SPDX license identifier.
    #[serde(default)]
    pub license: Option<String>,

    /// Topics for package discovery.
    #[serde(default)]
    pub topics: Vec<String>,

    /// Language standard level the sources are written against.
    #[serde(default = "default_standard")]
    pub standard: u16,
}

fn default_standard() -> u16 {
    REQUIRED_STANDARD
}

/// A third-party requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Requirement {
    /// Exact version to require.
    pub version: String,

    /// Option that must be enabled for this requirement to apply.
    #[serde(default)]
    pub option: Option<String>,

    /// Whether consumers see this requirement's headers.
    #[serde(default, rename = "transitive-headers")]
    pub transitive_headers: bool,

    /// Whether consumers link this requirement's libraries.
    #[serde(default, rename = "transitive-libs")]
    pub transitive_libs: bool,
}

impl Requirement {
    fn new(version: &str, option: Option<&str>, headers: bool, libs: bool) -> Self {
        Self {
            version: version.to_string(),
            option: option.map(str::to_string),
            transitive_headers: headers,
            transitive_libs: libs,
        }
    }
}

/// A requirement that applies under the current options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRequirement {
    /// Requirement name.
    pub name: String,
    /// Required version.
    pub version: String,
    /// Whether consumers see this requirement's headers.
    pub transitive_headers: bool,
    /// Whether consumers link this requirement's libraries.
    pub transitive_libs: bool,
}

impl ResolvedRequirement {
    /// The `name/version` reference.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

impl std::fmt::Display for ResolvedRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl Recipe {
    /// Load a recipe from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RecipeError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a recipe from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn parse(content: &str) -> Result<Self, RecipeError> {
        let recipe: Self = toml::from_str(content)?;
        recipe.validate()?;
        Ok(recipe)
    }

    /// Validate the recipe.
    fn validate(&self) -> Result<(), RecipeError> {
        let package = &self.package;
        check_reference_name(&package.name)
            .map_err(|reason| RecipeError::InvalidName(package.name.clone(), reason))?;
        check_version(&package.version)
            .map_err(|reason| RecipeError::InvalidVersion(package.version.clone(), reason))?;

        if package.standard != REQUIRED_STANDARD {
            return Err(RecipeError::UnsupportedStandard(package.standard));
        }

        for (name, requirement) in &self.requires {
            check_reference_name(name)
                .map_err(|reason| RecipeError::InvalidName(name.clone(), reason))?;
            check_version(&requirement.version).map_err(|reason| {
                RecipeError::InvalidRequirement {
                    requirement: name.clone(),
                    version: requirement.version.clone(),
                    reason,
                }
            })?;

            if let Some(option) = &requirement.option {
                if !self.options.contains_key(option) {
                    return Err(RecipeError::UndeclaredOption {
                        requirement: name.clone(),
                        option: option.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Serialize the recipe to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The declared options at their default values.
    #[must_use]
    pub fn default_options(&self) -> FeatureOptionSet {
        self.options.iter().map(|(name, value)| (name.as_str(), *value)).collect()
    }

    /// Overlay caller overrides on the declared defaults.
    ///
    /// Overrides for options the recipe does not declare are dropped.
    #[must_use]
    pub fn resolve_options(&self, overrides: &FeatureOptionSet) -> FeatureOptionSet {
        let mut options = self.default_options();

        for (name, value) in overrides.iter() {
            if self.options.contains_key(name) {
                options.set(name, value);
            } else {
                warn!(
                    option = name,
                    package = %self.package.name,
                    "ignoring override for undeclared option"
                );
            }
        }

        options
    }

    /// Requirements that apply under the given options, in name order.
    ///
    /// Ungated requirements always apply.
    #[must_use]
    pub fn requirements(&self, options: &FeatureOptionSet) -> Vec<ResolvedRequirement> {
        self.requires
            .iter()
            .filter(|(_, requirement)| {
                requirement
                    .option
                    .as_deref()
                    .map_or(true, |option| options.get(option).unwrap_or(false))
            })
            .map(|(name, requirement)| ResolvedRequirement {
                name: name.clone(),
                version: requirement.version.clone(),
                transitive_headers: requirement.transitive_headers,
                transitive_libs: requirement.transitive_libs,
            })
            .collect()
    }
}

/// Reference names are lowercase, 2 to 101 characters, and may not start
/// with `+`, `.` or `-`, so that `name/version` stays unambiguous.
fn check_reference_name(name: &str) -> Result<(), &'static str> {
    if !(2..=101).contains(&name.len()) {
        return Err("name must be between 2 and 101 characters");
    }

    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || "_+.-".contains(c);
    if let Some(bad) = name.chars().find(|c| !allowed(*c)) {
        return Err(if bad.is_ascii_uppercase() {
            "name must be lowercase"
        } else {
            "name can only contain a-z, 0-9, '_', '+', '.' and '-'"
        });
    }

    if name.starts_with(['+', '.', '-']) {
        return Err("name must start with a letter, digit or '_'");
    }

    Ok(())
}

/// Package and requirement versions are pinned, so they must be full semver.
fn check_version(version: &str) -> Result<(), String> {
    semver::Version::parse(version)
        .map(drop)
        .map_err(|e| e.to_string())
}

impl Default for Recipe {
    /// The h5pp 1.11.1 recipe.
    fn default() -> Self {
        let options = BTreeMap::from([
            (String::from("with_eigen"), true),
            (String::from("with_spdlog"), true),
        ]);

        let requires = BTreeMap::from([
            (
                String::from("hdf5"),
                Requirement::new("1.14.0", None, true, true),
            ),
            (
                String::from("eigen"),
                Requirement::new("3.4.0", Some("with_eigen"), true, false),
            ),
            (
                String::from("spdlog"),
                Requirement::new("1.11.0", Some("with_spdlog"), true, true),
            ),
        ]);

        Self {
            package: Package {
                name: String::from("h5pp"),
                version: String::from("1.11.1"),
                description: Some(String::from(
                    "A C++17 wrapper for HDF5 with focus on simplicity",
                )),
                homepage: Some(String::from("https://github.com/DavidAce/h5pp")),
                author: Some(String::from("DavidAce <aceituno@kth.se>")),
                license: Some(String::from("MIT")),
                topics: ["h5pp", "hdf5", "binary", "storage", "header-only", "cpp17"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                standard: REQUIRED_STANDARD,
            },
            options,
            requires,
        }
    }
}
