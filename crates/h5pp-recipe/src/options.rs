//! Boolean feature options controlling optional third-party integrations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur when parsing option assignments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("invalid option assignment '{0}', expected name=value")]
    MissingValue(String),

    #[error("invalid value '{value}' for option '{name}', expected true or false")]
    InvalidValue { name: String, value: String },
}

/// Feature options with a known effect on the build flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureOption {
    /// Eigen3 matrix type support.
    Eigen,
    /// spdlog logging (brings fmt along).
    Spdlog,
    /// fmt formatting without spdlog.
    Fmt,
}

impl FeatureOption {
    /// All recognized options, in derivation order.
    pub const ALL: [Self; 3] = [Self::Eigen, Self::Spdlog, Self::Fmt];

    /// Returns the option name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Eigen => "with_eigen",
            Self::Spdlog => "with_spdlog",
            Self::Fmt => "with_fmt",
        }
    }

    /// Look up an option by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.name() == name)
    }
}

impl std::fmt::Display for FeatureOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Option name to value mapping supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureOptionSet {
    values: BTreeMap<String, bool>,
}

impl FeatureOptionSet {
    /// Create an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option value.
    pub fn set(&mut self, name: impl Into<String>, value: bool) {
        self.values.insert(name.into(), value);
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: bool) -> Self {
        self.set(name, value);
        self
    }

    /// Get an option value, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    /// Returns true if a recognized option is present and true.
    #[must_use]
    pub fn is_enabled(&self, option: FeatureOption) -> bool {
        self.get(option.name()).unwrap_or(false)
    }

    /// Returns true if the named option is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate over options in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Names with no known effect on the build flags.
    pub fn unrecognized(&self) -> impl Iterator<Item = &str> {
        self.values
            .keys()
            .map(String::as_str)
            .filter(|name| FeatureOption::from_name(name).is_none())
    }

    /// Returns the number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for FeatureOptionSet {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

impl<K: Into<String>> Extend<(K, bool)> for FeatureOptionSet {
    fn extend<I: IntoIterator<Item = (K, bool)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.set(name, value);
        }
    }
}

/// Parse an assignment such as `with_eigen=false`.
///
/// Accepts `true`/`false` in any case as well as `1`/`0`.
pub fn parse_assignment(assignment: &str) -> Result<(String, bool), OptionError> {
    let (name, value) = assignment
        .split_once('=')
        .ok_or_else(|| OptionError::MissingValue(assignment.to_string()))?;
    let name = name.trim();
    let value = value.trim();

    if name.is_empty() {
        return Err(OptionError::MissingValue(assignment.to_string()));
    }

    let parsed = match value.to_ascii_lowercase().as_str() {
        "true" | "1" => true,
        "false" | "0" => false,
        _ => {
            return Err(OptionError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
            })
        }
    };

    Ok((name.to_string(), parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_names_round_trip() {
        for option in FeatureOption::ALL {
            assert_eq!(FeatureOption::from_name(option.name()), Some(option));
        }
        assert_eq!(FeatureOption::from_name("with_boost"), None);
    }

    #[test]
    fn enabled_requires_true_value() {
        let options = FeatureOptionSet::new()
            .with("with_eigen", true)
            .with("with_spdlog", false);
        assert!(options.is_enabled(FeatureOption::Eigen));
        assert!(!options.is_enabled(FeatureOption::Spdlog));
        assert!(!options.is_enabled(FeatureOption::Fmt));
    }

    #[test]
    fn unrecognized_names() {
        let options: FeatureOptionSet = [("with_eigen", true), ("shared", false), ("fPIC", true)]
            .into_iter()
            .collect();
        let unknown: Vec<_> = options.unrecognized().collect();
        assert_eq!(unknown, vec!["fPIC", "shared"]);
    }

    #[test]
    fn later_values_win() {
        let mut options = FeatureOptionSet::new().with("with_eigen", true);
        options.extend([("with_eigen", false)]);
        assert_eq!(options.get("with_eigen"), Some(false));
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn parse_assignments() {
        assert_eq!(
            parse_assignment("with_eigen=False").unwrap(),
            ("with_eigen".to_string(), false)
        );
        assert_eq!(
            parse_assignment(" with_fmt = 1 ").unwrap(),
            ("with_fmt".to_string(), true)
        );
        assert!(matches!(
            parse_assignment("with_eigen"),
            Err(OptionError::MissingValue(_))
        ));
        assert!(matches!(
            parse_assignment("=true"),
            Err(OptionError::MissingValue(_))
        ));
        assert!(matches!(
            parse_assignment("with_eigen=yes"),
            Err(OptionError::InvalidValue { .. })
        ));
    }
}
