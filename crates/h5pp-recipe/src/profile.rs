//! Build profile (`profile.toml`) describing the build environment.
//!
//! ```toml
//! [settings]
//! os = "Linux"
//! arch = "x86_64"
//! build_type = "Release"
//!
//! [settings.compiler]
//! name = "gcc"
//! version = "9.4"
//! cppstd = "gnu17"
//! libcxx = "libstdc++11"
//!
//! [options]
//! with_spdlog = false
//! ```

use crate::compiler::{CompilerError, CompilerIdentity, CppStandard};
use crate::options::FeatureOptionSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// The profile filename.
pub const PROFILE_FILE: &str = "profile.toml";

/// Errors that can occur when working with profiles.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("failed to read profile file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse profile: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("profile has no [settings.compiler] section")]
    MissingCompiler,

    #[error("invalid compiler settings: {0}")]
    Compiler(#[from] CompilerError),
}

/// The complete profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// Environment settings.
    #[serde(default)]
    pub settings: Settings,

    /// Option overrides.
    #[serde(default)]
    pub options: BTreeMap<String, bool>,
}

/// Environment settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Target operating system.
    #[serde(default)]
    pub os: Option<String>,

    /// Target architecture.
    #[serde(default)]
    pub arch: Option<String>,

    /// Build type (`Release`, `Debug`, ...).
    #[serde(default)]
    pub build_type: Option<String>,

    /// Compiler settings.
    #[serde(default)]
    pub compiler: Option<CompilerSettings>,
}

/// Compiler settings as written in the profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerSettings {
    /// Compiler name (`gcc`, `clang`, `apple-clang`, `msvc`, ...).
    pub name: String,

    /// Compiler version.
    pub version: String,

    /// Explicit language standard (`17`, `gnu17`, ...).
    #[serde(default)]
    pub cppstd: Option<String>,

    /// C++ standard library.
    #[serde(default)]
    pub libcxx: Option<String>,
}

impl CompilerSettings {
    /// Parse these settings into a compiler identity.
    pub fn identity(&self) -> Result<CompilerIdentity, CompilerError> {
        let mut identity = CompilerIdentity::from_settings(&self.name, &self.version)?;

        if let Some(cppstd) = &self.cppstd {
            identity = identity.with_cppstd(cppstd.parse::<CppStandard>()?);
        }
        if let Some(libcxx) = &self.libcxx {
            identity = identity.with_libcxx(libcxx.clone());
        }

        Ok(identity)
    }
}

impl Profile {
    /// Load a profile from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a profile from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ProfileError> {
        Ok(toml::from_str(content)?)
    }

    /// The compiler identity described by this profile.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no compiler settings or they are malformed.
    pub fn compiler_identity(&self) -> Result<CompilerIdentity, ProfileError> {
        let settings = self
            .settings
            .compiler
            .as_ref()
            .ok_or(ProfileError::MissingCompiler)?;
        Ok(settings.identity()?)
    }

    /// Option overrides from the `[options]` section.
    #[must_use]
    pub fn option_overrides(&self) -> FeatureOptionSet {
        self.options.iter().map(|(name, value)| (name.as_str(), *value)).collect()
    }
}
