//! Build configuration logic for the h5pp package recipe.
//!
//! This crate provides:
//! - Compiler identity parsing (family, version, language standard setting)
//! - The compatibility gate that refuses compilers without C++17 support
//! - Derivation of preprocessor defines, compiler flags and system libraries
//!   from feature options and the compiler identity
//! - Parsing and validation of `recipe.toml` and `profile.toml` files
//! - The exported package layout consumed by downstream builds

mod compiler;
mod configure;
mod flags;
mod gate;
mod layout;
mod options;
mod profile;
mod recipe;

#[cfg(test)]
mod testutil;

pub use compiler::{CompilerError, CompilerFamily, CompilerIdentity, CompilerVersion, CppStandard};
pub use configure::{configure, BuildConfiguration};
pub use flags::{
    derive_flags, FlagSet, FlagToken, EIGEN_DEFINE, FMT_DEFINE, LEGACY_FILESYSTEM_LIB,
    NOMINMAX_DEFINE, PERMISSIVE_FLAG, SPDLOG_DEFINE,
};
pub use gate::{
    minimum_version, validate_standard, IncompatibleCompilerError, MinimumVersion, Shortfall,
    MINIMUM_VERSIONS, REQUIRED_STANDARD,
};
pub use layout::{Component, PackageLayout};
pub use options::{parse_assignment, FeatureOption, FeatureOptionSet, OptionError};
pub use profile::{CompilerSettings, Profile, ProfileError, Settings, PROFILE_FILE};
pub use recipe::{Package, Recipe, RecipeError, Requirement, ResolvedRequirement, RECIPE_FILE};
