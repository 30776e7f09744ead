//! Build flag derivation from feature options and the compiler identity.

use crate::compiler::{CompilerFamily, CompilerIdentity, CompilerVersion};
use crate::options::{FeatureOption, FeatureOptionSet};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Define enabling Eigen3 support.
pub const EIGEN_DEFINE: &str = "H5PP_USE_EIGEN3";

/// Define enabling spdlog support.
pub const SPDLOG_DEFINE: &str = "H5PP_USE_SPDLOG";

/// Define enabling fmt support.
pub const FMT_DEFINE: &str = "H5PP_USE_FMT";

/// Define keeping `windows.h` from defining `min`/`max` macros.
pub const NOMINMAX_DEFINE: &str = "NOMINMAX";

/// MSVC flag enabling standards conformance mode.
pub const PERMISSIVE_FLAG: &str = "/permissive-";

/// Separate `std::filesystem` library needed by older libstdc++.
pub const LEGACY_FILESYSTEM_LIB: &str = "stdc++fs";

/// First GCC major whose libstdc++ ships `std::filesystem` in the main library.
const GCC_INTEGRATED_FILESYSTEM: u64 = 9;

/// A single define, compiler flag or system library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum FlagToken {
    /// Preprocessor define.
    Define(String),
    /// Compiler command-line flag.
    CompilerFlag(String),
    /// System library to link.
    SystemLib(String),
}

impl FlagToken {
    /// Create a define token.
    pub fn define(name: impl Into<String>) -> Self {
        Self::Define(name.into())
    }

    /// Create a compiler flag token.
    pub fn compiler_flag(flag: impl Into<String>) -> Self {
        Self::CompilerFlag(flag.into())
    }

    /// Create a system library token.
    pub fn system_lib(name: impl Into<String>) -> Self {
        Self::SystemLib(name.into())
    }

    /// The bare token value without command-line decoration.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Define(v) | Self::CompilerFlag(v) | Self::SystemLib(v) => v,
        }
    }
}

impl std::fmt::Display for FlagToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Define(name) => write!(f, "-D{name}"),
            Self::CompilerFlag(flag) => write!(f, "{flag}"),
            Self::SystemLib(name) => write!(f, "-l{name}"),
        }
    }
}

/// Ordered sequence of derived tokens.
///
/// Two options may contribute the same token, so duplicates can appear.
/// Consumers treat the sequence as a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlagSet {
    tokens: Vec<FlagToken>,
}

impl FlagSet {
    /// Create an empty flag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token.
    pub fn push(&mut self, token: FlagToken) {
        self.tokens.push(token);
    }

    /// Iterate over tokens in derivation order.
    pub fn iter(&self) -> std::slice::Iter<'_, FlagToken> {
        self.tokens.iter()
    }

    /// Number of tokens, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if no tokens were derived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns true if the token is present.
    #[must_use]
    pub fn contains(&self, token: &FlagToken) -> bool {
        self.tokens.contains(token)
    }

    /// Returns true if the define is present.
    #[must_use]
    pub fn has_define(&self, name: &str) -> bool {
        self.defines().any(|d| d == name)
    }

    /// The distinct tokens.
    #[must_use]
    pub fn to_set(&self) -> BTreeSet<&FlagToken> {
        self.tokens.iter().collect()
    }

    /// Returns true if both sets hold the same distinct tokens.
    #[must_use]
    pub fn same_tokens(&self, other: &Self) -> bool {
        self.to_set() == other.to_set()
    }

    /// Defines in derivation order, duplicates included.
    pub fn defines(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            FlagToken::Define(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Compiler flags in derivation order.
    pub fn compiler_flags(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            FlagToken::CompilerFlag(flag) => Some(flag.as_str()),
            _ => None,
        })
    }

    /// System libraries in derivation order.
    pub fn system_libs(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            FlagToken::SystemLib(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl<'a> IntoIterator for &'a FlagSet {
    type Item = &'a FlagToken;
    type IntoIter = std::slice::Iter<'a, FlagToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl FromIterator<FlagToken> for FlagSet {
    fn from_iter<I: IntoIterator<Item = FlagToken>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl Extend<FlagToken> for FlagSet {
    fn extend<I: IntoIterator<Item = FlagToken>>(&mut self, iter: I) {
        self.tokens.extend(iter);
    }
}

/// Defines contributed by an enabled option.
fn option_defines(option: FeatureOption) -> &'static [&'static str] {
    match option {
        FeatureOption::Eigen => &[EIGEN_DEFINE],
        FeatureOption::Spdlog => &[SPDLOG_DEFINE, FMT_DEFINE],
        FeatureOption::Fmt => &[FMT_DEFINE],
    }
}

/// Whether `std::filesystem` lives in the separate `stdc++fs` library.
fn needs_legacy_filesystem(compiler: &CompilerIdentity) -> bool {
    match compiler.family {
        CompilerFamily::Gcc => {
            compiler.version < CompilerVersion::from_parts(GCC_INTEGRATED_FILESYSTEM, 0, 0)
        }
        CompilerFamily::Clang => {
            matches!(compiler.libcxx.as_deref(), Some("libstdc++" | "libstdc++11"))
        }
        _ => false,
    }
}

/// Derive build flags for a configuration.
///
/// Every enabled option appends its defines; nothing is overwritten.
/// Toolchain tokens depend on the compiler alone. Unrecognized option names
/// are ignored with an advisory.
#[must_use]
pub fn derive_flags(options: &FeatureOptionSet, compiler: &CompilerIdentity) -> FlagSet {
    let mut flags = FlagSet::new();

    for option in FeatureOption::ALL {
        if options.is_enabled(option) {
            flags.extend(option_defines(option).iter().map(|d| FlagToken::define(*d)));
        }
    }

    for name in options.unrecognized() {
        warn!(option = name, "ignoring unrecognized feature option");
    }

    if needs_legacy_filesystem(compiler) {
        flags.push(FlagToken::system_lib(LEGACY_FILESYSTEM_LIB));
    }

    if compiler.is_msvc() {
        flags.push(FlagToken::define(NOMINMAX_DEFINE));
        flags.push(FlagToken::compiler_flag(PERMISSIVE_FLAG));
    }

    debug!(compiler = %compiler, tokens = flags.len(), "derived build flags");
    flags
}
