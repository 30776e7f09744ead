//! Compatibility gate: refuses compilers that cannot build C++17 sources.
//!
//! The gate is evaluated once, before any flag derivation or build step. It
//! never mutates state; its only side effect is advisory logging.

use crate::compiler::{CompilerFamily, CompilerIdentity, CompilerVersion, CppStandard};
use thiserror::Error;
use tracing::{debug, warn};

/// The language standard level h5pp is written against.
pub const REQUIRED_STANDARD: u16 = 17;

/// Minimum version of a compiler family with full C++17 support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimumVersion {
    /// Compiler family.
    pub family: CompilerFamily,
    major: u64,
    minor: u64,
}

impl MinimumVersion {
    const fn new(family: CompilerFamily, major: u64, minor: u64) -> Self {
        Self {
            family,
            major,
            minor,
        }
    }

    /// The minimum version.
    #[must_use]
    pub fn version(&self) -> CompilerVersion {
        CompilerVersion::from_parts(self.major, self.minor, 0)
    }
}

/// Minimum compiler versions per family.
///
/// `msvc` uses toolset numbering and `Visual Studio` uses IDE numbering, so
/// both are listed.
pub static MINIMUM_VERSIONS: [MinimumVersion; 5] = [
    MinimumVersion::new(CompilerFamily::Gcc, 7, 4),
    MinimumVersion::new(CompilerFamily::Clang, 6, 0),
    MinimumVersion::new(CompilerFamily::AppleClang, 10, 0),
    MinimumVersion::new(CompilerFamily::Msvc, 191, 0),
    MinimumVersion::new(CompilerFamily::VisualStudio, 15, 7),
];

/// Look up the minimum version for a family. Unlisted families return `None`.
#[must_use]
pub fn minimum_version(family: &CompilerFamily) -> Option<CompilerVersion> {
    MINIMUM_VERSIONS
        .iter()
        .find(|entry| &entry.family == family)
        .map(MinimumVersion::version)
}

/// Why a compiler was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortfall {
    /// The explicit standard setting is below the required level.
    ConfiguredStandard(CppStandard),
    /// The compiler version is below the family minimum.
    CompilerTooOld,
}

/// The compiler cannot build sources at the required standard level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "C++{required_standard} is required, but {}",
    describe_shortfall(.shortfall, .detected_compiler, .detected_version, .minimum_required_version)
)]
pub struct IncompatibleCompilerError {
    /// Required standard level.
    pub required_standard: u16,
    /// Detected compiler family.
    pub detected_compiler: CompilerFamily,
    /// Detected compiler version.
    pub detected_version: CompilerVersion,
    /// Minimum version for the family, if it is listed.
    pub minimum_required_version: Option<CompilerVersion>,
    /// Which check refused the compiler.
    pub shortfall: Shortfall,
}

fn describe_shortfall(
    shortfall: &Shortfall,
    compiler: &CompilerFamily,
    version: &CompilerVersion,
    minimum: &Option<CompilerVersion>,
) -> String {
    match (shortfall, minimum) {
        (Shortfall::ConfiguredStandard(configured), _) => {
            format!("{compiler} {version} is configured for C++{configured}")
        }
        (Shortfall::CompilerTooOld, Some(minimum)) => {
            format!("{compiler} {version} does not support it (minimum is {compiler} {minimum})")
        }
        (Shortfall::CompilerTooOld, None) => {
            format!("{compiler} {version} does not support it")
        }
    }
}

/// Check that a compiler can build sources at `required_standard`.
///
/// An explicit standard setting on the identity must cover the required
/// level; without one that check is skipped. The version must then reach
/// the family minimum from [`MINIMUM_VERSIONS`]. Unlisted families pass
/// with an advisory.
///
/// # Errors
///
/// Returns [`IncompatibleCompilerError`] if either check refuses the compiler.
pub fn validate_standard(
    required_standard: u16,
    compiler: &CompilerIdentity,
) -> Result<(), IncompatibleCompilerError> {
    let minimum = minimum_version(&compiler.family);

    if let Some(configured) = compiler.cppstd {
        if !configured.satisfies(required_standard) {
            return Err(IncompatibleCompilerError {
                required_standard,
                detected_compiler: compiler.family.clone(),
                detected_version: compiler.version.clone(),
                minimum_required_version: minimum,
                shortfall: Shortfall::ConfiguredStandard(configured),
            });
        }
    }

    match minimum {
        Some(minimum) if compiler.version < minimum => Err(IncompatibleCompilerError {
            required_standard,
            detected_compiler: compiler.family.clone(),
            detected_version: compiler.version.clone(),
            minimum_required_version: Some(minimum),
            shortfall: Shortfall::CompilerTooOld,
        }),
        Some(minimum) => {
            debug!(
                compiler = %compiler.family,
                version = %compiler.version,
                minimum = %minimum,
                "compiler supports C++{required_standard}"
            );
            Ok(())
        }
        None => {
            warn!(
                compiler = %compiler.family,
                version = %compiler.version,
                "unknown compiler, assuming it supports C++{required_standard}"
            );
            Ok(())
        }
    }
}
