//! Compiler identity as reported by the build environment.

use semver::Version;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing compiler settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompilerError {
    #[error("invalid compiler version '{0}': {1}")]
    InvalidVersion(String, &'static str),

    #[error("invalid language standard '{0}', expected a level such as 17 or gnu17")]
    InvalidStandard(String),

    #[error("compiler name cannot be empty")]
    EmptyName,
}

/// Compiler family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompilerFamily {
    /// GNU Compiler Collection.
    Gcc,
    /// LLVM Clang.
    Clang,
    /// Apple's fork of Clang shipped with Xcode.
    AppleClang,
    /// Microsoft Visual C++ (toolset numbering, e.g. 191, 193).
    Msvc,
    /// Microsoft Visual C++ reported by IDE version (e.g. 15.7, 16).
    VisualStudio,
    /// Any other compiler, keeping the name it was reported with.
    Unknown(String),
}

impl CompilerFamily {
    /// Map a compiler setting name to a family.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "gcc" => Self::Gcc,
            "clang" => Self::Clang,
            "apple-clang" => Self::AppleClang,
            "msvc" => Self::Msvc,
            "Visual Studio" => Self::VisualStudio,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns the family as it appears in settings.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::AppleClang => "apple-clang",
            Self::Msvc => "msvc",
            Self::VisualStudio => "Visual Studio",
            Self::Unknown(name) => name,
        }
    }
}

impl std::fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for CompilerFamily {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A compiler version such as `7`, `7.4`, `13.2.0` or `191`.
///
/// Missing components are treated as zero, so `9`, `9.0` and `9.0.0` compare
/// equal. The text the version was parsed from is kept for display.
#[derive(Debug, Clone)]
pub struct CompilerVersion {
    raw: String,
    version: Version,
}

impl CompilerVersion {
    /// Build a version from numeric components.
    #[must_use]
    pub fn from_parts(major: u64, minor: u64, patch: u64) -> Self {
        let raw = match (minor, patch) {
            (0, 0) => major.to_string(),
            (_, 0) => format!("{major}.{minor}"),
            _ => format!("{major}.{minor}.{patch}"),
        };
        Self {
            raw,
            version: Version::new(major, minor, patch),
        }
    }

    /// Major component.
    #[must_use]
    pub fn major(&self) -> u64 {
        self.version.major
    }

    /// Minor component.
    #[must_use]
    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    /// The normalized three-component version.
    #[must_use]
    pub fn as_semver(&self) -> &Version {
        &self.version
    }
}

impl FromStr for CompilerVersion {
    type Err = CompilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(CompilerError::InvalidVersion(
                s.to_string(),
                "version cannot be empty",
            ));
        }

        // Full semver first so pre-release tags survive
        if let Ok(version) = Version::parse(raw) {
            return Ok(Self {
                raw: raw.to_string(),
                version,
            });
        }

        let mut parts = [0u64; 3];
        for (index, part) in raw.split('.').enumerate() {
            if index == parts.len() {
                return Err(CompilerError::InvalidVersion(
                    raw.to_string(),
                    "at most three components are allowed",
                ));
            }
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CompilerError::InvalidVersion(
                    raw.to_string(),
                    "components must be numeric",
                ));
            }
            parts[index] = part.parse().map_err(|_| {
                CompilerError::InvalidVersion(raw.to_string(), "component is out of range")
            })?;
        }

        Ok(Self {
            raw: raw.to_string(),
            version: Version::new(parts[0], parts[1], parts[2]),
        })
    }
}

impl PartialEq for CompilerVersion {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for CompilerVersion {}

impl Hash for CompilerVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version.hash(state);
    }
}

impl PartialOrd for CompilerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CompilerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

impl std::fmt::Display for CompilerVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for CompilerVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// A configured C++ language standard level, e.g. `17` or `gnu17`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CppStandard {
    level: u16,
    gnu: bool,
}

impl CppStandard {
    /// An ISO standard level.
    #[must_use]
    pub const fn new(level: u16) -> Self {
        Self { level, gnu: false }
    }

    /// A standard level with GNU extensions.
    #[must_use]
    pub const fn gnu(level: u16) -> Self {
        Self { level, gnu: true }
    }

    /// The two-digit level (`98`, `11`, ..., `23`).
    #[must_use]
    pub fn level(self) -> u16 {
        self.level
    }

    /// Whether GNU extensions are enabled.
    #[must_use]
    pub fn is_gnu(self) -> bool {
        self.gnu
    }

    /// Whether this setting covers the given standard level.
    ///
    /// GNU dialects satisfy the ISO level they extend.
    #[must_use]
    pub fn satisfies(self, required: u16) -> bool {
        year(self.level) >= year(required)
    }
}

/// Two-digit levels wrap at the century: `98` precedes `03` and `11`.
fn year(level: u16) -> u32 {
    if (98..100).contains(&level) {
        1900 + u32::from(level)
    } else {
        2000 + u32::from(level)
    }
}

impl PartialOrd for CppStandard {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CppStandard {
    fn cmp(&self, other: &Self) -> Ordering {
        (year(self.level), self.gnu).cmp(&(year(other.level), other.gnu))
    }
}

impl FromStr for CppStandard {
    type Err = CompilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (digits, gnu) = match trimmed.strip_prefix("gnu") {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };

        if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CompilerError::InvalidStandard(s.to_string()));
        }
        let level: u16 = digits
            .parse()
            .map_err(|_| CompilerError::InvalidStandard(s.to_string()))?;

        Ok(Self { level, gnu })
    }
}

impl std::fmt::Display for CppStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.gnu {
            write!(f, "gnu{:02}", self.level)
        } else {
            write!(f, "{:02}", self.level)
        }
    }
}

impl Serialize for CppStandard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The compiler a build is configured for.
///
/// Immutable for the duration of a configuration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerIdentity {
    /// Compiler family.
    pub family: CompilerFamily,

    /// Compiler version.
    pub version: CompilerVersion,

    /// Explicit language standard setting, if the environment specifies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cppstd: Option<CppStandard>,

    /// C++ standard library setting (`libstdc++11`, `libc++`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libcxx: Option<String>,
}

impl CompilerIdentity {
    /// Create an identity with no standard or library settings.
    #[must_use]
    pub fn new(family: CompilerFamily, version: CompilerVersion) -> Self {
        Self {
            family,
            version,
            cppstd: None,
            libcxx: None,
        }
    }

    /// Parse an identity from setting values such as `("gcc", "9.4")`.
    ///
    /// The legacy `Visual Studio` family keeps its IDE version, whose minor
    /// component matters for the minimum version check.
    pub fn from_settings(name: &str, version: &str) -> Result<Self, CompilerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CompilerError::EmptyName);
        }
        let version: CompilerVersion = version.parse()?;
        Ok(Self::new(CompilerFamily::from_name(name), version))
    }

    /// Set the explicit language standard.
    #[must_use]
    pub fn with_cppstd(mut self, cppstd: CppStandard) -> Self {
        self.cppstd = Some(cppstd);
        self
    }

    /// Set the C++ standard library.
    #[must_use]
    pub fn with_libcxx(mut self, libcxx: impl Into<String>) -> Self {
        self.libcxx = Some(libcxx.into());
        self
    }

    /// Returns true for the Microsoft compiler under either numbering.
    #[must_use]
    pub fn is_msvc(&self) -> bool {
        matches!(
            self.family,
            CompilerFamily::Msvc | CompilerFamily::VisualStudio
        )
    }
}

impl std::fmt::Display for CompilerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.family, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(s: &str) -> CompilerVersion {
        s.parse().unwrap()
    }

    #[test]
    fn short_versions_are_zero_padded() {
        assert_eq!(version("9"), version("9.0"));
        assert_eq!(version("9.0"), version("9.0.0"));
        assert!(version("7.3") < version("7.4"));
        assert!(version("10") > version("9.4.1"));
        assert!(version("191") > version("190.24"));
    }

    #[test]
    fn version_keeps_original_text() {
        assert_eq!(version("7.4").to_string(), "7.4");
        assert_eq!(version("13.2.0").to_string(), "13.2.0");
    }

    #[test]
    fn full_semver_with_prerelease() {
        let v = version("9.0.0-rc1");
        assert!(v < version("9"));
        assert!(v > version("8.5"));
    }

    #[test]
    fn invalid_versions() {
        for bad in ["", "  ", "seven", "7.x", "7..4", "1.2.3.4", "+7"] {
            let err = bad.parse::<CompilerVersion>().unwrap_err();
            assert!(matches!(err, CompilerError::InvalidVersion(..)), "{bad}");
        }
    }

    #[test]
    fn from_parts_display() {
        assert_eq!(CompilerVersion::from_parts(7, 4, 0).to_string(), "7.4");
        assert_eq!(CompilerVersion::from_parts(191, 0, 0).to_string(), "191");
        assert_eq!(CompilerVersion::from_parts(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn family_names() {
        assert_eq!(CompilerFamily::from_name("gcc"), CompilerFamily::Gcc);
        assert_eq!(CompilerFamily::from_name("apple-clang"), CompilerFamily::AppleClang);
        assert_eq!(
            CompilerFamily::from_name("intel-cc"),
            CompilerFamily::Unknown("intel-cc".to_string())
        );
        assert_eq!(CompilerFamily::Unknown("icx".to_string()).to_string(), "icx");
    }

    #[test]
    fn parse_standards() {
        assert_eq!("17".parse::<CppStandard>().unwrap(), CppStandard::new(17));
        assert_eq!("gnu17".parse::<CppStandard>().unwrap(), CppStandard::gnu(17));
        assert!("c++17".parse::<CppStandard>().is_err());
        assert!("2017".parse::<CppStandard>().is_err());
        assert!("gnu".parse::<CppStandard>().is_err());
    }

    #[test]
    fn standard_ordering_wraps_century() {
        assert!(CppStandard::new(98) < CppStandard::new(11));
        assert!(CppStandard::new(14) < CppStandard::new(17));
        assert!(!CppStandard::new(98).satisfies(17));
        assert!(CppStandard::gnu(17).satisfies(17));
        assert!(CppStandard::new(20).satisfies(17));
        assert!(!CppStandard::gnu(14).satisfies(17));
    }

    #[test]
    fn standard_display() {
        assert_eq!(CppStandard::new(17).to_string(), "17");
        assert_eq!(CppStandard::gnu(20).to_string(), "gnu20");
        assert_eq!(CppStandard::new(3).to_string(), "03");
    }

    #[test]
    fn identity_from_settings() {
        let id = CompilerIdentity::from_settings("clang", "14.0.6").unwrap();
        assert_eq!(id.family, CompilerFamily::Clang);
        assert_eq!(id.version, version("14.0.6"));
        assert!(id.cppstd.is_none());
        assert!(!id.is_msvc());
    }

    #[test]
    fn visual_studio_keeps_ide_version() {
        let id = CompilerIdentity::from_settings("Visual Studio", "15.6").unwrap();
        assert_eq!(id.family, CompilerFamily::VisualStudio);
        assert_eq!(id.version, version("15.6"));
        assert!(id.is_msvc());
        assert_eq!(id.to_string(), "Visual Studio 15.6");

        let id = CompilerIdentity::from_settings("msvc", "193").unwrap();
        assert!(id.is_msvc());
    }

    #[test]
    fn empty_compiler_name() {
        let err = CompilerIdentity::from_settings(" ", "9").unwrap_err();
        assert_eq!(err, CompilerError::EmptyName);
    }

    #[test]
    fn identity_builders() {
        let id = CompilerIdentity::from_settings("gcc", "11")
            .unwrap()
            .with_cppstd(CppStandard::gnu(17))
            .with_libcxx("libstdc++11");
        assert_eq!(id.cppstd, Some(CppStandard::gnu(17)));
        assert_eq!(id.libcxx.as_deref(), Some("libstdc++11"));
        assert_eq!(id.to_string(), "gcc 11");
    }
}
