//! One configuration pass: gate, then derive.

use crate::compiler::CompilerIdentity;
use crate::flags::{derive_flags, FlagSet};
use crate::gate::{validate_standard, IncompatibleCompilerError, REQUIRED_STANDARD};
use crate::layout::PackageLayout;
use crate::options::FeatureOptionSet;
use crate::recipe::{Recipe, ResolvedRequirement};
use serde::Serialize;
use tracing::info;

/// Everything a downstream build invocation needs.
#[derive(Debug, Clone, Serialize)]
pub struct BuildConfiguration {
    /// Package name.
    pub package: String,
    /// Package version.
    pub version: String,
    /// The compiler the configuration was derived for.
    pub compiler: CompilerIdentity,
    /// Effective options after overrides.
    pub options: FeatureOptionSet,
    /// Derived flags.
    pub flags: FlagSet,
    /// Requirements pulled in by the effective options.
    pub requirements: Vec<ResolvedRequirement>,
    /// Exported package layout.
    pub layout: PackageLayout,
}

/// Configure a build of `recipe` for `compiler`.
///
/// The compatibility gate runs first, at the level the minimum version
/// table is built for; a refused compiler stops the pass before any option
/// is resolved or flag derived.
///
/// # Errors
///
/// Returns [`IncompatibleCompilerError`] if the compiler cannot build the
/// recipe's language standard.
pub fn configure(
    recipe: &Recipe,
    compiler: &CompilerIdentity,
    overrides: &FeatureOptionSet,
) -> Result<BuildConfiguration, IncompatibleCompilerError> {
    validate_standard(REQUIRED_STANDARD, compiler)?;

    let options = recipe.resolve_options(overrides);
    let flags = derive_flags(&options, compiler);
    let requirements = recipe.requirements(&options);
    let layout = PackageLayout::new(&recipe.package.name, &flags, &requirements);

    info!(
        package = %recipe.package.name,
        compiler = %compiler,
        requirements = requirements.len(),
        "configured build"
    );

    Ok(BuildConfiguration {
        package: recipe.package.name.clone(),
        version: recipe.package.version.clone(),
        compiler: compiler.clone(),
        options,
        flags,
        requirements,
        layout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{EIGEN_DEFINE, FMT_DEFINE, SPDLOG_DEFINE};
    use crate::gate::Shortfall;

    fn identity(name: &str, version: &str) -> CompilerIdentity {
        CompilerIdentity::from_settings(name, version).unwrap()
    }

    #[test]
    fn refused_compiler_short_circuits() {
        let err = configure(
            &Recipe::default(),
            &identity("gcc", "7.3"),
            &FeatureOptionSet::new(),
        )
        .unwrap_err();
        assert_eq!(err.shortfall, Shortfall::CompilerTooOld);
    }

    #[test]
    fn default_recipe_on_modern_gcc() {
        let config = configure(
            &Recipe::default(),
            &identity("gcc", "12.2"),
            &FeatureOptionSet::new(),
        )
        .unwrap();

        assert_eq!(config.package, "h5pp");
        assert_eq!(config.version, "1.11.1");
        for define in [EIGEN_DEFINE, SPDLOG_DEFINE, FMT_DEFINE] {
            assert!(config.flags.has_define(define));
        }
        assert_eq!(config.requirements.len(), 3);

        let deps = config.layout.component("h5pp_deps").unwrap();
        assert_eq!(
            deps.requires,
            vec!["eigen::eigen", "hdf5::hdf5", "spdlog::spdlog"]
        );
    }

    #[test]
    fn overrides_reach_flags_and_requirements() {
        let overrides = FeatureOptionSet::new().with("with_spdlog", false);
        let config = configure(&Recipe::default(), &identity("clang", "15"), &overrides).unwrap();

        assert!(config.flags.has_define(EIGEN_DEFINE));
        assert!(!config.flags.has_define(SPDLOG_DEFINE));
        assert!(!config.requirements.iter().any(|r| r.name == "spdlog"));
        assert_eq!(config.options.get("with_spdlog"), Some(false));
    }

    #[test]
    fn configured_standard_below_cpp17_is_refused() {
        let compiler = identity("gcc", "9").with_cppstd("14".parse().unwrap());
        let err = configure(&Recipe::default(), &compiler, &FeatureOptionSet::new()).unwrap_err();
        assert_eq!(err.required_standard, 17);
        assert!(matches!(err.shortfall, Shortfall::ConfiguredStandard(_)));

        let compiler = identity("gcc", "9").with_cppstd("gnu17".parse().unwrap());
        assert!(configure(&Recipe::default(), &compiler, &FeatureOptionSet::new()).is_ok());
    }
}
