//! Collecting the recipe, compiler identity and option overrides from arguments.

use anyhow::{bail, Context, Result};
use clap::Args;
use h5pp_recipe::{
    configure, parse_assignment, BuildConfiguration, CompilerIdentity, CompilerSettings,
    FeatureOptionSet, Profile, Recipe,
};
use std::path::{Path, PathBuf};

/// Arguments describing the build environment.
#[derive(Args, Debug, Default)]
pub struct EnvironmentArgs {
    /// Profile file with compiler settings and option overrides
    #[arg(long, short = 'p')]
    pub profile: Option<PathBuf>,

    /// Compiler name (gcc, clang, apple-clang, msvc, ...)
    #[arg(long)]
    pub compiler: Option<String>,

    /// Compiler version
    #[arg(long)]
    pub compiler_version: Option<String>,

    /// Language standard setting (17, gnu17, ...)
    #[arg(long)]
    pub cppstd: Option<String>,

    /// C++ standard library (libstdc++11, libc++, ...)
    #[arg(long)]
    pub libcxx: Option<String>,

    /// Option override, e.g. `-o with_eigen=false` (repeatable)
    #[arg(long = "option", short = 'o', value_name = "NAME=VALUE")]
    pub options: Vec<String>,
}

/// Load the recipe from a path, or fall back to the built-in one.
pub fn load_recipe(path: Option<&Path>) -> Result<Recipe> {
    match path {
        Some(path) => Recipe::from_path(path)
            .with_context(|| format!("failed to load recipe {}", path.display())),
        None => Ok(Recipe::default()),
    }
}

impl EnvironmentArgs {
    fn load_profile(&self) -> Result<Option<Profile>> {
        self.profile
            .as_deref()
            .map(|path| {
                Profile::from_path(path)
                    .with_context(|| format!("failed to load profile {}", path.display()))
            })
            .transpose()
    }

    /// Merge profile compiler settings with command-line values.
    ///
    /// Command-line values take precedence over the profile.
    fn compiler_settings(&self, profile: Option<&Profile>) -> Result<CompilerSettings> {
        let base = profile.and_then(|p| p.settings.compiler.clone());

        let name = self
            .compiler
            .clone()
            .or_else(|| base.as_ref().map(|c| c.name.clone()));
        let version = self
            .compiler_version
            .clone()
            .or_else(|| base.as_ref().map(|c| c.version.clone()));

        let (Some(name), Some(version)) = (name, version) else {
            bail!("no compiler given; pass --profile or --compiler with --compiler-version");
        };

        Ok(CompilerSettings {
            name,
            version,
            cppstd: self
                .cppstd
                .clone()
                .or_else(|| base.as_ref().and_then(|c| c.cppstd.clone())),
            libcxx: self
                .libcxx
                .clone()
                .or_else(|| base.as_ref().and_then(|c| c.libcxx.clone())),
        })
    }

    /// The compiler identity described by the arguments.
    pub fn compiler_identity(&self) -> Result<CompilerIdentity> {
        let profile = self.load_profile()?;
        self.identity_with(profile.as_ref())
    }

    fn identity_with(&self, profile: Option<&Profile>) -> Result<CompilerIdentity> {
        let settings = self.compiler_settings(profile)?;
        settings
            .identity()
            .context("invalid compiler settings")
    }

    /// Profile overrides followed by command-line overrides.
    fn option_overrides(&self, profile: Option<&Profile>) -> Result<FeatureOptionSet> {
        let mut overrides = profile.map(Profile::option_overrides).unwrap_or_default();

        for assignment in &self.options {
            let (name, value) = parse_assignment(assignment)?;
            overrides.set(name, value);
        }

        Ok(overrides)
    }

    /// Run a configuration pass for the recipe.
    pub fn configure(&self, recipe: &Recipe) -> Result<BuildConfiguration> {
        let profile = self.load_profile()?;
        let compiler = self.identity_with(profile.as_ref())?;
        let overrides = self.option_overrides(profile.as_ref())?;

        Ok(configure(recipe, &compiler, &overrides)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h5pp_recipe::{CompilerFamily, PROFILE_FILE};
    use std::fs;
    use tempfile::TempDir;

    fn write_profile(tmp: &TempDir, content: &str) -> PathBuf {
        let path = tmp.path().join(PROFILE_FILE);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn inline_compiler() {
        let args = EnvironmentArgs {
            compiler: Some("clang".to_string()),
            compiler_version: Some("16".to_string()),
            libcxx: Some("libc++".to_string()),
            ..Default::default()
        };
        let identity = args.compiler_identity().unwrap();
        assert_eq!(identity.family, CompilerFamily::Clang);
        assert_eq!(identity.libcxx.as_deref(), Some("libc++"));
    }

    #[test]
    fn missing_compiler_is_an_error() {
        let args = EnvironmentArgs {
            compiler: Some("gcc".to_string()),
            ..Default::default()
        };
        assert!(args.compiler_identity().is_err());
    }

    #[test]
    fn command_line_overrides_profile() {
        let tmp = TempDir::new().unwrap();
        let profile = write_profile(
            &tmp,
            r#"
[settings.compiler]
name = "gcc"
version = "8"
cppstd = "14"

[options]
with_eigen = false
"#,
        );

        let args = EnvironmentArgs {
            profile: Some(profile),
            compiler_version: Some("12".to_string()),
            cppstd: Some("gnu17".to_string()),
            options: vec!["with_spdlog=false".to_string()],
            ..Default::default()
        };

        let config = args.configure(&Recipe::default()).unwrap();
        assert_eq!(config.compiler.version.to_string(), "12");
        assert_eq!(config.options.get("with_eigen"), Some(false));
        assert_eq!(config.options.get("with_spdlog"), Some(false));
        assert!(config.flags.is_empty());
    }

    #[test]
    fn bad_option_assignment() {
        let args = EnvironmentArgs {
            compiler: Some("gcc".to_string()),
            compiler_version: Some("12".to_string()),
            options: vec!["with_eigen".to_string()],
            ..Default::default()
        };
        assert!(args.configure(&Recipe::default()).is_err());
    }

    #[test]
    fn builtin_recipe_without_path() {
        let recipe = load_recipe(None).unwrap();
        assert_eq!(recipe.package.name, "h5pp");
    }
}
