//! Exported package layout consumed by downstream builds.
//!
//! A package `h5pp` exports:
//! ```text
//! h5pp::h5pp
//! ├── h5pp::headers     # include directory
//! ├── h5pp::flags       # defines, compiler flags, system libraries
//! └── h5pp::deps        # hdf5::hdf5 plus enabled integrations
//! ```

use crate::flags::FlagSet;
use crate::recipe::ResolvedRequirement;
use serde::Serialize;

/// Suffix of the headers component.
const HEADERS: &str = "headers";

/// Suffix of the flags component.
const FLAGS: &str = "flags";

/// Suffix of the dependencies component.
const DEPS: &str = "deps";

/// One exported component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Component {
    /// Component name (`h5pp_flags`).
    pub name: String,
    /// CMake target name (`h5pp::flags`).
    pub cmake_target_name: String,
    /// CMake targets this component links.
    pub requires: Vec<String>,
    /// Preprocessor defines, each listed once.
    pub defines: Vec<String>,
    /// Compiler flags, each listed once.
    pub cxxflags: Vec<String>,
    /// System libraries, each listed once.
    pub system_libs: Vec<String>,
}

impl Component {
    fn new(package: &str, suffix: &str) -> Self {
        Self {
            name: format!("{package}_{suffix}"),
            cmake_target_name: format!("{package}::{suffix}"),
            ..Self::default()
        }
    }
}

/// The package layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageLayout {
    /// CMake config file name.
    pub cmake_file_name: String,
    /// Umbrella CMake target.
    pub cmake_target_name: String,
    /// Components in export order: headers, flags, deps.
    pub components: Vec<Component>,
}

impl PackageLayout {
    /// Build the layout for a package from its derived flags and requirements.
    #[must_use]
    pub fn new(package: &str, flags: &FlagSet, requirements: &[ResolvedRequirement]) -> Self {
        let headers = Component::new(package, HEADERS);

        let mut flags_component = Component::new(package, FLAGS);
        flags_component.defines = distinct(flags.defines());
        flags_component.cxxflags = distinct(flags.compiler_flags());
        flags_component.system_libs = distinct(flags.system_libs());

        let mut deps = Component::new(package, DEPS);
        deps.requires = requirements
            .iter()
            .map(|r| format!("{0}::{0}", r.name))
            .collect();

        Self {
            cmake_file_name: package.to_string(),
            cmake_target_name: format!("{package}::{package}"),
            components: vec![headers, flags_component, deps],
        }
    }

    /// Get a component by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Collect values keeping the first occurrence of each.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}
