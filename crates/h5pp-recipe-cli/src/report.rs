//! Printing configuration results.

use anyhow::Result;
use h5pp_recipe::BuildConfiguration;

/// Print the derived flags, one token per line or as JSON.
pub fn print_flags(config: &BuildConfiguration, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&config.flags)?);
        return Ok(());
    }

    for token in &config.flags {
        println!("{token}");
    }
    Ok(())
}

/// Print requirement references.
pub fn print_requirements(config: &BuildConfiguration) {
    for requirement in &config.requirements {
        let mut traits = Vec::new();
        if requirement.transitive_headers {
            traits.push("headers");
        }
        if requirement.transitive_libs {
            traits.push("libs");
        }

        if traits.is_empty() {
            println!("{requirement}");
        } else {
            println!("{requirement} (transitive: {})", traits.join(", "));
        }
    }
}

/// Print the package layout as a summary or JSON.
pub fn print_layout(config: &BuildConfiguration, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    let layout = &config.layout;
    println!("{} {} for {}", config.package, config.version, config.compiler);
    println!("cmake: {} ({})", layout.cmake_file_name, layout.cmake_target_name);

    for component in &layout.components {
        println!("  {} -> {}", component.name, component.cmake_target_name);
        print_list("requires", &component.requires);
        print_list("defines", &component.defines);
        print_list("cxxflags", &component.cxxflags);
        print_list("system_libs", &component.system_libs);
    }
    Ok(())
}

fn print_list(label: &str, values: &[String]) {
    if !values.is_empty() {
        println!("    {label}: {}", values.join(" "));
    }
}
