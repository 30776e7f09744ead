//! h5pp-recipe CLI - configure h5pp builds from the command line

use anyhow::Result;
use clap::{Parser, Subcommand};
use h5pp_recipe::REQUIRED_STANDARD;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod environment;
mod report;

use environment::EnvironmentArgs;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "H5PP_RECIPE_LOG";

#[derive(Parser)]
#[command(name = "h5pp-recipe")]
#[command(version)]
#[command(about = "Compiler compatibility and build flags for the h5pp package", long_about = None)]
struct Cli {
    /// Recipe file (defaults to the built-in h5pp recipe)
    #[arg(long, global = true)]
    recipe: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the compiler supports C++17
    Check {
        #[command(flatten)]
        env: EnvironmentArgs,
    },

    /// Print the derived defines, compiler flags and system libraries
    Flags {
        #[command(flatten)]
        env: EnvironmentArgs,

        /// Print JSON instead of one token per line
        #[arg(long)]
        json: bool,
    },

    /// List the requirements pulled in by the effective options
    Requires {
        #[command(flatten)]
        env: EnvironmentArgs,
    },

    /// Print the exported package layout
    Info {
        #[command(flatten)]
        env: EnvironmentArgs,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "h5pp_recipe=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let recipe = environment::load_recipe(cli.recipe.as_deref())?;

    match cli.command {
        Commands::Check { env } => {
            let compiler = env.compiler_identity()?;
            h5pp_recipe::validate_standard(REQUIRED_STANDARD, &compiler)?;
            println!(
                "ok: {} supports C++{} for {}",
                compiler, REQUIRED_STANDARD, recipe.package.name
            );
        }

        Commands::Flags { env, json } => {
            let config = env.configure(&recipe)?;
            report::print_flags(&config, json)?;
        }

        Commands::Requires { env } => {
            let config = env.configure(&recipe)?;
            report::print_requirements(&config);
        }

        Commands::Info { env, json } => {
            let config = env.configure(&recipe)?;
            report::print_layout(&config, json)?;
        }
    }

    Ok(())
}
