//! ZMK Configurator - command line front end
//!
//! Creates, validates and builds ZMK shield configurations saved as JSON.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zmk_config::cli::{
    BuildArgs, CliResult, ConfigArgs, KeycodesArgs, NewArgs, ShieldsArgs, ValidateArgs,
};

/// ZMK Configurator - validated ZMK shield configurations
#[derive(Parser, Debug)]
#[command(name = "zmk-config", author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List or search the code catalogs
    Keycodes(KeycodesArgs),
    /// List upstream shields or check name/id/directory availability
    Shields(ShieldsArgs),
    /// Create a new configuration file
    New(NewArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
    /// Generate shield files from a configuration file
    Build(BuildArgs),
    /// Show or change application settings
    Config(ConfigArgs),
}

impl Command {
    fn execute(&self) -> CliResult<()> {
        match self {
            Self::Keycodes(args) => args.execute(),
            Self::Shields(args) => args.execute(),
            Self::New(args) => args.execute(),
            Self::Validate(args) => args.execute(),
            Self::Build(args) => args.execute(),
            Self::Config(args) => args.execute(),
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli.command.execute() {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
