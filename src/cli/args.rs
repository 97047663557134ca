//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Stagehand - Incremental development build assembler
///
/// Assembles a runnable development build of a modular, plugin-based
/// application from already-compiled class output, reusing unchanged
/// plugin artifacts from the previous run.
#[derive(Parser, Debug)]
#[command(name = "stagehand")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STAGEHAND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .stagehand.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble a development build once
    Build(BuildArgs),

    /// Run the build server until stopped
    Serve(ServeArgs),

    /// List products defined by the descriptor
    Products(ProductsArgs),

    /// Show or locate configuration
    Config(ConfigArgs),
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Product code to build
    #[arg(short, long, env = "STAGEHAND_PRODUCT")]
    pub product: String,

    /// Extra plugin ids beyond the product's bundled set
    #[arg(long, value_delimiter = ',')]
    pub plugins: Vec<String>,

    /// Source checkout root (defaults to configuration, then cwd)
    #[arg(long, env = "STAGEHAND_PROJECT_ROOT")]
    pub project_root: Option<PathBuf>,

    /// Compiled classes root (defaults to <project-root>/out/classes)
    #[arg(long, env = "STAGEHAND_CLASSES_DIR")]
    pub classes_dir: Option<PathBuf>,

    /// Output root override
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Generate the runtime module repository
    #[arg(long)]
    pub module_repository: bool,

    /// Print the platform classpath after assembly
    #[arg(long)]
    pub print_classpath: bool,
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Listen port (loopback only)
    #[arg(long, env = "STAGEHAND_PORT")]
    pub port: Option<u16>,
}

/// Arguments for the products command
#[derive(Parser, Debug)]
pub struct ProductsArgs {
    /// Source checkout root holding the descriptor
    #[arg(long, env = "STAGEHAND_PROJECT_ROOT")]
    pub project_root: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}
