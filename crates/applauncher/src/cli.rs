//! Command-line argument definitions.

use applauncher_config::Config;
use clap::{Args, Parser, Subcommand};

/// Command-line interface of the application launcher.
#[derive(Parser, Debug)]
#[command(
    name = "applauncher",
    about = "Discovers installed applications and launches them with integrations",
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: Config,
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Launcher subcommands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Prints every configured action and the applications it found.
    List,
    /// Prints the items each action offers for a selection.
    Discover {
        /// Event data as a JSON object, usually carrying `selection`.
        #[arg(long, value_name = "JSON")]
        context: Option<String>,
    },
    /// Launches one application.
    Launch(LaunchArgs),
}

/// Arguments of the `launch` subcommand.
#[derive(Args, Debug, Clone)]
pub(crate) struct LaunchArgs {
    /// Application identifier; a trailing `*` picks the newest match.
    #[arg(value_name = "APPLICATION")]
    pub(crate) application: String,
    /// Launch through this action instead of the first one offering the
    /// application.
    #[arg(long, value_name = "IDENTIFIER")]
    pub(crate) action: Option<String>,
    /// Event data as a JSON object. When given, the action checks its
    /// selection before launching.
    #[arg(long, value_name = "JSON")]
    pub(crate) context: Option<String>,
    /// Extra arguments appended to the application command line.
    #[arg(last = true, value_name = "ARG")]
    pub(crate) arguments: Vec<String>,
}
