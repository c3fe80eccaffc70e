//! Command line definition and dispatch

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use ossadm_core::{Config, ConfigManager};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

pub mod alias;
pub mod rm;

/// Object storage administration CLI
#[derive(Parser, Debug)]
#[command(name = "ossadm", version, propagate_version = true)]
pub struct Cli {
    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable progress indicators
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage storage service aliases
    #[command(subcommand)]
    Alias(alias::AliasCommands),

    /// Remove objects, incomplete multipart uploads, or buckets
    Rm(rm::RmArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl Cli {
    fn output_config(&self) -> OutputConfig {
        OutputConfig {
            json: self.json,
            no_color: self.no_color,
            no_progress: self.no_progress,
            quiet: self.quiet,
        }
    }
}

/// Run the parsed command line
pub async fn execute(cli: Cli) -> ExitCode {
    let flags = cli.output_config();

    let config = match ConfigManager::new().and_then(|m| m.load()) {
        Ok(config) => config,
        Err(e) => {
            Formatter::new(flags).error(&format!("Failed to load config: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let output_config = flags.with_defaults(&config.defaults);
    let colors = Formatter::new(output_config.clone()).colors_enabled();
    console::set_colors_enabled(colors);
    console::set_colors_enabled_stderr(colors);

    dispatch(cli.command, output_config, &config).await
}

async fn dispatch(command: Commands, output_config: OutputConfig, config: &Config) -> ExitCode {
    match command {
        Commands::Alias(cmd) => alias::execute(cmd, output_config),
        Commands::Rm(args) => rm::execute(args, output_config, config).await,
        Commands::Completions(args) => {
            clap_complete::generate(
                args.shell,
                &mut Cli::command(),
                "ossadm",
                &mut std::io::stdout(),
            );
            ExitCode::Success
        }
    }
}
