// Binary entry point for augur-cli

mod args;
mod cli_helpers;
mod client;
mod commands;
mod config;
mod constants;
mod output;
mod prompts;
mod spinner;

use anyhow::Result;
use args::{Cli, CliConfig};
use clap::{CommandFactory, Parser};
use commands::Commands;
use output::OutputLevel;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        commands::report_error(&err);
        std::process::exit(1);
    }
}

/// Parse CLI arguments, load configuration and dispatch to the requested
/// sub-command.
pub async fn run() -> Result<()> {
    // Enable shell completion generation when the user sets COMPLETE=fish etc.
    clap_complete::CompleteEnv::with_factory(Cli::command).complete();
    let cli = Cli::parse();

    let output_level = OutputLevel::from_flags(cli.quiet, cli.verbose);
    output::init_logging(output_level);

    // Completions need no configuration
    if let Commands::Completions(args) = &cli.command {
        return args.run();
    }

    let cli_config = CliConfig::load()?;

    match &cli.command {
        Commands::Fortune(args) => args.run(output_level, &cli_config).await,
        Commands::Advice(args) => args.run(output_level, &cli_config).await,
        Commands::Chat(args) => args.run(output_level, &cli_config).await,
        Commands::Image(args) => args.run(output_level, &cli_config).await,
        Commands::Video(args) => args.run(output_level, &cli_config).await,
        Commands::Speak(args) => args.run(output_level, &cli_config).await,
        Commands::Transcribe(args) => args.run(output_level, &cli_config).await,
        Commands::Analyze(args) => args.run(output_level, &cli_config).await,
        Commands::Info(args) => args.run(output_level, &cli_config).await,
        Commands::Completions(args) => args.run(),
    }
}
