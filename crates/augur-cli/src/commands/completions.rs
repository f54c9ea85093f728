use std::io;

use anyhow::Result;
use clap::{Args, CommandFactory, ValueEnum};
use clap_complete::{generate, shells};

use crate::{args::Cli, constants::BINARY_NAME};

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Clone, Copy, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl CompletionsArgs {
    pub fn run(&self) -> Result<()> {
        let mut command = Cli::command();
        let mut stdout = io::stdout();

        match self.shell {
            Shell::Bash => generate(shells::Bash, &mut command, BINARY_NAME, &mut stdout),
            Shell::Zsh => generate(shells::Zsh, &mut command, BINARY_NAME, &mut stdout),
            Shell::Fish => generate(shells::Fish, &mut command, BINARY_NAME, &mut stdout),
            Shell::PowerShell => {
                generate(shells::PowerShell, &mut command, BINARY_NAME, &mut stdout)
            }
            Shell::Elvish => generate(shells::Elvish, &mut command, BINARY_NAME, &mut stdout),
        }
        Ok(())
    }
}
