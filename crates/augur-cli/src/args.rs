use anyhow::{Context, Result};
use clap::Parser;
use etcetera::BaseStrategy;
use std::path::PathBuf;

use crate::commands::Commands;
use crate::config::Config;
use crate::constants::BINARY_NAME;

// Example strings for after_long_help
const CLI_EXAMPLES: &str = r#"EXAMPLES:
  augur fortune --birth-date 1990-04-12          # Fortune from a birth date
  augur fortune --image palm.jpg                 # Palm or face reading
  augur advice                                   # Today's advice
  augur chat --search "Is Mercury in retrograde?" # Grounded chat
  augur image generate "a tarot card" -o card.jpg
  augur video "a comet over the sea" -o comet.mp4
  augur speak "Your fortune awaits" -o voice.pcm"#;

pub struct CliConfig {
    pub config_base_path: PathBuf,
    pub config: Config,
}

impl CliConfig {
    pub fn load() -> Result<Self> {
        let strategy =
            etcetera::choose_base_strategy().context("Could not locate a config directory")?;
        let config_base_path = strategy.config_dir().join(BINARY_NAME);
        let config = Config::load(&config_base_path)?;

        Ok(Self {
            config_base_path,
            config,
        })
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(about = "Fortunes, readings and visions from a generative-AI oracle")]
#[command(name = BINARY_NAME)]
#[command(after_long_help = CLI_EXAMPLES)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (shows retries)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Quiet output (only show errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::image::ImageCommand;
    use augur_core::AspectRatio;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fortune_with_birth_date() {
        let cli = Cli::try_parse_from(["augur", "fortune", "--birth-date", "1990-04-12"]).unwrap();
        let Commands::Fortune(args) = cli.command else {
            panic!("expected fortune");
        };
        assert_eq!(args.birth_date.as_deref(), Some("1990-04-12"));
        assert!(args.image.is_none());
    }

    #[test]
    fn test_fortune_needs_a_source() {
        assert!(Cli::try_parse_from(["augur", "fortune"]).is_err());
        assert!(Cli::try_parse_from(["augur", "fortune", "--image", "palm.jpg"]).is_ok());
        assert!(
            Cli::try_parse_from([
                "augur",
                "fortune",
                "--birth-date",
                "1990-04-12",
                "--image",
                "palm.jpg",
            ])
            .is_ok()
        );
    }

    #[test]
    fn test_parse_image_generate() {
        let cli = Cli::try_parse_from([
            "augur",
            "--quiet",
            "image",
            "generate",
            "a tarot card",
            "--aspect-ratio",
            "3:4",
            "-o",
            "card.jpg",
        ])
        .unwrap();

        assert!(cli.quiet);
        let Commands::Image(image) = cli.command else {
            panic!("expected image");
        };
        let ImageCommand::Generate(args) = image.command else {
            panic!("expected generate");
        };
        assert_eq!(args.aspect_ratio, AspectRatio::Portrait);
        assert!(!args.flash);
    }

    #[test]
    fn test_chat_location_requires_maps() {
        assert!(Cli::try_parse_from(["augur", "chat", "hi", "--lat", "1", "--lon", "2"]).is_err());
        assert!(
            Cli::try_parse_from([
                "augur", "chat", "hi", "--maps", "--lat", "1", "--lon", "2"
            ])
            .is_ok()
        );
    }

    #[test]
    fn test_video_rejects_unknown_ratio() {
        let result = Cli::try_parse_from([
            "augur",
            "video",
            "comet",
            "--aspect-ratio",
            "2:1",
            "-o",
            "c.mp4",
        ]);
        assert!(result.is_err());
    }
}
