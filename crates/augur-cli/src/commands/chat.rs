use anyhow::{Context, Result};
use augur_core::{ChatOptions, LatLng};
use clap::Args;

use crate::{
    args::CliConfig,
    cli_helpers::merge_stdin_and_prompt,
    client,
    commands::{print_sources, require_text},
    output::{self, OutputLevel},
    spinner::Spinner,
};

#[derive(Args)]
pub struct ChatArgs {
    /// The question (also read from stdin)
    #[arg(value_name = "PROMPT")]
    pub prompt: Option<String>,

    /// Ground the answer with Google Search
    #[arg(long)]
    pub search: bool,

    /// Think longer before answering
    #[arg(long)]
    pub think: bool,

    /// Ground the answer with Google Maps
    #[arg(long)]
    pub maps: bool,

    /// Latitude for map answers
    #[arg(long, requires_all = ["maps", "lon"], allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude for map answers
    #[arg(long, requires_all = ["maps", "lat"], allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl ChatArgs {
    pub fn options(&self) -> Result<ChatOptions> {
        let location = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(LatLng::new(lat, lon)?),
            _ => None,
        };

        Ok(ChatOptions {
            search: self.search,
            thinking: self.think,
            maps: self.maps,
            location,
        })
    }

    pub async fn run(&self, output_level: OutputLevel, cli_config: &CliConfig) -> Result<()> {
        let prompt = merge_stdin_and_prompt(self.prompt.clone())
            .context("No prompt provided. Pass one as an argument or pipe it on stdin")?;
        let options = self.options()?;

        if options.maps && options.location.is_none() {
            output::warning(
                "No --lat/--lon given; map answers will not be tailored to a location",
                output_level,
            );
        }

        let services = client::from_config(cli_config)?;
        let message = if options.thinking {
            "Thinking deeply"
        } else {
            "Thinking"
        };
        let response = Spinner::wrap(
            message,
            output_level,
            services.send_chat_message(&prompt, options),
        )
        .await?;

        println!("{}", require_text(&response)?);
        print_sources(&response, output_level);
        Ok(())
    }
}
