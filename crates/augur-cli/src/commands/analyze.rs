use anyhow::Result;
use augur_core::utils::media;
use clap::Args;
use std::path::PathBuf;

use crate::{
    args::CliConfig, client, commands::require_text, output::OutputLevel,
    prompts::DEFAULT_ANALYSIS_PROMPT, spinner::Spinner,
};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Video file (mp4, mov, webm)
    pub video: PathBuf,

    /// What to look for
    #[arg(default_value = DEFAULT_ANALYSIS_PROMPT)]
    pub prompt: String,
}

impl AnalyzeArgs {
    pub async fn run(&self, output_level: OutputLevel, cli_config: &CliConfig) -> Result<()> {
        let video = media::load_inline(&self.video).await?;
        if !video.mime_type.starts_with("video/") {
            anyhow::bail!("{} is not a video file", self.video.display());
        }

        let services = client::from_config(cli_config)?;
        let response = Spinner::wrap(
            "Watching",
            output_level,
            services.analyze_video(&video, &self.prompt),
        )
        .await?;

        println!("{}", require_text(&response)?);
        Ok(())
    }
}
