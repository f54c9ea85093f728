use anyhow::Result;
use augur_core::utils::media;
use clap::Args;
use std::path::PathBuf;

use crate::{
    args::CliConfig, client, commands::require_text, output::OutputLevel, spinner::Spinner,
};

#[derive(Args)]
pub struct TranscribeArgs {
    /// Audio file (mp3, wav, ogg, m4a, flac, webm)
    pub audio: PathBuf,
}

impl TranscribeArgs {
    pub async fn run(&self, output_level: OutputLevel, cli_config: &CliConfig) -> Result<()> {
        let audio = media::load_inline(&self.audio).await?;
        let services = client::from_config(cli_config)?;

        let response =
            Spinner::wrap("Transcribing", output_level, services.transcribe_audio(&audio))
                .await?;

        println!("{}", require_text(&response)?);
        Ok(())
    }
}
