use anyhow::{Context, Result};
use augur_core::utils::media;
use augur_core::{AugurError, GenerateContentResponse};
use clap::Args;
use std::path::{Path, PathBuf};

use crate::{
    args::CliConfig,
    cli_helpers::{merge_stdin_and_prompt, write_output},
    client,
    output::{self, OutputLevel},
    spinner::Spinner,
};

#[derive(Args)]
pub struct SpeakArgs {
    /// Text to speak (also read from stdin)
    pub text: Option<String>,

    /// Where to save the raw PCM audio
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

impl SpeakArgs {
    pub async fn run(&self, output_level: OutputLevel, cli_config: &CliConfig) -> Result<()> {
        let text = merge_stdin_and_prompt(self.text.clone())
            .context("Nothing to say. Pass text as an argument or pipe it on stdin")?;

        let services = client::from_config(cli_config)?;
        let response =
            Spinner::wrap("Finding a voice", output_level, services.text_to_speech(&text)).await?;

        save_speech(&response, &self.output, output_level)
    }
}

/// Write the PCM audio carried by a text-to-speech answer
pub fn save_speech(
    response: &GenerateContentResponse,
    path: &Path,
    output_level: OutputLevel,
) -> Result<()> {
    let audio = response
        .inline_data()
        .ok_or_else(|| AugurError::empty_response("The model returned no audio"))?;
    let pcm = media::decode_media(audio, "audio")?;

    write_output(path, &pcm).context("Failed to save the audio")?;
    output::success(
        &format!("Saved {} ({})", path.display(), audio.mime_type),
        output_level,
    );
    output::note(
        &format!(
            "Play it with {}",
            output::format_command(&format!(
                "ffplay -f s16le -ar 24000 -ac 1 {}",
                path.display()
            ))
        ),
        output_level,
    );
    Ok(())
}
