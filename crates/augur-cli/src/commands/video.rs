use anyhow::{Context, Result, bail};
use augur_core::utils::media;
use augur_core::{AiServices, AspectRatio, AugurError, VideoOperation};
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    args::CliConfig,
    cli_helpers::{parse_aspect_ratio, write_output},
    client,
    constants::VIDEO_POLL_SECONDS,
    output::{self, OutputLevel},
    spinner::Spinner,
};

#[derive(Args)]
pub struct VideoArgs {
    pub prompt: String,

    /// 16:9 or 9:16
    #[arg(long, value_parser = parse_aspect_ratio, default_value = "16:9")]
    pub aspect_ratio: AspectRatio,

    /// Image to animate
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Where to save the video
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

impl VideoArgs {
    pub async fn run(&self, output_level: OutputLevel, cli_config: &CliConfig) -> Result<()> {
        if !self.aspect_ratio.supports_video() {
            bail!(
                "Videos can only be {} or {}",
                AspectRatio::Wide,
                AspectRatio::Tall
            );
        }

        let services = client::from_config(cli_config)?;
        let seed = match &self.image {
            Some(path) => Some(media::load_inline(path).await?),
            None => None,
        };

        let operation = services
            .generate_video(&self.prompt, self.aspect_ratio, seed.as_ref())
            .await?;

        render_video(&services, operation, &self.output, output_level).await
    }
}

/// Wait for a started video operation, then download the result to `path`
pub async fn render_video(
    services: &AiServices,
    operation: VideoOperation,
    path: &Path,
    output_level: OutputLevel,
) -> Result<()> {
    tracing::info!(
        "started video operation {}",
        operation.name.as_deref().unwrap_or("<unnamed>")
    );
    output::note(
        &format!(
            "Rendering usually takes a few minutes; progress is checked every {VIDEO_POLL_SECONDS} seconds"
        ),
        output_level,
    );

    let finished = Spinner::wrap(
        "Rendering video",
        output_level,
        services.wait_for_video(operation, Duration::from_secs(VIDEO_POLL_SECONDS)),
    )
    .await?;

    let uri = finished
        .video_uri()
        .ok_or_else(|| AugurError::empty_response("The finished operation has no video"))?;
    let video = Spinner::wrap("Downloading", output_level, services.fetch_video(uri)).await?;

    write_output(path, &video.data).context("Failed to save the video")?;
    output::success(
        &format!(
            "Saved {} ({} bytes, {})",
            path.display(),
            video.data.len(),
            video.content_type
        ),
        output_level,
    );
    Ok(())
}
