use anyhow::{Context, Result};
use augur_core::utils::media;
use augur_core::{AspectRatio, AugurError, InlineData};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use crate::{
    args::CliConfig,
    cli_helpers::{parse_aspect_ratio, write_output},
    client,
    output::{self, OutputLevel},
    spinner::Spinner,
};

#[derive(Args)]
pub struct ImageArgs {
    #[command(subcommand)]
    pub command: ImageCommand,
}

#[derive(Subcommand)]
pub enum ImageCommand {
    /// Generate an image from a prompt
    Generate(GenerateArgs),
    /// Edit an existing image with a prompt
    Edit(EditArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    pub prompt: String,

    /// One of 1:1, 3:4, 4:3, 9:16, 16:9
    #[arg(long, value_parser = parse_aspect_ratio, default_value = "1:1")]
    pub aspect_ratio: AspectRatio,

    /// Use the flash image model instead of Imagen (no billing required)
    #[arg(long)]
    pub flash: bool,

    /// Where to save the image
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct EditArgs {
    /// Image to edit
    pub input: PathBuf,

    /// What to change
    pub prompt: String,

    /// Where to save the edited image
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

impl ImageArgs {
    pub async fn run(&self, output_level: OutputLevel, cli_config: &CliConfig) -> Result<()> {
        let services = client::from_config(cli_config)?;

        let (image, output_path) = match &self.command {
            ImageCommand::Generate(args) if args.flash => {
                if args.aspect_ratio != AspectRatio::Square {
                    output::warning(
                        "--aspect-ratio is ignored by the flash image model",
                        output_level,
                    );
                }
                let response = Spinner::wrap(
                    "Painting",
                    output_level,
                    services.generate_image_with_flash(&args.prompt),
                )
                .await?;
                (response.inline_data().cloned(), &args.output)
            }
            ImageCommand::Generate(args) => {
                let response = Spinner::wrap(
                    "Painting",
                    output_level,
                    services.generate_image(&args.prompt, args.aspect_ratio),
                )
                .await?;
                (response.first_image(), &args.output)
            }
            ImageCommand::Edit(args) => {
                let source = media::load_inline(&args.input).await?;
                let response = Spinner::wrap(
                    "Retouching",
                    output_level,
                    services.edit_image(&source, &args.prompt),
                )
                .await?;
                (response.inline_data().cloned(), &args.output)
            }
        };

        save_image(image, output_path, output_level)
    }
}

/// Decode a generated image and write it to `path`
pub fn save_image(image: Option<InlineData>, path: &Path, output_level: OutputLevel) -> Result<()> {
    let image =
        image.ok_or_else(|| AugurError::empty_response("The model returned no image"))?;
    let bytes = media::decode_media(&image, "image")?;

    write_output(path, &bytes).context("Failed to save the image")?;

    let expected = media::extension_for(&image.mime_type);
    if path.extension().and_then(|e| e.to_str()) != Some(expected) {
        output::note(
            &format!("Saved {} data; a .{expected} extension would match it", image.mime_type),
            output_level,
        );
    }
    output::success(&format!("Saved {}", path.display()), output_level);
    Ok(())
}
