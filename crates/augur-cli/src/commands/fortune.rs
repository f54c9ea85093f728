use anyhow::{Context, Result};
use augur_core::utils::media;
use augur_core::{AiServices, AspectRatio, AugurError};
use chrono::Local;
use clap::Args;
use std::path::{Path, PathBuf};

use crate::{
    args::CliConfig,
    cli_helpers::parse_birth_date,
    client,
    commands::{image::save_image, require_text, speak::save_speech, video::render_video},
    constants::QUIET_STARS,
    output::{self, OutputLevel},
    prompts,
    spinner::Spinner,
};

#[derive(Args)]
pub struct FortuneArgs {
    /// Birth date in YYYY-MM-DD format (optional with --image)
    #[arg(long, value_parser = parse_birth_date, required_unless_present = "image")]
    pub birth_date: Option<String>,

    /// Photo of a palm or a face to read
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Name to address the fortune to
    #[arg(long)]
    pub name: Option<String>,

    /// Also print a one or two sentence summary
    #[arg(long)]
    pub summary: bool,

    /// Read the fortune aloud into a raw PCM file
    #[arg(long, value_name = "FILE")]
    pub speak: Option<PathBuf>,

    /// Paint a portrait of your guardian angel
    #[arg(long, value_name = "FILE")]
    pub guide_image: Option<PathBuf>,

    /// Bring the guardian angel portrait to life as a 9:16 video
    #[arg(long, value_name = "FILE", requires = "guide_image")]
    pub animate: Option<PathBuf>,
}

impl FortuneArgs {
    pub async fn run(&self, output_level: OutputLevel, cli_config: &CliConfig) -> Result<()> {
        let services = client::from_config(cli_config)?;
        let today = prompts::date_label(Local::now().date_naive());

        let response = if let Some(path) = &self.image {
            let image = media::load_inline(path).await?;
            let prompt =
                prompts::palm_or_face(&today, self.name.as_deref(), self.birth_date.as_deref());
            Spinner::wrap(
                "Reading the lines",
                output_level,
                services.read_palm_or_face(&image, &prompt),
            )
            .await?
        } else {
            let date = self
                .birth_date
                .as_deref()
                .context("Either --birth-date or --image is required")?;
            let prompt = prompts::fortune(&today, date, self.name.as_deref());
            Spinner::wrap(
                "Consulting the stars",
                output_level,
                services.get_fortune(&prompt),
            )
            .await?
        };

        let Some(fortune) = response.text() else {
            println!("{QUIET_STARS}");
            if self.wants_follow_up() {
                output::warning("No fortune to build on, skipping the extras", output_level);
            }
            return Ok(());
        };

        output::heading(&format!("Your fortune for {today}"), output_level);
        println!("{fortune}");

        let guide = prompts::extract_guide(&fortune)
            .unwrap_or_else(|| prompts::MYSTERIOUS_GUIDE.to_string());
        output::note(
            &format!("\nYour guide: {}", output::format_model(&guide)),
            output_level,
        );

        if self.summary {
            self.summarize(&services, &fortune, output_level).await?;
        }
        if let Some(path) = &self.speak {
            let response = Spinner::wrap(
                "Finding a voice",
                output_level,
                services.text_to_speech(&prompts::spoken_fortune(&today, &fortune)),
            )
            .await?;
            save_speech(&response, path, output_level)?;
        }
        if let Some(path) = &self.guide_image {
            self.paint_guide(&services, &guide, &fortune, path, output_level).await?;
        }
        Ok(())
    }

    fn wants_follow_up(&self) -> bool {
        self.summary || self.speak.is_some() || self.guide_image.is_some()
    }

    async fn summarize(
        &self,
        services: &AiServices,
        fortune: &str,
        output_level: OutputLevel,
    ) -> Result<()> {
        let response = Spinner::wrap(
            "Distilling",
            output_level,
            services.get_fortune(&prompts::summarize(fortune)),
        )
        .await?;

        output::heading("\nIn short", output_level);
        println!("{}", require_text(&response)?);
        Ok(())
    }

    /// Portrait of the guide, then the optional animation seeded with it
    async fn paint_guide(
        &self,
        services: &AiServices,
        guide: &str,
        fortune: &str,
        path: &Path,
        output_level: OutputLevel,
    ) -> Result<()> {
        let response = Spinner::wrap(
            "Painting your guide",
            output_level,
            services.generate_image_with_flash(&prompts::guide_portrait(
                guide,
                self.name.as_deref(),
            )),
        )
        .await?;
        let portrait = response.inline_data().cloned();
        save_image(portrait.clone(), path, output_level)?;

        let Some(video_path) = &self.animate else {
            return Ok(());
        };
        let portrait = portrait
            .ok_or_else(|| AugurError::empty_response("The model returned no portrait"))?;
        let operation = services
            .generate_video(
                &prompts::animate_guide(guide, fortune, self.name.as_deref()),
                AspectRatio::Tall,
                Some(&portrait),
            )
            .await?;

        render_video(services, operation, video_path, output_level).await
    }
}
