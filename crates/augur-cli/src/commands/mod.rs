use anyhow::Result;
use augur_core::{AugurError, GenerateContentResponse};
use clap::Subcommand;

use crate::output::{self, OutputLevel};

pub mod advice;
pub mod analyze;
pub mod chat;
pub mod completions;
pub mod fortune;
pub mod image;
pub mod info;
pub mod speak;
pub mod transcribe;
pub mod video;

// Re-export the command args structs
pub use advice::AdviceArgs;
pub use analyze::AnalyzeArgs;
pub use chat::ChatArgs;
pub use completions::CompletionsArgs;
pub use fortune::FortuneArgs;
pub use image::ImageArgs;
pub use info::InfoArgs;
pub use speak::SpeakArgs;
pub use transcribe::TranscribeArgs;
pub use video::VideoArgs;

const FORTUNE_EXAMPLES: &str = r#"EXAMPLES:
  augur fortune --birth-date 1990-04-12            # Fortune from a birth date
  augur fortune --birth-date 1990-04-12 --name Ada # Personalised fortune
  augur fortune --image palm.jpg                   # Palm or face reading
  augur fortune --birth-date 1990-04-12 --summary --speak fortune.pcm
  augur fortune --birth-date 1990-04-12 --guide-image angel.png --animate angel.mp4"#;

const CHAT_EXAMPLES: &str = r#"EXAMPLES:
  augur chat "What does the Tower card mean?"
  augur chat --think "Plan my week around the full moon"
  augur chat --search "When is the next eclipse?"
  augur chat --maps --lat 48.85 --lon 2.35 "Quiet tea rooms nearby?""#;

const IMAGE_EXAMPLES: &str = r#"EXAMPLES:
  augur image generate "a guardian angel" -o angel.jpg
  augur image generate "a tarot card" --aspect-ratio 3:4 -o card.jpg
  augur image generate "an owl" --flash -o owl.png   # No billing required
  augur image edit palm.jpg "add glowing lines" -o glow.png"#;

const VIDEO_EXAMPLES: &str = r#"EXAMPLES:
  augur video "a comet over the sea" -o comet.mp4
  augur video "the angel spreads its wings" --image angel.jpg --aspect-ratio 9:16 -o angel.mp4"#;

const COMPLETIONS_EXAMPLES: &str = r#"EXAMPLES:
  augur completions bash > ~/.bashrc       # Add bash completions
  augur completions zsh > ~/.zshrc         # Add zsh completions
  augur completions fish > ~/.config/fish/completions/augur.fish"#;

#[derive(Subcommand)]
pub enum Commands {
    /// Tell a fortune from a birth date or a palm/face photo, then optionally
    /// summarize it, speak it, or paint and animate your guardian angel
    #[command(after_long_help = FORTUNE_EXAMPLES)]
    Fortune(FortuneArgs),
    /// Get a short piece of advice for today
    Advice(AdviceArgs),
    /// Ask the oracle anything, optionally grounded in search or maps
    #[command(after_long_help = CHAT_EXAMPLES)]
    Chat(ChatArgs),
    /// Generate or edit images
    #[command(after_long_help = IMAGE_EXAMPLES)]
    Image(ImageArgs),
    /// Generate a short video
    #[command(after_long_help = VIDEO_EXAMPLES)]
    Video(VideoArgs),
    /// Speak text aloud (writes raw 24kHz 16-bit mono PCM)
    Speak(SpeakArgs),
    /// Transcribe an audio file
    Transcribe(TranscribeArgs),
    /// Analyze a video file
    Analyze(AnalyzeArgs),
    /// Show configuration and system information
    Info(InfoArgs),
    /// Generate shell completions
    #[command(after_long_help = COMPLETIONS_EXAMPLES)]
    Completions(CompletionsArgs),
}

/// Answer text, or a hard error when the model produced none
pub fn require_text(response: &GenerateContentResponse) -> Result<String> {
    if let Some(text) = response.text() {
        return Ok(text);
    }

    let reason = response
        .block_reason()
        .map(|reason| format!(" (blocked: {reason})"))
        .unwrap_or_default();
    Err(AugurError::empty_response(format!("The model returned no text{reason}")).into())
}

/// Print the error with a suggestion where one applies
pub fn report_error(err: &anyhow::Error) {
    let suggestion = match err.downcast_ref::<AugurError>() {
        Some(AugurError::BillingRequired) => Some(format!(
            "Imagen needs a billed account; try {}",
            output::format_command("augur image generate --flash")
        )),
        Some(AugurError::SafetyBlocked { .. }) => {
            Some("The image model refused this prompt; try rewording it".to_string())
        }
        Some(AugurError::QuotaExceeded) => {
            Some("The quota resets over time; wait a minute and try again".to_string())
        }
        Some(AugurError::ModelOverloaded) => Some(format!(
            "Check that the proxy is running, see {}",
            output::format_command("augur info")
        )),
        Some(AugurError::Configuration { .. }) => Some(format!(
            "Run {} to see where configuration is read from",
            output::format_command("augur info")
        )),
        _ => None,
    };

    let message = format!("{err:#}");
    match suggestion {
        Some(suggestion) => output::error_with_suggestion(&message, &suggestion),
        None => output::error(&message),
    }
}

/// Print grounding sources under a chat answer
pub fn print_sources(response: &GenerateContentResponse, output_level: OutputLevel) {
    let sources: Vec<String> = response
        .grounding_chunks()
        .iter()
        .filter_map(|chunk| chunk.source())
        .filter_map(|source| {
            let uri = source.uri.as_deref()?;
            Some(match source.title.as_deref() {
                Some(title) => format!("  {title} - {uri}"),
                None => format!("  {uri}"),
            })
        })
        .collect();

    if sources.is_empty() {
        return;
    }

    output::heading("\nSources:", output_level);
    for source in sources {
        output::note(&source, output_level);
    }
}
