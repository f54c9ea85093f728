use anyhow::Result;
use clap::Args;

use crate::{
    args::CliConfig, cli_helpers::merge_stdin_and_prompt, client, commands::require_text,
    output::OutputLevel, prompts::DAILY_ADVICE_PROMPT, spinner::Spinner,
};

#[derive(Args)]
pub struct AdviceArgs {
    /// What the advice should be about (also read from stdin)
    #[arg(value_name = "PROMPT")]
    pub prompt: Option<String>,
}

impl AdviceArgs {
    pub async fn run(&self, output_level: OutputLevel, cli_config: &CliConfig) -> Result<()> {
        let services = client::from_config(cli_config)?;

        let prompt = match merge_stdin_and_prompt(self.prompt.clone()) {
            Some(topic) => format!("{DAILY_ADVICE_PROMPT} It should speak to this: {topic}"),
            None => DAILY_ADVICE_PROMPT.to_string(),
        };

        let response =
            Spinner::wrap("Listening", output_level, services.get_daily_advice(&prompt)).await?;

        println!("{}", require_text(&response)?);
        Ok(())
    }
}
