use anyhow::Result;
use augur_core::config::{PROXY_ENDPOINT_ENV, PROXY_URL_ENV, TIMEOUT_ENV};
use clap::Args;

use crate::{
    args::CliConfig,
    constants::*,
    output::{self, OutputLevel},
};

#[derive(Args)]
pub struct InfoArgs {
    // Info command has no arguments
}

/// Helper function to check environment variable status
fn env_var_status(var_name: &str) -> String {
    std::env::var(var_name).unwrap_or_else(|_| "None".to_string())
}

impl InfoArgs {
    pub async fn run(&self, output_level: OutputLevel, cli_config: &CliConfig) -> Result<()> {
        let config = &cli_config.config;
        let config_path = cli_config.config_base_path.join(CONFIG_FILE_NAME);

        output::note(
            &format!("config file: {}", config_path.display()),
            output_level,
        );

        output::heading("\nProxy:", output_level);
        match config.proxy_config() {
            Ok(proxy) => {
                output::note(&format!("url: {}", proxy.url()), output_level);
                output::note(
                    &format!("timeout: {}s", proxy.timeout_seconds),
                    output_level,
                );
            }
            Err(err) => output::warning(&format!("{err:#}"), output_level),
        }
        output::note(
            &format!(
                "retries: {} attempts, {}ms initial delay, {}ms hint buffer",
                config.retry.max_attempts,
                config.retry.initial_delay_ms,
                config.retry.hint_buffer_ms
            ),
            output_level,
        );

        output::heading("\nModels:", output_level);
        let models = &config.models;
        for (role, model) in [
            ("flash", &models.flash),
            ("pro", &models.pro),
            ("imagen", &models.imagen),
            ("flash_image", &models.flash_image),
            ("veo", &models.veo),
            ("tts", &models.tts),
        ] {
            output::note(
                &format!("{role} = {}", output::format_model(model)),
                output_level,
            );
        }

        output::heading("\nEnv Vars:", output_level);
        for var in [PROXY_URL_ENV, PROXY_ENDPOINT_ENV, TIMEOUT_ENV] {
            output::note(&format!("{var} = {}", env_var_status(var)), output_level);
        }

        output::heading("\nVersion info:", output_level);
        output::note(
            &format!("version: {}", env!("CARGO_PKG_VERSION")),
            output_level,
        );

        Ok(())
    }
}
