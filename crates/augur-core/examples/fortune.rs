use augur_core::{AiServices, ConfigBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Requires AUGUR_PROXY_URL, e.g. http://localhost:3000
    let config = ConfigBuilder::from_env()?;
    let services = AiServices::new(&config)?;

    println!("Asking the stars via {}...\n", config.url());

    let response = services
        .get_fortune(
            "Tell a short, poetic fortune for someone born on the 12th of April, 1990. \
             Mention their zodiac sign.",
        )
        .await?;

    match response.text() {
        Some(text) => println!("{text}"),
        None => println!("The stars are quiet for now. Try again later."),
    }

    if let Some(usage) = response.usage_metadata {
        println!("\nTokens used: {}", usage.total_token_count);
    }

    Ok(())
}
