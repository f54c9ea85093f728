//! # augur-core - client for the augur generative-AI proxy
//!
//! The augur proxy exposes a single HTTP endpoint that forwards
//! `{"operation", "params"}` requests to a generative-AI SDK. This crate
//! wraps it with typed payloads, structured errors, and a retry layer that
//! understands the service's rate-limit and overload signals.
//!
//! ## Features
//!
//! - **Fortunes and advice** - text prompts, palm and face readings
//! - **Media** - image generation and editing, video generation, speech, transcription
//! - **Grounded chat** - Google Search and Maps tools, deep thinking
//! - **Retries** - server retry hints honored, exponential backoff otherwise
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use augur_core::{AiServices, ProxyConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProxyConfig::new("http://localhost:3000");
//!     let services = AiServices::new(&config)?;
//!
//!     let response = services.get_fortune("Born on the 12th of April, 1990").await?;
//!     println!("{}", response.text().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! ## Retrying arbitrary operations
//!
//! [`Retrier`] works on any closure returning `Result<T, AugurError>`:
//!
//! ```rust,no_run
//! use augur_core::{AugurError, Retrier, RetryPolicy};
//! use std::time::Duration;
//!
//! # async fn fetch() -> Result<String, AugurError> { Ok(String::new()) }
//! # async fn demo() -> Result<(), AugurError> {
//! let retrier = Retrier::new(RetryPolicy::new(5, Duration::from_millis(250)));
//! let body = retrier.run(|| fetch()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, AugurError>`](AugurError):
//!
//! ```rust,no_run
//! # use augur_core::{AiServices, AugurError, types::AspectRatio};
//! # async fn demo(services: AiServices) {
//! match services.generate_image("a crystal ball", AspectRatio::Square).await {
//!     Ok(response) => println!("{} image(s)", response.generated_images.len()),
//!     Err(AugurError::BillingRequired) => println!("Try the flash image model instead"),
//!     Err(AugurError::QuotaExceeded) => println!("Quota exhausted, come back later"),
//!     Err(e) => println!("Other error: {e}"),
//! }
//! # }
//! ```

pub mod config;
pub mod error;
pub mod proxy;
pub mod retry;
pub mod services;
pub mod types;
pub mod utils;


pub use config::{ConfigBuilder, ModelSet, ProxyConfig};
pub use error::{AugurError, ErrorStatus, UpstreamError};
pub use proxy::{Operation, ProxyClient, ProxyRequest, ProxyResponse};
pub use retry::{
    Classification, Retrier, RetryLayer, RetryPolicy, RetryService, Sleeper, TokioSleeper,
    classify, with_retry,
};
pub use services::{AiServices, ChatOptions, RetryingProxy, VideoBlob};
pub use types::{AspectRatio, GenerateContentResponse, InlineData, LatLng, VideoOperation};
