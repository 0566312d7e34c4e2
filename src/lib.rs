//! Threatmodel - reads an architecture diagram and suggests security baselines.
//!
//! The pipeline runs three remote services in sequence:
//! 1. Computer Vision "Read" recognizes the text in a local image
//! 2. An Azure `OpenAI` completion deployment names the cloud services in that
//!    text and then writes security recommendations for them
//! 3. The GitHub contents API is searched for a security baseline document
//!    per service
//!
//! # Example
//!
//! ```no_run
//! use threatmodel::core::config::AppConfig;
//! use threatmodel::features::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     threatmodel::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let pipeline = Pipeline::from_config(&config)?;
//!
//!     let report = pipeline.run(&mut std::io::stdout()).await?;
//!     println!("{} baselines found", report.baselines.found_count());
//!     Ok(())
//! }
//! ```

pub mod ai;
pub mod clients;
pub mod core;
pub mod errors;
pub mod features;
pub mod utils;

pub use errors::PipelineError;

/// Configure structured JSON logging on stderr.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once is harmless.
///
/// # Example
///
/// ```
/// threatmodel::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
