use anyhow::{Context, Result};
use threatmodel::core::config::AppConfig;
use threatmodel::features::Pipeline;
use tracing::error;

async fn run() -> Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let pipeline = Pipeline::from_config(&config).context("Failed to initialize clients")?;

    println!("Azure Cognitive Services Computer Vision - threat model quickstart");
    pipeline.run(&mut std::io::stdout().lock()).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // A missing .env file is fine; the environment may already be set
    let _ = dotenvy::dotenv();
    threatmodel::setup_logging();

    if let Err(e) = run().await {
        error!("{:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
