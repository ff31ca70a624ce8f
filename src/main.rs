use atelier::app;
use atelier::config::SiteConfig;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SiteConfig::parse();
    log::info!("Data directory: {}", config.data_dir.display());

    // Start the web application
    app::run(config).await?;

    Ok(())
}
