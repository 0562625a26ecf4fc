use clap::Parser;
use infrastructure::config::Config;
use infrastructure::http_backend::HttpBackend;
use presentation::cli::{Cli, CliApp};
use shared::telemetry::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load();
    cli.apply(&mut config);
    init_logging(&config.log_level);

    let backend = HttpBackend::new(&config)?;
    let mut app = CliApp::new(backend).with_external_api_key(config.external_api_key.clone());
    app.run().await?;
    Ok(())
}
