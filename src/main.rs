//! Wiring & DI. Entry point: bootstrap adapters, inject into the input port, run UI.
//! No business logic here.

use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wpbulk::adapters::browser::{DryRunChannel, WebDriverChannel};
use wpbulk::adapters::persistence::{CsvReportWriter, FsInputSource};
use wpbulk::adapters::ui::tui::TuiInputPort;
use wpbulk::domain::CountryRegistry;
use wpbulk::ports::{ChannelDriver, InputPort, InputSourcePort, ReportPort};
use wpbulk::shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    wpbulk::adapters::ui::init_ui();

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("configuration: {}", e))?;

    // A broken country table is a startup failure, not a per-number one.
    let registry = Arc::new(
        CountryRegistry::builtin().map_err(|e| anyhow::anyhow!("country registry: {}", e))?,
    );
    info!(countries = registry.len(), "country registry loaded");

    let driver: Arc<dyn ChannelDriver> = if cfg.is_dry_run() {
        warn!("WPBULK_DRY_RUN is set, no messages will be sent");
        Arc::new(DryRunChannel::new())
    } else {
        info!(
            webdriver = %cfg.webdriver_url_or_default(),
            chat = %cfg.chat_url_or_default(),
            headless = cfg.is_headless(),
            "using chromedriver channel"
        );
        Arc::new(
            WebDriverChannel::new(
                &cfg.webdriver_url_or_default(),
                &cfg.chat_url_or_default(),
                Duration::from_secs(cfg.send_timeout_secs_or_default()),
            )
            .with_profile_dir(cfg.browser_profile_dir.clone())
            .headless(cfg.is_headless()),
        )
    };

    let inputs: Arc<dyn InputSourcePort> = Arc::new(FsInputSource::new());
    let reports: Arc<dyn ReportPort> = Arc::new(CsvReportWriter::new());

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        Arc::new(cfg),
        registry,
        inputs,
        reports,
        driver,
    ));

    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
