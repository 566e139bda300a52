use cellview::{
    init_logging, poller_config, Config, EventDispatcher, LoadSignal, PanelClient, PollerStop,
    ScreenPoller, ScreenshotHost, BUILD_DATE, VERSION,
};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cellview", version, about = "Mirror a CellAdvisor screen over HTTP")]
struct Args {
    /// Configuration file (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server address, overrides the config file
    #[arg(short, long)]
    base_url: Option<String>,

    /// Write each screenshot to this file
    #[arg(short, long)]
    save_screenshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging()?;
    tracing::info!("CellView {} (built {})", VERSION, BUILD_DATE);

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load_or_default(&Config::default_path()?)?,
    };
    if let Some(base_url) = args.base_url {
        config.connection.base_url = base_url;
    }
    if let Some(path) = args.save_screenshot {
        config.poller.screenshot_path = Some(path);
    }
    config.validate()?;

    let client = PanelClient::new(
        &config.connection.base_url,
        config.connection.request_timeout(),
    )?;
    tracing::info!("Polling {}", client.base_url());

    let events = EventDispatcher::default();
    let load = LoadSignal::new();

    let mut host = ScreenshotHost::new(client.clone(), load.clone());
    if let Some(path) = &config.poller.screenshot_path {
        host = host.save_to(path);
    }
    let host_events = events.subscribe();
    let poller = ScreenPoller::new(client, events, load, poller_config(&config.poller))?;
    let host = tokio::spawn(host.run(host_events));

    let stop = poller.run().await;
    drop(poller);

    let loaded = host.await?;
    match stop {
        PollerStop::TransportFailure(reason) => {
            anyhow::bail!("connection failed after {} screenshots: {}", loaded, reason)
        }
        PollerStop::LoadStalled => {
            anyhow::bail!("screenshot stopped loading after {} screenshots", loaded)
        }
    }
}
