use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use aqi_server::aqicn::WebDriverLauncher;
use aqi_server::config::AppConfig;
use aqi_server::cpcb::{CpcbClient, FileFeed};
use aqi_server::lookup::AqiLookup;
use aqi_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("aqi_server=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Browser sessions are launched per request
    let launcher = WebDriverLauncher::new(config.browser.clone());

    // Read stations from a local snapshot if one is configured
    let lookup = match &config.feed_file {
        Some(path) => {
            info!(path = %path.display(), "using offline CPCB feed");
            AqiLookup::new(FileFeed::new(path.clone()), launcher, config.scrape.clone())
        }
        None => {
            info!(url = %config.feed.url, "using live CPCB feed");
            let client = CpcbClient::new(config.feed.clone())?;
            AqiLookup::new(client, launcher, config.scrape.clone())
        }
    };

    let app = create_router(AppState::new(lookup));

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("AQI server listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  GET  /health                - Health check");
    println!("  GET  /aqi?lat=<f>&lon=<f>   - AQI at the nearest CPCB station");

    axum::serve(listener, app).await?;
    Ok(())
}
