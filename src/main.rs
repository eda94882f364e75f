mod config;
mod event;
mod event_log;
mod render;
mod service;
mod timeline;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::{runtime::Runtime, sync::Notify};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // a missing .env is fine
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::Config::from_env()?;
    info!(?config, "starting demo site");

    let runtime = Runtime::new()?;

    let stop = Arc::new(Notify::new());
    ctrlc::set_handler({
        let stop = stop.clone();
        move || {
            eprintln!("Stopping demo site...");
            stop.notify_one();
        }
    })?;

    runtime.block_on(async move {
        let analytics = if config.analytics_enabled {
            service::HttpAnalyticsClient::new_shared(&config.api_base_url, config.api_timeout)
                .context("Failed to create analytics client")?
        } else {
            service::NoopAnalyticsClient::new_shared()
        };

        let (event_writer, event_reader) =
            event_log::new_in_memory_shared_with_capacity(config.event_log_capacity);
        let timeline = timeline::Timeline::canned();
        timeline.validate().context("Invalid demo timeline")?;
        let player = service::DemoPlayer::new_shared(timeline, event_writer);

        service::Ui::new(player, event_reader, analytics)
            .serve(config.bind_addr, async move { stop.notified().await })
            .await
    })
}
