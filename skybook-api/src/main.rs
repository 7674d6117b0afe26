use std::net::SocketAddr;
use std::time::Duration;
use skybook_api::{app, AppState};
use skybook_store::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "skybook_api=debug,skybook_order=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        "Starting Skybook API on port {} (tax rate {}, currency {})",
        config.server.port,
        config.business_rules.tax_rate,
        config.business_rules.default_currency
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let sweep_every = Duration::from_secs(config.sessions.sweep_interval_secs.max(1));
    let state = AppState::new(config);

    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_every);
        loop {
            ticker.tick().await;
            sweeper.sweep_idle().await;
        }
    });

    let app = app(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
