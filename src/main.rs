// main.rs
use smart_lamp::{
    Dispatcher, TracingSink,
    config::{Settings, TransportKind},
    handlers,
    transport::{Connector, TcpConnector, WsConnector},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::new()?;

    if settings.metrics.enabled {
        smart_lamp::metrics::setup_metrics(settings.metrics.port)
            .map_err(|e| anyhow::anyhow!("Failed to setup metrics: {}", e))?;
        info!(port = settings.metrics.port, "Metrics exporter started");
    }

    match settings.connection.transport {
        TransportKind::Ws => run(WsConnector::new(settings.connection.path.clone()), &settings).await,
        TransportKind::Tcp => run(TcpConnector, &settings).await,
    }
}

async fn run<C: Connector>(connector: C, settings: &Settings) -> anyhow::Result<()> {
    let mut dispatcher = Dispatcher::new(settings.connection.endpoint(), connector, TracingSink)
        .with_fault_limit(settings.connection.max_consecutive_faults);

    if settings.status.enabled {
        let listener = tokio::net::TcpListener::bind(&settings.status.address)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind address: {}", e))?;
        let snapshots = dispatcher.subscribe();
        tokio::spawn(async move {
            if let Err(e) = handlers::serve(listener, snapshots).await {
                error!("Status server error: {}", e);
            }
        });
    }

    info!(endpoint = %dispatcher.endpoint(), "Lamp starting");
    let termination = dispatcher.run(shutdown_signal()).await?;
    info!(?termination, state = ?dispatcher.state(), "Lamp stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
