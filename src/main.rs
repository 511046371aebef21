//! Bridge binary: WebSocket and HTTP listeners plus the OSC writer task.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use microtonal_bridge::adapters::http::{static_router, BridgeStatus, StaticSiteState};
use microtonal_bridge::adapters::osc::UdpOscWriter;
use microtonal_bridge::adapters::websocket::{websocket_router, ConnectionTracker, WebSocketState};
use microtonal_bridge::application::BridgeRouter;
use microtonal_bridge::config::{AppConfig, ServerConfig};

const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    install_panic_hook();
    config.validate()?;

    let (osc_handle, writer) =
        UdpOscWriter::bind(&config.osc.local_addr(), &config.osc.remote_addr()).await?;
    tracing::info!(
        local_addr = %writer.local_addr()?,
        remote_addr = %writer.remote_addr(),
        "OSC writer ready"
    );
    let mut writer_task = tokio::spawn(writer.run());

    let router = BridgeRouter::new(Arc::new(osc_handle))
        .with_verbose(config.server.verbose_logging);
    let ws_state = WebSocketState::new(Arc::new(router), Arc::new(ConnectionTracker::new()));
    let ws_app = websocket_router().with_state(ws_state);

    let status = BridgeStatus {
        http_port: config.server.http_port,
        ws_port: config.server.ws_port,
        osc_target: config.osc.remote_addr(),
        osc_local_port: config.osc.local_port,
    };
    let http_app = static_router(StaticSiteState::new(config.static_files.root.clone(), status));

    let ws_listener = TcpListener::bind(config.server.ws_addr()).await?;
    let http_listener = TcpListener::bind(config.server.http_addr()).await?;
    tracing::info!(addr = %ws_listener.local_addr()?, "WebSocket server listening");
    tracing::info!(
        addr = %http_listener.local_addr()?,
        root = %config.static_files.root.display(),
        "HTTP server listening"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => tracing::error!(error = %e, "Unable to listen for shutdown signal"),
        }
    });

    let ws_server = axum::serve(
        ws_listener,
        ws_app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_rx.clone()))
    .into_future();
    let http_server = axum::serve(http_listener, http_app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .into_future();

    let (ws_result, http_result) = tokio::join!(ws_server, http_server);
    ws_result?;
    http_result?;

    // open sockets may still hold sink handles; give the writer a bounded drain
    match tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer_task).await {
        Ok(Ok(stats)) => {
            tracing::info!(sent = stats.sent, failed = stats.failed, "OSC writer stopped");
        }
        Ok(Err(e)) => tracing::error!(error = %e, "OSC writer task failed"),
        Err(_) => {
            writer_task.abort();
            tracing::warn!("OSC writer still busy at shutdown; dropped");
        }
    }

    tracing::info!("Bridge stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if server.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(panic = %info, "Unhandled panic");
    }));
}

async fn shutdown_signal(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}
