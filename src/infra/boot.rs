use std::future::Future;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::io::{AsyncBufRead, BufReader};

use crate::api::dispatch::Dispatcher;
use crate::clients::driver::Connector;
use crate::clients::mysql::MySqlConnector;
use crate::domain::ConnectArgs;
use crate::infra::config::Config;
use crate::infra::runtime::heartbeat::{self, HeartbeatConfig};
use crate::infra::runtime::output::OutputChannel;
use crate::infra::runtime::session::{ActivityClock, Session};
use crate::infra::runtime::transport::{self, ExitReason};
use crate::tools::gateway::DatabaseGateway;

/// Serves MySQL over stdin/stdout until the caller goes away or a signal
/// arrives.
pub async fn run_stdio(cfg: Config) -> anyhow::Result<ExitReason> {
    tracing::info!(
        heartbeat_secs = cfg.heartbeat_interval.as_secs(),
        idle_secs = cfg.idle_threshold.as_secs(),
        require_initialize = cfg.require_initialize,
        autoconnect = cfg.autoconnect,
        "BOOT mysql-mcp-gateway"
    );
    run_with(
        cfg,
        Arc::new(MySqlConnector),
        BufReader::new(tokio::io::stdin()),
        OutputChannel::stdout(),
        shutdown_signal(),
    )
    .await
}

/// Wires a session around any connector and byte streams.
pub async fn run_with<R, S>(
    cfg: Config,
    connector: Arc<dyn Connector>,
    input: R,
    out: OutputChannel,
    shutdown: S,
) -> anyhow::Result<ExitReason>
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    cfg.validate().map_err(|e| anyhow!("invalid configuration: {e}"))?;

    let clock = ActivityClock::default();
    let mut gateway = DatabaseGateway::new(connector);
    if cfg.autoconnect {
        let params = cfg.connection.resolve(ConnectArgs::default());
        match gateway.connect(params).await {
            Ok(()) => tracing::info!("autoconnect succeeded"),
            Err(e) => tracing::warn!(error = %e, "autoconnect failed, waiting for connect_db"),
        }
    }

    let mut dispatcher = Dispatcher::new(
        Session::new(gateway, clock.clone()),
        cfg.connection.clone(),
        cfg.require_initialize,
    );
    let beat = heartbeat::spawn(
        out.clone(),
        clock,
        HeartbeatConfig {
            interval: cfg.heartbeat_interval,
            idle_threshold: cfg.idle_threshold,
        },
    );

    let reason = transport::serve(input, out, &mut dispatcher, shutdown).await;
    beat.abort();
    Ok(reason)
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }
}
