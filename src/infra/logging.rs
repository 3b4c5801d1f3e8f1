use tracing_subscriber::EnvFilter;

/// Initialize tracing once, honoring RUST_LOG if set (default `info`).
/// Logs always go to stderr: stdout carries the protocol.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Record a counter through the metrics facade and mirror it as a log line.
pub fn log_metric(tool: &str, metric: &str, value: f64) {
    metrics::counter!(format!("gateway_{metric}"), "tool" => tool.to_string())
        .increment(value as u64);
    tracing::trace!(tool = tool, metric = metric, value = value, "metric");
}
