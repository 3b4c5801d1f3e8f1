//! The single exclusive-access point for everything written to stdout.

use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

type Sink = Box<dyn AsyncWrite + Send + Unpin>;

/// Cloneable handle to the output stream. Each `send` writes one complete
/// line under the lock, so responses and heartbeats never interleave.
#[derive(Clone)]
pub struct OutputChannel {
    inner: Arc<Mutex<Sink>>,
}

impl OutputChannel {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    pub async fn send<T: Serialize>(&self, msg: &T) -> std::io::Result<()> {
        let mut line = serde_json::to_string(msg)?;
        line.push('\n');
        let mut w = self.inner.lock().await;
        w.write_all(line.as_bytes()).await?;
        w.flush().await
    }
}
