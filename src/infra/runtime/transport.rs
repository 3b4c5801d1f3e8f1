//! Line-delimited stdio loop: one JSON message per line in, one per line out.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::api::dispatch::{Dispatcher, Outcome};
use crate::core::mcp;
use crate::infra::runtime::output::OutputChannel;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    EndOfInput,
    ExitRequested,
    Signal,
    InputError,
    OutputClosed,
}

/// Serves requests until end of input, `exit`, the `shutdown` future
/// resolving, or an I/O failure. The connection is always closed before
/// returning.
pub async fn serve<R, S>(
    mut input: R,
    out: OutputChannel,
    dispatcher: &mut Dispatcher,
    shutdown: S,
) -> ExitReason
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut buf = Vec::new();

    let reason = loop {
        buf.clear();
        let read = tokio::select! {
            _ = &mut shutdown => break ExitReason::Signal,
            r = input.read_until(b'\n', &mut buf) => r,
        };

        match read {
            Ok(0) => break ExitReason::EndOfInput,
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break ExitReason::InputError;
            }
        }

        let outcome = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => dispatcher.handle_line(line.trim()).await,
            Err(e) => Outcome::Reply(mcp::parse_error(e.to_string())),
        };

        match outcome {
            Outcome::Reply(resp) => {
                if let Err(e) = out.send(&resp).await {
                    tracing::error!(error = %e, "stdout write failed");
                    break ExitReason::OutputClosed;
                }
            }
            Outcome::Silent => {}
            Outcome::Exit => break ExitReason::ExitRequested,
        }
    };

    tracing::info!(reason = ?reason, "session ending");
    dispatcher.shutdown().await;
    reason
}
