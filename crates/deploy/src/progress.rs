//! Start/end progress reporting around asynchronous work.
//!
//! The original tool drove a terminal spinner; here the observable contract
//! is kept (a loading message before the work, an end message only on
//! success) and the rendering is plain log output.

use std::fmt;
use std::future::Future;

/// Where progress messages go. The deployment flow only ever emits through
/// this trait, so tests can capture messages with an in-memory sink.
pub trait ProgressSink {
    fn emit(&self, message: &str);
}

/// Renders progress messages through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn emit(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Wraps a pending operation with a start/end notification pair.
///
/// Emits `loading_message`, awaits the operation, then emits `end_message`
/// only if it succeeded. Transparent to the operation's outcome: the result
/// (or failure) is returned unchanged, and no retries or timing changes
/// happen here.
pub async fn with_progress<S, Fut, T, E>(
    sink: &S,
    loading_message: impl fmt::Display,
    end_message: impl fmt::Display,
    operation: Fut,
) -> Result<T, E>
where
    S: ProgressSink + ?Sized,
    Fut: Future<Output = Result<T, E>>,
{
    sink.emit(&loading_message.to_string());
    let result = operation.await;
    if result.is_ok() {
        sink.emit(&end_message.to_string());
    }
    result
}
