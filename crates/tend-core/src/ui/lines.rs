//! Single-owner wrapper over the shared input line stream.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tracing::error;

use crate::ui::{UiError, UiResult};

/// Receive half of a session's input stream, enforcing single readership.
///
/// A session's dispatch loop and the prompts nested inside a running command
/// take turns reading the same stream; correctness rests on there never
/// being two readers at once. Cloning a `LineReceiver` hands out another
/// handle to the same stream, and [`recv`](LineReceiver::recv) fails loudly
/// if it catches two handles receiving concurrently, instead of silently
/// routing a line to the wrong consumer.
#[derive(Clone)]
pub struct LineReceiver {
    inner: Arc<Mutex<UnboundedReceiver<String>>>,
}

impl LineReceiver {
    /// Wraps a raw line channel receiver.
    pub fn new(rx: UnboundedReceiver<String>) -> Self {
        Self { inner: Arc::new(Mutex::new(rx)) }
    }

    /// Receives the next line.
    ///
    /// Returns `UiError::Closed` when the send half is gone, and
    /// `UiError::Contended` if another receive is already in flight.
    pub async fn recv(&self) -> UiResult<String> {
        let Ok(mut rx) = self.inner.try_lock() else {
            error!("two concurrent receives on one input stream; commands must run strictly sequentially");
            return Err(UiError::Contended);
        };
        rx.recv().await.ok_or(UiError::Closed)
    }
}
