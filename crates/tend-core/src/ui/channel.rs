//! The prompt capability set bridged onto a pair of message channels.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::ui::{LineReceiver, Ui, UiError, UiResult};

/// How long an [`ask`](Ui::ask) waits for a reply before giving up.
pub const DEFAULT_ASK_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// A [`Ui`] for transports that can only exchange discrete text lines,
/// such as a texting channel.
///
/// Prompts go out on the send half; replies are the next line to arrive on
/// the receive half. The adapter assumes the transport delivers exactly one
/// reply per prompt, in prompt order; it never retries or re-sends.
pub struct ChannelUi {
    lines: LineReceiver,
    out: UnboundedSender<String>,
    ask_timeout: Duration,
}

impl ChannelUi {
    /// Creates an adapter over the given channel pair with the default
    /// five-minute ask window.
    pub fn new(lines: LineReceiver, out: UnboundedSender<String>) -> Self {
        Self { lines, out, ask_timeout: DEFAULT_ASK_TIMEOUT }
    }

    /// Overrides the ask window.
    pub fn with_ask_timeout(mut self, ask_timeout: Duration) -> Self {
        self.ask_timeout = ask_timeout;
        self
    }

    fn send(&self, text: &str) {
        if self.out.send(text.to_string()).is_err() {
            // nobody is draining the output side anymore; nothing to do
            warn!("dropping output line, channel closed");
        }
    }
}

#[async_trait]
impl Ui for ChannelUi {
    /// Sends the prompt, then waits for the next input line.
    ///
    /// Exactly one of three things happens: the next line arrives and is the
    /// answer; the window elapses, in which case one literal `"timeout"`
    /// line is sent and `UiError::Timeout` returned; or the input stream
    /// closes mid-ask, which surfaces as `UiError::Closed` with no timeout
    /// line.
    async fn ask(&self, prompt: &str) -> UiResult<String> {
        self.send(prompt);
        match timeout(self.ask_timeout, self.lines.recv()).await {
            Ok(reply) => reply,
            Err(_) => {
                debug!(window = ?self.ask_timeout, "ask timed out");
                self.send("timeout");
                Err(UiError::Timeout(self.ask_timeout))
            }
        }
    }

    fn output(&self, text: &str) {
        self.send(text);
    }

    fn info(&self, text: &str) {
        self.send(text);
    }

    fn warn(&self, text: &str) {
        self.send(text);
    }

    fn error(&self, text: &str) {
        self.send(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn harness() -> (UnboundedSender<String>, ChannelUi, UnboundedReceiver<String>) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        (in_tx, ChannelUi::new(LineReceiver::new(in_rx), out_tx), out_rx)
    }

    #[tokio::test]
    async fn test_ask_returns_the_next_line() {
        let (in_tx, ui, mut out_rx) = harness();
        in_tx.send("42".to_string()).unwrap();

        let answer = ui.ask("The answer?").await.unwrap();
        assert_eq!(answer, "42");
        assert_eq!(out_rx.recv().await.unwrap(), "The answer?");
    }

    #[tokio::test]
    async fn test_replies_match_asks_in_order() {
        let (in_tx, ui, mut out_rx) = harness();
        for i in 0..5 {
            in_tx.send(format!("reply {i}")).unwrap();
        }

        for i in 0..5 {
            let answer = ui.ask(&format!("prompt {i}")).await.unwrap();
            assert_eq!(answer, format!("reply {i}"));
            assert_eq!(out_rx.recv().await.unwrap(), format!("prompt {i}"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ask_timeout_emits_one_timeout_line() {
        let (_in_tx, ui, mut out_rx) = harness();

        let result = ui.ask("anyone there?").await;
        assert!(matches!(result, Err(UiError::Timeout(_))));

        assert_eq!(out_rx.recv().await.unwrap(), "anyone there?");
        assert_eq!(out_rx.recv().await.unwrap(), "timeout");
        // and nothing after the single timeout line
        assert!(out_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_ask_timeout_window_is_configurable() {
        let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let ui = ChannelUi::new(LineReceiver::new(in_rx), out_tx)
            .with_ask_timeout(Duration::from_millis(20));

        let result = ui.ask("quick now").await;
        assert!(matches!(result, Err(UiError::Timeout(_))));
        assert_eq!(out_rx.recv().await.unwrap(), "quick now");
        assert_eq!(out_rx.recv().await.unwrap(), "timeout");
        drop(in_tx);
    }

    #[tokio::test]
    async fn test_ask_reports_closure_without_timeout_line() {
        let (in_tx, ui, mut out_rx) = harness();
        drop(in_tx);

        let result = ui.ask("anyone there?").await;
        assert!(matches!(result, Err(UiError::Closed)));

        assert_eq!(out_rx.recv().await.unwrap(), "anyone there?");
        assert!(out_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_ask_secret_defaults_to_ask() {
        let (in_tx, ui, mut out_rx) = harness();
        in_tx.send("hunter2".to_string()).unwrap();

        let answer = ui.ask_secret("password?").await.unwrap();
        assert_eq!(answer, "hunter2");
        assert_eq!(out_rx.recv().await.unwrap(), "password?");
    }

    #[tokio::test]
    async fn test_emit_methods_share_the_output_channel() {
        let (_in_tx, ui, mut out_rx) = harness();
        ui.output("a");
        ui.info("b");
        ui.warn("c");
        ui.error("d");

        for expected in ["a", "b", "c", "d"] {
            assert_eq!(out_rx.recv().await.unwrap(), expected);
        }
    }
}
