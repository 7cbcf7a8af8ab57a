//! User-interaction capability set.
//!
//! Every command talks to its user through the [`Ui`] trait, which is the
//! minimal capability set a front end must provide: one blocking question
//! (`ask`), its unmasked-secret variant, and four non-blocking emit methods.
//! Two adapters ship here: [`ChannelUi`] bridges the capability set onto a
//! pair of message channels (a texting-style transport), and [`TerminalUi`]
//! backs a plain interactive terminal. Commands cannot tell them apart.

mod channel;
pub mod input;
mod lines;
mod terminal;

pub use channel::{ChannelUi, DEFAULT_ASK_TIMEOUT};
pub use lines::LineReceiver;
pub use terminal::TerminalUi;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by user-interaction primitives.
#[derive(Error, Debug)]
pub enum UiError {
    /// No reply arrived within the ask window.
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// The input stream ended.
    #[error("input stream closed")]
    Closed,

    /// A second receive was attempted while one was already in flight.
    ///
    /// The input stream has exactly one logical reader at a time; hitting
    /// this means a caller broke the strictly sequential execution contract.
    #[error("concurrent receive on a single-reader input stream")]
    Contended,

    /// Terminal I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for user-interaction operations.
pub type UiResult<T> = std::result::Result<T, UiError>;

/// The capability set any front end must implement to host commands.
#[async_trait]
pub trait Ui: Send + Sync {
    /// Asks the user a question and waits for one line in reply.
    async fn ask(&self, prompt: &str) -> UiResult<String>;

    /// Asks for a secret.
    ///
    /// The default delegates to [`ask`](Ui::ask) with no masking; adapters
    /// for transports that can suppress echo may override this
    /// independently. A line-oriented message transport cannot, so its
    /// secrets travel in the clear by design.
    async fn ask_secret(&self, prompt: &str) -> UiResult<String> {
        self.ask(prompt).await
    }

    /// Emits a plain output line.
    fn output(&self, text: &str);

    /// Emits an informational line related to previous output.
    fn info(&self, text: &str);

    /// Emits a warning line.
    fn warn(&self, text: &str);

    /// Emits an error line.
    fn error(&self, text: &str);
}
