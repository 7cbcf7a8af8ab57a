//! The direct-terminal front end.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::ui::{Ui, UiError, UiResult};

/// A [`Ui`] over the process's own terminal.
///
/// A terminal user is local, so `ask` waits indefinitely; warnings and
/// errors go to stderr, everything else to stdout.
pub struct TerminalUi {
    stdin: Mutex<Lines<BufReader<Stdin>>>,
}

impl TerminalUi {
    /// Creates a terminal UI over stdin/stdout/stderr.
    pub fn new() -> Self {
        Self { stdin: Mutex::new(BufReader::new(tokio::io::stdin()).lines()) }
    }
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ui for TerminalUi {
    async fn ask(&self, prompt: &str) -> UiResult<String> {
        println!("{prompt}");
        let mut stdin = self.stdin.lock().await;
        stdin.next_line().await?.ok_or(UiError::Closed)
    }

    fn output(&self, text: &str) {
        println!("{text}");
    }

    fn info(&self, text: &str) {
        println!("{text}");
    }

    fn warn(&self, text: &str) {
        eprintln!("{text}");
    }

    fn error(&self, text: &str) {
        eprintln!("{text}");
    }
}
