//! Implementations of the `tend` subcommands.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use tend_core::{
    CommandSet, Interpreter, LineReceiver, MemStore, Session, Storage, TerminalUi, Ui, User,
};

use crate::config::Config;

/// Creates the account configuration for this machine.
pub fn init(name: &str, path: &Path) -> Result<()> {
    let config = Config { user_id: Uuid::new_v4().to_string(), user_name: name.to_string() };
    config.save(path)?;
    println!("User account created, your id is: {}", config.user_id);
    Ok(())
}

/// Runs one command line against the local terminal.
///
/// This is the direct front end: the terminal itself is the UI, and the
/// command's exit status becomes the process exit status.
pub async fn run(line: &[String], config_path: &Path) -> Result<i32> {
    let config = Config::load(config_path)?;
    let user = User::new(config.user_id, config.user_name);

    let ui: Arc<dyn Ui> = Arc::new(TerminalUi::new());
    let storage: Arc<dyn Storage> = Arc::new(MemStore::new());

    Ok(CommandSet.dispatch(line, ui, &user, storage).await)
}

/// Runs a full channel-bridged session over stdin/stdout.
///
/// Stands in for a remote transport: each stdin line enters the session's
/// input channel, and everything the session emits is printed. The session
/// ends when stdin closes.
pub async fn session(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let user = User::new(config.user_id, config.user_name);

    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if in_tx.send(line).is_err() {
                break;
            }
        }
        // dropping in_tx closes the session's input stream
    });

    let writer = tokio::spawn(async move {
        while let Some(line) = out_rx.recv().await {
            println!("{line}");
        }
    });

    let session = Session::new(
        Some(user),
        Arc::new(MemStore::new()),
        LineReceiver::new(in_rx),
        out_tx,
        Arc::new(CommandSet),
        || warn!("session bailed"),
    );
    session.start().await;
    info!("session finished");

    reader.abort();
    writer.await?;
    Ok(())
}
