//! Tend Core - channel-bridged command sessions for a personal assistant.
//!
//! This crate provides the machinery that lets the same synchronous,
//! prompt/response command set serve two front ends:
//! - a direct interactive terminal, and
//! - a remote, line-oriented message transport (a texting-style channel)
//!   with no notion of a persistent terminal session.
//!
//! The pieces, leaves first: the [`ui`] module defines the capability set
//! commands interact through and bridges it onto a pair of message channels;
//! a [`Session`] runs one user's dispatch loop over those channels; and the
//! `stream` command turns the storage change feed into a live, heartbeat-
//! augmented activity log.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tend_core::{CommandSet, LineReceiver, MemStore, Session, User};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (_in_tx, in_rx) = mpsc::unbounded_channel();
//!     let (out_tx, _out_rx) = mpsc::unbounded_channel();
//!     let session = Session::new(
//!         Some(User::new("u1", "alice")),
//!         Arc::new(MemStore::new()),
//!         LineReceiver::new(in_rx),
//!         out_tx,
//!         Arc::new(CommandSet),
//!         || {},
//!     );
//!     session.start().await;
//! }
//! ```

pub mod commands;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod ui;

pub use commands::{
    Command, CommandSet, Interpreter, NoteCommand, StreamCommand, TagCommand, TodoCommand,
    FAILURE, SUCCESS,
};
pub use error::{Result, TendError};
pub use models::{Event, Location, Note, Record, RecordKind, Tag, Task, User};
pub use session::Session;
pub use storage::{
    Change, ChangeFeed, ChangeKind, MemStore, Storage, StorageError, StorageResult,
};
pub use ui::{ChannelUi, LineReceiver, TerminalUi, Ui, UiError, UiResult};
