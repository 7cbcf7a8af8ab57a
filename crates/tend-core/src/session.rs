//! Per-user command session over a line-oriented transport.
//!
//! A [`Session`] is the bridge between one authenticated user and one pair
//! of message channels: it reads text lines, tokenizes each into an argument
//! vector, and synchronously dispatches it through an [`Interpreter`]. While
//! a dispatch is in progress the loop is not reading, so any prompt the
//! running command asks is the sole reader of the stream at that moment;
//! that is the entire line-routing mechanism, and it depends on commands
//! executing strictly one at a time.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

use crate::commands::Interpreter;
use crate::models::User;
use crate::storage::Storage;
use crate::ui::{ChannelUi, LineReceiver, Ui, UiError};

const NO_ACCOUNT: &str = "Looks like you don't have an account, sorry :(";

/// One user's command session over a channel pair.
pub struct Session {
    /// The user interacting with the session, if authenticated.
    user: Option<User>,
    /// Storage handle commands execute against.
    storage: Arc<dyn Storage>,
    /// Receive half of the transport's input stream.
    lines: LineReceiver,
    /// Send half of the transport's output stream.
    output: UnboundedSender<String>,
    /// Interpreter the dispatch loop hands argument vectors to.
    interpreter: Arc<dyn Interpreter>,
    /// One-shot teardown callback supplied by the owning transport.
    bail: Option<Box<dyn FnOnce() + Send>>,
}

impl Session {
    /// Creates a session bound to one channel pair.
    pub fn new(
        user: Option<User>,
        storage: Arc<dyn Storage>,
        lines: LineReceiver,
        output: UnboundedSender<String>,
        interpreter: Arc<dyn Interpreter>,
        bail: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            user,
            storage,
            lines,
            output,
            interpreter,
            bail: Some(Box::new(bail)),
        }
    }

    /// Runs the dispatch loop until the input stream closes.
    ///
    /// A session with no usable identity emits one fixed message, bails, and
    /// returns without reading any input. Otherwise every received line
    /// becomes one interpreter dispatch; the dispatch status never stops the
    /// loop.
    pub async fn start(mut self) {
        let ui: Arc<dyn Ui> =
            Arc::new(ChannelUi::new(self.lines.clone(), self.output.clone()));

        let Some(user) = self.user.take().filter(|u| !u.id.is_empty()) else {
            ui.output(NO_ACCOUNT);
            self.bail();
            return;
        };

        info!(user = %user.id, "session started");
        loop {
            match self.lines.recv().await {
                Ok(line) => {
                    let argv: Vec<String> =
                        line.split_whitespace().map(str::to_string).collect();
                    // we block here so a nested ask can read in our absence
                    let status = self
                        .interpreter
                        .dispatch(&argv, Arc::clone(&ui), &user, Arc::clone(&self.storage))
                        .await;
                    if status != 0 {
                        debug!(status, line = %line, "command returned failure");
                    }
                }
                Err(UiError::Closed) => {
                    info!(user = %user.id, "input stream closed, session over");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "session receive failed");
                    break;
                }
            }
        }
    }

    fn bail(&mut self) {
        if let Some(bail) = self.bail.take() {
            bail();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

    use crate::commands::{CommandSet, SUCCESS};
    use crate::models::{Record, Task};
    use crate::storage::MemStore;
    use crate::ui::input;

    struct Recorder {
        argvs: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl Interpreter for Recorder {
        async fn dispatch(
            &self,
            argv: &[String],
            _ui: Arc<dyn Ui>,
            _user: &User,
            _storage: Arc<dyn Storage>,
        ) -> i32 {
            self.argvs.lock().unwrap().push(argv.to_vec());
            SUCCESS
        }
    }

    fn channels() -> (
        UnboundedSender<String>,
        LineReceiver,
        UnboundedSender<String>,
        UnboundedReceiver<String>,
    ) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        (in_tx, LineReceiver::new(in_rx), out_tx, out_rx)
    }

    #[tokio::test]
    async fn test_missing_identity_bails_once_and_reads_nothing() {
        let (in_tx, lines, out_tx, mut out_rx) = channels();
        let probe = lines.clone();
        let bails = Arc::new(AtomicI32::new(0));
        let bails_in_session = Arc::clone(&bails);

        let session = Session::new(
            None,
            Arc::new(MemStore::new()),
            lines,
            out_tx,
            Arc::new(Recorder { argvs: Mutex::new(Vec::new()) }),
            move || {
                bails_in_session.fetch_add(1, Ordering::SeqCst);
            },
        );

        in_tx.send("todo list".to_string()).unwrap();
        session.start().await;

        assert_eq!(bails.load(Ordering::SeqCst), 1);
        assert_eq!(out_rx.recv().await.unwrap(), NO_ACCOUNT);
        // the line we queued was never consumed
        assert_eq!(probe.recv().await.unwrap(), "todo list");
    }

    #[tokio::test]
    async fn test_lines_become_argument_vectors() {
        let (in_tx, lines, out_tx, _out_rx) = channels();
        let recorder = Arc::new(Recorder { argvs: Mutex::new(Vec::new()) });

        let session = Session::new(
            Some(User::new("u1", "alice")),
            Arc::new(MemStore::new()),
            lines,
            out_tx,
            Arc::clone(&recorder) as Arc<dyn Interpreter>,
            || {},
        );

        in_tx.send("todo list".to_string()).unwrap();
        in_tx.send("  note   new  ".to_string()).unwrap();
        drop(in_tx);
        session.start().await;

        let argvs = recorder.argvs.lock().unwrap();
        assert_eq!(
            *argvs,
            vec![
                vec!["todo".to_string(), "list".to_string()],
                vec!["note".to_string(), "new".to_string()],
            ]
        );
    }

    /// An interpreter whose "todo new" asks three nested questions, like the
    /// real one does.
    struct Asker;

    #[async_trait]
    impl Interpreter for Asker {
        async fn dispatch(
            &self,
            argv: &[String],
            ui: Arc<dyn Ui>,
            user: &User,
            storage: Arc<dyn Storage>,
        ) -> i32 {
            match argv.first().map(String::as_str) {
                Some("list") => {
                    ui.output("Todos:");
                    SUCCESS
                }
                Some("new") => {
                    let name = input::string_input(ui.as_ref(), "Name:").await.unwrap();
                    let _deadline = input::yes_no(ui.as_ref(), "Does it have a deadline?")
                        .await
                        .unwrap();
                    let _prereqs =
                        input::yes_no(ui.as_ref(), "Does it have any prerequisites?")
                            .await
                            .unwrap();
                    let task = Task {
                        id: storage.new_id(),
                        owner_id: user.id.clone(),
                        name,
                        ..Task::default()
                    };
                    storage.save(Record::Task(task)).await.unwrap();
                    SUCCESS
                }
                _ => SUCCESS,
            }
        }
    }

    #[tokio::test]
    async fn test_nested_asks_consume_from_the_shared_stream() {
        let (in_tx, lines, out_tx, mut out_rx) = channels();
        let storage = Arc::new(MemStore::new());

        let session = Session::new(
            Some(User::new("u1", "alice")),
            Arc::clone(&storage) as Arc<dyn Storage>,
            lines,
            out_tx,
            Arc::new(Asker),
            || {},
        );

        // line 1 dispatches alone; lines 2-5 are one dispatch plus its
        // three nested replies
        for line in ["list", "new", "Buy milk", "n", "n"] {
            in_tx.send(line.to_string()).unwrap();
        }
        drop(in_tx);
        session.start().await;

        let tasks = storage.tasks("u1").await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Buy milk");

        assert_eq!(out_rx.recv().await.unwrap(), "Todos:");
        assert_eq!(out_rx.recv().await.unwrap(), "Name: [string]:");
    }

    #[tokio::test]
    async fn test_interpreter_failure_does_not_stop_the_loop() {
        struct Failing(AtomicI32);

        #[async_trait]
        impl Interpreter for Failing {
            async fn dispatch(
                &self,
                _argv: &[String],
                _ui: Arc<dyn Ui>,
                _user: &User,
                _storage: Arc<dyn Storage>,
            ) -> i32 {
                self.0.fetch_add(1, Ordering::SeqCst);
                1
            }
        }

        let (in_tx, lines, out_tx, _out_rx) = channels();
        let failing = Arc::new(Failing(AtomicI32::new(0)));

        let session = Session::new(
            Some(User::new("u1", "alice")),
            Arc::new(MemStore::new()),
            lines,
            out_tx,
            Arc::clone(&failing) as Arc<dyn Interpreter>,
            || {},
        );

        in_tx.send("boom".to_string()).unwrap();
        in_tx.send("boom again".to_string()).unwrap();
        drop(in_tx);
        session.start().await;

        assert_eq!(failing.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_session_runs_the_real_command_set() {
        let (in_tx, lines, out_tx, mut out_rx) = channels();
        let storage = Arc::new(MemStore::new());

        let session = Session::new(
            Some(User::new("u1", "alice")),
            Arc::clone(&storage) as Arc<dyn Storage>,
            lines,
            out_tx,
            Arc::new(CommandSet),
            || {},
        );

        for line in ["todo new", "Buy milk", "n", "n", "todo list"] {
            in_tx.send(line.to_string()).unwrap();
        }
        drop(in_tx);
        session.start().await;

        let tasks = storage.tasks("u1").await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Buy milk");

        let mut saw_listing_header = false;
        while let Ok(line) = out_rx.try_recv() {
            if line == "Todos:" {
                saw_listing_header = true;
            }
        }
        assert!(saw_listing_header);
    }
}
