//! Live activity feed command.
//!
//! `stream` subscribes to the storage change feed and renders the user's
//! event updates as they happen, until the feed ends. Unlike every other
//! command it does not return promptly; the session dispatching it stays
//! blocked, which is exactly the sequential-execution contract the shared
//! input stream depends on.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::debug;

use crate::commands::{Command, FAILURE, SUCCESS};
use crate::error::Result;
use crate::models::{Event, Record};
use crate::storage::{ChangeKind, Storage};
use crate::ui::Ui;

/// How long the feed may stay quiet before a liveness line goes out.
const HEARTBEAT_PERIOD: Duration = Duration::from_secs(5);

/// Implements the `stream` command.
pub struct StreamCommand {
    ui: Arc<dyn Ui>,
    user_id: String,
    storage: Arc<dyn Storage>,
    heartbeat: Duration,
}

impl StreamCommand {
    /// Creates a `stream` command bound to one user and storage handle.
    pub fn new(ui: Arc<dyn Ui>, user_id: String, storage: Arc<dyn Storage>) -> Self {
        Self { ui, user_id, storage, heartbeat: HEARTBEAT_PERIOD }
    }

    /// Overrides the heartbeat period. The emitted line keeps its wording.
    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    fn errorf(&self, msg: &str) {
        self.ui.error(&format!("[tend stream] Error: {msg}"));
    }

    /// Renders one matched event: tag badges, name, optional location,
    /// then an optional indented note line.
    async fn render(&self, event: &Event) -> Result<()> {
        let tags = self.storage.tags_for(event).await?;
        let mut badges: String =
            tags.iter().map(|tag| format!("[{}]", tag.name)).collect();
        if badges.is_empty() {
            badges = " ".to_string();
        } else {
            badges.push_str(": ");
        }

        let location = self.storage.location_of(event).await?;
        let place = location
            .map(|l| format!("(lat: {}, lon: {}, alt: {})", l.lat, l.lon, l.alt))
            .unwrap_or_default();

        self.ui.output(&format!("{badges}{} {place}", event.name));

        if let Some(note) = self.storage.note_of(event).await? {
            self.ui.output(&format!("\tNote: {}", note.text));
        }

        Ok(())
    }
}

#[async_trait]
impl Command for StreamCommand {
    fn synopsis(&self) -> &'static str {
        "Stream your events"
    }

    fn help(&self) -> String {
        let help_text = "
Usage:
	tend stream
";
        help_text.trim().to_string()
    }

    async fn run(&mut self, _args: &[String]) -> i32 {
        if self.user_id.is_empty() {
            self.errorf("no user id");
            return FAILURE;
        }

        let mut changes = self.storage.changes();
        debug!(user = %self.user_id, "waiting for changes");

        loop {
            tokio::select! {
                item = changes.recv() => match item {
                    None => {
                        self.ui.output("Connection closed by server");
                        return SUCCESS;
                    }
                    Some(Err(e)) => {
                        self.errorf(&format!("receiving change: {e}"));
                        return FAILURE;
                    }
                    Some(Ok(change)) => match change.kind {
                        // the feed is a narrow window: event updates only
                        ChangeKind::Update => {
                            if let Record::Event(event) = change.record {
                                debug!(event = %event.id, "change");
                                if let Err(e) = self.render(&event).await {
                                    self.errorf(&e.to_string());
                                    return FAILURE;
                                }
                            }
                        }
                        ChangeKind::Create | ChangeKind::Delete => {}
                    },
                },
                // re-armed on every wakeup, so it only fires after a full
                // quiet period
                () = sleep(self.heartbeat) => {
                    self.ui.output("5 second heartbeat");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, Note, Tag, Task};
    use crate::storage::MemStore;
    use crate::ui::{ChannelUi, LineReceiver};
    use tokio::sync::mpsc::{self, UnboundedReceiver};
    use tokio::task::JoinHandle;

    struct Harness {
        out_rx: UnboundedReceiver<String>,
        storage: Arc<MemStore>,
        running: JoinHandle<i32>,
    }

    /// Spawns the stream command against a fresh store and lets it
    /// subscribe before returning.
    async fn spawn_stream() -> Harness {
        let (_in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let ui: Arc<dyn Ui> = Arc::new(ChannelUi::new(LineReceiver::new(in_rx), out_tx));
        let storage = Arc::new(MemStore::new());

        let mut command =
            StreamCommand::new(ui, "u1".to_string(), Arc::clone(&storage) as Arc<dyn Storage>);
        let running = tokio::spawn(async move { command.run(&[]).await });
        tokio::task::yield_now().await;

        Harness { out_rx, storage, running }
    }

    fn event(id: &str, name: &str) -> Event {
        Event {
            id: id.to_string(),
            owner_id: "u1".to_string(),
            name: name.to_string(),
            ..Event::default()
        }
    }

    /// Saving twice produces an Update change, which is what the stream
    /// renders.
    async fn update(storage: &MemStore, event: Event) {
        storage.save(Record::Event(event.clone())).await.unwrap();
        storage.save(Record::Event(event)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_bare_event_line_format() {
        let mut h = spawn_stream().await;
        update(&h.storage, event("e1", "standup")).await;

        // leading space for no tags, trailing space for no location
        assert_eq!(h.out_rx.recv().await.unwrap(), " standup ");

        h.storage.close_feeds();
        assert_eq!(h.running.await.unwrap(), SUCCESS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_event_updates_are_rendered() {
        let mut h = spawn_stream().await;

        // a create (first save) and a non-event update are both discarded
        h.storage
            .save(Record::Event(event("e1", "created only")))
            .await
            .unwrap();
        let task = Task { id: "t1".to_string(), owner_id: "u1".to_string(), ..Task::default() };
        h.storage.save(Record::Task(task.clone())).await.unwrap();
        h.storage.save(Record::Task(task)).await.unwrap();

        update(&h.storage, event("e2", "rendered")).await;

        assert_eq!(h.out_rx.recv().await.unwrap(), " rendered ");
        h.storage.close_feeds();
        assert_eq!(h.running.await.unwrap(), SUCCESS);
        assert!(h.out_rx.recv().await.is_some()); // the closure line
        assert!(h.out_rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_rendering_with_tags_location_and_note() {
        let mut h = spawn_stream().await;

        h.storage
            .save(Record::Tag(Tag {
                id: "t1".to_string(),
                owner_id: "u1".to_string(),
                name: "work".to_string(),
            }))
            .await
            .unwrap();
        h.storage
            .save(Record::Location(Location {
                id: "l1".to_string(),
                lat: 40.7,
                lon: -74.0,
                alt: 10.0,
            }))
            .await
            .unwrap();
        h.storage
            .save(Record::Note(Note {
                id: "n1".to_string(),
                owner_id: "u1".to_string(),
                text: "bring slides".to_string(),
                ..Note::default()
            }))
            .await
            .unwrap();

        let mut e = event("e1", "board meeting");
        e.tag_ids = vec!["t1".to_string()];
        e.location_id = Some("l1".to_string());
        e.note_id = Some("n1".to_string());
        update(&h.storage, e).await;

        assert_eq!(
            h.out_rx.recv().await.unwrap(),
            "[work]: board meeting (lat: 40.7, lon: -74, alt: 10)"
        );
        assert_eq!(h.out_rx.recv().await.unwrap(), "\tNote: bring slides");

        h.storage.close_feeds();
        assert_eq!(h.running.await.unwrap(), SUCCESS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_fires_on_a_quiet_feed() {
        let mut h = spawn_stream().await;

        // nothing arrives; the 5 second timer wins the race
        assert_eq!(h.out_rx.recv().await.unwrap(), "5 second heartbeat");
        assert_eq!(h.out_rx.recv().await.unwrap(), "5 second heartbeat");

        // an event re-arms the timer and is rendered as usual
        update(&h.storage, event("e1", "standup")).await;
        assert_eq!(h.out_rx.recv().await.unwrap(), " standup ");

        h.storage.close_feeds();
        assert_eq!(h.running.await.unwrap(), SUCCESS);
    }

    #[tokio::test]
    async fn test_heartbeat_period_is_configurable() {
        let (_in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let ui: Arc<dyn Ui> = Arc::new(ChannelUi::new(LineReceiver::new(in_rx), out_tx));
        let storage = Arc::new(MemStore::new());

        let mut command =
            StreamCommand::new(ui, "u1".to_string(), Arc::clone(&storage) as Arc<dyn Storage>)
                .with_heartbeat(Duration::from_millis(20));
        let running = tokio::spawn(async move { command.run(&[]).await });

        // the wording stays fixed whatever the period
        assert_eq!(out_rx.recv().await.unwrap(), "5 second heartbeat");

        storage.close_feeds();
        assert_eq!(running.await.unwrap(), SUCCESS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closure_ends_with_success_and_silence() {
        let mut h = spawn_stream().await;
        h.storage.close_feeds();

        assert_eq!(h.running.await.unwrap(), SUCCESS);
        assert_eq!(h.out_rx.recv().await.unwrap(), "Connection closed by server");
        // no heartbeat or anything else after closure
        assert!(h.out_rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_error_is_one_line_and_failure() {
        let mut h = spawn_stream().await;
        h.storage.fail_feeds("connection reset");

        assert_eq!(h.running.await.unwrap(), FAILURE);
        let line = h.out_rx.recv().await.unwrap();
        assert!(line.contains("[tend stream] Error:"), "got: {line}");
        assert!(h.out_rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dangling_location_link_fails_the_command() {
        let mut h = spawn_stream().await;

        let mut e = event("e1", "standup");
        e.location_id = Some("nowhere".to_string());
        update(&h.storage, e).await;

        assert_eq!(h.running.await.unwrap(), FAILURE);
        let line = h.out_rx.recv().await.unwrap();
        assert!(line.contains("Error"), "got: {line}");
    }

    #[tokio::test]
    async fn test_missing_user_id_short_circuits() {
        let (_in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let ui: Arc<dyn Ui> = Arc::new(ChannelUi::new(LineReceiver::new(in_rx), out_tx));
        let storage = Arc::new(MemStore::new());

        let mut command =
            StreamCommand::new(ui, String::new(), Arc::clone(&storage) as Arc<dyn Storage>);
        assert_eq!(command.run(&[]).await, FAILURE);

        assert!(out_rx.recv().await.unwrap().contains("no user id"));
    }
}
