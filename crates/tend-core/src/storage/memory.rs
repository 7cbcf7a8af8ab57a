//! In-memory storage used by tests and the demo binary.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Event, Location, Note, Record, RecordKind, Tag, Task};
use crate::storage::{Change, ChangeFeed, ChangeKind, Storage, StorageError, StorageResult};

/// In-process [`Storage`] implementation.
///
/// Records live in a map keyed by id; every mutation is fanned out to all
/// live change-feed subscribers in application order.
#[derive(Default)]
pub struct MemStore {
    records: Mutex<HashMap<String, Record>>,
    subscribers: Mutex<Vec<UnboundedSender<StorageResult<Change>>>>,
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes every outstanding change feed, as a server would on shutdown.
    pub fn close_feeds(&self) {
        self.subscribers.lock().unwrap().clear();
    }

    /// Injects a feed failure into every outstanding change feed.
    pub fn fail_feeds(&self, reason: &str) {
        let subscribers = self.subscribers.lock().unwrap();
        for tx in subscribers.iter() {
            let _ = tx.send(Err(StorageError::Feed(reason.to_string())));
        }
    }

    fn publish(&self, change: Change) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| tx.send(Ok(change.clone())).is_ok());
    }

    fn collect<T, F>(&self, kind: RecordKind, owner_id: &str, pick: F) -> Vec<T>
    where
        F: Fn(&Record) -> Option<(T, &str)>,
    {
        let records = self.records.lock().unwrap();
        let mut out: Vec<(String, T)> = records
            .values()
            .filter(|r| r.kind() == kind)
            .filter_map(|r| {
                pick(r).and_then(|(value, owner)| {
                    (owner == owner_id).then(|| (r.id().to_string(), value))
                })
            })
            .collect();
        // map iteration order is arbitrary; sort by id for stable listings
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out.into_iter().map(|(_, value)| value).collect()
    }

    fn get(&self, id: &str) -> Option<Record> {
        self.records.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl Storage for MemStore {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    async fn save(&self, record: Record) -> StorageResult<()> {
        let id = record.id().to_string();
        if id.is_empty() {
            return Err(StorageError::InvalidData("record has no id".to_string()));
        }

        let kind = {
            let mut records = self.records.lock().unwrap();
            let existed = records.insert(id.clone(), record.clone()).is_some();
            if existed { ChangeKind::Update } else { ChangeKind::Create }
        };

        debug!(id = %id, kind = record.kind().as_str(), "saved record");
        self.publish(Change { kind, record });
        Ok(())
    }

    async fn delete(&self, record: &Record) -> StorageResult<()> {
        let id = record.id();
        let removed = self.records.lock().unwrap().remove(id);
        match removed {
            Some(record) => {
                debug!(id = %id, "deleted record");
                self.publish(Change { kind: ChangeKind::Delete, record });
                Ok(())
            }
            None => Err(StorageError::NotFound(id.to_string())),
        }
    }

    async fn tasks(&self, owner_id: &str) -> StorageResult<Vec<Task>> {
        Ok(self.collect(RecordKind::Task, owner_id, |r| match r {
            Record::Task(t) => Some((t.clone(), t.owner_id.as_str())),
            _ => None,
        }))
    }

    async fn tags(&self, owner_id: &str) -> StorageResult<Vec<Tag>> {
        let mut tags = self.collect(RecordKind::Tag, owner_id, |r| match r {
            Record::Tag(t) => Some((t.clone(), t.owner_id.as_str())),
            _ => None,
        });
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn notes(&self, owner_id: &str) -> StorageResult<Vec<Note>> {
        Ok(self.collect(RecordKind::Note, owner_id, |r| match r {
            Record::Note(n) => Some((n.clone(), n.owner_id.as_str())),
            _ => None,
        }))
    }

    fn changes(&self) -> ChangeFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    async fn tags_for(&self, event: &Event) -> StorageResult<Vec<Tag>> {
        let mut tags = Vec::with_capacity(event.tag_ids.len());
        for id in &event.tag_ids {
            match self.get(id) {
                Some(Record::Tag(tag)) => tags.push(tag),
                _ => return Err(StorageError::NotFound(format!("tag {id}"))),
            }
        }
        Ok(tags)
    }

    async fn location_of(&self, event: &Event) -> StorageResult<Option<Location>> {
        let Some(id) = event.location_id.as_deref() else {
            return Ok(None);
        };
        match self.get(id) {
            Some(Record::Location(location)) => Ok(Some(location)),
            _ => Err(StorageError::NotFound(format!("location {id}"))),
        }
    }

    async fn note_of(&self, event: &Event) -> StorageResult<Option<Note>> {
        let Some(id) = event.note_id.as_deref() else {
            return Ok(None);
        };
        match self.get(id) {
            Some(Record::Note(note)) => Ok(Some(note)),
            _ => Err(StorageError::NotFound(format!("note {id}"))),
        }
    }
}
