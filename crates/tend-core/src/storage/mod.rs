//! Storage collaborator contract.
//!
//! Commands and sessions talk to storage through the [`Storage`] trait:
//! record CRUD scoped to an owning user, relation lookups for events, and a
//! live change feed. The persistent engine behind the trait is deliberately
//! out of scope; [`MemStore`] is the in-process reference implementation used
//! by tests and the demo binary.

mod error;
mod memory;

pub use error::{StorageError, StorageResult};
pub use memory::MemStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::models::{Event, Location, Note, Record, Tag, Task};

/// The kind of mutation a change notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A record was created.
    Create,
    /// An existing record was modified.
    Update,
    /// A record was removed.
    Delete,
}

/// A single mutation notification from the storage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// What happened.
    pub kind: ChangeKind,
    /// The record after the mutation (or as deleted).
    pub record: Record,
}

/// A live, ordered feed of mutation notifications.
///
/// `Some(Ok(_))` carries the next change, `Some(Err(_))` is a feed failure,
/// and `None` means the producer closed the feed.
pub type ChangeFeed = mpsc::UnboundedReceiver<StorageResult<Change>>;

/// Storage handle shared by sessions and commands.
///
/// Implementations may be shared across many concurrent sessions; within one
/// session or one feed consumer, calls are issued strictly sequentially.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Allocates a fresh record id.
    fn new_id(&self) -> String;

    /// Saves a record, creating or replacing it by id.
    async fn save(&self, record: Record) -> StorageResult<()>;

    /// Deletes a record by id.
    async fn delete(&self, record: &Record) -> StorageResult<()>;

    /// All tasks owned by the given user.
    async fn tasks(&self, owner_id: &str) -> StorageResult<Vec<Task>>;

    /// All tags owned by the given user.
    async fn tags(&self, owner_id: &str) -> StorageResult<Vec<Tag>>;

    /// All notes owned by the given user.
    async fn notes(&self, owner_id: &str) -> StorageResult<Vec<Note>>;

    /// Subscribes to the live change feed.
    ///
    /// Changes are delivered in the exact order the store applies them.
    fn changes(&self) -> ChangeFeed;

    /// Resolves the tags attached to an event.
    ///
    /// An event with no tags resolves to an empty list; a dangling tag link
    /// is an error.
    async fn tags_for(&self, event: &Event) -> StorageResult<Vec<Tag>>;

    /// Resolves an event's location link.
    ///
    /// `Ok(None)` means the link is unset, which is not an error.
    async fn location_of(&self, event: &Event) -> StorageResult<Option<Location>>;

    /// Resolves an event's note link.
    ///
    /// `Ok(None)` means the link is unset, which is not an error.
    async fn note_of(&self, event: &Event) -> StorageResult<Option<Note>>;
}
