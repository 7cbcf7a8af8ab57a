//! Domain records for the tend assistant.
//!
//! This module defines the record types stored on behalf of a user (tasks,
//! events, notes, tags, locations) together with the closed `Record` sum the
//! change feed carries. Keeping the sum closed lets feed consumers match on
//! record kinds exhaustively instead of comparing open string codes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The kind tag of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    User,
    Task,
    Event,
    Note,
    Tag,
    Location,
}

impl RecordKind {
    /// Stable textual name of the kind, as it appears in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::User => "user",
            RecordKind::Task => "task",
            RecordKind::Event => "event",
            RecordKind::Note => "note",
            RecordKind::Tag => "tag",
            RecordKind::Location => "location",
        }
    }
}

/// A stored record of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    User(User),
    Task(Task),
    Event(Event),
    Note(Note),
    Tag(Tag),
    Location(Location),
}

impl Record {
    /// The kind tag of this record.
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::User(_) => RecordKind::User,
            Record::Task(_) => RecordKind::Task,
            Record::Event(_) => RecordKind::Event,
            Record::Note(_) => RecordKind::Note,
            Record::Tag(_) => RecordKind::Tag,
            Record::Location(_) => RecordKind::Location,
        }
    }

    /// The record's unique id.
    pub fn id(&self) -> &str {
        match self {
            Record::User(u) => &u.id,
            Record::Task(t) => &t.id,
            Record::Event(e) => &e.id,
            Record::Note(n) => &n.id,
            Record::Tag(t) => &t.id,
            Record::Location(l) => &l.id,
        }
    }
}

/// A user account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl User {
    /// Creates a user with the given id and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// A task owned by a user.
///
/// Work time is tracked as a ledger of start/stop instants in `stages`: an
/// odd number of entries means the task is currently in progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Id of the owning user.
    pub owner_id: String,
    /// Task name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last-modified timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Optional deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Completion timestamp, set once the task is completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Alternating start/stop instants.
    #[serde(default)]
    pub stages: Vec<DateTime<Utc>>,
    /// Ids of tasks that must be completed before this one.
    #[serde(default)]
    pub prerequisite_ids: Vec<String>,
    /// Ids of tags attached to this task.
    #[serde(default)]
    pub tag_ids: Vec<String>,
}

impl Task {
    /// Whether the task has been completed.
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Whether the task is currently being worked on.
    pub fn in_progress(&self) -> bool {
        self.stages.len() % 2 == 1
    }

    /// Starts work on the task. Idempotent while in progress.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if !self.in_progress() {
            self.stages.push(now);
        }
    }

    /// Stops work on the task. Idempotent while stopped.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        if self.in_progress() {
            self.stages.push(now);
        }
    }

    /// Stops the task if needed and marks it completed.
    pub fn stop_and_complete(&mut self, now: DateTime<Utc>) {
        self.stop(now);
        self.completed_at = Some(now);
        self.updated_at = Some(now);
    }

    /// Total time spent across all start/stop pairs. An open final stage
    /// counts up to `now`.
    pub fn time_spent(&self, now: DateTime<Utc>) -> Duration {
        let mut total = Duration::zero();
        let mut pairs = self.stages.chunks_exact(2);
        for pair in pairs.by_ref() {
            total += pair[1].signed_duration_since(pair[0]);
        }
        if let [start] = pairs.remainder() {
            total += now.signed_duration_since(*start);
        }
        total
    }

    /// Attaches a tag link if not already present.
    pub fn include_tag(&mut self, tag: &Tag) {
        if !self.tag_ids.iter().any(|id| id == &tag.id) {
            self.tag_ids.push(tag.id.clone());
        }
    }

    /// Adds a prerequisite link if not already present.
    pub fn include_prerequisite(&mut self, task: &Task) {
        if !self.prerequisite_ids.iter().any(|id| id == &task.id) {
            self.prerequisite_ids.push(task.id.clone());
        }
    }
}

/// A calendar event owned by a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: String,
    /// Id of the owning user.
    pub owner_id: String,
    /// Event name.
    pub name: String,
    /// When the event occurs.
    pub time: Option<DateTime<Utc>>,
    /// Ids of tags attached to this event.
    #[serde(default)]
    pub tag_ids: Vec<String>,
    /// Link to the event's location, if any.
    pub location_id: Option<String>,
    /// Link to a note attached to the event, if any.
    pub note_id: Option<String>,
}

/// A free-form note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique note identifier.
    pub id: String,
    /// Id of the owning user.
    pub owner_id: String,
    /// The note text.
    pub text: String,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last-modified timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A label attachable to tasks and events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique tag identifier.
    pub id: String,
    /// Id of the owning user.
    pub owner_id: String,
    /// Tag name.
    pub name: String,
}

/// A geographic position attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Unique location identifier.
    pub id: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Altitude in meters.
    pub alt: f64,
}
