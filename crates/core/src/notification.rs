//! Notification entity, classification sets, and typed payloads.
//!
//! A [`Notification`] is created once from a [`NewNotification`] and is
//! immutable afterwards except for its [`ReadState`]. The `type` of a
//! notification is not stored as a separate field: it is derived from the
//! [`NotificationPayload`] variant, so a payload can never disagree with the
//! type it is filed under.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Closed sets
// ---------------------------------------------------------------------------

/// Error returned when a string does not name a member of a closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownVariant {
    /// Which set was being parsed (`"type"`, `"priority"`, `"category"`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Notification type. Selects which payload shape the record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// A pickup is happening today.
    Schedule,
    /// An upcoming pickup or a truck that is about to arrive.
    Reminder,
    /// Informational notices such as reward points.
    Info,
    /// Platform announcements such as app updates.
    System,
}

impl NotificationType {
    pub const ALL: [NotificationType; 4] = [
        NotificationType::Schedule,
        NotificationType::Reminder,
        NotificationType::Info,
        NotificationType::System,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::Schedule => "schedule",
            NotificationType::Reminder => "reminder",
            NotificationType::Info => "info",
            NotificationType::System => "system",
        }
    }
}

impl FromStr for NotificationType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("type", s))
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation emphasis, ordered from least to most important.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    /// Renders the red-dot indicator on the client.
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("priority", s))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side grouping tag. Independent of [`NotificationType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    WastePickup,
    WasteSchedule,
    Points,
    Update,
    General,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::WastePickup,
        Category::WasteSchedule,
        Category::Points,
        Category::Update,
        Category::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::WastePickup => "waste_pickup",
            Category::WasteSchedule => "waste_schedule",
            Category::Points => "points",
            Category::Update => "update",
            Category::General => "general",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("category", s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Payload of a `schedule` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePayload {
    pub waste_type: String,
    pub schedule_day: String,
    /// Pickup window, e.g. `"06:00 - 08:00"`.
    pub pickup_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<DbId>,
}

/// Payload of a `reminder` notification.
///
/// Collection reminders fill the schedule fields; truck proximity alerts
/// fill `distance` and `eta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub waste_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<String>,
}

/// Reward points granted to the recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPayload {
    pub points: i64,
    pub total_points: i64,
    pub reason: String,
}

/// An application release the client should update to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUpdatePayload {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_url: Option<String>,
}

/// Free-form note attached to info notices and announcements.
///
/// Unknown fields are rejected so that a malformed reward or app-update blob
/// does not decode as an empty note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Payload of an `info` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfoPayload {
    Reward(RewardPayload),
    Note(NotePayload),
}

/// Payload of a `system` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemPayload {
    AppUpdate(AppUpdatePayload),
    Announcement(NotePayload),
}

/// Type-specific payload. The variant *is* the notification type.
///
/// Serializes to the flat JSON object stored in the `data` column. Because
/// several shapes overlap, decoding needs the type column:
/// see [`NotificationPayload::from_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NotificationPayload {
    Schedule(SchedulePayload),
    Reminder(ReminderPayload),
    Info(InfoPayload),
    System(SystemPayload),
}

impl NotificationPayload {
    pub fn notification_type(&self) -> NotificationType {
        match self {
            NotificationPayload::Schedule(_) => NotificationType::Schedule,
            NotificationPayload::Reminder(_) => NotificationType::Reminder,
            NotificationPayload::Info(_) => NotificationType::Info,
            NotificationPayload::System(_) => NotificationType::System,
        }
    }

    /// Encode as the opaque JSON blob persisted next to the record.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Decode a persisted blob using the record's type.
    pub fn from_json(
        kind: NotificationType,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            NotificationType::Schedule => Self::Schedule(serde_json::from_value(value)?),
            NotificationType::Reminder => Self::Reminder(serde_json::from_value(value)?),
            NotificationType::Info => Self::Info(serde_json::from_value(value)?),
            NotificationType::System => Self::System(serde_json::from_value(value)?),
        })
    }
}

// ---------------------------------------------------------------------------
// Read state
// ---------------------------------------------------------------------------

/// Read/unread flag together with the moment of the transition.
///
/// Modelled as one value so that "`read_at` is set iff the record is read"
/// holds by construction. Serializes as `{ "is_read": .., "read_at": .. }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadState {
    #[default]
    Unread,
    Read { at: Timestamp },
}

impl ReadState {
    /// Rebuild from the two persisted columns.
    ///
    /// Returns `None` when the columns disagree.
    pub fn from_parts(is_read: bool, read_at: Option<Timestamp>) -> Option<Self> {
        match (is_read, read_at) {
            (false, None) => Some(ReadState::Unread),
            (true, Some(at)) => Some(ReadState::Read { at }),
            _ => None,
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, ReadState::Read { .. })
    }

    pub fn read_at(&self) -> Option<Timestamp> {
        match self {
            ReadState::Unread => None,
            ReadState::Read { at } => Some(*at),
        }
    }

    /// Transition to read. An already-read state keeps its original time.
    pub fn mark_read(self, at: Timestamp) -> Self {
        match self {
            ReadState::Unread => ReadState::Read { at },
            read => read,
        }
    }
}

impl Serialize for ReadState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ReadState", 2)?;
        state.serialize_field("is_read", &self.is_read())?;
        state.serialize_field("read_at", &self.read_at())?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Reasons a notification record cannot be stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidNotification {
    #[error("recipient id must be positive, got {0}")]
    InvalidRecipient(DbId),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// A classified notification that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: DbId,
    pub category: Category,
    pub title: String,
    pub message: String,
    pub icon: String,
    pub priority: Priority,
    pub payload: NotificationPayload,
    pub read_state: ReadState,
}

impl NewNotification {
    pub fn kind(&self) -> NotificationType {
        self.payload.notification_type()
    }

    /// Mark the record as read at creation time (seeding and imports).
    pub fn already_read(mut self, at: Timestamp) -> Self {
        self.read_state = ReadState::Read { at };
        self
    }

    /// Check the field-level invariants every stored record must satisfy.
    pub fn validate(&self) -> Result<(), InvalidNotification> {
        if self.recipient_id <= 0 {
            return Err(InvalidNotification::InvalidRecipient(self.recipient_id));
        }
        for (name, value) in [
            ("title", &self.title),
            ("message", &self.message),
            ("icon", &self.icon),
        ] {
            if value.trim().is_empty() {
                return Err(InvalidNotification::EmptyField(name));
            }
        }
        Ok(())
    }
}

/// A stored notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub recipient_id: DbId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub category: Category,
    pub title: String,
    pub message: String,
    pub icon: String,
    pub priority: Priority,
    #[serde(rename = "data")]
    pub payload: NotificationPayload,
    #[serde(flatten)]
    pub read_state: ReadState,
    pub created_at: Timestamp,
}

impl Notification {
    /// Materialize a stored record from its creation input.
    pub fn from_new(id: DbId, created_at: Timestamp, new: NewNotification) -> Self {
        Self {
            id,
            recipient_id: new.recipient_id,
            kind: new.payload.notification_type(),
            category: new.category,
            title: new.title,
            message: new.message,
            icon: new.icon,
            priority: new.priority,
            payload: new.payload,
            read_state: new.read_state,
            created_at,
        }
    }

    pub fn is_read(&self) -> bool {
        self.read_state.is_read()
    }

    pub fn read_at(&self) -> Option<Timestamp> {
        self.read_state.read_at()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
