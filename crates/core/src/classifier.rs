//! Event classification.
//!
//! [`classify`] turns an [`InboundEvent`] published by an upstream engine
//! (waste schedule, truck tracking, rewards, release announcer) into a
//! [`NewNotification`]. The event's `event_type` discriminator alone selects
//! the template; the shape of the remaining fields is never used to guess.
//!
//! Classification is a pure function. Persisting the result is the caller's
//! job.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::notification::{
    AppUpdatePayload, Category, InfoPayload, InvalidNotification, NewNotification, NotePayload,
    NotificationPayload, Priority, ReadState, ReminderPayload, RewardPayload, SchedulePayload,
    SystemPayload,
};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Inbound event
// ---------------------------------------------------------------------------

/// A domain event addressed to a single recipient.
///
/// Wire shape: `{ "recipient_id": 1, "event_type": "...", ...fields }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Owning user, supplied by the producer (ultimately the auth layer).
    pub recipient_id: DbId,

    /// Discriminator, e.g. `"schedule_trigger"`.
    pub event_type: String,

    /// Event-specific fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl InboundEvent {
    pub fn new(recipient_id: DbId, event_type: impl Into<String>) -> Self {
        Self {
            recipient_id,
            event_type: event_type.into(),
            fields: Map::new(),
        }
    }

    /// Attach a single event-specific field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an event could not be turned into a notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("Unrecognized event type '{0}'")]
    UnknownEventType(String),

    #[error("Invalid fields for '{event_type}' event: {reason}")]
    InvalidFields { event_type: EventKind, reason: String },

    #[error("Classified record is invalid: {0}")]
    InvalidRecord(#[from] InvalidNotification),
}

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// Every event type the classifier has a template for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The schedule engine fires on the morning of a pickup day.
    ScheduleTrigger,
    /// The schedule engine reminds the household the day before.
    CollectionReminder,
    /// Truck tracking reports the truck is close to the household.
    TruckProximity,
    /// The reward engine credited points.
    RewardGranted,
    /// A new app release is available.
    AppUpdate,
    /// Operator-written platform announcement.
    Announcement,
    /// Operator-written informational notice.
    Info,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::ScheduleTrigger,
        EventKind::CollectionReminder,
        EventKind::TruckProximity,
        EventKind::RewardGranted,
        EventKind::AppUpdate,
        EventKind::Announcement,
        EventKind::Info,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ScheduleTrigger => "schedule_trigger",
            EventKind::CollectionReminder => "collection_reminder",
            EventKind::TruckProximity => "truck_proximity",
            EventKind::RewardGranted => "reward_granted",
            EventKind::AppUpdate => "app_update",
            EventKind::Announcement => "announcement",
            EventKind::Info => "info",
        }
    }
}

impl FromStr for EventKind {
    type Err = ClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ClassificationError::UnknownEventType(s.to_string()))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Typed events
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ScheduleTrigger {
    waste_type: String,
    schedule_day: String,
    pickup_time: String,
    #[serde(default)]
    schedule_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
struct CollectionReminder {
    waste_type: String,
    schedule_day: String,
    #[serde(default)]
    pickup_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TruckProximity {
    waste_type: String,
    distance: String,
    eta: String,
}

#[derive(Debug, Deserialize)]
struct RewardGranted {
    points: i64,
    total_points: i64,
    reason: String,
}

#[derive(Debug, Deserialize)]
struct AppUpdate {
    version: String,
    #[serde(default)]
    update_url: Option<String>,
}

/// Announcements and info notices carry their own copy.
#[derive(Debug, Deserialize)]
struct Authored {
    title: String,
    message: String,
    #[serde(default)]
    detail: Option<String>,
}

/// Fields any event may carry on top of its own.
#[derive(Debug, Default, Deserialize)]
struct Overrides {
    #[serde(default)]
    priority: Option<Priority>,
}

/// A parsed event, one variant per [`EventKind`].
#[derive(Debug)]
enum DomainEvent {
    ScheduleTrigger(ScheduleTrigger),
    CollectionReminder(CollectionReminder),
    TruckProximity(TruckProximity),
    RewardGranted(RewardGranted),
    AppUpdate(AppUpdate),
    Announcement(Authored),
    Info(Authored),
}

impl DomainEvent {
    fn parse(kind: EventKind, fields: &Map<String, Value>) -> Result<Self, ClassificationError> {
        Ok(match kind {
            EventKind::ScheduleTrigger => Self::ScheduleTrigger(decode(kind, fields)?),
            EventKind::CollectionReminder => Self::CollectionReminder(decode(kind, fields)?),
            EventKind::TruckProximity => Self::TruckProximity(decode(kind, fields)?),
            EventKind::RewardGranted => Self::RewardGranted(decode(kind, fields)?),
            EventKind::AppUpdate => Self::AppUpdate(decode(kind, fields)?),
            EventKind::Announcement => Self::Announcement(decode(kind, fields)?),
            EventKind::Info => Self::Info(decode(kind, fields)?),
        })
    }
}

fn decode<T: DeserializeOwned>(
    kind: EventKind,
    fields: &Map<String, Value>,
) -> Result<T, ClassificationError> {
    serde_json::from_value(Value::Object(fields.clone())).map_err(|e| {
        ClassificationError::InvalidFields {
            event_type: kind,
            reason: e.to_string(),
        }
    })
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Everything a template fixes for one event.
struct Rendered {
    category: Category,
    icon: &'static str,
    priority: Priority,
    title: String,
    message: String,
    payload: NotificationPayload,
}

fn render(event: DomainEvent) -> Rendered {
    match event {
        DomainEvent::ScheduleTrigger(e) => Rendered {
            category: Category::WastePickup,
            icon: "eco",
            priority: Priority::High,
            title: format!("Pengambilan Sampah {} Hari Ini!", e.waste_type),
            message: format!(
                "Jangan lupa! Hari ini adalah jadwal pengambilan sampah {}. \
                 Pastikan sampah sudah dipisahkan dan siap diambil pada pukul {}.",
                e.waste_type, e.pickup_time
            ),
            payload: NotificationPayload::Schedule(SchedulePayload {
                waste_type: e.waste_type,
                schedule_day: e.schedule_day,
                pickup_time: e.pickup_time,
                schedule_id: e.schedule_id,
            }),
        },
        DomainEvent::CollectionReminder(e) => {
            let prepare = match e.pickup_time.as_deref().and_then(window_start) {
                Some(start) => format!("Siapkan sampah Anda sebelum jam {start} pagi."),
                None => "Siapkan sampah Anda sebelum truk datang.".to_string(),
            };
            Rendered {
                category: Category::WasteSchedule,
                icon: "calendar_today",
                priority: Priority::Normal,
                title: format!("Besok Jadwal Sampah {}", e.waste_type),
                message: format!(
                    "Besok adalah hari pengambilan sampah {}. {prepare}",
                    e.waste_type
                ),
                payload: NotificationPayload::Reminder(ReminderPayload {
                    waste_type: e.waste_type,
                    schedule_day: Some(e.schedule_day),
                    pickup_time: e.pickup_time,
                    distance: None,
                    eta: None,
                }),
            }
        }
        DomainEvent::TruckProximity(e) => Rendered {
            category: Category::WastePickup,
            icon: "warning",
            priority: Priority::Urgent,
            title: "URGENT: Truk Sudah Dekat!".to_string(),
            message: format!(
                "Truk pengangkut sampah sudah ada di area Anda ({}, sekitar {}). \
                 Segera keluarkan sampah Anda!",
                e.distance, e.eta
            ),
            payload: NotificationPayload::Reminder(ReminderPayload {
                waste_type: e.waste_type,
                schedule_day: None,
                pickup_time: None,
                distance: Some(e.distance),
                eta: Some(e.eta),
            }),
        },
        DomainEvent::RewardGranted(e) => Rendered {
            category: Category::Points,
            icon: "stars",
            priority: Priority::Low,
            title: format!("Selamat! Anda Mendapat {} Poin", e.points),
            message: format!(
                "Poin reward telah ditambahkan ke akun Anda. Total poin Anda sekarang {}.",
                e.total_points
            ),
            payload: NotificationPayload::Info(InfoPayload::Reward(RewardPayload {
                points: e.points,
                total_points: e.total_points,
                reason: e.reason,
            })),
        },
        DomainEvent::AppUpdate(e) => Rendered {
            category: Category::Update,
            icon: "system_update",
            priority: Priority::Normal,
            title: "Update Aplikasi Tersedia".to_string(),
            message: format!(
                "Versi baru aplikasi Gerobaks ({}) tersedia. Update sekarang untuk fitur terbaru!",
                e.version
            ),
            payload: NotificationPayload::System(SystemPayload::AppUpdate(AppUpdatePayload {
                version: e.version,
                update_url: e.update_url,
            })),
        },
        DomainEvent::Announcement(e) => Rendered {
            category: Category::General,
            icon: "campaign",
            priority: Priority::Normal,
            title: e.title,
            message: e.message,
            payload: NotificationPayload::System(SystemPayload::Announcement(NotePayload {
                detail: e.detail,
            })),
        },
        DomainEvent::Info(e) => Rendered {
            category: Category::General,
            icon: "info",
            priority: Priority::Normal,
            title: e.title,
            message: e.message,
            payload: NotificationPayload::Info(InfoPayload::Note(NotePayload {
                detail: e.detail,
            })),
        },
    }
}

/// Start of a pickup window such as `"06:00 - 08:00"`.
fn window_start(window: &str) -> Option<&str> {
    window
        .split('-')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Classify an inbound event into an unread notification record.
///
/// Fails with [`ClassificationError`] if the discriminator is unknown, the
/// fields do not match the event's shape, or the rendered record breaks a
/// record invariant (e.g. an announcement with an empty title).
pub fn classify(event: &InboundEvent) -> Result<NewNotification, ClassificationError> {
    let kind: EventKind = event.event_type.parse()?;
    let overrides: Overrides = decode(kind, &event.fields)?;
    let rendered = render(DomainEvent::parse(kind, &event.fields)?);

    let record = NewNotification {
        recipient_id: event.recipient_id,
        category: rendered.category,
        title: rendered.title,
        message: rendered.message,
        icon: rendered.icon.to_string(),
        priority: overrides.priority.unwrap_or(rendered.priority),
        payload: rendered.payload,
        read_state: ReadState::Unread,
    };
    record.validate()?;

    Ok(record)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::notification::NotificationType;

    fn schedule_event() -> InboundEvent {
        InboundEvent::new(1, "schedule_trigger")
            .with_field("waste_type", "Organik")
            .with_field("schedule_day", "selasa")
            .with_field("pickup_time", "06:00 - 08:00")
            .with_field("schedule_id", 1)
    }

    fn valid_events() -> Vec<InboundEvent> {
        vec![
            schedule_event(),
            InboundEvent::new(1, "collection_reminder")
                .with_field("waste_type", "Anorganik")
                .with_field("schedule_day", "rabu")
                .with_field("pickup_time", "06:00 - 08:00"),
            InboundEvent::new(1, "truck_proximity")
                .with_field("waste_type", "B3")
                .with_field("distance", "200m")
                .with_field("eta", "2 menit"),
            InboundEvent::new(1, "reward_granted")
                .with_field("points", 50)
                .with_field("total_points", 350)
                .with_field("reason", "waste_pickup_completed"),
            InboundEvent::new(1, "app_update")
                .with_field("version", "2.1.0")
                .with_field(
                    "update_url",
                    "https://play.google.com/store/apps/details?id=com.gerobaks",
                ),
            InboundEvent::new(1, "announcement")
                .with_field("title", "Libur Nasional")
                .with_field("message", "Tidak ada pengambilan sampah hari Senin."),
            InboundEvent::new(1, "info")
                .with_field("title", "Tips")
                .with_field("message", "Pisahkan sampah organik dan anorganik."),
        ]
    }

    #[test]
    fn every_valid_event_yields_an_unread_valid_record() {
        for event in valid_events() {
            let record = classify(&event)
                .unwrap_or_else(|e| panic!("{} should classify: {e}", event.event_type));
            assert!(record.validate().is_ok());
            assert_eq!(record.read_state, ReadState::Unread);
            assert_eq!(record.read_state.read_at(), None);
            assert!(!record.title.trim().is_empty());
            assert!(!record.message.trim().is_empty());
            assert_eq!(record.recipient_id, 1);
        }
    }

    #[test]
    fn schedule_trigger_uses_schedule_template() {
        let record = classify(&schedule_event()).unwrap();

        assert_eq!(record.kind(), NotificationType::Schedule);
        assert_eq!(record.category, Category::WastePickup);
        assert_eq!(record.icon, "eco");
        assert_eq!(record.priority, Priority::High);
        assert_eq!(record.title, "Pengambilan Sampah Organik Hari Ini!");
        assert!(record.message.contains("06:00 - 08:00"));
        assert_matches!(
            record.payload,
            NotificationPayload::Schedule(SchedulePayload { schedule_id: Some(1), .. })
        );
    }

    #[test]
    fn collection_reminder_mentions_window_start() {
        let record = classify(&valid_events()[1]).unwrap();

        assert_eq!(record.kind(), NotificationType::Reminder);
        assert_eq!(record.category, Category::WasteSchedule);
        assert_eq!(record.title, "Besok Jadwal Sampah Anorganik");
        assert!(record.message.ends_with("sebelum jam 06:00 pagi."));
    }

    #[test]
    fn truck_proximity_is_urgent_reminder() {
        let record = classify(&valid_events()[2]).unwrap();

        assert_eq!(record.kind(), NotificationType::Reminder);
        assert_eq!(record.priority, Priority::Urgent);
        assert_eq!(record.icon, "warning");
        assert_matches!(
            record.payload,
            NotificationPayload::Reminder(ReminderPayload { ref distance, .. })
                if distance.as_deref() == Some("200m")
        );
    }

    #[test]
    fn reward_granted_is_low_priority_points_info() {
        let record = classify(&valid_events()[3]).unwrap();

        assert_eq!(record.kind(), NotificationType::Info);
        assert_eq!(record.category, Category::Points);
        assert_eq!(record.priority, Priority::Low);
        assert_eq!(record.title, "Selamat! Anda Mendapat 50 Poin");
    }

    #[test]
    fn app_update_is_system_update() {
        let record = classify(&valid_events()[4]).unwrap();

        assert_eq!(record.kind(), NotificationType::System);
        assert_eq!(record.category, Category::Update);
        assert!(record.message.contains("2.1.0"));
    }

    #[test]
    fn explicit_priority_overrides_template() {
        let event = schedule_event().with_field("priority", "urgent");
        let record = classify(&event).unwrap();
        assert_eq!(record.priority, Priority::Urgent);
    }

    #[test]
    fn unknown_priority_is_rejected() {
        let event = schedule_event().with_field("priority", "critical");
        assert_matches!(
            classify(&event),
            Err(ClassificationError::InvalidFields { event_type: EventKind::ScheduleTrigger, .. })
        );
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let event = InboundEvent::new(1, "compost_delivered").with_field("waste_type", "Organik");
        assert_eq!(
            classify(&event),
            Err(ClassificationError::UnknownEventType("compost_delivered".to_string()))
        );
    }

    #[test]
    fn discriminator_wins_over_payload_shape() {
        // Schedule-shaped fields under a reminder discriminator still
        // classify as a reminder.
        let mut event = schedule_event();
        event.event_type = "collection_reminder".to_string();
        let record = classify(&event).unwrap();
        assert_eq!(record.kind(), NotificationType::Reminder);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let event = InboundEvent::new(1, "truck_proximity").with_field("waste_type", "B3");
        let err = classify(&event).unwrap_err();
        assert_matches!(err, ClassificationError::InvalidFields { .. });
        assert!(err.to_string().contains("truck_proximity"));
    }

    #[test]
    fn empty_authored_title_is_rejected() {
        let event = InboundEvent::new(1, "announcement")
            .with_field("title", " ")
            .with_field("message", "body");
        assert_eq!(
            classify(&event),
            Err(ClassificationError::InvalidRecord(
                InvalidNotification::EmptyField("title")
            ))
        );
    }

    #[test]
    fn non_positive_recipient_is_rejected() {
        let mut event = schedule_event();
        event.recipient_id = 0;
        assert_matches!(
            classify(&event),
            Err(ClassificationError::InvalidRecord(InvalidNotification::InvalidRecipient(0)))
        );
    }

    #[test]
    fn inbound_event_wire_shape_is_flat() {
        let event: InboundEvent = serde_json::from_value(serde_json::json!({
            "recipient_id": 9,
            "event_type": "reward_granted",
            "points": 10,
            "total_points": 20,
            "reason": "bonus",
        }))
        .unwrap();

        assert_eq!(event.recipient_id, 9);
        assert_eq!(event.fields.len(), 3);
        assert!(classify(&event).is_ok());
    }

    #[test]
    fn window_start_handles_missing_separator() {
        assert_eq!(window_start("06:00 - 08:00"), Some("06:00"));
        assert_eq!(window_start("07:30"), Some("07:30"));
        assert_eq!(window_start(" - 08:00"), None);
    }
}
