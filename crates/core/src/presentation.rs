//! On-device presentation request.
//!
//! The OS notification layer only needs display text, a glyph name, and an
//! urgency hint. [`PresentationRequest`] is what the delivery presenter hands
//! to a presentation surface.

use serde::Serialize;

use crate::notification::{Notification, Priority};
use crate::types::DbId;

/// How intrusively the device should present a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Tray only, no sound.
    Passive,
    /// Banner with default sound.
    Active,
    /// Banner that may break through focus modes.
    TimeSensitive,
    /// Full attention; the client also shows the red dot.
    Critical,
}

impl From<Priority> for Urgency {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Low => Urgency::Passive,
            Priority::Normal => Urgency::Active,
            Priority::High => Urgency::TimeSensitive,
            Priority::Urgent => Urgency::Critical,
        }
    }
}

/// Message pushed to a presentation surface for a freshly created record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentationRequest {
    pub notification_id: DbId,
    pub recipient_id: DbId,
    pub title: String,
    pub message: String,
    pub icon: String,
    pub urgency: Urgency,
}

impl From<&Notification> for PresentationRequest {
    fn from(record: &Notification) -> Self {
        Self {
            notification_id: record.id,
            recipient_id: record.recipient_id,
            title: record.title.clone(),
            message: record.message.clone(),
            icon: record.icon.clone(),
            urgency: record.priority.into(),
        }
    }
}

impl PresentationRequest {
    /// JSON frame sent to connected clients and push relays.
    pub fn to_message(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "notification",
            "notification_id": self.notification_id,
            "recipient_id": self.recipient_id,
            "title": self.title,
            "message": self.message,
            "icon": self.icon,
            "urgency": self.urgency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgency_tracks_priority() {
        assert_eq!(Urgency::from(Priority::Low), Urgency::Passive);
        assert_eq!(Urgency::from(Priority::Normal), Urgency::Active);
        assert_eq!(Urgency::from(Priority::High), Urgency::TimeSensitive);
        assert_eq!(Urgency::from(Priority::Urgent), Urgency::Critical);
    }

    #[test]
    fn message_frame_has_notification_type() {
        let request = PresentationRequest {
            notification_id: 3,
            recipient_id: 1,
            title: "URGENT: Truk Sudah Dekat!".to_string(),
            message: "Segera keluarkan sampah Anda!".to_string(),
            icon: "warning".to_string(),
            urgency: Urgency::Critical,
        };
        let frame = request.to_message();
        assert_eq!(frame["type"], "notification");
        assert_eq!(frame["urgency"], "critical");
        assert_eq!(frame["notification_id"], 3);
    }
}
