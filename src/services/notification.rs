//! Link notifications
//!
//! The core decides *when* an owner should hear about a link (expired, limit
//! exceeded, updated) and builds a plain message; a `NotificationSink` decides
//! where it goes.

use std::sync::Arc;

use serde::Serialize;
use strum::{AsRefStr, Display};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::Result;
use crate::storage::{ShortLink, UserRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    Expired,
    LimitExceeded,
    Updated,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkNotification {
    pub kind: NotificationKind,
    pub owner_id: Uuid,
    pub link: ShortLink,
    pub message: String,
}

pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &LinkNotification) -> Result<()>;
}

/// Discards everything.
pub struct NullSink;

impl NotificationSink for NullSink {
    fn deliver(&self, _notification: &LinkNotification) -> Result<()> {
        Ok(())
    }
}

/// Appends messages to the owner's inbox in the user registry.
pub struct UserInboxSink {
    users: Arc<UserRegistry>,
}

impl UserInboxSink {
    pub fn new(users: Arc<UserRegistry>) -> Self {
        Self { users }
    }
}

impl NotificationSink for UserInboxSink {
    fn deliver(&self, notification: &LinkNotification) -> Result<()> {
        if self
            .users
            .push_notification(notification.owner_id, &notification.message)
        {
            info!(
                "Notification for user {}: {}",
                notification.owner_id, notification.message
            );
        } else {
            debug!(
                "Notification dropped, user {} is unknown",
                notification.owner_id
            );
        }
        Ok(())
    }
}

/// Builds notifications and hands them to the sink when enabled.
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    enabled: bool,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>, enabled: bool) -> Self {
        Self { sink, enabled }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NullSink), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn link_expired(&self, link: &ShortLink) -> Result<()> {
        let message = format!(
            "Link {} expired at {}. Create a new link.",
            link.short_code,
            link.expires_at.format("%d.%m.%Y %H:%M:%S")
        );
        self.send(NotificationKind::Expired, link, message)
    }

    pub fn limit_exceeded(&self, link: &ShortLink) -> Result<()> {
        let message = format!(
            "Link {} reached its click limit ({}). Create a new link.",
            link.short_code, link.click_limit
        );
        self.send(NotificationKind::LimitExceeded, link, message)
    }

    pub fn link_updated(&self, link: &ShortLink, details: &str) -> Result<()> {
        let message = format!("Link {} updated: {}", link.short_code, details);
        self.send(NotificationKind::Updated, link, message)
    }

    fn send(&self, kind: NotificationKind, link: &ShortLink, message: String) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        self.sink.deliver(&LinkNotification {
            kind,
            owner_id: link.owner_id,
            link: link.clone(),
            message,
        })
    }
}
