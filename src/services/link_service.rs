//! Link management service
//!
//! The entry point callers use for link operations. Wraps the registry, keeps
//! the owner's back-references current and notifies owners about limit and
//! expiry events.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::errors::{LinkshelfError, Result};
use crate::services::notification::Notifier;
use crate::storage::{LinkRegistry, ShortLink, UserRegistry};

pub struct LinkService {
    links: Arc<LinkRegistry>,
    users: Arc<UserRegistry>,
    notifier: Arc<Notifier>,
    base_url: String,
}

impl LinkService {
    pub fn new(
        links: Arc<LinkRegistry>,
        users: Arc<UserRegistry>,
        notifier: Arc<Notifier>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            links,
            users,
            notifier,
            base_url: base_url.into(),
        }
    }

    /// Create a short link, or return the owner's existing one for this URL.
    pub fn create_link(
        &self,
        url: &str,
        owner_id: Uuid,
        click_limit: Option<u32>,
    ) -> Result<ShortLink> {
        let link = self.links.create(url, owner_id, click_limit)?;
        self.users.add_link(owner_id, &link.short_code);
        Ok(link)
    }

    /// Resolve a code to its target URL.
    ///
    /// Expired and limit-exceeded outcomes notify the owner before the error
    /// is returned.
    pub fn resolve(&self, code: &str) -> Result<String> {
        let err = match self.links.resolve(code) {
            Ok(url) => return Ok(url),
            Err(err) => err,
        };

        if let Some(link) = self.links.peek(code) {
            let notified = match &err {
                LinkshelfError::Expired(_) => self.notifier.link_expired(&link),
                LinkshelfError::LimitExceeded(_) => self.notifier.limit_exceeded(&link),
                _ => Ok(()),
            };
            if let Err(e) = notified {
                warn!("LinkService: failed to notify about '{}': {}", code, e);
            }
        }

        Err(err)
    }

    pub fn link_info(&self, code: &str, owner_id: Uuid) -> Result<ShortLink> {
        self.links.get(code, owner_id)
    }

    pub fn user_links(&self, owner_id: Uuid) -> Vec<ShortLink> {
        self.links.list_by_owner(owner_id)
    }

    pub fn update_click_limit(
        &self,
        code: &str,
        owner_id: Uuid,
        new_limit: u32,
    ) -> Result<ShortLink> {
        let link = self.links.update_click_limit(code, owner_id, new_limit)?;

        let details = format!("click limit set to {}", new_limit);
        if let Err(e) = self.notifier.link_updated(&link, &details) {
            warn!("LinkService: failed to notify about '{}': {}", code, e);
        }
        Ok(link)
    }

    pub fn delete_link(&self, code: &str, owner_id: Uuid) -> bool {
        let removed = self.links.delete(code, owner_id);
        if removed {
            self.users.remove_link(owner_id, code);
        }
        removed
    }

    pub fn full_short_url(&self, code: &str) -> String {
        format!("{}{}", self.base_url, code)
    }
}
