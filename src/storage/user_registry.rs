//! Session → user mapping
//!
//! Users hold back-references to the codes they own and a bounded inbox of
//! notification strings. They never own link lifetime.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::utils::Clock;

pub const DEFAULT_INBOX_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub session_token: String,
    pub created_at: DateTime<Utc>,
    pub owned_links: Vec<String>,
    pub notifications: VecDeque<String>,
}

impl User {
    fn new(session_token: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_token,
            created_at: now,
            owned_links: Vec::new(),
            notifications: VecDeque::new(),
        }
    }

    pub fn owns_link(&self, code: &str) -> bool {
        self.owned_links.iter().any(|c| c == code)
    }

    /// Append a message, dropping the oldest once `capacity` is exceeded.
    fn push_notification(&mut self, message: String, capacity: usize) {
        self.notifications.push_back(message);
        while self.notifications.len() > capacity {
            self.notifications.pop_front();
        }
    }
}

pub struct UserRegistry {
    users: DashMap<Uuid, User>,
    sessions: DashMap<String, Uuid>,
    inbox_capacity: usize,
    clock: Arc<dyn Clock>,
}

impl UserRegistry {
    pub fn new(inbox_capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: DashMap::new(),
            sessions: DashMap::new(),
            inbox_capacity,
            clock,
        }
    }

    /// Look up the user bound to `session_token`, creating one on a miss.
    pub fn get_or_create(&self, session_token: &str) -> User {
        match self.sessions.entry(session_token.to_string()) {
            Entry::Occupied(mut entry) => {
                if let Some(user) = self.users.get(entry.get()) {
                    return user.value().clone();
                }
                // Session points at a deleted user; bind a fresh one.
                let user = User::new(session_token.to_string(), self.clock.now());
                entry.insert(user.id);
                self.users.insert(user.id, user.clone());
                info!("UserRegistry: created user {}", user.id);
                user
            }
            Entry::Vacant(entry) => {
                let user = User::new(session_token.to_string(), self.clock.now());
                self.users.insert(user.id, user.clone());
                entry.insert(user.id);
                info!("UserRegistry: created user {}", user.id);
                user
            }
        }
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|user| user.value().clone())
    }

    pub fn delete(&self, id: Uuid) -> bool {
        match self.users.remove(&id) {
            Some((_, user)) => {
                self.sessions
                    .remove_if(&user.session_token, |_, owner| *owner == id);
                info!("UserRegistry: deleted user {}", id);
                true
            }
            None => false,
        }
    }

    pub fn add_link(&self, id: Uuid, code: &str) -> bool {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                if !user.owns_link(code) {
                    user.owned_links.push(code.to_string());
                }
                true
            }
            None => false,
        }
    }

    pub fn remove_link(&self, id: Uuid, code: &str) -> bool {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                let before = user.owned_links.len();
                user.owned_links.retain(|c| c != code);
                user.owned_links.len() != before
            }
            None => false,
        }
    }

    /// Append a timestamped message to the user's inbox.
    pub fn push_notification(&self, id: Uuid, message: &str) -> bool {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                let stamped = format!(
                    "{} - {}",
                    self.clock.now().format("%d.%m.%Y %H:%M:%S"),
                    message
                );
                user.push_notification(stamped, self.inbox_capacity);
                true
            }
            None => false,
        }
    }

    pub fn notifications(&self, id: Uuid) -> Vec<String> {
        self.users
            .get(&id)
            .map(|user| user.notifications.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
