//! Notification read-state tracking.
//!
//! A [`NotificationRegistry`] holds one user's notifications newest first.
//! The unread count is derived from the entries on every call, so no mutation
//! path can leave it out of step with the list.
//!
//! The server keeps one registry per user inside a [`NotificationHub`], which
//! is owned by the application state and handed to handlers explicitly.

use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

use crate::models::{NewNotification, Notification};

/// Entries a registry keeps before it starts dropping old ones.
pub const DEFAULT_REGISTRY_CAPACITY: usize = 200;

/// Ordered notification list for a single user.
///
/// Holds at most `capacity` entries. Past that, the oldest read entry is
/// dropped first, and the oldest entry overall only when everything is
/// unread.
#[derive(Debug)]
pub struct NotificationRegistry {
    /// Newest first.
    entries: VecDeque<Notification>,
    next_id: u64,
    capacity: usize,
}

impl Default for NotificationRegistry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_REGISTRY_CAPACITY)
    }
}

impl NotificationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            next_id: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict_overflow(&mut self) {
        while self.entries.len() > self.capacity {
            let oldest_read = self.entries.iter().rposition(|n| n.read);
            let index = oldest_read.unwrap_or(self.entries.len() - 1);
            if let Some(dropped) = self.entries.remove(index) {
                tracing::debug!(id = dropped.id, read = dropped.read, "notification evicted");
            }
        }
    }

    /// Adds a notification at the front and returns its assigned id.
    pub fn add(&mut self, new: NewNotification) -> u64 {
        self.next_id += 1;
        let id = self.next_id;

        self.entries.push_front(Notification {
            id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            timestamp: Utc::now(),
            read: false,
            link: new.link,
        });
        self.evict_overflow();

        tracing::debug!(id, unread = self.unread_count(), "notification added");
        id
    }

    /// Marks one notification as read.
    ///
    /// Returns `true` if an unread entry changed state. Unknown ids and
    /// already-read entries are left alone.
    pub fn mark_as_read(&mut self, id: u64) -> bool {
        match self.entries.iter_mut().find(|n| n.id == id) {
            Some(entry) if !entry.read => {
                entry.read = true;
                true
            }
            _ => false,
        }
    }

    /// Marks every notification as read. Returns how many changed.
    pub fn mark_all_as_read(&mut self) -> usize {
        let mut changed = 0;
        for entry in self.entries.iter_mut().filter(|n| !n.read) {
            entry.read = true;
            changed += 1;
        }
        changed
    }

    /// Removes a notification regardless of its read state.
    pub fn clear_notification(&mut self, id: u64) -> Option<Notification> {
        let index = self.entries.iter().position(|n| n.id == id)?;
        self.entries.remove(index)
    }

    /// Removes every notification. Ids keep counting from where they were.
    pub fn clear_all_notifications(&mut self) {
        self.entries.clear();
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    /// Notifications, newest first.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn get(&self, id: u64) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies the current state out for serialization.
    pub fn snapshot(&self) -> NotificationSnapshot {
        NotificationSnapshot {
            notifications: self.entries.iter().cloned().collect(),
            unread_count: self.unread_count(),
        }
    }
}

/// Point-in-time view of a registry.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSnapshot {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

/// Per-user notification registries.
#[derive(Debug, Default)]
pub struct NotificationHub {
    /// Registries keyed by user id.
    registries: RwLock<HashMap<String, NotificationRegistry>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a notification for one user, creating their registry if needed.
    pub async fn notify(&self, user_id: &str, notification: NewNotification) -> u64 {
        let mut registries = self.registries.write().await;
        registries
            .entry(user_id.to_string())
            .or_default()
            .add(notification)
    }

    /// Adds a copy of the notification for each listed user except `skip`.
    ///
    /// Duplicate ids in `user_ids` receive a single copy.
    pub async fn broadcast<'a>(
        &self,
        user_ids: impl IntoIterator<Item = &'a str>,
        skip: &str,
        notification: NewNotification,
    ) -> usize {
        let mut registries = self.registries.write().await;
        let mut seen = std::collections::HashSet::new();
        let mut delivered = 0;

        for user_id in user_ids {
            if user_id == skip || !seen.insert(user_id) {
                continue;
            }
            registries
                .entry(user_id.to_string())
                .or_default()
                .add(notification.clone());
            delivered += 1;
        }

        tracing::debug!(delivered, title = %notification.title, "notification broadcast");
        delivered
    }

    /// Runs `f` against a user's registry, creating it if needed.
    pub async fn with_registry<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut NotificationRegistry) -> T,
    ) -> T {
        let mut registries = self.registries.write().await;
        f(registries.entry(user_id.to_string()).or_default())
    }

    /// Drops a user's registry entirely. Returns whether one existed.
    pub async fn remove(&self, user_id: &str) -> bool {
        self.registries.write().await.remove(user_id).is_some()
    }

    /// Number of users holding a registry.
    pub async fn user_count(&self) -> usize {
        self.registries.read().await.len()
    }

    pub async fn snapshot(&self, user_id: &str) -> NotificationSnapshot {
        let registries = self.registries.read().await;
        registries
            .get(user_id)
            .map(NotificationRegistry::snapshot)
            .unwrap_or_else(|| NotificationSnapshot {
                notifications: Vec::new(),
                unread_count: 0,
            })
    }
}
