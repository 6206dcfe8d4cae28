//! "Recent" views over entity snapshots.
//!
//! The projector never touches storage: callers hand it whatever collection
//! they already hold and get back a sorted, truncated copy.

use chrono::{DateTime, Utc};

use crate::models::{Activity, Announcement, Document, Notification};

/// Number of entries the dashboard shows when no limit is given.
pub const DEFAULT_FEED_LIMIT: usize = 5;

/// Something that can appear in a recency-ordered feed.
pub trait FeedItem {
    type Key: Ord;

    /// Time the item was created or last modified.
    fn feed_timestamp(&self) -> DateTime<Utc>;

    /// Tie-breaker when timestamps collide.
    fn feed_key(&self) -> Self::Key;
}

impl FeedItem for Document {
    type Key = String;

    fn feed_timestamp(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn feed_key(&self) -> String {
        self.id.clone()
    }
}

impl FeedItem for Announcement {
    type Key = String;

    fn feed_timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn feed_key(&self) -> String {
        self.id.clone()
    }
}

impl FeedItem for Activity {
    type Key = String;

    fn feed_timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn feed_key(&self) -> String {
        self.id.clone()
    }
}

impl FeedItem for Notification {
    type Key = u64;

    fn feed_timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn feed_key(&self) -> u64 {
        self.id
    }
}

/// Newest `max` items, ordered by timestamp then key, both descending.
///
/// The input is left untouched.
pub fn recent<T: FeedItem + Clone>(items: &[T], max: usize) -> Vec<T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| {
        b.feed_timestamp()
            .cmp(&a.feed_timestamp())
            .then_with(|| b.feed_key().cmp(&a.feed_key()))
    });
    sorted.into_iter().take(max).cloned().collect()
}
