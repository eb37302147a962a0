//! Tag-invalidated query cache for backend reads.
//!
//! Reads are keyed by request path and query. Each entry carries the
//! [`Tag`] of its resource family; a mutation invalidates every entry of the
//! families it touches. Invalidated or expired entries are kept so that a
//! failed refresh can still show the last good data next to the error.

use crate::error::AppError;
use dashmap::DashMap;
use oracle_forge_client::{Envelope, Error as GatewayError};
use serde_json::Value;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};


/// Resource family used for invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Health and configuration status.
    System,
    /// Adventure list and active adventure.
    Adventures,
    /// Play sessions, journal and characters.
    Sessions,
    /// World state and world entities.
    World,
    /// Player files.
    Players,
    /// Reference lookups.
    Lookups,
    /// Oracle tables.
    Oracle,
    /// Generators.
    Generators,
    /// Combat sessions.
    Combat,
    /// Map files and custom maps.
    Maps,
}

impl Tag {
    /// Derives the resource family from a backend-relative path.
    #[must_use]
    pub fn for_path(path: &str) -> Tag {
        let path = path.split('?').next().unwrap_or_default();
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        match segments.next() {
            Some("adventures") => {
                // /adventures/{id}/{family}/...
                match segments.nth(1) {
                    Some("world" | "world_state") => Tag::World,
                    Some("players") => Tag::Players,
                    Some("sessions") => Tag::Sessions,
                    Some("map_file" | "upload_map" | "custom_maps" | "upload_custom_map") => {
                        Tag::Maps
                    }
                    _ => Tag::Adventures,
                }
            }
            Some("session") => Tag::Sessions,
            Some("lookup") => Tag::Lookups,
            Some("oracle") => Tag::Oracle,
            Some("generators") => Tag::Generators,
            Some("combat") => Tag::Combat,
            _ => Tag::System,
        }
    }

    /// Families whose cached reads a mutation of this family makes stale.
    #[must_use]
    pub fn invalidates(self) -> &'static [Tag] {
        match self {
            // Every per-adventure view hangs off the adventure itself.
            Tag::Adventures => &[
                Tag::Adventures,
                Tag::Sessions,
                Tag::World,
                Tag::Players,
                Tag::Maps,
                Tag::Combat,
            ],
            Tag::Sessions => &[Tag::Sessions, Tag::Adventures],
            Tag::World => &[Tag::World],
            Tag::Players => &[Tag::Players],
            Tag::Combat => &[Tag::Combat],
            Tag::Maps => &[Tag::Maps],
            Tag::Generators => &[Tag::Generators],
            Tag::Oracle => &[Tag::Oracle],
            Tag::Lookups => &[Tag::Lookups],
            Tag::System => &[Tag::System],
        }
    }
}

/// Outcome of a cached read.
#[derive(Debug)]
pub enum QueryResult {
    /// Served from a fresh cache entry without a request.
    Hit(Value),
    /// Fetched from the backend (and stored when caching is enabled).
    Fetched(Value),
    /// The refresh failed; the last good data is still shown.
    Stale {
        /// Last good data.
        data: Value,
        /// Why the refresh failed.
        error: AppError,
    },
    /// The read failed and nothing was cached.
    Failed(AppError),
}

impl QueryResult {
    /// Data to display, fresh or stale.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Hit(data) | Self::Fetched(data) | Self::Stale { data, .. } => Some(data),
            Self::Failed(_) => None,
        }
    }

    /// Error to report, if the read did not succeed.
    #[must_use]
    pub fn error(&self) -> Option<&AppError> {
        match self {
            Self::Stale { error, .. } | Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// True if no request was made.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    tag: Tag,
    data: Value,
    stored_at: Instant,
    invalidated: bool,
}

impl Entry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        !self.invalidated && self.stored_at.elapsed() < ttl
    }
}

/// Concurrent query cache.
#[derive(Debug)]
pub struct QueryCache {
    entries: DashMap<String, Entry>,
    ttl: Duration,
    enabled: bool,
}

impl QueryCache {
    /// Creates a cache whose entries stay fresh for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            enabled: true,
        }
    }

    /// Creates a cache that never stores anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::ZERO,
            enabled: false,
        }
    }

    /// Number of stored entries, fresh or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serves `key` from cache when fresh, otherwise runs `fetch`.
    ///
    /// Only successful envelopes are stored. When `fetch` fails and an older
    /// entry exists, the result is [`QueryResult::Stale`].
    pub async fn read<F, Fut>(&self, key: &str, tag: Tag, fetch: F) -> QueryResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Envelope<Value>, GatewayError>>,
    {
        if self.enabled
            && let Some(entry) = self.entries.get(key)
            && entry.is_fresh(self.ttl)
        {
            debug!(key, "cache hit");
            return QueryResult::Hit(entry.data.clone());
        }

        let outcome = fetch()
            .await
            .and_then(Envelope::into_result)
            .map_err(AppError::from);

        match outcome {
            Ok(data) => {
                if self.enabled {
                    self.entries.insert(
                        key.to_string(),
                        Entry {
                            tag,
                            data: data.clone(),
                            stored_at: Instant::now(),
                            invalidated: false,
                        },
                    );
                }
                QueryResult::Fetched(data)
            }
            Err(error) => {
                let previous = self.entries.get(key).map(|entry| entry.data.clone());
                match previous {
                    Some(data) => {
                        warn!(key, error = %error, "refresh failed, keeping cached data");
                        QueryResult::Stale { data, error }
                    }
                    None => QueryResult::Failed(error),
                }
            }
        }
    }

    /// Marks every entry of the families touched by a `tag` mutation stale.
    /// Returns the number of entries affected.
    pub fn invalidate(&self, tag: Tag) -> usize {
        let targets = tag.invalidates();
        let mut count = 0;
        for mut entry in self.entries.iter_mut() {
            if targets.contains(&entry.tag) && !entry.invalidated {
                entry.invalidated = true;
                count += 1;
            }
        }
        debug!(?tag, count, "cache invalidated");
        count
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
