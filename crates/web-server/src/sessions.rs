use analytics::SessionContext;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A live session, locked on its own so one user's writes never block another's.
pub type SharedSession = Arc<Mutex<SessionContext>>;

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

/// Live analytics sessions keyed by user id.
///
/// A session idle for longer than the configured time is dropped. Expired
/// entries are swept whenever a new session is registered.
pub struct SessionRegistry {
    idle_timeout: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_live(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.last_seen) < self.idle_timeout
    }

    /// Registers `session` and returns its user id.
    pub fn insert(&self, session: SessionContext) -> String {
        let user_id = session.user_id().to_string();
        let now = Instant::now();
        let mut entries = self.lock();

        let before = entries.len();
        entries.retain(|_, entry| self.is_live(entry, now));
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Dropped idle analytics sessions.");
        }

        entries.insert(
            user_id.clone(),
            Entry {
                session: Arc::new(Mutex::new(session)),
                last_seen: now,
            },
        );
        user_id
    }

    /// The live session for `user_id`, refreshing its idle timer.
    pub fn get(&self, user_id: &str) -> Option<SharedSession> {
        let now = Instant::now();
        let mut entries = self.lock();
        let live = self.is_live(entries.get(user_id)?, now);
        if !live {
            entries.remove(user_id);
            return None;
        }
        let entry = entries.get_mut(user_id)?;
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    /// Ends the session for `user_id`. `false` when there was none.
    pub fn remove(&self, user_id: &str) -> bool {
        self.lock().remove(user_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
