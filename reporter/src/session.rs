use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use web_time::{Instant, SystemTime, UNIX_EPOCH};

/// How long a freshly opened session is handed out again instead of opening
/// another one.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(5);

const LOCAL_PREFIX: &str = "local-";
const LOCAL_SUFFIX_LEN: usize = 7;

pub fn utc_now() -> DateTime<Utc> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default();
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default()
}

/// Who is playing and in what context, sent when opening a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub game_id: String,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub survey_mode: bool,
    pub survey_question_id: Option<String>,
}

impl SessionRequest {
    /// Key under which concurrent session opens are coalesced.
    pub fn key(&self) -> String {
        format!(
            "{}:{}",
            self.game_id,
            self.user_id.as_deref().unwrap_or("guest")
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub is_guest: bool,
    pub game_id: String,
}

impl Session {
    /// Session made up on the spot when the platform cannot be reached.
    pub fn local(request: &SessionRequest, now: DateTime<Utc>) -> Self {
        let millis = now.timestamp_millis();
        let mut rng = SmallRng::seed_from_u64(millis as u64);
        let suffix: String = (0..LOCAL_SUFFIX_LEN)
            .map(|_| char::from_digit(rng.random_range(0..36u32), 36).unwrap_or('0'))
            .collect();

        Self {
            session_id: format!("{LOCAL_PREFIX}{millis}-{suffix}"),
            user_id: request.user_id.clone(),
            username: request.username.clone(),
            is_guest: request.user_id.is_none(),
            game_id: request.game_id.clone(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.session_id.starts_with(LOCAL_PREFIX)
    }
}

struct Slot {
    opened_at: Instant,
    session: Session,
}

/// Single in-flight guard for opening sessions.
///
/// The first caller for a key runs the initializer while holding the lock;
/// anyone asking for the same key within the grace window gets that result.
/// There is one lock for all keys, so a slow open for one key also holds up
/// lookups for every other key.
pub struct SessionGuard {
    grace: Duration,
    slots: Mutex<HashMap<String, Slot>>,
}

impl SessionGuard {
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_init(&self, key: &str, init: impl FnOnce() -> Session) -> Session {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(slot) = slots.get(key) {
            let age = slot.opened_at.elapsed();
            if age < self.grace {
                log::debug!("Reusing session {} opened {:?} ago", slot.session.session_id, age);
                return slot.session.clone();
            }
        }

        let session = init();
        log::info!("Opened session {} for {}", session.session_id, key);
        slots.insert(
            key.to_owned(),
            Slot {
                opened_at: Instant::now(),
                session: session.clone(),
            },
        );
        session
    }

    /// Drops the cached session for `key`, the next call opens a new one.
    pub fn forget(&self, key: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key);
    }
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE)
    }
}
