use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Result};

use super::timer::TimerQueue;

/// The roster proper: principal -> announced public key, with expiry driven
/// by the embedded [`TimerQueue`].
///
/// `MemberTable` is unsynchronized. The coordinator serializes all access
/// behind its request lock; do not share one across threads.
pub struct MemberTable {
    keys: HashMap<String, String>,
    timers: TimerQueue,
}

impl MemberTable {
    pub fn new(expiry: Duration) -> Self {
        Self {
            keys: HashMap::new(),
            timers: TimerQueue::new(expiry),
        }
    }

    /// Applies one announcement and reports whether it revised the roster.
    ///
    /// A revision is a first appearance or a changed key; refreshing with an
    /// unchanged key only re-arms the expiry timer. After applying the
    /// announcement, every member whose timer has lapsed is evicted, so
    /// incoming traffic doubles as the expiry beat.
    pub fn update_ping(&mut self, principal: &str, key: &str) -> Result<bool> {
        if principal.is_empty() {
            bail!("principal must not be empty");
        }
        if key.is_empty() {
            bail!("announced key must not be empty");
        }

        let revised = match self.keys.get(principal) {
            Some(current) => current != key,
            None => true,
        };
        if revised {
            self.keys.insert(principal.to_string(), key.to_string());
        }

        self.timers.add(principal);
        while let Some(expired) = self.timers.poll_expired() {
            self.keys.remove(&expired);
        }

        Ok(revised)
    }

    /// Copy of the whole roster.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.keys.clone()
    }

    /// Copy restricted to `subset`. Members of `subset` that no longer exist
    /// are omitted, which is how removals reach clients.
    pub fn subshot(&self, subset: &[String]) -> HashMap<String, String> {
        let mut result = HashMap::new();
        for principal in subset {
            if let Some(key) = self.keys.get(principal) {
                result.insert(principal.clone(), key.clone());
            }
        }
        result
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
