use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use tokio::sync::Mutex;

use super::instance::generate_instance_id;
use super::protocol::{AnnounceRequest, AnnounceResponse, PROTOCOL_VERSION};
use crate::changelog::log::ChangeLog;
use crate::roster::table::MemberTable;

/// Process-startup configuration. Nothing here is mutable at runtime.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How long a member survives without announcing.
    pub expiry: Duration,
    /// How many revisions the change log retains.
    pub changelog_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            expiry: Duration::from_secs(2),
            changelog_capacity: 500,
        }
    }
}

/// Shared mutable state, guarded as one unit. The roster and the change log
/// are unsynchronized internally; this lock is their only protection.
struct RosterState {
    members: MemberTable,
    changes: ChangeLog,
}

/// The serialization point for all announcements.
///
/// The transport may deliver requests on many parallel tasks; every one of
/// them funnels through the single mutex here for the whole of its state
/// work. No I/O happens while the lock is held.
pub struct Coordinator {
    server_instance: String,
    started: Instant,
    state: Mutex<RosterState>,
}

/// Counters exposed on the health surface.
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorStats {
    pub members: usize,
    pub next_cursor: u64,
    pub retained_from: u64,
    pub uptime_secs: u64,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Result<Self> {
        Ok(Self {
            server_instance: generate_instance_id()?,
            started: Instant::now(),
            state: Mutex::new(RosterState {
                members: MemberTable::new(config.expiry),
                changes: ChangeLog::new(config.changelog_capacity),
            }),
        })
    }

    pub fn instance_id(&self) -> &str {
        &self.server_instance
    }

    /// Applies one authenticated announcement and assembles the reply.
    ///
    /// `principal` is the identity established by the transport. The request
    /// refreshes (or revises) the caller's own membership, then the reply
    /// carries everything revised since the caller's cursor. A caller whose
    /// `server_instance` is stale is served from cursor zero: its cursor was
    /// issued by a process that no longer exists, but its key announcement
    /// is still honored.
    pub async fn announce(
        &self,
        principal: &str,
        req: AnnounceRequest,
    ) -> Result<AnnounceResponse> {
        if req.version != PROTOCOL_VERSION {
            bail!(
                "wrong protocol version: {} instead of {}",
                req.version,
                PROTOCOL_VERSION
            );
        }

        let mut cursor = req.cursor;
        if req.server_instance != self.server_instance {
            cursor = 0;
        }

        let mut state = self.state.lock().await;

        let revised = state.members.update_ping(principal, &req.key)?;
        if revised {
            let assigned = state.changes.add_update(principal);
            tracing::debug!("Revision {} recorded for {}", assigned, principal);
        }

        let delta = state.changes.since(cursor);
        let current_cluster = if delta.complete {
            let mut wanted = delta.entries;
            if !req.include_member.is_empty() {
                wanted.push(req.include_member);
            }
            state.members.subshot(&wanted)
        } else {
            // the caller's cursor predates what we retain; it has to
            // reconcile from scratch
            state.members.snapshot()
        };

        Ok(AnnounceResponse {
            current_cluster,
            cursor: delta.next_cursor,
            server_instance: self.server_instance.clone(),
        })
    }

    pub async fn stats(&self) -> CoordinatorStats {
        let state = self.state.lock().await;
        CoordinatorStats {
            members: state.members.len(),
            next_cursor: state.changes.next_cursor(),
            retained_from: state.changes.start(),
            uptime_secs: self.started.elapsed().as_secs(),
        }
    }
}
