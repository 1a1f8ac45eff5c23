//! The room: membership registry plus one session's estimate ledger.
//!
//! Every connection task participating in a room shares one `Arc<Room>`.
//! All mutable state sits behind a single lock so that the completion
//! predicate ("has every current member estimated round N?") always sees
//! the member set and the round's estimates from the same instant. A
//! membership change and an estimate insertion can never interleave in a
//! way that produces a torn "member count vs estimate count" read.
//!
//! # Waiting
//!
//! Tasks that need to block until a predicate holds (session started,
//! round complete) use [`Room::wait_for_start`] and [`Room::wait_for_round`].
//! Each mutation that can flip a predicate wakes all waiters through a
//! [`Notify`], and waiters re-check under the lock:
//!
//! ```text
//! record_estimate ─┐
//! remove_member  ──┼──→ notify_waiters() ──→ waiter re-locks, re-checks
//! start_session  ──┘
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, Notify};

use crate::{ClientHandle, RoomError};

/// A completed round's `(name, estimate)` pairs, ordered by name.
pub type RoundResults = Vec<(String, String)>;

/// State guarded by the room lock.
#[derive(Default)]
struct RoomState {
    /// Flips to `true` exactly once, when the host starts the session.
    started: bool,
    /// Name the host registered under.
    host: Option<String>,
    /// Set when the host leaves before starting.
    host_departed: bool,
    members: HashMap<String, ClientHandle>,
    /// round number → member name → estimate.
    rounds: BTreeMap<u32, BTreeMap<String, String>>,
}

impl RoomState {
    /// A round is complete once every current member has an entry in it.
    ///
    /// Estimates from members who left after submitting stay in the
    /// ledger (and in the rendered results) but are not waited on.
    fn round_complete(&self, round: u32) -> bool {
        match self.rounds.get(&round) {
            Some(estimates) => {
                self.members.keys().all(|name| estimates.contains_key(name))
            }
            None => false,
        }
    }

    fn round_results(&self, round: u32) -> RoundResults {
        self.rounds
            .get(&round)
            .map(|estimates| {
                estimates
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// An isolated estimation session keyed by a user-chosen identifier.
pub struct Room {
    id: String,
    state: Mutex<RoomState>,
    /// Readable without the lock so the registry never has to take it.
    closed: AtomicBool,
    changed: Notify,
}

impl Room {
    /// Creates an empty room whose session has not started.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(RoomState::default()),
            closed: AtomicBool::new(false),
            changed: Notify::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// `true` once the room has been torn down. Closed rooms accept no
    /// new members and are dropped from the registry.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub async fn is_started(&self) -> bool {
        self.state.lock().await.started
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Registers a member.
    ///
    /// A member already registered under the same name is silently
    /// replaced and returned.
    ///
    /// # Errors
    /// - [`RoomError::Closed`] if the room was torn down.
    /// - [`RoomError::SessionAlreadyStarted`] if the host started the
    ///   session after the caller looked the room up.
    pub async fn add_member(
        &self,
        handle: ClientHandle,
    ) -> Result<Option<ClientHandle>, RoomError> {
        let mut state = self.state.lock().await;
        self.check_joinable(&state)?;
        let replaced = self.admit(&mut state, handle);
        drop(state);
        self.changed.notify_waiters();
        Ok(replaced)
    }

    /// Like [`add_member`](Self::add_member), but refuses a name that is
    /// already registered instead of replacing it.
    pub async fn add_unique_member(
        &self,
        handle: ClientHandle,
    ) -> Result<(), RoomError> {
        let mut state = self.state.lock().await;
        self.check_joinable(&state)?;
        if state.members.contains_key(handle.name()) {
            return Err(RoomError::NameTaken(handle.name().to_string()));
        }
        self.admit(&mut state, handle);
        drop(state);
        self.changed.notify_waiters();
        Ok(())
    }

    fn check_joinable(&self, state: &RoomState) -> Result<(), RoomError> {
        if self.is_closed() {
            return Err(RoomError::Closed(self.id.clone()));
        }
        if state.started {
            return Err(RoomError::SessionAlreadyStarted(self.id.clone()));
        }
        Ok(())
    }

    fn admit(
        &self,
        state: &mut RoomState,
        handle: ClientHandle,
    ) -> Option<ClientHandle> {
        let name = handle.name().to_string();
        if handle.is_host() {
            state.host = Some(name.clone());
        }
        let replaced = state.members.insert(name.clone(), handle);
        if replaced.is_some() {
            tracing::warn!(
                room = %self.id,
                %name,
                "name already registered, replacing earlier member"
            );
        }
        tracing::info!(
            room = %self.id,
            %name,
            members = state.members.len(),
            "member joined"
        );
        replaced
    }

    /// Removes the member registered under `name`, if any.
    ///
    /// Returns `true` if a member was removed.
    pub async fn remove_member(&self, name: &str) -> bool {
        let mut state = self.state.lock().await;
        let removed = self.remove_locked(&mut state, name);
        drop(state);
        if removed {
            self.changed.notify_waiters();
        }
        removed
    }

    /// Removes `handle`'s registration, unless its name has since been
    /// taken over by a different connection.
    pub async fn leave(&self, handle: &ClientHandle) -> bool {
        let mut state = self.state.lock().await;
        let registered = state
            .members
            .get(handle.name())
            .is_some_and(|current| current.same_registration(handle));
        let removed = registered && self.remove_locked(&mut state, handle.name());
        drop(state);
        if removed {
            self.changed.notify_waiters();
        }
        removed
    }

    /// Sends `notice` to the other members, then removes `handle`'s
    /// registration, all under one lock hold.
    ///
    /// Everyone still in the room receives the notice before any result
    /// that the departure unblocks. Does nothing if the name has since
    /// been taken over by a different connection.
    pub async fn depart(&self, handle: &ClientHandle, notice: &str) -> bool {
        let mut state = self.state.lock().await;
        let registered = state
            .members
            .get(handle.name())
            .is_some_and(|current| current.same_registration(handle));
        if !registered {
            return false;
        }
        self.deliver_locked(&mut state, notice, Some(handle.name()));
        self.remove_locked(&mut state, handle.name());
        drop(state);
        self.changed.notify_waiters();
        true
    }

    /// Closes a room whose creator disappeared before registering.
    pub async fn abandon(&self) {
        let mut state = self.state.lock().await;
        if !state.started {
            state.host_departed = true;
        }
        self.close_locked("abandoned by its creator");
        drop(state);
        self.changed.notify_waiters();
    }

    fn remove_locked(&self, state: &mut RoomState, name: &str) -> bool {
        if state.members.remove(name).is_none() {
            return false;
        }
        tracing::info!(
            room = %self.id,
            %name,
            members = state.members.len(),
            "member left"
        );

        // A room whose creator is still picking a name stays open even
        // when empty; `abandon` covers a creator who never registers.
        let host_registered = state.host.is_some();
        if !state.started && state.host.as_deref() == Some(name) {
            state.host_departed = true;
            self.close_locked("host left before starting");
        } else if state.members.is_empty() && (host_registered || state.started) {
            self.close_locked("last member left");
        }
        true
    }

    fn close_locked(&self, reason: &str) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::info!(room = %self.id, reason, "room closed");
        }
    }

    /// Snapshot of every current member except `name`.
    pub async fn others_of(&self, name: &str) -> Vec<ClientHandle> {
        let state = self.state.lock().await;
        state
            .members
            .values()
            .filter(|member| member.name() != name)
            .cloned()
            .collect()
    }

    pub async fn member_count(&self) -> usize {
        self.state.lock().await.members.len()
    }

    /// Current member names, sorted.
    pub async fn member_names(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut names: Vec<String> = state.members.keys().cloned().collect();
        names.sort();
        names
    }

    // -----------------------------------------------------------------------
    // Delivery
    // -----------------------------------------------------------------------

    /// Delivers `text` to every current member.
    ///
    /// A member whose connection is gone is logged and removed, exactly
    /// as if it had disconnected; delivery to the others continues.
    pub async fn broadcast(&self, text: &str) {
        let mut state = self.state.lock().await;
        let dropped = self.deliver_locked(&mut state, text, None);
        drop(state);
        if dropped {
            self.changed.notify_waiters();
        }
    }

    /// Delivers `text` to every current member except `name`.
    pub async fn broadcast_except(&self, name: &str, text: &str) {
        let mut state = self.state.lock().await;
        let dropped = self.deliver_locked(&mut state, text, Some(name));
        drop(state);
        if dropped {
            self.changed.notify_waiters();
        }
    }

    /// Returns `true` if any unreachable member was removed.
    fn deliver_locked(
        &self,
        state: &mut RoomState,
        text: &str,
        except: Option<&str>,
    ) -> bool {
        let mut unreachable = Vec::new();
        for (name, member) in &state.members {
            if except == Some(name.as_str()) {
                continue;
            }
            if let Err(e) = member.send(text) {
                tracing::warn!(room = %self.id, error = %e, "delivery failed");
                unreachable.push(name.clone());
            }
        }

        for name in &unreachable {
            self.remove_locked(state, name);
        }
        !unreachable.is_empty()
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    /// Starts the session, sending `reset` to every member first.
    ///
    /// The flag flips under the same lock hold as the delivery, so no
    /// waiter can observe "started" before `reset` is queued for it.
    /// Returns `true` only for the call that actually started the session;
    /// later calls are no-ops.
    pub async fn start_session(&self, reset: &str) -> bool {
        let mut state = self.state.lock().await;
        if state.started {
            return false;
        }
        self.deliver_locked(&mut state, reset, None);
        state.started = true;
        tracing::info!(
            room = %self.id,
            members = state.members.len(),
            "session started"
        );
        drop(state);
        self.changed.notify_waiters();
        true
    }

    /// Waits until the host starts the session.
    ///
    /// # Errors
    /// - [`RoomError::HostLeft`] if the host departed first.
    /// - [`RoomError::Closed`] if the room was torn down for another reason.
    pub async fn wait_for_start(&self) -> Result<(), RoomError> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let state = self.state.lock().await;
                if state.started {
                    return Ok(());
                }
                if self.is_closed() {
                    return Err(if state.host_departed {
                        RoomError::HostLeft(self.id.clone())
                    } else {
                        RoomError::Closed(self.id.clone())
                    });
                }
            }

            notified.await;
        }
    }

    // -----------------------------------------------------------------------
    // Rounds
    // -----------------------------------------------------------------------

    /// Records `member`'s estimate for `round`, overwriting an earlier one.
    ///
    /// Returns `false` (and records nothing) unless `member` is the current
    /// registration under its name. A participant whose name was taken
    /// over by a later join can no longer estimate for it.
    pub async fn record_estimate(
        &self,
        round: u32,
        member: &ClientHandle,
        value: impl Into<String>,
    ) -> bool {
        let name = member.name();
        let mut state = self.state.lock().await;
        let registered = state
            .members
            .get(name)
            .is_some_and(|current| current.same_registration(member));
        if !registered {
            tracing::debug!(room = %self.id, %name, round, "estimate from non-member ignored");
            return false;
        }
        state
            .rounds
            .entry(round)
            .or_default()
            .insert(name.to_string(), value.into());
        let complete = state.round_complete(round);
        drop(state);

        if complete {
            tracing::info!(room = %self.id, round, "round complete");
        }
        self.changed.notify_waiters();
        true
    }

    /// `true` iff every current member has an estimate for `round`.
    pub async fn is_round_complete(&self, round: u32) -> bool {
        self.state.lock().await.round_complete(round)
    }

    /// Snapshot of `round`'s estimates, ordered by member name.
    pub async fn round_estimates(&self, round: u32) -> RoundResults {
        self.state.lock().await.round_results(round)
    }

    /// Waits until `round` is complete and returns its estimates.
    ///
    /// Wakes on every estimate and every departure, so a member leaving
    /// can complete an otherwise stalled round. The returned snapshot is
    /// taken under the same lock hold that saw the round complete.
    pub async fn wait_for_round(&self, round: u32) -> RoundResults {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let state = self.state.lock().await;
                if state.round_complete(round) {
                    return state.round_results(round);
                }
            }

            notified.await;
        }
    }
}
