//! The session coordinator: one participant's walk through the protocol.
//!
//! ```text
//! Joining ──→ AwaitingStart ──→ Round 1 ──→ Round 2 ──→ …
//!    │             │               │
//!    ▼             ▼               ▼
//! Rejected     (departure)     Left via `exit` / disconnect / timeout
//! ```
//!
//! Every participant runs its own coordinator on its own task. They never
//! talk to each other directly, only through the shared [`Room`]: each
//! one records its estimate, waits for the room to report the round
//! complete, and renders the results itself.

use std::sync::Arc;

use pokerforge_protocol::{text, EstimateInput, HostInput, ANSI_CLEAR_SCREEN};
use pokerforge_room::{
    ClientHandle, ClientSender, JoinedRoom, Room, RoomError, RoomRegistry,
};

use crate::participant::{ClientReceiver, Participant};
use crate::{SessionConfig, SessionError};

/// How a participant's session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Turned away while joining (session started, capacity, room closed).
    Rejected(RoomError),
    /// Typed `exit`.
    Left,
    /// Disconnected, timed out, or the room ended underneath them.
    Dropped(SessionError),
}

/// A participant's registration in a room.
struct Membership {
    room: Arc<Room>,
    handle: ClientHandle,
}

/// Drives participants through join, start and estimation rounds.
///
/// Cheap to clone; every clone shares the same [`RoomRegistry`].
#[derive(Clone)]
pub struct SessionCoordinator {
    registry: Arc<RoomRegistry>,
    config: SessionConfig,
}

impl SessionCoordinator {
    pub fn new(registry: Arc<RoomRegistry>, config: SessionConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Runs one participant's session to completion.
    ///
    /// `inbound` yields the participant's input lines and closes when the
    /// connection does; `outbound` delivers text to it. Whatever happens
    /// here, only this participant and its room are affected.
    pub async fn handle(
        &self,
        inbound: ClientReceiver,
        outbound: ClientSender,
    ) -> SessionOutcome {
        let mut io = Participant::new(inbound, outbound, &self.config);

        let membership = match self.join(&mut io).await {
            Ok(membership) => membership,
            Err(SessionError::Room(e)) => {
                tracing::info!(error = %e, "participant rejected");
                return SessionOutcome::Rejected(e);
            }
            Err(e) => {
                tracing::debug!(error = %e, "participant gone while joining");
                return SessionOutcome::Dropped(e);
            }
        };

        let result = self.participate(&mut io, &membership).await;
        self.depart(&membership).await;

        match result {
            Ok(()) => SessionOutcome::Left,
            Err(e) => {
                tracing::info!(
                    room = membership.room.id(),
                    name = membership.handle.name(),
                    error = %e,
                    "participant dropped"
                );
                match &e {
                    SessionError::TimedOut(_) => {
                        let _ = io.send(text::timed_out());
                    }
                    SessionError::Room(room_err) => {
                        let _ = io.send(self.rejection_text(room_err));
                    }
                    SessionError::Disconnected => {}
                }
                SessionOutcome::Dropped(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Joining
    // -----------------------------------------------------------------------

    async fn join(
        &self,
        io: &mut Participant,
    ) -> Result<Membership, SessionError> {
        io.send(text::welcome())?;
        let room_id = io.prompt(text::room_prompt()).await?;

        let JoinedRoom { room, created } =
            match self.registry.join_or_create(&room_id).await {
                Ok(joined) => joined,
                Err(e) => {
                    let _ = io.send(self.rejection_text(&e));
                    return Err(e.into());
                }
            };

        match self.enter(io, &room, created).await {
            Ok(handle) => Ok(Membership { room, handle }),
            Err(e) => {
                if created {
                    // Nobody else can start this room now.
                    room.abandon().await;
                    self.registry.remove(&room).await;
                }
                Err(e)
            }
        }
    }

    /// Greets the participant, asks for a name and registers it.
    async fn enter(
        &self,
        io: &mut Participant,
        room: &Arc<Room>,
        created: bool,
    ) -> Result<ClientHandle, SessionError> {
        if created {
            io.send(text::created_room(room.id()))?;
        } else if room.is_started().await {
            let e = RoomError::SessionAlreadyStarted(room.id().to_string());
            let _ = io.send(self.rejection_text(&e));
            return Err(e.into());
        } else {
            io.send(text::joined_room(room.id()))?;
        }

        loop {
            let name = io.prompt(text::name_prompt()).await?;
            let handle =
                ClientHandle::new(name.clone(), created, io.outbound().clone());

            let admitted = if self.config.reject_duplicate_names {
                room.add_unique_member(handle.clone()).await
            } else {
                room.add_member(handle.clone()).await.map(|_| ())
            };

            match admitted {
                Ok(()) => {
                    room.broadcast_except(&name, &text::member_joined(&name))
                        .await;
                    return Ok(handle);
                }
                Err(RoomError::NameTaken(_)) => {
                    io.send(text::name_taken(&name))?;
                }
                Err(e) => {
                    let _ = io.send(self.rejection_text(&e));
                    return Err(e.into());
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Awaiting start and rounds
    // -----------------------------------------------------------------------

    async fn participate(
        &self,
        io: &mut Participant,
        membership: &Membership,
    ) -> Result<(), SessionError> {
        if membership.handle.is_host() {
            self.host_start(io, membership).await?;
        } else {
            self.await_start(io, membership).await?;
        }
        self.play_rounds(io, membership).await
    }

    /// The host re-prompts until it types the start command. No one else
    /// can start the session.
    async fn host_start(
        &self,
        io: &mut Participant,
        membership: &Membership,
    ) -> Result<(), SessionError> {
        loop {
            let line = io.prompt(text::start_prompt()).await?;
            if HostInput::parse(&line) == HostInput::Start {
                break;
            }
        }
        if !membership.room.start_session(ANSI_CLEAR_SCREEN).await {
            tracing::debug!(
                room = membership.room.id(),
                "session was already started"
            );
        }
        Ok(())
    }

    async fn await_start(
        &self,
        io: &mut Participant,
        membership: &Membership,
    ) -> Result<(), SessionError> {
        io.send(text::waiting_for_host())?;
        io.wait_on(membership.room.wait_for_start()).await??;
        io.send("\n")?;
        Ok(())
    }

    /// Returns `Ok(())` when the participant types `exit`.
    async fn play_rounds(
        &self,
        io: &mut Participant,
        membership: &Membership,
    ) -> Result<(), SessionError> {
        let room = &membership.room;
        let name = membership.handle.name();
        let mut round: u32 = 1;

        loop {
            io.send(text::round_header(round))?;
            let line = io.prompt(text::estimate_prompt()).await?;

            let estimate = match EstimateInput::parse(&line) {
                EstimateInput::Exit => {
                    let _ = io.send(text::bye());
                    tracing::info!(room = room.id(), name, round, "participant exited");
                    return Ok(());
                }
                EstimateInput::Estimate(estimate) => estimate,
            };

            if !room
                .record_estimate(round, &membership.handle, estimate)
                .await
            {
                let taken_over =
                    room.member_names().await.iter().any(|n| n == name);
                let e = if taken_over {
                    RoomError::Replaced(name.to_string())
                } else {
                    // Dropped by a failed delivery in the meantime.
                    RoomError::PeerUnreachable(name.to_string())
                };
                return Err(e.into());
            }
            io.send("\n")?;

            if !room.is_round_complete(round).await {
                io.send(text::waiting_for_estimates())?;
            }
            let results = io.wait_on(room.wait_for_round(round)).await?;
            io.send("\n\n")?;
            io.send(text::round_results(round, &results))?;

            round += 1;
        }
    }

    // -----------------------------------------------------------------------
    // Departure
    // -----------------------------------------------------------------------

    /// Removes the participant and tells the others. If that closed the
    /// room, the room is dropped from the registry.
    async fn depart(&self, membership: &Membership) {
        let room = &membership.room;
        let notice = text::member_left(membership.handle.name());

        room.depart(&membership.handle, &notice).await;
        if room.is_closed() {
            self.registry.remove(room).await;
        }
    }

    fn rejection_text(&self, err: &RoomError) -> String {
        match err {
            RoomError::SessionAlreadyStarted(_) => {
                text::session_already_started().to_string()
            }
            RoomError::CapacityExceeded(capacity) => {
                text::capacity_exceeded(*capacity)
            }
            RoomError::Closed(_) => text::room_closed().to_string(),
            RoomError::HostLeft(_) => text::host_left().to_string(),
            RoomError::Replaced(name) => text::name_replaced(name),
            other => format!("{other}\n"),
        }
    }
}
