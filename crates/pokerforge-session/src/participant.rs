//! Line I/O for one participant, with timeouts and disconnect detection.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use pokerforge_protocol::text;
use pokerforge_room::ClientSender;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval};

use crate::{SessionConfig, SessionError};

/// Channel receiver yielding the participant's trimmed input lines.
pub type ClientReceiver = mpsc::UnboundedReceiver<String>;

enum WaitEvent {
    Input(Option<String>),
    Tick,
    Deadline,
}

/// One participant's side of the conversation.
///
/// Owns the inbound line channel and a clone of the outbound sink. Lines
/// that arrive while the participant is waiting on the room are kept and
/// answered at the next prompt.
pub struct Participant {
    inbound: ClientReceiver,
    outbound: ClientSender,
    pending: VecDeque<String>,
    wait_timeout: Option<Duration>,
    spinner_interval: Option<Duration>,
}

impl Participant {
    pub fn new(
        inbound: ClientReceiver,
        outbound: ClientSender,
        config: &SessionConfig,
    ) -> Self {
        Self {
            inbound,
            outbound,
            pending: VecDeque::new(),
            wait_timeout: config.wait_timeout,
            spinner_interval: config.spinner_interval,
        }
    }

    /// The sink this participant's messages go to.
    pub fn outbound(&self) -> &ClientSender {
        &self.outbound
    }

    /// Queues text for the participant.
    pub fn send(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.outbound
            .send(text.into())
            .map_err(|_| SessionError::Disconnected)
    }

    /// Returns the next input line.
    ///
    /// # Errors
    /// - [`SessionError::Disconnected`] once the connection is closed.
    /// - [`SessionError::TimedOut`] if no line arrives within the wait
    ///   timeout.
    pub async fn read_line(&mut self) -> Result<String, SessionError> {
        if let Some(line) = self.pending.pop_front() {
            return Ok(line);
        }

        let line = match self.wait_timeout {
            Some(limit) => tokio::time::timeout(limit, self.inbound.recv())
                .await
                .map_err(|_| SessionError::TimedOut(limit))?,
            None => self.inbound.recv().await,
        };
        line.ok_or(SessionError::Disconnected)
    }

    /// Sends `text`, then reads the answer.
    pub async fn prompt(&mut self, text: &str) -> Result<String, SessionError> {
        self.send(text)?;
        self.read_line().await
    }

    /// Drives `fut` to completion while watching the connection.
    ///
    /// Meanwhile input is buffered for the next prompt, a closed
    /// connection aborts the wait, and the spinner (if enabled) ticks.
    pub async fn wait_on<F: Future>(
        &mut self,
        fut: F,
    ) -> Result<F::Output, SessionError> {
        tokio::pin!(fut);
        let mut spinner = self.spinner_interval.map(|period| {
            tokio::time::interval_at(Instant::now() + period, period)
        });
        let deadline = self.wait_timeout.map(|limit| Instant::now() + limit);
        let mut frame = 0;

        loop {
            let event = tokio::select! {
                output = &mut fut => return Ok(output),
                line = self.inbound.recv() => WaitEvent::Input(line),
                _ = next_tick(&mut spinner) => WaitEvent::Tick,
                _ = sleep_until(deadline) => WaitEvent::Deadline,
            };

            match event {
                WaitEvent::Input(Some(line)) => self.pending.push_back(line),
                WaitEvent::Input(None) => return Err(SessionError::Disconnected),
                WaitEvent::Tick => {
                    self.send(text::spinner_frame(frame))?;
                    frame += 1;
                }
                WaitEvent::Deadline => {
                    return Err(SessionError::TimedOut(
                        self.wait_timeout.unwrap_or_default(),
                    ));
                }
            }
        }
    }
}

async fn next_tick(spinner: &mut Option<Interval>) {
    match spinner {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
