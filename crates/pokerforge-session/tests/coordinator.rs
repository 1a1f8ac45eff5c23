//! Integration tests for the session coordinator.
//!
//! Each test client is a pair of in-memory channels wired straight into
//! `SessionCoordinator::handle`, running on its own task just like a
//! real connection would.

use std::sync::Arc;
use std::time::Duration;

use pokerforge_protocol::ANSI_CLEAR_SCREEN;
use pokerforge_room::{RegistryConfig, RoomError, RoomRegistry};
use pokerforge_session::{
    SessionConfig, SessionCoordinator, SessionError, SessionOutcome,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// =========================================================================
// Helpers
// =========================================================================

const PATIENCE: Duration = Duration::from_secs(2);

struct TestClient {
    input: Option<mpsc::UnboundedSender<String>>,
    output: mpsc::UnboundedReceiver<String>,
    buffer: String,
    task: JoinHandle<SessionOutcome>,
}

impl TestClient {
    fn connect(coordinator: &SessionCoordinator) -> Self {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let coordinator = coordinator.clone();
        let task =
            tokio::spawn(async move { coordinator.handle(in_rx, out_tx).await });
        Self {
            input: Some(in_tx),
            output: out_rx,
            buffer: String::new(),
            task,
        }
    }

    fn say(&self, line: &str) {
        self.input
            .as_ref()
            .expect("client already disconnected")
            .send(line.to_string())
            .expect("coordinator should be reading");
    }

    fn disconnect(&mut self) {
        self.input = None;
    }

    /// Reads output until `needle` shows up; returns everything up to and
    /// including it.
    async fn expect(&mut self, needle: &str) -> String {
        loop {
            if let Some(pos) = self.buffer.find(needle) {
                let end = pos + needle.len();
                let consumed: String = self.buffer.drain(..end).collect();
                return consumed;
            }
            match tokio::time::timeout(PATIENCE, self.output.recv()).await {
                Ok(Some(text)) => self.buffer.push_str(&text),
                Ok(None) => panic!(
                    "output closed while waiting for {needle:?}; got {:?}",
                    self.buffer
                ),
                Err(_) => panic!(
                    "timed out waiting for {needle:?}; got {:?}",
                    self.buffer
                ),
            }
        }
    }

    async fn outcome(self) -> SessionOutcome {
        tokio::time::timeout(PATIENCE, self.task)
            .await
            .expect("session should end")
            .expect("session task should not panic")
    }
}

fn coordinator_with(capacity: usize, config: SessionConfig) -> SessionCoordinator {
    let registry = Arc::new(RoomRegistry::new(RegistryConfig { capacity }));
    SessionCoordinator::new(registry, config)
}

fn quiet() -> SessionConfig {
    SessionConfig {
        spinner_interval: None,
        ..SessionConfig::default()
    }
}

fn coordinator() -> SessionCoordinator {
    coordinator_with(5, quiet())
}

/// Host creates `room` as `host_name`; ends at the start prompt.
async fn host(coord: &SessionCoordinator, room: &str, host_name: &str) -> TestClient {
    let mut client = TestClient::connect(coord);
    client.expect("Enter the room number").await;
    client.say(room);
    client.expect("created where you are the host").await;
    client.expect("Enter your name: ").await;
    client.say(host_name);
    client.expect("Type 'start'").await;
    client
}

/// Guest joins `room` as `name`; ends waiting for the host.
async fn guest(coord: &SessionCoordinator, room: &str, name: &str) -> TestClient {
    let mut client = TestClient::connect(coord);
    client.expect("Enter the room number").await;
    client.say(room);
    client.expect(&format!("Joined room {room}.")).await;
    client.expect("Enter your name: ").await;
    client.say(name);
    client.expect("Waiting for host to start").await;
    client
}

/// Host types start; everyone sees the reset and the first round prompt.
async fn start(host: &mut TestClient, guests: &mut [&mut TestClient]) {
    host.say("start");
    host.expect(ANSI_CLEAR_SCREEN).await;
    host.expect("+++ Round 1 +++").await;
    host.expect("Enter your estimate: ").await;
    for g in guests.iter_mut() {
        g.expect(ANSI_CLEAR_SCREEN).await;
        g.expect("+++ Round 1 +++").await;
        g.expect("Enter your estimate: ").await;
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_host_start_and_first_round() {
    let coord = coordinator();
    let mut alice = host(&coord, "r1", "alice").await;
    let mut bob = guest(&coord, "r1", "bob").await;
    alice.expect("bob joined the room.").await;

    start(&mut alice, &mut [&mut bob]).await;

    alice.say("5");
    alice.expect("Waiting for other players to estimate...").await;
    bob.say("8");

    for client in [&mut alice, &mut bob] {
        client.expect("All estimates received for Round 1.").await;
        client.expect("- alice: 5\n- bob: 8\n").await;
        client.expect("Round finished.").await;
        client.expect("+++ Round 2 +++").await;
    }

    assert!(coord.registry().exists("r1").await);
}

#[tokio::test]
async fn test_non_start_input_reprompts_host() {
    let coord = coordinator();
    let mut alice = host(&coord, "r1", "alice").await;

    alice.say("go");
    alice.expect("Type 'start'").await;
    alice.say("start");
    alice.expect("+++ Round 1 +++").await;
}

#[tokio::test]
async fn test_join_after_start_is_rejected() {
    let coord = coordinator();
    let mut alice = host(&coord, "r1", "alice").await;
    let mut bob = guest(&coord, "r1", "bob").await;
    start(&mut alice, &mut [&mut bob]).await;

    let mut carol = TestClient::connect(&coord);
    carol.expect("Enter the room number").await;
    carol.say("r1");
    carol.expect("The session has already started.").await;

    assert_eq!(
        carol.outcome().await,
        SessionOutcome::Rejected(RoomError::SessionAlreadyStarted("r1".into()))
    );
    let room = coord.registry().lookup("r1").await.unwrap();
    assert_eq!(room.member_names().await, vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_capacity_exceeded_is_rejected() {
    let coord = coordinator_with(1, quiet());
    let _alice = host(&coord, "r1", "alice").await;

    let mut bob = TestClient::connect(&coord);
    bob.expect("Enter the room number").await;
    bob.say("r2");
    bob.expect("maximum of 1 rooms").await;

    assert_eq!(
        bob.outcome().await,
        SessionOutcome::Rejected(RoomError::CapacityExceeded(1))
    );
    assert_eq!(coord.registry().room_ids().await, vec!["r1"]);
}

#[tokio::test]
async fn test_disconnect_completes_round_for_the_rest() {
    let coord = coordinator();
    let mut alice = host(&coord, "r1", "alice").await;
    let mut bob = guest(&coord, "r1", "bob").await;
    let mut carol = guest(&coord, "r1", "carol").await;
    alice.expect("carol joined the room.").await;
    start(&mut alice, &mut [&mut bob, &mut carol]).await;

    alice.say("3");
    bob.say("5");
    alice.expect("Waiting for other players").await;
    carol.disconnect();

    for client in [&mut alice, &mut bob] {
        client.expect("carol left the room.").await;
        let results = client.expect("Round finished.").await;
        assert!(results.contains("- alice: 3\n- bob: 5\n"));
        assert!(!results.contains("carol:"));
        client.expect("+++ Round 2 +++").await;
    }

    assert_eq!(
        carol.outcome().await,
        SessionOutcome::Dropped(SessionError::Disconnected)
    );
}

#[tokio::test]
async fn test_exit_leaves_room_and_notifies_others() {
    let coord = coordinator();
    let mut alice = host(&coord, "r1", "alice").await;
    let mut bob = guest(&coord, "r1", "bob").await;
    start(&mut alice, &mut [&mut bob]).await;

    bob.say("exit");
    bob.expect("Bye bye!").await;
    alice.expect("bob left the room.").await;
    assert_eq!(bob.outcome().await, SessionOutcome::Left);

    // Alone in the room, alice's rounds complete on her own estimate.
    alice.say("2");
    alice.expect("- alice: 2\n").await;
    alice.expect("+++ Round 2 +++").await;
}

#[tokio::test]
async fn test_last_member_exit_frees_the_room() {
    let coord = coordinator_with(1, quiet());
    let mut alice = host(&coord, "r1", "alice").await;
    alice.say("start");
    alice.expect("Enter your estimate: ").await;

    alice.say("exit");
    assert_eq!(alice.outcome().await, SessionOutcome::Left);

    assert!(!coord.registry().exists("r1").await);
    let _bob = host(&coord, "r2", "bob").await;
}

#[tokio::test]
async fn test_host_leaving_before_start_releases_guests() {
    let coord = coordinator();
    let mut alice = host(&coord, "r1", "alice").await;
    let mut bob = guest(&coord, "r1", "bob").await;

    alice.disconnect();

    bob.expect("alice left the room.").await;
    bob.expect("The host left before starting the session.").await;
    assert_eq!(
        bob.outcome().await,
        SessionOutcome::Dropped(SessionError::Room(RoomError::HostLeft(
            "r1".into()
        )))
    );
    assert!(!coord.registry().exists("r1").await);
}

#[tokio::test]
async fn test_creator_disconnecting_before_name_abandons_room() {
    let coord = coordinator();
    let mut alice = TestClient::connect(&coord);
    alice.expect("Enter the room number").await;
    alice.say("r1");
    alice.expect("Enter your name: ").await;

    alice.disconnect();

    assert_eq!(
        alice.outcome().await,
        SessionOutcome::Dropped(SessionError::Disconnected)
    );
    assert!(!coord.registry().exists("r1").await);
}

#[tokio::test]
async fn test_input_typed_while_waiting_is_kept() {
    let coord = coordinator();
    let mut alice = host(&coord, "r1", "alice").await;
    let mut bob = guest(&coord, "r1", "bob").await;
    alice.expect("bob joined the room.").await;

    // Bob answers round 1 before the session even starts.
    bob.say("13");
    tokio::time::sleep(Duration::from_millis(20)).await;
    start(&mut alice, &mut [&mut bob]).await;
    alice.say("8");

    for client in [&mut alice, &mut bob] {
        client.expect("- alice: 8\n- bob: 13\n").await;
    }
}

#[tokio::test]
async fn test_duplicate_name_reprompts_when_rejected() {
    let coord = coordinator_with(
        5,
        SessionConfig {
            reject_duplicate_names: true,
            ..quiet()
        },
    );
    let mut alice = host(&coord, "r1", "alice").await;

    let mut impostor = TestClient::connect(&coord);
    impostor.expect("Enter the room number").await;
    impostor.say("r1");
    impostor.expect("Enter your name: ").await;
    impostor.say("alice");
    impostor.expect("The name alice is already taken").await;
    impostor.expect("Enter your name: ").await;
    impostor.say("alice2");
    impostor.expect("Waiting for host to start").await;

    alice.expect("alice2 joined the room.").await;
}

#[tokio::test]
async fn test_idle_participant_times_out() {
    let coord = coordinator_with(
        5,
        SessionConfig {
            wait_timeout: Some(Duration::from_millis(50)),
            ..quiet()
        },
    );
    let mut alice = host(&coord, "r1", "alice").await;

    alice.expect("No activity for too long").await;
    assert_eq!(
        alice.outcome().await,
        SessionOutcome::Dropped(SessionError::TimedOut(Duration::from_millis(50)))
    );
    assert!(!coord.registry().exists("r1").await);
}

#[tokio::test]
async fn test_round_numbers_advance_without_gaps() {
    let coord = coordinator();
    let mut alice = host(&coord, "r1", "alice").await;
    let mut bob = guest(&coord, "r1", "bob").await;
    start(&mut alice, &mut [&mut bob]).await;

    for round in 1..=3 {
        alice.say("1");
        bob.say("2");
        for client in [&mut alice, &mut bob] {
            client
                .expect(&format!("All estimates received for Round {round}."))
                .await;
            client.expect(&format!("+++ Round {} +++", round + 1)).await;
        }
    }
}

#[tokio::test]
async fn test_guest_leaving_before_host_names_keeps_room_open() {
    let coord = coordinator();
    let mut alice = TestClient::connect(&coord);
    alice.expect("Enter the room number").await;
    alice.say("r1");
    alice.expect("created where you are the host").await;
    alice.expect("Enter your name: ").await;

    let mut bob = guest(&coord, "r1", "bob").await;
    bob.disconnect();
    assert_eq!(
        bob.outcome().await,
        SessionOutcome::Dropped(SessionError::Disconnected)
    );
    assert!(coord.registry().exists("r1").await);

    alice.say("alice");
    alice.expect("Type 'start'").await;
    let room = coord.registry().lookup("r1").await.unwrap();
    assert_eq!(room.member_names().await, vec!["alice"]);
}

#[tokio::test]
async fn test_replaced_participant_cannot_overwrite_estimate() {
    let coord = coordinator();
    let mut host_client = host(&coord, "r1", "host").await;
    let mut first = guest(&coord, "r1", "alice").await;
    let mut second = guest(&coord, "r1", "alice").await;

    host_client.say("start");
    host_client.expect("Enter your estimate: ").await;
    second.expect("Enter your estimate: ").await;
    first.expect("Enter your estimate: ").await;

    second.say("3");
    second.expect("Waiting for other players").await;
    first.say("100");
    first.expect("Someone else joined as alice").await;
    assert_eq!(
        first.outcome().await,
        SessionOutcome::Dropped(SessionError::Room(RoomError::Replaced(
            "alice".into()
        )))
    );

    host_client.say("5");
    for client in [&mut host_client, &mut second] {
        let results = client.expect("Round finished.").await;
        assert!(results.contains("- alice: 3\n- host: 5\n"));
        assert!(!results.contains("100"));
    }
}
