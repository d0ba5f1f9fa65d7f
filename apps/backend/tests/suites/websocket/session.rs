use std::time::Duration;

use orchestrator::config::orchestrator::OrchestratorConfig;
use orchestrator::domain::actions::{Actor, Command, PlayerAction};
use orchestrator::domain::stages::blackjack::RoundPhase;
use orchestrator::domain::stages::StageState;
use orchestrator::domain::types::{MatchMode, UserId};
use orchestrator::domain::view::MatchView;
use orchestrator::runtime::clock::now_millis;
use orchestrator::services::snapshots;
use orchestrator::AppState;
use serde_json::json;

use crate::common::{fast_config, test_state, test_state_with};
use crate::support::server::start_test_server;
use crate::support::websocket_client::WebSocketClient;

const HOST: i64 = 500;
const GUEST: i64 = 501;
const WAIT: Duration = Duration::from_secs(5);

async fn lobby(state: &AppState) -> Result<i64, Box<dyn std::error::Error>> {
    let db = state.db().cloned().ok_or("test state has no database")?;
    let created = state
        .flow
        .create_match(&db, &state.config, MatchMode::FiveKamp, HOST, "host".into(), now_millis())
        .await?;
    let match_id = created.match_id;
    state.registry()?.register(created);
    Ok(match_id)
}

fn submit(action: serde_json::Value) -> serde_json::Value {
    json!({ "type": "submit", "action": action, "client_ts": 1 })
}

#[actix_web::test]
async fn connect_receives_state_and_acks_actions() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let match_id = lobby(&state).await?;
    let (server, addr) = start_test_server(state)?;
    let url = format!("ws://{addr}/api/ws/matches/{match_id}");

    let mut host = WebSocketClient::connect_as(&url, HOST, WAIT).await?;
    let initial = host.recv_until("match_state", WAIT).await?;
    assert_eq!(initial["view"]["match_id"], match_id);
    assert_eq!(initial["view"]["you"], 0);

    host.send_json(&json!({ "type": "ping" })).await?;
    host.recv_until("pong", WAIT).await?;

    // Bots fill the empty seats.
    host.send_json(&submit(json!({ "type": "StartMatch" }))).await?;
    let ack = host.recv_until("ack", WAIT).await?;
    assert!(ack["seq"].as_i64().is_some_and(|seq| seq > 2), "{ack}");

    host.send_json(&submit(json!({ "type": "StartMatch" }))).await?;
    let rejected = host.recv_until("action_rejected", WAIT).await?;
    assert_eq!(rejected["code"], "ILLEGAL_ACTION");

    host.close().await?;
    server.stop(true).await;
    Ok(())
}

#[actix_web::test]
async fn malformed_messages_are_rejected_without_closing() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let match_id = lobby(&state).await?;
    let (server, addr) = start_test_server(state)?;
    let url = format!("ws://{addr}/api/ws/matches/{match_id}");

    let mut host = WebSocketClient::connect_as(&url, HOST, WAIT).await?;
    host.recv_until("match_state", WAIT).await?;

    host.send_text("{not json").await?;
    let rejected = host.recv_until("action_rejected", WAIT).await?;
    assert_eq!(rejected["code"], "VALIDATION_FAILED");

    host.send_json(&json!({ "type": "ping" })).await?;
    host.recv_until("pong", WAIT).await?;

    host.close().await?;
    server.stop(true).await;
    Ok(())
}

#[actix_web::test]
async fn commits_are_pushed_to_other_sessions() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let match_id = lobby(&state).await?;
    let (server, addr) = start_test_server(state)?;
    let url = format!("ws://{addr}/api/ws/matches/{match_id}");

    let mut host = WebSocketClient::connect_as(&url, HOST, WAIT).await?;
    host.recv_until("match_state", WAIT).await?;

    // A spectator connects, then takes a seat over the same socket.
    let mut guest = WebSocketClient::connect_as(&url, GUEST, WAIT).await?;
    let spectating = guest.recv_until("match_state", WAIT).await?;
    assert!(spectating["view"]["you"].is_null());

    guest
        .send_json(&submit(json!({ "type": "Join", "payload": { "display_name": "Bo" } })))
        .await?;
    guest.recv_until("ack", WAIT).await?;

    let pushed = loop {
        let msg = host.recv_until("events", WAIT).await?;
        let joined = msg["events"]
            .as_array()
            .is_some_and(|events| events.iter().any(|e| e["event_type"] == "PlayerJoined"));
        if joined {
            break msg;
        }
    };
    assert!(pushed["events"][0]["seq"].as_i64().is_some());

    let view = host.recv_until("match_state", WAIT).await?;
    assert_eq!(view["view"]["players"].as_array().map(Vec::len), Some(2));

    guest.close().await?;
    host.close().await?;
    server.stop(true).await;
    Ok(())
}

#[actix_web::test]
async fn unknown_match_refuses_the_upgrade() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let (server, addr) = start_test_server(state)?;
    let url = format!("ws://{addr}/api/ws/matches/4242");

    let attempt = WebSocketClient::connect_as(&url, HOST, Duration::from_millis(300)).await;
    assert!(attempt.is_err());

    server.stop(true).await;
    Ok(())
}

fn by(user_id: UserId, action: PlayerAction) -> Command {
    Command::Act {
        actor: Actor::User { user_id },
        action,
        client_ts: None,
    }
}

/// A player drops mid-hand and the idle actor is evicted; reconnecting
/// reloads the match from storage and the same hand is still theirs to play.
#[actix_web::test]
async fn reconnect_after_eviction_resumes_the_hand() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state_with(OrchestratorConfig {
        ready_check_secs: 60,
        bj_betting_secs: 60,
        bj_decision_secs: 60,
        ..fast_config()
    })
    .await?;
    let db = state.db().cloned().ok_or("test state has no database")?;
    let registry = state.registry()?;
    let created = state
        .flow
        .create_match(&db, &state.config, MatchMode::BlackjackOnly, HOST, "host".into(), now_millis())
        .await?;
    let match_id = created.match_id;
    registry.register(created);
    registry
        .submit(match_id, by(GUEST, PlayerAction::Join { display_name: "guest".into() }))
        .await?;
    registry.submit(match_id, by(HOST, PlayerAction::StartMatch)).await?;
    for user_id in [HOST, GUEST] {
        registry.submit(match_id, by(user_id, PlayerAction::ConfirmReady)).await?;
    }

    let (server, addr) = start_test_server(state)?;
    let url = format!("ws://{addr}/api/ws/matches/{match_id}");
    let mut host = WebSocketClient::connect_as(&url, HOST, WAIT).await?;
    host.recv_until("hand_state", WAIT).await?;

    // Bet until the host is dealt a hand that still needs a decision.
    let mut updates = registry.handle(match_id).await?.subscribe();
    let mut before = None;
    for _ in 0..10 {
        let current = registry.state(match_id).await?;
        let StageState::Blackjack(bj) = &current.stage else {
            return Err(format!("expected blackjack, got {}", current.current_stage()).into());
        };
        assert_eq!(bj.phase, RoundPhase::Betting);
        let round = bj.round;
        registry
            .submit(match_id, by(HOST, PlayerAction::PlaceBet { spot: 0, amount: 20 }))
            .await?;
        registry.submit(match_id, by(HOST, PlayerAction::FinishBetting)).await?;
        registry.submit(match_id, by(GUEST, PlayerAction::FinishBetting)).await?;

        let settled = tokio::time::timeout(
            WAIT,
            updates.wait_for(|s| match &s.stage {
                StageState::Blackjack(bj) => {
                    bj.round != round
                        || (bj.phase == RoundPhase::PlayerTurns && bj.active_hand().is_some())
                }
                _ => true,
            }),
        )
        .await?
        .map(|s| s.clone())?;
        if matches!(&settled.stage, StageState::Blackjack(bj) if bj.round == round) {
            before = Some(settled);
            break;
        }
    }
    let before = before.ok_or("host was never left with a live hand")?;
    let host_seat = before.seat_of(HOST).ok_or("host has a seat")?;
    let StageState::Blackjack(bj) = &before.stage else {
        return Err("expected blackjack".into());
    };
    let active = bj.active_hand().cloned().ok_or("active hand")?;
    assert_eq!(active.seat, host_seat);

    host.close().await?;
    let dropped = tokio::time::timeout(
        WAIT,
        updates.wait_for(|s| s.player(host_seat).is_some_and(|p| !p.is_connected)),
    )
    .await?
    .map(|s| s.clone())?;
    assert_eq!(dropped.last_seq, before.last_seq + 1);
    assert_eq!(dropped.stage, before.stage);

    registry.evict(match_id);
    assert_eq!(registry.live_count(), 0);
    assert_eq!(snapshots::rehydrate(&db, match_id).await?, *dropped);

    let mut host = WebSocketClient::connect_as(&url, HOST, WAIT).await?;
    let resumed = host.recv_until("hand_state", WAIT).await?;
    assert_eq!(resumed["view"]["last_seq"], dropped.last_seq + 1);
    let expected = serde_json::to_value(MatchView::for_viewer(&dropped, Some(host_seat)))?;
    assert_eq!(resumed["view"]["detail"], expected["detail"]);
    let reloaded = registry.state(match_id).await?;
    assert_eq!(reloaded.stage, dropped.stage);
    assert!(reloaded.player(host_seat).is_some_and(|p| p.is_connected));

    host.send_json(&submit(json!({
        "type": "Stand",
        "payload": { "spot": active.spot, "hand": active.index }
    })))
    .await?;
    let ack = host.recv_until("ack", WAIT).await?;
    let seq = ack["seq"].as_i64().ok_or("ack carries a seq")?;
    assert!(seq > reloaded.last_seq, "{ack}");

    // A full replay only succeeds over a gap-free log.
    let replayed = snapshots::replay_full(&db, match_id).await?;
    assert!(replayed.last_seq >= seq);
    assert!(replayed.is_conserved());

    host.close().await?;
    server.stop(true).await;
    registry.shutdown();
    Ok(())
}
