//! Session gateway wire format.
//!
//! Both directions are JSON objects tagged by `type` in snake_case.

use serde::{Deserialize, Serialize};

use crate::domain::actions::PlayerAction;
use crate::domain::events::{MatchEvent, MatchEventKind};
use crate::domain::match_state::MatchState;
use crate::domain::stages::blackjack::BlackjackEvent;
use crate::domain::stages::dice_hilo::DiceEvent;
use crate::domain::stages::holdem::HoldemEvent;
use crate::domain::stages::quiz::QuizEvent;
use crate::domain::stages::roulette::RouletteEvent;
use crate::domain::types::{Millis, Seat, Stage};
use crate::domain::view::{MatchView, PublicEvent};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Submit {
        action: PlayerAction,
        #[serde(default)]
        client_ts: Option<Millis>,
    },
    Resync,
    Ping,
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Submitter only.
    Ack { seq: i64 },
    /// Submitter only.
    ActionRejected { code: String, detail: String },
    MatchState { view: MatchView },
    StageStarted { stage: Stage },
    HandState { view: MatchView },
    RoundCompleted { stage: Stage, round: u32 },
    Events { events: Vec<PublicEvent> },
    Pong,
}

impl ServerMsg {
    pub fn rejected(err: &AppError) -> Self {
        ServerMsg::ActionRejected {
            code: err.code().as_str().to_string(),
            detail: err.detail(),
        }
    }

    /// Full state for `viewer`; stages played hand by hand get `hand_state`.
    pub fn state_for(state: &MatchState, viewer: Option<Seat>) -> Self {
        let view = MatchView::for_viewer(state, viewer);
        match view.stage {
            Stage::Blackjack | Stage::Holdem => ServerMsg::HandState { view },
            _ => ServerMsg::MatchState { view },
        }
    }
}

/// The round a stage just closed, if `kind` closes one.
fn round_closed(kind: &MatchEventKind) -> Option<(Stage, u32)> {
    match kind {
        MatchEventKind::Blackjack(BlackjackEvent::RoundCompleted { round }) => {
            Some((Stage::Blackjack, *round))
        }
        MatchEventKind::Roulette(RouletteEvent::SpinClosed { spin }) => {
            Some((Stage::RouletteInterlude, *spin))
        }
        MatchEventKind::Trivia(QuizEvent::ItemClosed { index, .. }) => {
            Some((Stage::Trivia, *index))
        }
        MatchEventKind::MusicQuiz(QuizEvent::ItemClosed { index, .. }) => {
            Some((Stage::MusicQuiz, *index))
        }
        MatchEventKind::DiceHiLo(DiceEvent::RoundClosed { round }) => {
            Some((Stage::DiceHiLo, *round))
        }
        MatchEventKind::Holdem(HoldemEvent::HandSettled { hand_no, .. }) => {
            Some((Stage::Holdem, *hand_no))
        }
        _ => None,
    }
}

/// What one participant receives after a committed batch: the events, any
/// stage and round markers they contain, then the viewer's fresh state.
pub fn commit_messages(
    state: &MatchState,
    events: &[MatchEvent],
    viewer: Option<Seat>,
) -> Vec<ServerMsg> {
    let mut out = Vec::with_capacity(events.len() + 2);
    out.push(ServerMsg::Events {
        events: PublicEvent::list(events, state.status.is_terminal()),
    });
    for event in events {
        if let MatchEventKind::StageStarted { stage } = &event.kind {
            out.push(ServerMsg::StageStarted { stage: *stage });
        } else if let Some((stage, round)) = round_closed(&event.kind) {
            out.push(ServerMsg::RoundCompleted { stage, round });
        }
    }
    out.push(ServerMsg::state_for(state, viewer));
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::rules::MatchRules;
    use crate::domain::types::MatchMode;

    #[test]
    fn client_messages_use_snake_case_tags() {
        let submit: ClientMsg = serde_json::from_value(json!({
            "type": "submit",
            "action": {"type": "FinishBetting"},
            "client_ts": 1234
        }))
        .unwrap();
        assert_eq!(
            submit,
            ClientMsg::Submit {
                action: PlayerAction::FinishBetting,
                client_ts: Some(1234)
            }
        );
        let resync: ClientMsg = serde_json::from_value(json!({"type": "resync"})).unwrap();
        assert_eq!(resync, ClientMsg::Resync);
        assert!(serde_json::from_value::<ClientMsg>(json!({"type": "subscribe"})).is_err());
    }

    #[test]
    fn server_messages_are_tagged() {
        let ack = serde_json::to_value(ServerMsg::Ack { seq: 9 }).unwrap();
        assert_eq!(ack, json!({"type": "ack", "seq": 9}));
        let marker = serde_json::to_value(ServerMsg::RoundCompleted {
            stage: Stage::DiceHiLo,
            round: 2,
        })
        .unwrap();
        assert_eq!(marker["type"], "round_completed");
        assert_eq!(marker["round"], 2);
    }

    #[test]
    fn commit_batch_ends_with_the_viewers_state() {
        let created =
            MatchState::create(3, MatchMode::FiveKamp, MatchRules::default(), 11, 10, "Ana", 0)
                .unwrap();
        let msgs = commit_messages(&created.state, &created.events, Some(0));
        assert!(matches!(msgs.first(), Some(ServerMsg::Events { events }) if events.len() == created.events.len()));
        match msgs.last() {
            Some(ServerMsg::MatchState { view }) => {
                assert_eq!(view.you, Some(0));
                assert_eq!(view.last_seq, created.state.last_seq);
            }
            other => panic!("unexpected tail {other:?}"),
        }
    }

    #[test]
    fn round_markers_cover_every_round_based_stage() {
        assert_eq!(
            round_closed(&MatchEventKind::DiceHiLo(DiceEvent::RoundClosed { round: 4 })),
            Some((Stage::DiceHiLo, 4))
        );
        assert_eq!(
            round_closed(&MatchEventKind::Roulette(RouletteEvent::SpinClosed { spin: 1 })),
            Some((Stage::RouletteInterlude, 1))
        );
        assert_eq!(
            round_closed(&MatchEventKind::StageStarted {
                stage: Stage::Yatzy
            }),
            None
        );
    }
}
