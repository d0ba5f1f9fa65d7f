//! Hand-built views for strategy tests.

use crate::domain::stages::blackjack::RoundPhase;
use crate::domain::types::{Chips, MatchMode, MatchStatus, Seat, Stage};
use crate::domain::view::{BlackjackView, MatchView, PlayerView, StageView};

pub fn view_with(detail: StageView, stacks: &[(Seat, Chips)]) -> MatchView {
    let stage = match &detail {
        StageView::Lobby => Stage::Lobby,
        StageView::ReadyCheck => Stage::ReadyCheck,
        StageView::Yatzy(_) => Stage::Yatzy,
        StageView::Blackjack(_) => Stage::Blackjack,
        StageView::RouletteInterlude(_) => Stage::RouletteInterlude,
        StageView::Trivia(_) => Stage::Trivia,
        StageView::DiceHiLo(_) => Stage::DiceHiLo,
        StageView::MusicQuiz(_) => Stage::MusicQuiz,
        StageView::Holdem(_) => Stage::Holdem,
        StageView::Completed => Stage::Completed,
        StageView::Cancelled => Stage::Cancelled,
    };
    MatchView {
        match_id: 7,
        mode: MatchMode::FiveKamp,
        status: MatchStatus::Running,
        stage,
        last_seq: 10,
        you: None,
        players: stacks
            .iter()
            .map(|(seat, stack)| PlayerView {
                seat: *seat,
                display_name: format!("seat-{seat}"),
                is_bot: true,
                is_connected: false,
                autopilot: false,
                ready: true,
                left: false,
                stack: *stack,
            })
            .collect(),
        deadline: None,
        awaiting: stacks.iter().map(|(seat, _)| *seat).collect(),
        detail,
    }
}

pub fn blackjack_view(phase: RoundPhase) -> BlackjackView {
    BlackjackView {
        round: 1,
        rounds_total: Some(5),
        phase,
        bets: Vec::new(),
        finished_betting: Vec::new(),
        hands: Vec::new(),
        dealer: Vec::new(),
        net: Vec::new(),
    }
}
