//! The house bot: one specialised strategy per stage.

use super::blackjack::BasicStrategy;
use super::cautious::Cautious;
use super::holdem::TightAggressive;
use super::quiz::WeightedGuesser;
use super::random::RandomBot;
use super::trait_def::BotStrategy;
use super::yatzy::Greedy;
use crate::domain::actions::PlayerAction;
use crate::domain::types::{Seat, Stage};
use crate::domain::view::MatchView;

/// Routes each stage to its strategy and falls back to random play when the
/// specialist has no answer for an awaited seat.
pub struct SputnikBot {
    yatzy: Greedy,
    blackjack: BasicStrategy,
    table: Cautious,
    quiz: WeightedGuesser,
    holdem: TightAggressive,
    fallback: RandomBot,
}

impl SputnikBot {
    pub const NAME: &'static str = "sputnik";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(seed: Option<u64>) -> Self {
        Self {
            yatzy: Greedy,
            blackjack: BasicStrategy,
            table: Cautious,
            quiz: WeightedGuesser::new(seed),
            holdem: TightAggressive,
            fallback: RandomBot::new(seed),
        }
    }

    fn specialist(&self, stage: Stage) -> Option<&dyn BotStrategy> {
        match stage {
            Stage::Yatzy => Some(&self.yatzy),
            Stage::Blackjack => Some(&self.blackjack),
            Stage::RouletteInterlude | Stage::DiceHiLo => Some(&self.table),
            Stage::Trivia | Stage::MusicQuiz => Some(&self.quiz),
            Stage::Holdem => Some(&self.holdem),
            Stage::Lobby | Stage::ReadyCheck | Stage::Completed | Stage::Cancelled => None,
        }
    }
}

impl BotStrategy for SputnikBot {
    fn next_action(&self, view: &MatchView, seat: Seat) -> Option<PlayerAction> {
        let specialist = self.specialist(view.stage)?;
        specialist.next_action(view, seat).or_else(|| {
            if view.awaiting.contains(&seat) {
                self.fallback.next_action(view, seat)
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fixtures::{blackjack_view, view_with};
    use crate::domain::stages::blackjack::RoundPhase;
    use crate::domain::view::StageView;

    #[test]
    fn dispatches_blackjack_to_basic_strategy() {
        let view = view_with(
            StageView::Blackjack(blackjack_view(RoundPhase::Betting)),
            &[(0, 500)],
        );
        let bot = SputnikBot::new(Some(5));
        assert_eq!(
            bot.next_action(&view, 0),
            BasicStrategy.next_action(&view, 0)
        );
    }

    #[test]
    fn idle_in_lobby() {
        let view = view_with(StageView::Lobby, &[(0, 0)]);
        assert_eq!(SputnikBot::new(None).next_action(&view, 0), None);
    }
}
