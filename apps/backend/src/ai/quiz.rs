//! Difficulty-weighted guesser for trivia and the music quiz.
//!
//! The question banks ship with the server, so a bot "knows" an item the way
//! a well-read player would: by recognising the prompt. Whether it actually
//! recalls the answer is a seeded coin flip weighted by difficulty; the seed
//! mixes the match, the question index and the seat, so a replayed match makes
//! the same guesses.

use tracing::debug;

use super::trait_def::BotStrategy;
use crate::domain::actions::PlayerAction;
use crate::domain::rng::{derive_seed, DetRng};
use crate::domain::stages::quiz::{Difficulty, QuizKind};
use crate::domain::types::Seat;
use crate::domain::view::{MatchView, OpenQuestion, QuizView, StageView};

pub struct WeightedGuesser {
    seed: u64,
}

impl WeightedGuesser {
    pub const NAME: &'static str = "weighted-guesser";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed: seed.unwrap_or(0x5EED_0F_5077_1C),
        }
    }

    /// Chance in percent of recalling the right answer.
    pub fn recall_percent(difficulty: Difficulty) -> u64 {
        match difficulty {
            Difficulty::Easy => 85,
            Difficulty::Medium => 60,
            Difficulty::Hard => 35,
        }
    }

    fn choose(&self, match_id: i64, seat: Seat, kind: QuizKind, q: &OpenQuestion) -> u8 {
        let options = q.choices.len().clamp(1, 4) as u64;
        let salt = ((seat as u64) << 32) | q.index as u64;
        let mut rng = DetRng::new(derive_seed(self.seed ^ match_id as u64, match_id, salt));

        let Some(answer) = known_answer(kind, &q.prompt) else {
            return rng.below(options) as u8;
        };
        if rng.below(100) < Self::recall_percent(q.difficulty) || options == 1 {
            return answer;
        }
        // Pick uniformly among the wrong choices.
        let wrong = rng.below(options - 1) as u8;
        if wrong >= answer {
            wrong + 1
        } else {
            wrong
        }
    }
}

fn known_answer(kind: QuizKind, prompt: &str) -> Option<u8> {
    kind.bank()
        .iter()
        .find(|entry| entry.prompt == prompt)
        .map(|entry| entry.answer)
}

fn action_for(quiz: &QuizView, question: &OpenQuestion, choice: u8) -> PlayerAction {
    match quiz.kind {
        QuizKind::Trivia => PlayerAction::SubmitAnswer {
            question: question.index,
            choice,
        },
        QuizKind::Music => PlayerAction::MusicGuess {
            round: question.index,
            choice,
        },
    }
}

impl BotStrategy for WeightedGuesser {
    fn next_action(&self, view: &MatchView, seat: Seat) -> Option<PlayerAction> {
        let quiz = match &view.detail {
            StageView::Trivia(q) | StageView::MusicQuiz(q) => q,
            _ => return None,
        };
        let question = quiz.question.as_ref()?;
        if quiz.answered.contains(&seat) {
            return None;
        }
        let choice = self.choose(view.match_id, seat, quiz.kind, question);
        debug!(
            match_id = view.match_id,
            seat,
            question = question.index,
            choice,
            "quiz bot answered"
        );
        Some(action_for(quiz, question, choice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fixtures::view_with;
    use crate::domain::stages::quiz_bank::{BankEntry, TRACKS, TRIVIA};

    fn quiz_view(kind: QuizKind, entry: &BankEntry, index: u32) -> QuizView {
        QuizView {
            kind,
            total: 5,
            question: Some(OpenQuestion {
                index,
                prompt: entry.prompt.to_string(),
                choices: entry.choices.iter().map(|c| c.to_string()).collect(),
                difficulty: entry.difficulty,
                base_points: 100,
                opened_at: 0,
            }),
            answered: Vec::new(),
            last_answer: None,
            points: Vec::new(),
        }
    }

    #[test]
    fn same_seed_same_guess() {
        let view = view_with(StageView::Trivia(quiz_view(QuizKind::Trivia, &TRIVIA[0], 0)), &[(2, 100)]);
        let a = WeightedGuesser::new(Some(9)).next_action(&view, 2);
        let b = WeightedGuesser::new(Some(9)).next_action(&view, 2);
        assert_eq!(a, b);
        assert!(matches!(a, Some(PlayerAction::SubmitAnswer { question: 0, .. })));
    }

    #[test]
    fn music_uses_guess_action() {
        let view = view_with(StageView::MusicQuiz(quiz_view(QuizKind::Music, &TRACKS[0], 3)), &[(1, 100)]);
        let action = WeightedGuesser::new(None).next_action(&view, 1);
        assert!(matches!(action, Some(PlayerAction::MusicGuess { round: 3, choice }) if choice < 4));
    }

    #[test]
    fn skips_when_already_answered() {
        let mut quiz = quiz_view(QuizKind::Trivia, &TRIVIA[1], 1);
        quiz.answered.push(4);
        let view = view_with(StageView::Trivia(quiz), &[(4, 100)]);
        assert_eq!(WeightedGuesser::new(None).next_action(&view, 4), None);
    }

    #[test]
    fn easy_questions_mostly_right() {
        let entry = TRIVIA
            .iter()
            .find(|e| e.difficulty == Difficulty::Easy)
            .unwrap();
        let bot = WeightedGuesser::new(Some(1));
        let correct = (0..200u32)
            .filter(|i| {
                let q = quiz_view(QuizKind::Trivia, entry, *i);
                let question = q.question.as_ref().unwrap();
                bot.choose(7, 0, QuizKind::Trivia, question) == entry.answer
            })
            .count();
        assert!(correct > 130, "only {correct}/200 correct on an easy item");
    }

    #[test]
    fn unknown_prompt_still_answers_in_range() {
        let bot = WeightedGuesser::new(Some(3));
        let q = OpenQuestion {
            index: 0,
            prompt: "not in any bank".into(),
            choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            difficulty: Difficulty::Hard,
            base_points: 300,
            opened_at: 0,
        };
        assert!(bot.choose(1, 1, QuizKind::Trivia, &q) < 4);
    }
}
