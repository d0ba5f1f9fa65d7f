//! Bot players.
//!
//! Every strategy reads a `MatchView` (the same redacted state a human
//! client gets) and proposes a `PlayerAction`. The runtime submits it through
//! the normal command path, so a bad proposal is simply rejected.

mod blackjack;
mod cautious;
mod holdem;
mod quiz;
mod random;
pub mod registry;
mod sputnik;
mod trait_def;
mod yatzy;

#[cfg(test)]
mod fixtures;

pub use blackjack::BasicStrategy;
pub use cautious::Cautious;
pub use holdem::TightAggressive;
pub use quiz::WeightedGuesser;
pub use random::RandomBot;
pub use sputnik::SputnikBot;
pub use trait_def::BotStrategy;
pub use yatzy::Greedy;
