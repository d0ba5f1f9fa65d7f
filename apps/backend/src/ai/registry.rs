//! Bot registration.
//!
//! 1) Implement `BotStrategy` for your type in its module.
//! 2) Add a `BotFactory` entry below with a stable `name` and `version`.
//! 3) Keep ordering stable; constructors must not have side effects.
//! 4) Same seed, same behavior.

use super::blackjack::BasicStrategy;
use super::cautious::Cautious;
use super::holdem::TightAggressive;
use super::quiz::WeightedGuesser;
use super::random::RandomBot;
use super::sputnik::SputnikBot;
use super::trait_def::BotStrategy;
use super::yatzy::Greedy;

pub struct BotFactory {
    pub name: &'static str,
    pub version: &'static str,
    pub make: fn(seed: Option<u64>) -> Box<dyn BotStrategy>,
}

static BOT_FACTORIES: &[BotFactory] = &[
    BotFactory {
        name: SputnikBot::NAME,
        version: SputnikBot::VERSION,
        make: make_sputnik,
    },
    BotFactory {
        name: BasicStrategy::NAME,
        version: BasicStrategy::VERSION,
        make: make_basic_strategy,
    },
    BotFactory {
        name: Greedy::NAME,
        version: Greedy::VERSION,
        make: make_greedy,
    },
    BotFactory {
        name: WeightedGuesser::NAME,
        version: WeightedGuesser::VERSION,
        make: make_weighted_guesser,
    },
    BotFactory {
        name: TightAggressive::NAME,
        version: TightAggressive::VERSION,
        make: make_tight_aggressive,
    },
    BotFactory {
        name: Cautious::NAME,
        version: Cautious::VERSION,
        make: make_cautious,
    },
    BotFactory {
        name: RandomBot::NAME,
        version: RandomBot::VERSION,
        make: make_random,
    },
];

pub fn registered_bots() -> &'static [BotFactory] {
    BOT_FACTORIES
}

pub fn by_name(name: &str) -> Option<&'static BotFactory> {
    registered_bots().iter().find(|factory| factory.name == name)
}

fn make_sputnik(seed: Option<u64>) -> Box<dyn BotStrategy> {
    Box::new(SputnikBot::new(seed))
}

fn make_basic_strategy(_seed: Option<u64>) -> Box<dyn BotStrategy> {
    Box::new(BasicStrategy)
}

fn make_greedy(_seed: Option<u64>) -> Box<dyn BotStrategy> {
    Box::new(Greedy)
}

fn make_weighted_guesser(seed: Option<u64>) -> Box<dyn BotStrategy> {
    Box::new(WeightedGuesser::new(seed))
}

fn make_tight_aggressive(_seed: Option<u64>) -> Box<dyn BotStrategy> {
    Box::new(TightAggressive)
}

fn make_cautious(_seed: Option<u64>) -> Box<dyn BotStrategy> {
    Box::new(Cautious)
}

fn make_random(seed: Option<u64>) -> Box<dyn BotStrategy> {
    Box::new(RandomBot::new(seed))
}

#[cfg(test)]
mod bot_registry_smoke {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = registered_bots().iter().map(|f| f.name).collect();
        assert_eq!(names.len(), registered_bots().len());
    }

    #[test]
    fn lookup_helper_behaves() {
        assert!(by_name(SputnikBot::NAME).is_some());
        assert!(by_name(RandomBot::NAME).is_some());
        assert!(by_name("NotARealBot").is_none());
    }

    #[test]
    fn every_factory_constructs() {
        for factory in registered_bots() {
            let bot = (factory.make)(Some(123));
            let _: &dyn BotStrategy = bot.as_ref();
        }
    }
}
