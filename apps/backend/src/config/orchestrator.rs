//! Runtime knobs read once at startup.
//!
//! Everything that affects game outcomes is copied into `MatchRules` when a
//! match is created; the remaining fields only shape the runtime.

use std::env;
use std::str::FromStr;

use crate::ai::registry as bot_registry;
use crate::ai::{BotStrategy, SputnikBot};
use crate::domain::rules::{MatchRules, SEAT_LIMIT};
use crate::domain::types::{Chips, MatchMode};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub queue_capacity: usize,
    pub snapshot_every_events: i64,
    pub bot_think_ms: u64,
    /// Registered bot name driving automated seats.
    pub bot_strategy: String,
    pub bot_seed: Option<u64>,
    /// Live matches re-activated at boot.
    pub resume_limit: u64,

    pub min_players: u8,
    pub max_seats: u8,
    pub ready_check_secs: i64,
    pub bot_substitution: bool,
    pub yatzy_turn_secs: i64,
    pub bj_betting_secs: i64,
    pub bj_decision_secs: i64,
    pub bj_rounds_five_kamp: u32,
    pub bj_rounds_chicken_run: u32,
    pub bj_only_buy_in: Chips,
    pub roulette_spins: u32,
    pub roulette_betting_secs: i64,
    pub trivia_questions: u32,
    pub dice_rounds: u32,
    pub dice_call_secs: i64,
    pub music_rounds: u32,
    pub holdem_max_hands: u32,
    pub holdem_decision_secs: i64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            snapshot_every_events: 50,
            bot_think_ms: 400,
            bot_strategy: SputnikBot::NAME.to_string(),
            bot_seed: None,
            resume_limit: 1000,
            min_players: 2,
            max_seats: 6,
            ready_check_secs: 60,
            bot_substitution: true,
            yatzy_turn_secs: 30,
            bj_betting_secs: 20,
            bj_decision_secs: 15,
            bj_rounds_five_kamp: 5,
            bj_rounds_chicken_run: 3,
            bj_only_buy_in: 1000,
            roulette_spins: 3,
            roulette_betting_secs: 20,
            trivia_questions: 5,
            dice_rounds: 5,
            dice_call_secs: 15,
            music_rounds: 5,
            holdem_max_hands: 12,
            holdem_decision_secs: 20,
        }
    }
}

fn parsed<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            AppError::config(format!("environment variable '{name}' has invalid value {raw:?}"))
        }),
        Err(_) => Ok(default),
    }
}

fn flag(name: &str, default: bool) -> Result<bool, AppError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::config(format!(
                "environment variable '{name}' must be a boolean, got {raw:?}"
            ))),
        },
        Err(_) => Ok(default),
    }
}

impl OrchestratorConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let d = Self::default();
        let cfg = Self {
            queue_capacity: parsed("MATCH_QUEUE_CAPACITY", d.queue_capacity)?,
            snapshot_every_events: parsed("SNAPSHOT_EVERY_EVENTS", d.snapshot_every_events)?,
            bot_think_ms: parsed("BOT_THINK_MS", d.bot_think_ms)?,
            bot_strategy: env::var("BOT_STRATEGY").unwrap_or(d.bot_strategy),
            bot_seed: match env::var("BOT_SEED") {
                Ok(_) => Some(parsed("BOT_SEED", 0u64)?),
                Err(_) => None,
            },
            resume_limit: parsed("RESUME_LIVE_LIMIT", d.resume_limit)?,
            min_players: parsed("MIN_PLAYERS", d.min_players)?,
            max_seats: parsed("MAX_SEATS", d.max_seats)?,
            ready_check_secs: parsed("READY_CHECK_TIMEOUT_SECS", d.ready_check_secs)?,
            bot_substitution: flag("BOT_SUBSTITUTION", d.bot_substitution)?,
            yatzy_turn_secs: parsed("YATZY_TURN_SECS", d.yatzy_turn_secs)?,
            bj_betting_secs: parsed("BJ_BETTING_SECS", d.bj_betting_secs)?,
            bj_decision_secs: parsed("BJ_DECISION_SECS", d.bj_decision_secs)?,
            bj_rounds_five_kamp: parsed("BJ_ROUNDS_FIVE_KAMP", d.bj_rounds_five_kamp)?,
            bj_rounds_chicken_run: parsed("BJ_ROUNDS_CHICKEN_RUN", d.bj_rounds_chicken_run)?,
            bj_only_buy_in: parsed("BJ_ONLY_BUY_IN", d.bj_only_buy_in)?,
            roulette_spins: parsed("ROULETTE_SPINS", d.roulette_spins)?,
            roulette_betting_secs: parsed("ROULETTE_BETTING_SECS", d.roulette_betting_secs)?,
            trivia_questions: parsed("TRIVIA_QUESTIONS", d.trivia_questions)?,
            dice_rounds: parsed("DICE_ROUNDS", d.dice_rounds)?,
            dice_call_secs: parsed("DICE_CALL_SECS", d.dice_call_secs)?,
            music_rounds: parsed("MUSIC_ROUNDS", d.music_rounds)?,
            holdem_max_hands: parsed("HOLDEM_MAX_HANDS", d.holdem_max_hands)?,
            holdem_decision_secs: parsed("HOLDEM_DECISION_SECS", d.holdem_decision_secs)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.queue_capacity == 0 {
            return Err(AppError::config("MATCH_QUEUE_CAPACITY must be at least 1"));
        }
        if self.snapshot_every_events <= 0 {
            return Err(AppError::config("SNAPSHOT_EVERY_EVENTS must be positive"));
        }
        if self.max_seats < 2 || self.max_seats > SEAT_LIMIT {
            return Err(AppError::config(format!(
                "MAX_SEATS must be 2..={SEAT_LIMIT}, got {}",
                self.max_seats
            )));
        }
        if self.min_players == 0 || self.min_players > self.max_seats {
            return Err(AppError::config(format!(
                "MIN_PLAYERS must be 1..={}, got {}",
                self.max_seats, self.min_players
            )));
        }
        if bot_registry::by_name(&self.bot_strategy).is_none() {
            return Err(AppError::config(format!(
                "BOT_STRATEGY '{}' is not a registered bot",
                self.bot_strategy
            )));
        }
        Ok(())
    }

    /// Strategy instance for automated seats.
    pub fn make_bot(&self) -> Result<Box<dyn BotStrategy>, AppError> {
        bot_registry::by_name(&self.bot_strategy)
            .map(|factory| (factory.make)(self.bot_seed))
            .ok_or_else(|| AppError::config(format!("unknown bot '{}'", self.bot_strategy)))
    }

    /// Rules frozen into a new match of `mode`.
    pub fn rules_for(&self, mode: MatchMode) -> MatchRules {
        let base = MatchRules::for_mode(mode);
        MatchRules {
            min_players: self.min_players,
            max_seats: self.max_seats,
            ready_check_secs: self.ready_check_secs,
            bot_substitution: self.bot_substitution,
            buy_in: match mode {
                MatchMode::BlackjackOnly => self.bj_only_buy_in,
                _ => 0,
            },
            yatzy_turn_secs: self.yatzy_turn_secs,
            bj_betting_secs: self.bj_betting_secs,
            bj_decision_secs: self.bj_decision_secs,
            bj_rounds: match mode {
                MatchMode::FiveKamp => Some(self.bj_rounds_five_kamp),
                MatchMode::ChickenRun => Some(self.bj_rounds_chicken_run),
                MatchMode::BlackjackOnly => None,
            },
            roulette_spins: self.roulette_spins,
            roulette_betting_secs: self.roulette_betting_secs,
            trivia_questions: self.trivia_questions,
            dice_rounds: self.dice_rounds,
            dice_call_secs: self.dice_call_secs,
            music_rounds: self.music_rounds,
            holdem_max_hands: self.holdem_max_hands,
            holdem_decision_secs: self.holdem_decision_secs,
            ..base
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn defaults_match_rules_defaults() {
        let cfg = OrchestratorConfig::default();
        assert_eq!(cfg.rules_for(MatchMode::FiveKamp), MatchRules::default());
        assert_eq!(
            cfg.rules_for(MatchMode::ChickenRun),
            MatchRules::for_mode(MatchMode::ChickenRun)
        );
        assert_eq!(
            cfg.rules_for(MatchMode::BlackjackOnly),
            MatchRules::for_mode(MatchMode::BlackjackOnly)
        );
    }

    #[test]
    #[serial]
    fn env_overrides_and_rejects_garbage() {
        env::set_var("DICE_ROUNDS", "7");
        env::set_var("BOT_SUBSTITUTION", "off");
        let cfg = OrchestratorConfig::from_env().unwrap();
        assert_eq!(cfg.dice_rounds, 7);
        assert!(!cfg.bot_substitution);

        env::set_var("DICE_ROUNDS", "many");
        let err = OrchestratorConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("DICE_ROUNDS"));

        env::remove_var("DICE_ROUNDS");
        env::remove_var("BOT_SUBSTITUTION");
    }

    #[test]
    #[serial]
    fn unknown_bot_strategy_is_a_config_error() {
        env::set_var("BOT_STRATEGY", "card-counter");
        let err = OrchestratorConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("card-counter"));

        env::set_var("BOT_STRATEGY", "random");
        env::set_var("BOT_SEED", "99");
        let cfg = OrchestratorConfig::from_env().unwrap();
        assert_eq!(cfg.bot_seed, Some(99));
        assert!(cfg.make_bot().is_ok());

        env::remove_var("BOT_STRATEGY");
        env::remove_var("BOT_SEED");
    }

    #[test]
    #[serial]
    fn max_seats_is_bounded_by_one_holdem_deck() {
        env::set_var("MAX_SEATS", "24");
        let err = OrchestratorConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("MAX_SEATS"), "{err}");

        env::set_var("MAX_SEATS", "23");
        let cfg = OrchestratorConfig::from_env().unwrap();
        assert_eq!(cfg.rules_for(MatchMode::FiveKamp).max_seats, SEAT_LIMIT);

        env::remove_var("MAX_SEATS");
    }
}
