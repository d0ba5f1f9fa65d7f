pub mod ledger_entries;
pub mod match_events;
pub mod match_players;
pub mod match_snapshots;
pub mod matches;
pub mod stage_states;

pub use ledger_entries::Entity as LedgerEntries;
pub use match_events::Entity as MatchEvents;
pub use match_players::Entity as MatchPlayers;
pub use match_snapshots::Entity as MatchSnapshots;
pub use matches::Entity as Matches;
pub use stage_states::Entity as StageStates;
