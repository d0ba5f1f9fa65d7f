mod bot_match;
mod ordering;
mod recovery;

use orchestrator::domain::actions::{Actor, Command, PlayerAction};
use orchestrator::domain::types::UserId;

pub fn act(user_id: UserId, action: PlayerAction) -> Command {
    Command::Act {
        actor: Actor::User { user_id },
        action,
        client_ts: None,
    }
}

pub fn join_as(user_id: UserId, name: &str) -> Command {
    act(
        user_id,
        PlayerAction::Join {
            display_name: name.to_string(),
        },
    )
}
