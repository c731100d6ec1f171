//! User registration and the game catalogue.

use tracing::info;
use wager_store::{Tables, Timestamp};
use wager_types::{Game, User};

use crate::error::WagerResult;
use crate::global::GlobalLedger;

/// Register a user and widen the global ledger to include them.
pub fn register_user(tables: &mut Tables, name: &str, now: Timestamp) -> WagerResult<User> {
    let name = User::normalize_name(name)?;
    let user = tables.insert_user(name)?;
    GlobalLedger::update_users(tables, now)?;
    info!(user_id = %user.id, name = %user.name, "user registered");
    Ok(user)
}

pub fn create_game(tables: &mut Tables, name: &str) -> WagerResult<Game> {
    let name = Game::normalize_name(name)?;
    let game = tables.insert_game(name);
    info!(game_id = %game.id, name = %game.name, "game created");
    Ok(game)
}
