pub mod game_log;
pub mod synthetic;
pub mod types;

use anyhow::Result;
use types::GameLogEntry;

/// Anything that can hand the engine a batch of game-log rows.
pub trait GameLogSource {
    fn name(&self) -> &str;
    fn entries(&mut self) -> Result<Vec<GameLogEntry>>;
}
