pub mod board;
pub mod combat;
pub mod error;
pub mod events;
pub mod game_master;
pub mod player;
pub mod render;
pub mod turn;

pub use board::{Board, BoardBuilder, Continent, Territory};
pub use combat::{BattleOutcome, Dice, LoadedDice, RandomDice};
pub use error::{BoardError, GameError, MoveError};
pub use events::{ActionResult, EventKind, GameView};
pub use game_master::{generate_players, GameMaster, GameSummary, TurnOutcome};
pub use player::{Controller, Decision, HumanPlayer, Player, RandomPlayer, Request, ScriptedPrompt};
pub use render::MapRenderer;
pub use turn::{Phase, TurnState};

pub type PlayerId = u8;
pub type NumArmies = u16;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;
