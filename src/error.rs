// Quitting is not an error: it travels as `Decision::Quit`.

use crate::PlayerId;

/// Configuration errors raised while building or querying a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("unknown territory: {0}")]
    UnknownTerritory(String),
    #[error("unknown continent: {0}")]
    UnknownContinent(String),
    #[error("illegal adjacency {0} <-> {1}")]
    IllegalAdjacency(String, String),
    #[error("territory declared twice: {0}")]
    DuplicateTerritory(String),
    #[error("continent has no territories: {0}")]
    EmptyContinent(String),
    #[error("board invariant violated: {0}")]
    Invariant(String),
}

/// A decision that violates the legal options of the current phase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("illegal deployment: {0}")]
    IllegalDeployment(String),
    #[error("illegal attack: {0}")]
    IllegalAttack(String),
    #[error("illegal fortify: {0}")]
    IllegalFortify(String),
    #[error("the turn is already over")]
    TurnOver,
}

/// Errors that abort the game loop.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Board(#[from] BoardError),
    /// Computer players must only choose from the options they are given.
    #[error("player {player} made an illegal move")]
    IllegalMove {
        player: PlayerId,
        #[source]
        source: MoveError,
    },
    #[error("observer failed")]
    Observer(#[source] anyhow::Error),
    #[error("invalid setup: {0}")]
    Setup(String),
}
