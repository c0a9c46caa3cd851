use std::fmt;

use crate::board::Board;
use crate::error::MoveError;
use crate::turn::{AttackOption, FortifyOption, Occupation};
use crate::{NumArmies, PlayerId};

pub use self::human_player::{HumanPlayer, Prompt, ScriptedPrompt, TerminalPrompt};
pub use self::random_player::RandomPlayer;

mod human_player;
mod random_player;

/// A question put to a player. Every option listed is legal on the board the
/// request was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    // called at the start of the turn until the whole pool is placed
    Deploy {
        pool: NumArmies,
        territories: Vec<String>,
    },
    // called repeatedly during the attack phase; passing ends the phase
    Attack { options: Vec<AttackOption> },
    // called after a conquest: move armies into the taken territory
    Occupy(Occupation),
    // called once per turn after all attacks are completed; passing skips it
    Fortify { options: Vec<FortifyOption> },
}

impl Request {
    pub fn may_pass(&self) -> bool {
        matches!(self, Request::Attack { .. } | Request::Fortify { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Deploy { territory: String, armies: NumArmies },
    Attack { from: String, to: String },
    Occupy { armies: NumArmies },
    Fortify { from: String, to: String, armies: NumArmies },
    /// End the current phase.
    Pass,
    /// Leave the game; ends it for everyone.
    Quit,
}

/// How a seat makes its decisions.
pub enum Controller {
    Human(HumanPlayer),
    Computer(RandomPlayer),
}

impl Controller {
    pub fn decide(&mut self, request: &Request, board: &Board) -> Decision {
        match self {
            Controller::Human(human) => human.decide(request, board),
            Controller::Computer(computer) => computer.decide(request, board),
        }
    }

    /// Tells the player why their last decision was refused.
    pub fn reject(&mut self, error: &MoveError) {
        if let Controller::Human(human) = self {
            human.reject(error);
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Controller::Human(_))
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Controller::Human(_) => write!(f, "Human"),
            Controller::Computer(_) => write!(f, "Computer"),
        }
    }
}

#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    name: String,
    controller: Controller,
    eliminated: bool,
    territories: usize,
    reinforcements: NumArmies,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, controller: Controller) -> Player {
        Player {
            id,
            name: name.to_string(),
            controller,
            eliminated: false,
            territories: 0,
            reinforcements: 0,
        }
    }

    pub fn human(id: PlayerId, name: &str, player: HumanPlayer) -> Player {
        Player::new(id, name, Controller::Human(player))
    }

    pub fn computer(id: PlayerId, name: &str, player: RandomPlayer) -> Player {
        Player::new(id, name, Controller::Computer(player))
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_human(&self) -> bool {
        self.controller.is_human()
    }

    pub fn is_eliminated(&self) -> bool {
        self.eliminated
    }

    pub fn territories(&self) -> usize {
        self.territories
    }

    /// Armies still to place this turn; zero outside the deploy phase.
    pub fn reinforcements(&self) -> NumArmies {
        self.reinforcements
    }

    pub fn decide(&mut self, request: &Request, board: &Board) -> Decision {
        self.controller.decide(request, board)
    }

    pub fn reject(&mut self, error: &MoveError) {
        self.controller.reject(error);
    }

    pub(crate) fn eliminate(&mut self) {
        self.eliminated = true;
        self.territories = 0;
        self.reinforcements = 0;
    }

    pub(crate) fn set_totals(&mut self, territories: usize, reinforcements: NumArmies) {
        self.territories = territories;
        self.reinforcements = reinforcements;
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
