use std::cmp::max;

use crate::board::Board;
use crate::combat::{self, Dice};
use crate::error::{BoardError, MoveError};
use crate::events::ActionResult;
use crate::{NumArmies, PlayerId};

pub const MIN_REINFORCEMENTS: NumArmies = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Deploy,
    Attack,
    Fortify,
    Done,
}

impl Phase {
    pub fn next(self) -> Phase {
        match self {
            Phase::Deploy => Phase::Attack,
            Phase::Attack => Phase::Fortify,
            Phase::Fortify | Phase::Done => Phase::Done,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackOption {
    pub from: String,
    pub to: String,
    pub attacker_armies: NumArmies,
    pub defender_armies: NumArmies,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FortifyOption {
    pub from: String,
    pub to: String,
    pub max_armies: NumArmies,
}

/// Armies the conqueror must move into a freshly taken territory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupation {
    pub from: String,
    pub to: String,
    pub min: NumArmies,
    pub max: NumArmies,
}

// calculate the total number of reinforcements that a player will receive
// from territories held and continent bonuses
pub fn reinforcements(board: &Board, player: PlayerId) -> NumArmies {
    let owned = board.owned_count(player) as NumArmies;
    max(MIN_REINFORCEMENTS, owned / 3) + board.continent_bonuses(player)
}

pub fn deploy_options(board: &Board, player: PlayerId) -> Vec<String> {
    board
        .owned_by(player)
        .into_iter()
        .map(|t| t.name().to_string())
        .collect()
}

pub fn attack_options(board: &Board, player: PlayerId) -> Vec<AttackOption> {
    let mut options = Vec::new();
    for origin in board.owned_by(player) {
        if origin.armies() < 2 {
            continue;
        }
        let Ok(neighbours) = board.adjacent(origin.name()) else {
            continue;
        };
        for name in neighbours {
            if let Ok(target) = board.territory(&name) {
                if !target.is_owned_by(player) {
                    options.push(AttackOption {
                        from: origin.name().to_string(),
                        to: name.clone(),
                        attacker_armies: origin.armies(),
                        defender_armies: target.armies(),
                    });
                }
            }
        }
    }
    options
}

pub fn fortify_options(board: &Board, player: PlayerId) -> Vec<FortifyOption> {
    let owned = board.owned_by(player);
    let mut options = Vec::new();
    for origin in owned.iter().filter(|t| t.armies() > 1) {
        for destination in owned.iter().filter(|t| t.name() != origin.name()) {
            if let Ok(true) = board.connected_through_owned(player, origin.name(), destination.name()) {
                options.push(FortifyOption {
                    from: origin.name().to_string(),
                    to: destination.name().to_string(),
                    max_armies: origin.armies() - 1,
                });
            }
        }
    }
    options
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnState {
    player: PlayerId,
    phase: Phase,
    reinforcements: NumArmies,
    attacks: u32,
    conquests: u32,
    fortified: bool,
    pending: Option<Occupation>,
}

impl TurnState {
    /// Starts a turn in the deploy phase with the player's full pool.
    pub fn begin(board: &Board, player: PlayerId) -> TurnState {
        TurnState::with_reinforcements(player, reinforcements(board, player))
    }

    pub fn with_reinforcements(player: PlayerId, reinforcements: NumArmies) -> TurnState {
        TurnState {
            player,
            phase: Phase::Deploy,
            reinforcements,
            attacks: 0,
            conquests: 0,
            fortified: false,
            pending: None,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn reinforcements(&self) -> NumArmies {
        self.reinforcements
    }

    pub fn attacks(&self) -> u32 {
        self.attacks
    }

    pub fn conquests(&self) -> u32 {
        self.conquests
    }

    pub fn fortified(&self) -> bool {
        self.fortified
    }

    pub fn pending_occupation(&self) -> Option<&Occupation> {
        self.pending.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Moves to the next phase once the current one may be left.
    pub fn advance(&mut self) -> Result<ActionResult, MoveError> {
        match self.phase {
            Phase::Deploy if self.reinforcements > 0 => {
                return Err(MoveError::IllegalDeployment(format!(
                    "{} reinforcements left to place",
                    self.reinforcements
                )))
            }
            Phase::Attack if self.pending.is_some() => {
                return Err(MoveError::IllegalAttack(
                    "conquered territory must be occupied first".to_string(),
                ))
            }
            Phase::Done => {
                return Err(MoveError::TurnOver)
            }
            _ => {}
        }
        let from = self.phase;
        self.phase = from.next();
        Ok(ActionResult::PhaseChanged {
            player: self.player,
            from,
            to: self.phase,
        })
    }

    pub fn deploy(
        &mut self,
        board: &mut Board,
        territory: &str,
        armies: NumArmies,
    ) -> Result<ActionResult, MoveError> {
        let illegal = |reason: String| MoveError::IllegalDeployment(reason);
        if self.phase != Phase::Deploy {
            return Err(illegal(format!("cannot deploy during {:?}", self.phase)));
        }
        if armies == 0 {
            return Err(illegal("must place at least one army".to_string()));
        }
        if armies > self.reinforcements {
            return Err(illegal(format!(
                "only {} reinforcements available, cannot place {}",
                self.reinforcements, armies
            )));
        }
        let target = board.territory(territory).map_err(|e| illegal(e.to_string()))?;
        if !target.is_owned_by(self.player) {
            return Err(illegal(format!("{} is not yours", territory)));
        }

        board
            .add_armies(territory, armies)
            .map_err(|e| illegal(e.to_string()))?;
        self.reinforcements -= armies;
        log::debug!(
            "player {} placed {} on {} ({} left)",
            self.player,
            armies,
            territory,
            self.reinforcements
        );
        Ok(ActionResult::Deployed {
            player: self.player,
            territory: territory.to_string(),
            armies,
        })
    }

    fn verify_attack(&self, board: &Board, from: &str, to: &str) -> Result<(), MoveError> {
        let illegal = |reason: String| MoveError::IllegalAttack(reason);
        if self.phase != Phase::Attack {
            return Err(illegal(format!("cannot attack during {:?}", self.phase)));
        }
        if self.pending.is_some() {
            return Err(illegal("conquered territory must be occupied first".to_string()));
        }
        let origin = board.territory(from).map_err(|e| illegal(e.to_string()))?;
        if !origin.is_owned_by(self.player) {
            return Err(illegal(format!("{} is not yours", from)));
        }
        if origin.armies() < 2 {
            return Err(illegal(format!("{} needs at least 2 armies to attack", from)));
        }
        if !board
            .is_enemy_territory(self.player, to)
            .map_err(|e| illegal(e.to_string()))?
        {
            return Err(illegal(format!("{} is already yours", to)));
        }
        if !board.are_adjacent(from, to).map_err(|e| illegal(e.to_string()))? {
            return Err(illegal(format!("{} does not border {}", from, to)));
        }
        Ok(())
    }

    /// Rolls one exchange. A conquest transfers the target immediately and
    /// leaves an occupation pending until [`TurnState::occupy`] is called.
    pub fn attack(
        &mut self,
        board: &mut Board,
        from: &str,
        to: &str,
        dice: &mut dyn Dice,
    ) -> Result<ActionResult, MoveError> {
        self.verify_attack(board, from, to)?;
        let to_move_error = |e: BoardError| MoveError::IllegalAttack(e.to_string());

        let attacker_armies = board.territory(from).map_err(to_move_error)?.armies();
        let target = board.territory(to).map_err(to_move_error)?;
        let (defender, defender_armies) = (target.owner(), target.armies());

        let outcome = combat::battle(dice, attacker_armies, defender_armies);
        board
            .remove_armies(from, outcome.attacker_losses)
            .map_err(to_move_error)?;
        board
            .remove_armies(to, outcome.defender_losses)
            .map_err(to_move_error)?;
        self.attacks += 1;
        log::debug!(
            "{} {:?} vs {} {:?}: attacker lost {}, defender lost {}",
            from,
            outcome.attacker_dice,
            to,
            outcome.defender_dice,
            outcome.attacker_losses,
            outcome.defender_losses
        );

        let conquered = board.territory(to).map_err(to_move_error)?.armies() == 0;
        let mut eliminated = None;
        if conquered {
            board.transfer(to, self.player).map_err(to_move_error)?;
            self.conquests += 1;
            let remaining = board.territory(from).map_err(to_move_error)?.armies();
            self.pending = Some(Occupation {
                from: from.to_string(),
                to: to.to_string(),
                min: 1,
                max: remaining - 1,
            });
            log::info!("player {} conquered {}", self.player, to);
            eliminated = defender.filter(|&d| board.owned_count(d) == 0);
        }

        Ok(ActionResult::Attacked {
            player: self.player,
            from: from.to_string(),
            to: to.to_string(),
            outcome,
            conquered,
            eliminated,
        })
    }

    pub fn occupy(&mut self, board: &mut Board, armies: NumArmies) -> Result<ActionResult, MoveError> {
        let occupation = self
            .pending
            .as_ref()
            .ok_or_else(|| MoveError::IllegalAttack("no conquered territory to occupy".to_string()))?;
        if armies < occupation.min || armies > occupation.max {
            return Err(MoveError::IllegalAttack(format!(
                "must move between {} and {} armies into {}",
                occupation.min, occupation.max, occupation.to
            )));
        }
        let to_move_error = |e: BoardError| MoveError::IllegalAttack(e.to_string());
        board
            .remove_armies(&occupation.from, armies)
            .map_err(to_move_error)?;
        board
            .add_armies(&occupation.to, armies)
            .map_err(to_move_error)?;
        let result = ActionResult::Occupied {
            player: self.player,
            from: occupation.from.clone(),
            to: occupation.to.clone(),
            armies,
        };
        self.pending = None;
        Ok(result)
    }

    pub fn fortify(
        &mut self,
        board: &mut Board,
        from: &str,
        to: &str,
        armies: NumArmies,
    ) -> Result<ActionResult, MoveError> {
        let illegal = |reason: String| MoveError::IllegalFortify(reason);
        if self.phase != Phase::Fortify {
            return Err(illegal(format!("cannot fortify during {:?}", self.phase)));
        }
        if self.fortified {
            return Err(illegal("already fortified this turn".to_string()));
        }
        if from == to {
            return Err(illegal("origin and destination are the same".to_string()));
        }
        let origin = board.territory(from).map_err(|e| illegal(e.to_string()))?;
        let destination = board.territory(to).map_err(|e| illegal(e.to_string()))?;
        if !origin.is_owned_by(self.player) || !destination.is_owned_by(self.player) {
            return Err(illegal(format!("{} and {} must both be yours", from, to)));
        }
        if armies == 0 || armies >= origin.armies() {
            return Err(illegal(format!(
                "can move between 1 and {} armies from {}",
                origin.armies().saturating_sub(1),
                from
            )));
        }
        if !board
            .connected_through_owned(self.player, from, to)
            .map_err(|e| illegal(e.to_string()))?
        {
            return Err(illegal(format!("no path of your territories from {} to {}", from, to)));
        }

        board
            .remove_armies(from, armies)
            .map_err(|e| illegal(e.to_string()))?;
        board
            .add_armies(to, armies)
            .map_err(|e| illegal(e.to_string()))?;
        self.fortified = true;
        Ok(ActionResult::Fortified {
            player: self.player,
            from: from.to_string(),
            to: to.to_string(),
            armies,
        })
    }
}
