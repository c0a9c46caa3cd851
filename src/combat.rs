use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::NumArmies;

pub const MAX_ATTACK_DICE: NumArmies = 3;
pub const MAX_DEFEND_DICE: NumArmies = 2;

// one army always stays behind on the attacking territory
pub fn attacking_allowed(armies: NumArmies) -> NumArmies {
    max_allowed(MAX_ATTACK_DICE, armies.saturating_sub(1))
}

pub fn defending_allowed(armies: NumArmies) -> NumArmies {
    max_allowed(MAX_DEFEND_DICE, armies)
}

// given `max` and `pool`, returns min(`max`, `pool`)
fn max_allowed(max: NumArmies, pool: NumArmies) -> NumArmies {
    pool.min(max)
}

/// Source of die faces.
pub trait Dice {
    /// Rolls `count` six-sided dice.
    fn roll(&mut self, count: usize) -> Vec<u8>;
}

#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    pub fn new() -> RandomDice {
        RandomDice {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> RandomDice {
        RandomDice {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        RandomDice::new()
    }
}

impl Dice for RandomDice {
    fn roll(&mut self, count: usize) -> Vec<u8> {
        (0..count).map(|_| self.rng.random_range(1..=6)).collect()
    }
}

/// Replays a fixed sequence of faces. Rolling past the end of the script
/// yields ones.
#[derive(Debug, Clone, Default)]
pub struct LoadedDice {
    faces: VecDeque<u8>,
}

impl LoadedDice {
    pub fn new(faces: impl IntoIterator<Item = u8>) -> LoadedDice {
        LoadedDice {
            faces: faces.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl Dice for LoadedDice {
    fn roll(&mut self, count: usize) -> Vec<u8> {
        (0..count)
            .map(|_| self.faces.pop_front().unwrap_or(1))
            .collect()
    }
}

/// Result of one exchange. Dice are stored sorted highest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleOutcome {
    pub attacker_dice: Vec<u8>,
    pub defender_dice: Vec<u8>,
    pub attacker_losses: NumArmies,
    pub defender_losses: NumArmies,
}

/// Compares already-rolled dice.
pub fn resolve(attacker_dice: &[u8], defender_dice: &[u8]) -> BattleOutcome {
    let mut attacker_dice = attacker_dice.to_vec();
    let mut defender_dice = defender_dice.to_vec();
    attacker_dice.sort_unstable_by(|a, b| b.cmp(a));
    defender_dice.sort_unstable_by(|a, b| b.cmp(a));

    let (mut attacker_losses, mut defender_losses) = (0, 0);
    for (a, d) in attacker_dice.iter().zip(defender_dice.iter()) {
        if a > d {
            defender_losses += 1;
        } else {
            attacker_losses += 1;
        }
    }

    BattleOutcome {
        attacker_dice,
        defender_dice,
        attacker_losses,
        defender_losses,
    }
}

/// Rolls for both sides given the armies on each territory and resolves the
/// exchange. The attacker needs at least two armies and the defender one.
pub fn battle(dice: &mut dyn Dice, attacker_armies: NumArmies, defender_armies: NumArmies) -> BattleOutcome {
    let attacker = dice.roll(attacking_allowed(attacker_armies) as usize);
    let defender = dice.roll(defending_allowed(defender_armies) as usize);
    resolve(&attacker, &defender)
}
