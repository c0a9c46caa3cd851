use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::Board;

use super::{Decision, Request};

/// Computer seat that picks uniformly among the legal options it is offered.
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    // determines how often the player launches another attack when one is
    // available
    param_attack: f64,

    // determines how often the player bothers to fortify
    param_fortify: f64,

    rng: StdRng,
}

impl RandomPlayer {
    pub fn new(param_attack: f64, param_fortify: f64, rng: StdRng) -> RandomPlayer {
        RandomPlayer {
            param_attack,
            param_fortify,
            rng,
        }
    }

    /// Draws its own temperament from the seed.
    pub fn seeded(seed: u64) -> RandomPlayer {
        let mut rng = StdRng::seed_from_u64(seed);
        let param_attack = rng.random_range(0.5..0.95);
        let param_fortify = rng.random_range(0.0..1.0);
        RandomPlayer::new(param_attack, param_fortify, rng)
    }

    pub fn param_attack(&self) -> f64 {
        self.param_attack
    }

    pub(super) fn decide(&mut self, request: &Request, _board: &Board) -> Decision {
        match request {
            Request::Deploy { pool, territories } => {
                if territories.is_empty() || *pool == 0 {
                    return Decision::Pass;
                }
                // pick a random owned territory to assign some reinforcements to
                let territory = territories[self.rng.random_range(0..territories.len())].clone();
                let armies = self.rng.random_range(1..=*pool);
                Decision::Deploy { territory, armies }
            }
            Request::Attack { options } => {
                if options.is_empty() || self.rng.random::<f64>() >= self.param_attack {
                    return Decision::Pass;
                }
                let option = &options[self.rng.random_range(0..options.len())];
                Decision::Attack {
                    from: option.from.clone(),
                    to: option.to.clone(),
                }
            }
            Request::Occupy(occupation) => Decision::Occupy {
                armies: self.rng.random_range(occupation.min..=occupation.max),
            },
            Request::Fortify { options } => {
                if options.is_empty() || self.rng.random::<f64>() >= self.param_fortify {
                    return Decision::Pass;
                }
                let option = &options[self.rng.random_range(0..options.len())];
                Decision::Fortify {
                    from: option.from.clone(),
                    to: option.to.clone(),
                    armies: self.rng.random_range(1..=option.max_armies),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::{AttackOption, FortifyOption, Occupation};

    #[test]
    fn choices_come_from_the_request() {
        let board = Board::mini();
        let mut player = RandomPlayer::new(1.0, 1.0, StdRng::seed_from_u64(11));
        let territories = vec!["alpha".to_string(), "charlie".to_string()];
        for _ in 0..50 {
            match player.decide(&Request::Deploy { pool: 4, territories: territories.clone() }, &board) {
                Decision::Deploy { territory, armies } => {
                    assert!(territories.contains(&territory));
                    assert!((1..=4).contains(&armies));
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        let attack = Request::Attack {
            options: vec![AttackOption {
                from: "alpha".to_string(),
                to: "bravo".to_string(),
                attacker_armies: 2,
                defender_armies: 1,
            }],
        };
        assert_eq!(
            player.decide(&attack, &board),
            Decision::Attack {
                from: "alpha".to_string(),
                to: "bravo".to_string()
            }
        );

        let occupy = Request::Occupy(Occupation {
            from: "alpha".to_string(),
            to: "bravo".to_string(),
            min: 1,
            max: 1,
        });
        assert_eq!(player.decide(&occupy, &board), Decision::Occupy { armies: 1 });

        let fortify = Request::Fortify {
            options: vec![FortifyOption {
                from: "alpha".to_string(),
                to: "foxtrot".to_string(),
                max_armies: 2,
            }],
        };
        match player.decide(&fortify, &board) {
            Decision::Fortify { armies, .. } => assert!((1..=2).contains(&armies)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn passes_without_options() {
        let board = Board::mini();
        let mut player = RandomPlayer::seeded(5);
        assert_eq!(player.decide(&Request::Attack { options: vec![] }, &board), Decision::Pass);
        assert_eq!(player.decide(&Request::Fortify { options: vec![] }, &board), Decision::Pass);
    }

    #[test]
    fn timid_player_never_attacks() {
        let board = Board::mini();
        let mut player = RandomPlayer::new(0.0, 0.0, StdRng::seed_from_u64(1));
        let attack = Request::Attack {
            options: vec![AttackOption {
                from: "alpha".to_string(),
                to: "bravo".to_string(),
                attacker_armies: 5,
                defender_armies: 1,
            }],
        };
        for _ in 0..20 {
            assert_eq!(player.decide(&attack, &board), Decision::Pass);
        }
    }
}
