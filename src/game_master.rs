use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::Board;
use crate::combat::Dice;
use crate::error::{GameError, MoveError};
use crate::events::{ActionResult, EventKind, EventRegistry, GameView};
use crate::player::{Decision, HumanPlayer, Player, RandomPlayer, Request};
use crate::turn::{self, Phase, TurnState};
use crate::{NumArmies, PlayerId, MAX_PLAYERS, MIN_PLAYERS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    /// The player asked to leave; the game has been ended.
    Quit,
    /// Every other player has been eliminated.
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub winner: Option<PlayerId>,
    /// Number of the last turn that was started.
    pub turns: u32,
    pub quit: bool,
}

pub struct GameMaster {
    board: Board,
    players: Vec<Player>,
    current: usize,
    events: EventRegistry,
    dice: Box<dyn Dice>,
    turn: u32,
    // set while a turn is unfinished because an observer failed
    in_progress: Option<TurnState>,
    max_turns: Option<u32>,
    ended: bool,
}

/// Builds `total` seats, the first `humans` of them reading from the terminal.
pub fn generate_players(
    humans: usize,
    total: usize,
    seed: Option<u64>,
) -> Result<Vec<Player>, GameError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&total) {
        return Err(GameError::Setup(format!(
            "a game needs {} to {} players, got {}",
            MIN_PLAYERS, MAX_PLAYERS, total
        )));
    }
    if humans > total {
        return Err(GameError::Setup(format!(
            "{} human players do not fit in a {} player game",
            humans, total
        )));
    }
    let mut seeds = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let players = (0..total)
        .map(|i| {
            let id = i as PlayerId;
            if i < humans {
                Player::human(id, &format!("Player {}", i + 1), HumanPlayer::terminal())
            } else {
                let computer = RandomPlayer::seeded(seeds.random());
                Player::computer(id, &format!("Computer {}", i + 1), computer)
            }
        })
        .collect();
    Ok(players)
}

impl GameMaster {
    /// Takes over a fully assigned board. Seats must be numbered by their
    /// position in `players`.
    pub fn new(
        board: Board,
        players: Vec<Player>,
        dice: impl Dice + 'static,
    ) -> Result<GameMaster, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
            return Err(GameError::Setup(format!(
                "a game needs {} to {} players, got {}",
                MIN_PLAYERS,
                MAX_PLAYERS,
                players.len()
            )));
        }
        if let Some((i, p)) = players
            .iter()
            .enumerate()
            .find(|(i, p)| p.id() as usize != *i)
        {
            return Err(GameError::Setup(format!(
                "seat {} is held by player id {}",
                i,
                p.id()
            )));
        }
        board.check()?;
        if !board.is_fully_owned() {
            return Err(GameError::Setup("every territory needs an owner".to_string()));
        }
        if let Some(t) = board
            .territories()
            .find(|t| t.owner().is_some_and(|o| o as usize >= players.len()))
        {
            return Err(GameError::Setup(format!(
                "{} is owned by a player who is not seated",
                t.name()
            )));
        }

        let mut master = GameMaster {
            board,
            players,
            current: 0,
            events: EventRegistry::new(),
            dice: Box::new(dice),
            turn: 1,
            in_progress: None,
            max_turns: None,
            ended: false,
        };
        master.refresh_eliminations();
        master.refresh_totals(0);
        match master.players.iter().position(|p| !p.is_eliminated()) {
            Some(first) => master.current = first,
            None => master.ended = true,
        }
        if master.active_players().len() <= 1 {
            master.ended = true;
        }
        Ok(master)
    }

    /// Stops [`GameMaster::run`] once the turn with this number is over.
    pub fn set_max_turns(&mut self, max_turns: Option<u32>) {
        self.max_turns = max_turns;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn active_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| !p.is_eliminated())
            .map(Player::id)
            .collect()
    }

    pub fn view(&self) -> GameView<'_> {
        GameView {
            board: &self.board,
            players: &self.players,
            current: self.players[self.current].id(),
            turn: self.turn,
        }
    }

    pub fn add_end_turn_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&GameView<'_>, EventKind, &ActionResult) -> anyhow::Result<()> + 'static,
    {
        self.events.subscribe(EventKind::EndTurn, callback);
    }

    pub fn add_end_action_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&GameView<'_>, EventKind, &ActionResult) -> anyhow::Result<()> + 'static,
    {
        self.events.subscribe(EventKind::EndAction, callback);
    }

    fn fire(&mut self, kind: EventKind, result: &ActionResult) -> Result<(), GameError> {
        let view = GameView {
            board: &self.board,
            players: &self.players,
            current: self.players[self.current].id(),
            turn: self.turn,
        };
        self.events
            .fire(kind, &view, result)
            .map_err(GameError::Observer)
    }

    /// Runs turns until one player is left, someone quits, or the turn limit
    /// is hit.
    pub fn run(&mut self) -> Result<GameSummary, GameError> {
        log::info!("Starting a game with {} players", self.players.len());
        let mut quit = false;
        while !self.ended {
            log::debug!("Current player is: {}", self.current_player().name());
            if self.player_take_turn()? == TurnOutcome::Quit {
                quit = true;
                break;
            }
            if self.ended {
                break;
            }
            if self.max_turns.is_some_and(|limit| self.turn >= limit) {
                log::warn!("turn limit of {} reached, stopping the game", self.turn);
                break;
            }
            self.end_turn();
        }
        let summary = self.summary(quit);
        if let Some(winner) = summary.winner.and_then(|id| self.player(id)) {
            log::info!("{} has conquered the world", winner);
        }
        Ok(summary)
    }

    pub fn summary(&self, quit: bool) -> GameSummary {
        let active = self.active_players();
        GameSummary {
            winner: if active.len() == 1 { Some(active[0]) } else { None },
            turns: self.turn,
            quit,
        }
    }

    /// Advances to the next seat still in the game, or ends the game when
    /// only one remains.
    pub fn end_turn(&mut self) {
        self.refresh_eliminations();
        let active = self.active_players();
        if active.len() <= 1 {
            self.ended = true;
            return;
        }
        self.in_progress = None;
        let seats = self.players.len();
        for step in 1..=seats {
            let next = (self.current + step) % seats;
            if !self.players[next].is_eliminated() {
                self.current = next;
                break;
            }
        }
        self.turn += 1;
    }

    /// Ends the game early, e.g. when a player quits.
    pub fn end_game(&mut self) {
        if !self.ended {
            log::info!("Game ended on turn {}", self.turn);
        }
        self.ended = true;
    }

    fn quit(&mut self) -> TurnOutcome {
        log::info!("{} quit the game", self.players[self.current]);
        self.end_game();
        TurnOutcome::Quit
    }

    fn refresh_eliminations(&mut self) {
        for i in 0..self.players.len() {
            let id = self.players[i].id();
            if !self.players[i].is_eliminated() && self.board.owned_count(id) == 0 {
                self.eliminate(id);
            }
        }
    }

    fn refresh_totals(&mut self, reinforcements: NumArmies) {
        let current = self.current;
        for (i, player) in self.players.iter_mut().enumerate() {
            if player.is_eliminated() {
                continue;
            }
            let owned = self.board.owned_count(player.id());
            let pool = if i == current { reinforcements } else { 0 };
            player.set_totals(owned, pool);
        }
    }

    fn eliminate(&mut self, id: PlayerId) {
        let Some(player) = self.players.get_mut(id as usize) else {
            return;
        };
        if player.is_eliminated() {
            return;
        }
        player.eliminate();
        log::info!("{} has been eliminated", player);
        if self.active_players().len() <= 1 {
            self.ended = true;
        }
    }

    // Passing is only accepted where the request allows it; anywhere else it
    // is handled like any other illegal move.
    fn ask(&mut self, request: &Request) -> Result<Decision, GameError> {
        loop {
            let decision = self.players[self.current].decide(request, &self.board);
            log::trace!("{} decided {:?}", self.players[self.current], decision);
            if decision != Decision::Pass || request.may_pass() {
                return Ok(decision);
            }
            let error = match request {
                Request::Deploy { pool, .. } => {
                    MoveError::IllegalDeployment(format!("{} reinforcements left to place", pool))
                }
                _ => MoveError::IllegalAttack("conquered territory must be occupied first".to_string()),
            };
            self.apply(Err(error), 0)?;
        }
    }

    // Applies the outcome of one decision. Rejected human moves are reported
    // back and asked again; a computer seat breaking the rules is a bug.
    fn apply(
        &mut self,
        result: Result<ActionResult, MoveError>,
        reinforcements: NumArmies,
    ) -> Result<Option<ActionResult>, GameError> {
        match result {
            Ok(action) => {
                if let ActionResult::Attacked {
                    eliminated: Some(loser),
                    ..
                } = action
                {
                    self.eliminate(loser);
                }
                self.refresh_totals(reinforcements);
                self.fire(EventKind::EndAction, &action)?;
                Ok(Some(action))
            }
            Err(error) => {
                let player = &mut self.players[self.current];
                if player.is_human() {
                    log::warn!("{}: {}", player, error);
                    player.reject(&error);
                    Ok(None)
                } else {
                    Err(GameError::IllegalMove {
                        player: player.id(),
                        source: error,
                    })
                }
            }
        }
    }

    fn transition(&mut self, turn: &mut TurnState) -> Result<(), GameError> {
        let player = turn.player();
        let result = turn
            .advance()
            .map_err(|source| GameError::IllegalMove { player, source })?;
        self.refresh_totals(turn.reinforcements());
        self.fire(EventKind::EndAction, &result)
    }

    /// Runs the current player through one full turn. A turn interrupted by
    /// a failing observer is resumed where it stopped on the next call.
    pub fn player_take_turn(&mut self) -> Result<TurnOutcome, GameError> {
        if self.ended {
            return Ok(TurnOutcome::GameOver);
        }
        let mut turn = match self.in_progress.take() {
            Some(turn) => {
                log::debug!(
                    "{} resumes turn {} in the {:?} phase",
                    self.players[self.current],
                    self.turn,
                    turn.phase()
                );
                turn
            }
            None => {
                let turn = TurnState::begin(&self.board, self.players[self.current].id());
                log::info!(
                    "{} is distributing {} reinforcements (turn {})",
                    self.players[self.current],
                    turn.reinforcements(),
                    self.turn
                );
                turn
            }
        };
        match self.play_phases(&mut turn) {
            Err(error) => {
                self.in_progress = Some(turn);
                return Err(error);
            }
            Ok(Some(outcome)) => return Ok(outcome),
            Ok(None) => {}
        }

        log::debug!(
            "{} ends turn {} after {} attacks and {} conquests",
            self.players[self.current],
            self.turn,
            turn.attacks(),
            turn.conquests()
        );
        let ended = ActionResult::TurnEnded {
            player: turn.player(),
            turn: self.turn,
        };
        self.fire(EventKind::EndTurn, &ended)?;

        Ok(if self.ended {
            TurnOutcome::GameOver
        } else {
            TurnOutcome::Completed
        })
    }

    // Plays whatever phases are left. `Some` means the turn was cut short.
    fn play_phases(&mut self, turn: &mut TurnState) -> Result<Option<TurnOutcome>, GameError> {
        let player = turn.player();
        self.refresh_totals(turn.reinforcements());

        if turn.phase() == Phase::Deploy {
            while turn.reinforcements() > 0 {
                let request = Request::Deploy {
                    pool: turn.reinforcements(),
                    territories: turn::deploy_options(&self.board, player),
                };
                let result = match self.ask(&request)? {
                    Decision::Quit => return Ok(Some(self.quit())),
                    Decision::Deploy { territory, armies } => {
                        turn.deploy(&mut self.board, &territory, armies)
                    }
                    other => Err(MoveError::IllegalDeployment(format!(
                        "expected a deployment, got {:?}",
                        other
                    ))),
                };
                self.apply(result, turn.reinforcements())?;
            }
            self.transition(turn)?;
        }

        if turn.phase() == Phase::Attack {
            loop {
                if let Some(occupation) = turn.pending_occupation().cloned() {
                    let result = match self.ask(&Request::Occupy(occupation))? {
                        Decision::Quit => return Ok(Some(self.quit())),
                        Decision::Occupy { armies } => turn.occupy(&mut self.board, armies),
                        other => Err(MoveError::IllegalAttack(format!(
                            "conquered territory must be occupied, got {:?}",
                            other
                        ))),
                    };
                    self.apply(result, 0)?;
                    continue;
                }
                if self.ended {
                    break;
                }
                let options = turn::attack_options(&self.board, player);
                if options.is_empty() {
                    break;
                }
                let result = match self.ask(&Request::Attack { options })? {
                    Decision::Quit => return Ok(Some(self.quit())),
                    Decision::Pass => break,
                    Decision::Attack { from, to } => {
                        turn.attack(&mut self.board, &from, &to, self.dice.as_mut())
                    }
                    other => Err(MoveError::IllegalAttack(format!(
                        "expected an attack, got {:?}",
                        other
                    ))),
                };
                self.apply(result, 0)?;
            }
            self.transition(turn)?;
        }

        if turn.phase() == Phase::Fortify {
            while !self.ended && !turn.fortified() {
                let options = turn::fortify_options(&self.board, player);
                if options.is_empty() {
                    break;
                }
                let result = match self.ask(&Request::Fortify { options })? {
                    Decision::Quit => return Ok(Some(self.quit())),
                    Decision::Pass => break,
                    Decision::Fortify { from, to, armies } => {
                        turn.fortify(&mut self.board, &from, &to, armies)
                    }
                    other => Err(MoveError::IllegalFortify(format!(
                        "expected a fortification, got {:?}",
                        other
                    ))),
                };
                self.apply(result, 0)?;
            }
            self.transition(turn)?;
        }
        debug_assert_eq!(turn.phase(), Phase::Done);
        Ok(None)
    }
}

impl fmt::Debug for GameMaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameMaster")
            .field("players", &self.players)
            .field("current", &self.current)
            .field("turn", &self.turn)
            .field("in_progress", &self.in_progress)
            .field("ended", &self.ended)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::LoadedDice;
    use crate::player::ScriptedPrompt;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const RING: [&str; 6] = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"];

    fn timid(id: PlayerId) -> Player {
        Player::computer(
            id,
            &format!("Computer {}", id + 1),
            RandomPlayer::new(0.0, 0.0, StdRng::seed_from_u64(id as u64)),
        )
    }

    fn scripted(id: PlayerId, lines: &[&str]) -> Player {
        Player::human(
            id,
            &format!("Player {}", id + 1),
            HumanPlayer::new(ScriptedPrompt::new(lines.iter().copied())),
        )
    }

    fn ring(owners: [(PlayerId, NumArmies); 6]) -> Board {
        let mut board = Board::mini();
        for (name, (owner, armies)) in RING.iter().zip(owners) {
            board.assign_owner(name, owner, armies).unwrap();
        }
        board
    }

    #[test]
    fn end_turn_skips_players_without_territory() {
        let board = ring([(0, 1), (2, 1), (0, 1), (2, 1), (0, 1), (2, 1)]);
        let mut master =
            GameMaster::new(board, vec![timid(0), timid(1), timid(2)], LoadedDice::default()).unwrap();
        assert_eq!(master.current_player().id(), 0);
        master.end_turn();
        assert_eq!(master.current_player().id(), 2);
        assert!(master.player(1).unwrap().is_eliminated());
        assert!(!master.ended());
        master.end_turn();
        assert_eq!(master.current_player().id(), 0);
    }

    #[test]
    fn game_ends_when_one_player_remains() {
        let board = ring([(0, 1), (1, 1), (0, 1), (1, 1), (0, 1), (1, 1)]);
        let mut master = GameMaster::new(board, vec![timid(0), timid(1)], LoadedDice::default()).unwrap();
        for name in ["bravo", "delta", "foxtrot"] {
            master.board.assign_owner(name, 0, 1).unwrap();
        }
        assert!(!master.ended());
        master.end_turn();
        assert!(master.ended());
        assert_eq!(master.summary(false).winner, Some(0));
        assert_eq!(master.player_take_turn().unwrap(), TurnOutcome::GameOver);
    }

    #[test]
    fn setup_is_validated() {
        let board = ring([(0, 1); 6]);
        assert!(matches!(
            GameMaster::new(board.clone(), vec![timid(0)], LoadedDice::default()),
            Err(GameError::Setup(_))
        ));
        assert!(matches!(
            GameMaster::new(board.clone(), vec![timid(0), timid(0)], LoadedDice::default()),
            Err(GameError::Setup(_))
        ));
        assert!(matches!(
            GameMaster::new(Board::mini(), vec![timid(0), timid(1)], LoadedDice::default()),
            Err(GameError::Setup(_))
        ));
        assert!(generate_players(1, 7, Some(1)).is_err());
        assert!(generate_players(3, 2, Some(1)).is_err());
        let players = generate_players(0, 4, Some(1)).unwrap();
        assert_eq!(players.len(), 4);
        assert!(players.iter().all(|p| !p.is_human()));
    }

    #[test]
    fn quit_during_deployment_ends_the_game() {
        let board = ring([(0, 1), (1, 1), (0, 1), (1, 1), (0, 1), (1, 1)]);
        let mut master = GameMaster::new(
            board,
            vec![scripted(0, &["quit"]), timid(1)],
            LoadedDice::default(),
        )
        .unwrap();
        let summary = master.run().unwrap();
        assert!(summary.quit);
        assert_eq!(summary.winner, None);
        assert_eq!(summary.turns, 1);
        assert!(master.ended());
        assert_eq!(master.player_take_turn().unwrap(), TurnOutcome::GameOver);
    }

    #[test]
    fn human_turn_with_rejected_moves() {
        // player 0 holds alpha, charlie, echo: 3 reinforcements, no bonus
        let board = ring([(0, 1), (1, 1), (0, 1), (1, 1), (0, 1), (1, 1)]);
        let script = [
            "bravo 3", // not owned
            "alpha 3",
            "alpha bravo", // 4 armies against 1, dice 6 6 6 against 1
            "5",           // more than alpha can spare
            "2",
            "pass",
            "bravo charlie 1",
        ];
        let prompt = ScriptedPrompt::new(script);
        let transcript = prompt.transcript();
        let human = Player::human(0, "Player 1", HumanPlayer::new(prompt));
        let mut master =
            GameMaster::new(board, vec![human, timid(1)], LoadedDice::new([6, 6, 6, 1])).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        master.add_end_action_callback(move |_, _, result| {
            sink.borrow_mut().push(result.clone());
            Ok(())
        });
        let turns = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&turns);
        master.add_end_turn_callback(move |view, kind, _| {
            assert_eq!(kind, EventKind::EndTurn);
            assert_eq!(view.current, 0);
            *counter.borrow_mut() += 1;
            Ok(())
        });

        assert_eq!(master.player_take_turn().unwrap(), TurnOutcome::Completed);
        let board = master.board();
        assert_eq!(board.territory("alpha").unwrap().armies(), 2);
        assert_eq!(board.territory("bravo").unwrap().owner(), Some(0));
        assert_eq!(board.territory("bravo").unwrap().armies(), 1);
        assert_eq!(board.territory("charlie").unwrap().armies(), 2);
        assert_eq!(*turns.borrow(), 1);
        assert_eq!(master.player(0).unwrap().territories(), 4);

        let log = log.borrow();
        let kinds: Vec<&str> = log
            .iter()
            .map(|r| match r {
                ActionResult::PhaseChanged { .. } => "phase",
                ActionResult::Deployed { .. } => "deploy",
                ActionResult::Attacked { .. } => "attack",
                ActionResult::Occupied { .. } => "occupy",
                ActionResult::Fortified { .. } => "fortify",
                ActionResult::TurnEnded { .. } => "end",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["deploy", "phase", "attack", "occupy", "phase", "fortify", "phase"]
        );
        master.board().check().unwrap();

        let refusals: Vec<String> = transcript
            .borrow()
            .iter()
            .filter(|m| m.ends_with("Choose again."))
            .cloned()
            .collect();
        assert_eq!(
            refusals,
            vec![
                "illegal deployment: bravo is not yours. Choose again.",
                "illegal attack: must move between 1 and 3 armies into bravo. Choose again.",
            ]
        );
    }

    #[test]
    fn observer_failure_propagates_after_mutation() {
        let board = ring([(0, 1), (1, 1), (0, 1), (1, 1), (0, 1), (1, 1)]);
        let mut master = GameMaster::new(
            board,
            vec![scripted(0, &["alpha 3"]), timid(1)],
            LoadedDice::default(),
        )
        .unwrap();
        master.add_end_action_callback(|_, _, _| anyhow::bail!("renderer crashed"));
        let err = master.player_take_turn().unwrap_err();
        assert!(matches!(err, GameError::Observer(_)));
        assert_eq!(master.board().territory("alpha").unwrap().armies(), 4);
    }

    #[test]
    fn run_stops_at_the_turn_limit() {
        let board = ring([(0, 1), (1, 1), (0, 1), (1, 1), (0, 1), (1, 1)]);
        let mut master = GameMaster::new(board, vec![timid(0), timid(1)], LoadedDice::default()).unwrap();
        master.set_max_turns(Some(3));
        let summary = master.run().unwrap();
        assert_eq!(
            summary,
            GameSummary {
                winner: None,
                turns: 3,
                quit: false
            }
        );
        assert!(!master.ended());
        // three deploy phases of 3 armies each on top of the starting six
        let total: NumArmies = master.board().territories().map(|t| t.armies()).sum();
        assert_eq!(total, 15);
    }

    #[test]
    fn pass_is_refused_while_deploying() {
        let board = ring([(0, 1), (1, 1), (0, 1), (1, 1), (0, 1), (1, 1)]);
        let prompt = ScriptedPrompt::new(["pass", "alpha 3", "quit"]);
        let transcript = prompt.transcript();
        let human = Player::human(0, "Player 1", HumanPlayer::new(prompt));
        let mut master = GameMaster::new(board, vec![human, timid(1)], LoadedDice::default()).unwrap();
        assert_eq!(master.player_take_turn().unwrap(), TurnOutcome::Quit);
        assert_eq!(master.board().territory("alpha").unwrap().armies(), 4);
        assert!(transcript
            .borrow()
            .iter()
            .any(|m| m == "illegal deployment: 3 reinforcements left to place. Choose again."));
    }

    #[test]
    fn illegal_computer_move_is_fatal() {
        let board = ring([(0, 1), (1, 1), (0, 1), (1, 1), (0, 1), (1, 1)]);
        let mut master =
            GameMaster::new(board, vec![timid(0), scripted(1, &[])], LoadedDice::default()).unwrap();
        let err = master
            .apply(Err(MoveError::IllegalAttack("bravo does not border echo".to_string())), 0)
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::IllegalMove {
                player: 0,
                source: MoveError::IllegalAttack(_)
            }
        ));

        // a human seat gets the decision back instead
        master.end_turn();
        assert_eq!(master.current_player().id(), 1);
        let refused = master.apply(Err(MoveError::IllegalFortify("no path".to_string())), 0);
        assert!(matches!(refused, Ok(None)));
    }

    #[test]
    fn failed_observer_after_conquest_resumes_the_turn() {
        let board = ring([(0, 1), (1, 1), (0, 1), (1, 1), (0, 1), (1, 1)]);
        let script = ["alpha 3", "alpha bravo", "2", "pass", "pass"];
        let mut master = GameMaster::new(
            board,
            vec![scripted(0, &script), timid(1)],
            LoadedDice::new([6, 6, 6, 1]),
        )
        .unwrap();
        let tripped = Rc::new(Cell::new(false));
        let flag = Rc::clone(&tripped);
        master.add_end_action_callback(move |_, _, result| {
            if let ActionResult::Attacked { conquered: true, .. } = result {
                if !flag.replace(true) {
                    anyhow::bail!("display lost");
                }
            }
            Ok(())
        });
        let deployments = Rc::new(Cell::new(0));
        let counter = Rc::clone(&deployments);
        master.add_end_action_callback(move |_, _, result| {
            if let ActionResult::Deployed { .. } = result {
                counter.set(counter.get() + 1);
            }
            Ok(())
        });

        assert!(matches!(master.player_take_turn(), Err(GameError::Observer(_))));
        let bravo = master.board().territory("bravo").unwrap();
        assert_eq!((bravo.owner(), bravo.armies()), (Some(0), 0));

        // the occupation is asked for first and no second pool is handed out
        assert_eq!(master.player_take_turn().unwrap(), TurnOutcome::Completed);
        assert!(tripped.get());
        assert_eq!(deployments.get(), 1);
        assert_eq!(master.board().territory("alpha").unwrap().armies(), 2);
        assert_eq!(master.board().territory("bravo").unwrap().armies(), 2);
        assert_eq!(master.board().territory("charlie").unwrap().armies(), 1);
        assert_eq!(master.turn(), 1);
        assert_eq!(master.current_player().id(), 0);
        master.board().check().unwrap();
    }

    #[test]
    fn conquering_the_last_territory_wins() {
        // five territories and the south continent: a pool of 3 + 2
        let board = ring([(0, 5), (1, 1), (0, 1), (0, 1), (0, 1), (0, 1)]);
        let mut master = GameMaster::new(
            board,
            vec![scripted(0, &["alpha 5", "alpha bravo", "1"]), timid(1)],
            LoadedDice::new([6, 6, 6, 1]),
        )
        .unwrap();
        assert_eq!(master.player_take_turn().unwrap(), TurnOutcome::GameOver);
        assert!(master.ended());
        assert!(master.player(1).unwrap().is_eliminated());
        assert_eq!(master.summary(false).winner, Some(0));
        assert_eq!(master.board().territory("alpha").unwrap().armies(), 9);
        assert_eq!(master.board().territory("bravo").unwrap().armies(), 1);
    }
}
