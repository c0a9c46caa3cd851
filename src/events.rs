// Observers run synchronously in registration order; the first error stops
// delivery of that event.

use std::collections::HashMap;
use std::fmt;

use crate::board::Board;
use crate::combat::BattleOutcome;
use crate::player::Player;
use crate::turn::Phase;
use crate::{NumArmies, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// After every deployment, attack, occupation, fortification and phase change.
    EndAction,
    /// Once the current player reaches the end of their turn.
    EndTurn,
}

/// What just happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    PhaseChanged {
        player: PlayerId,
        from: Phase,
        to: Phase,
    },
    Deployed {
        player: PlayerId,
        territory: String,
        armies: NumArmies,
    },
    Attacked {
        player: PlayerId,
        from: String,
        to: String,
        outcome: BattleOutcome,
        conquered: bool,
        eliminated: Option<PlayerId>,
    },
    Occupied {
        player: PlayerId,
        from: String,
        to: String,
        armies: NumArmies,
    },
    Fortified {
        player: PlayerId,
        from: String,
        to: String,
        armies: NumArmies,
    },
    TurnEnded {
        player: PlayerId,
        turn: u32,
    },
}

/// Read-only references handed to observers.
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    pub board: &'a Board,
    pub players: &'a [Player],
    pub current: PlayerId,
    pub turn: u32,
}

impl<'a> GameView<'a> {
    pub fn player(&self, id: PlayerId) -> Option<&'a Player> {
        self.players.iter().find(|p| p.id() == id)
    }
}

pub type Callback = Box<dyn FnMut(&GameView<'_>, EventKind, &ActionResult) -> anyhow::Result<()>>;

#[derive(Default)]
pub struct EventRegistry {
    subscribers: HashMap<EventKind, Vec<Callback>>,
}

impl EventRegistry {
    pub fn new() -> EventRegistry {
        EventRegistry::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, callback: F)
    where
        F: FnMut(&GameView<'_>, EventKind, &ActionResult) -> anyhow::Result<()> + 'static,
    {
        self.subscribers
            .entry(kind)
            .or_default()
            .push(Box::new(callback));
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }

    pub fn fire(
        &mut self,
        kind: EventKind,
        view: &GameView<'_>,
        result: &ActionResult,
    ) -> anyhow::Result<()> {
        if let Some(callbacks) = self.subscribers.get_mut(&kind) {
            for callback in callbacks.iter_mut() {
                callback(view, kind, result)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("end_action", &self.subscriber_count(EventKind::EndAction))
            .field("end_turn", &self.subscriber_count(EventKind::EndTurn))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn turn_ended() -> ActionResult {
        ActionResult::TurnEnded { player: 0, turn: 1 }
    }

    #[test]
    fn callbacks_run_in_registration_order() {
        let board = Board::mini();
        let view = GameView {
            board: &board,
            players: &[],
            current: 0,
            turn: 1,
        };
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = EventRegistry::new();
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            registry.subscribe(EventKind::EndTurn, move |_, kind, _| {
                seen.borrow_mut().push((tag, kind));
                Ok(())
            });
        }
        registry.fire(EventKind::EndTurn, &view, &turn_ended()).unwrap();
        registry.fire(EventKind::EndAction, &view, &turn_ended()).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![("first", EventKind::EndTurn), ("second", EventKind::EndTurn)]
        );
    }

    #[test]
    fn failing_observer_stops_delivery() {
        let board = Board::mini();
        let view = GameView {
            board: &board,
            players: &[],
            current: 0,
            turn: 1,
        };
        let calls = Rc::new(RefCell::new(0));
        let mut registry = EventRegistry::new();
        registry.subscribe(EventKind::EndAction, |_, _, _| anyhow::bail!("window closed"));
        let counter = Rc::clone(&calls);
        registry.subscribe(EventKind::EndAction, move |_, _, _| {
            *counter.borrow_mut() += 1;
            Ok(())
        });
        let err = registry
            .fire(EventKind::EndAction, &view, &turn_ended())
            .unwrap_err();
        assert_eq!(err.to_string(), "window closed");
        assert_eq!(*calls.borrow(), 0);
    }
}
