use std::collections::HashMap;
use std::fmt::Write as _;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use colored::{Color, Colorize};

use crate::events::GameView;
use crate::game_master::GameMaster;
use crate::player::Player;
use crate::PlayerId;

// handed out from the back, one per seat
const RGB_CODES: [(u8, u8, u8); 6] = [
    (255, 0, 0),    // red
    (0, 255, 0),    // green
    (0, 0, 255),    // blue
    (255, 255, 0),  // yellow
    (160, 32, 240), // purple
    (165, 42, 42),  // brown
];

const UNOWNED: Color = Color::TrueColor {
    r: 255,
    g: 255,
    b: 255,
};

#[derive(Debug, Clone)]
pub struct MapRenderer {
    colours: HashMap<PlayerId, Color>,
    delay: Option<Duration>,
}

impl MapRenderer {
    pub fn new(players: &[Player], delay: Option<Duration>) -> MapRenderer {
        let colours = players
            .iter()
            .zip(RGB_CODES.iter().rev())
            .map(|(p, &(r, g, b))| (p.id(), Color::TrueColor { r, g, b }))
            .collect();
        MapRenderer { colours, delay }
    }

    pub fn colour(&self, owner: Option<PlayerId>) -> Color {
        owner
            .and_then(|o| self.colours.get(&o).copied())
            .unwrap_or(UNOWNED)
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    pub fn render(&self, view: &GameView<'_>) -> String {
        let mut out = String::new();
        let current = view.player(view.current).map_or("-", Player::name);
        let _ = writeln!(out, "== turn {} | {} to play ==", view.turn, current);
        for player in view.players {
            let status = if player.is_eliminated() {
                "eliminated".to_string()
            } else {
                format!("{} territories", player.territories())
            };
            let _ = writeln!(
                out,
                "{} {} ({})",
                "■".color(self.colour(Some(player.id()))),
                player.name(),
                status
            );
        }
        for continent in view.board.continents() {
            let _ = writeln!(out, "{} (+{})", continent.name(), continent.bonus());
            for name in continent.members() {
                let Ok(territory) = view.board.territory(name) else {
                    continue;
                };
                let _ = writeln!(
                    out,
                    "  {} {:<24}{:>4}",
                    "●".color(self.colour(territory.owner())),
                    territory.name(),
                    territory.armies()
                );
            }
        }
        out
    }

    /// Subscribes a redraw to both events and, if set, the refresh delay to
    /// end-of-action only. Draws the starting position once.
    pub fn attach(self, master: &mut GameMaster) {
        println!("{}", self.render(&master.view()));
        let renderer = Rc::new(self);

        let on_turn = Rc::clone(&renderer);
        master.add_end_turn_callback(move |view, _, _| {
            println!("{}", on_turn.render(view));
            Ok(())
        });
        let on_action = Rc::clone(&renderer);
        master.add_end_action_callback(move |view, _, _| {
            println!("{}", on_action.render(view));
            Ok(())
        });
        if let Some(delay) = renderer.delay {
            master.add_end_action_callback(move |_, _, _| {
                log::debug!("delaying refresh...");
                thread::sleep(delay);
                Ok(())
            });
        }
    }
}
