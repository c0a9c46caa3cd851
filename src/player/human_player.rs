use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::str::FromStr;

use dialoguer::Input;

use crate::board::Board;
use crate::error::MoveError;
use crate::NumArmies;

use super::{Decision, Request};

/// Line-oriented input for a human seat.
pub trait Prompt {
    fn show(&mut self, message: &str);

    /// Reads one line. `None` means the input is gone and the player quits.
    fn read(&mut self, prompt: &str) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn show(&mut self, message: &str) {
        println!("{}", message);
    }

    fn read(&mut self, prompt: &str) -> Option<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .ok()
    }
}

/// Feeds prepared lines, then reports closed input. Everything shown to the
/// player is kept in a transcript that outlives the prompt.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompt {
    lines: VecDeque<String>,
    shown: Rc<RefCell<Vec<String>>>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(lines: I) -> ScriptedPrompt
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompt {
            lines: lines.into_iter().map(Into::into).collect(),
            shown: Rc::default(),
        }
    }

    pub fn transcript(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.shown)
    }
}

impl Prompt for ScriptedPrompt {
    fn show(&mut self, message: &str) {
        self.shown.borrow_mut().push(message.to_string());
    }

    fn read(&mut self, _prompt: &str) -> Option<String> {
        self.lines.pop_front()
    }
}

pub struct HumanPlayer {
    prompt: Box<dyn Prompt>,
}

impl HumanPlayer {
    pub fn new(prompt: impl Prompt + 'static) -> HumanPlayer {
        HumanPlayer {
            prompt: Box::new(prompt),
        }
    }

    pub fn terminal() -> HumanPlayer {
        HumanPlayer::new(TerminalPrompt)
    }

    pub(super) fn reject(&mut self, error: &MoveError) {
        self.prompt.show(&format!("{}. Choose again.", error));
    }

    /// Blocks until a well-formed answer or a quit. Whether the answer is
    /// legal is for the turn engine to judge.
    pub(super) fn decide(&mut self, request: &Request, board: &Board) -> Decision {
        self.describe(request, board);
        let prompt = match request {
            Request::Deploy { .. } => "Deploy <territory> <armies>",
            Request::Attack { .. } => "Attack <option> or <from> <to>, 'pass' to stop",
            Request::Occupy(_) => "Armies to move in",
            Request::Fortify { .. } => "Fortify <option> <armies> or <from> <to> <armies>, 'pass' to skip",
        };
        loop {
            let Some(line) = self.prompt.read(prompt) else {
                return Decision::Quit;
            };
            let line = line.trim().to_ascii_lowercase();
            match line.as_str() {
                "quit" | "q" | "exit" => return Decision::Quit,
                "pass" | "p" | "done" | "end" => return Decision::Pass,
                _ => {}
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match parse(request, &tokens) {
                Some(decision) => return decision,
                None => self.prompt.show("Could not understand that."),
            }
        }
    }

    fn describe(&mut self, request: &Request, board: &Board) {
        let mut text = String::new();
        match request {
            Request::Deploy { pool, territories } => {
                text.push_str(&format!("Reinforcements to distribute: {}\n", pool));
                text.push_str("Owned territories:");
                for (i, name) in territories.iter().enumerate() {
                    let armies = board.territory(name).map(|t| t.armies()).unwrap_or(0);
                    text.push_str(&format!("\n  [{}] {} ({})", i, name, armies));
                }
            }
            Request::Attack { options } => {
                text.push_str("Possible attacks:");
                for (i, o) in options.iter().enumerate() {
                    text.push_str(&format!(
                        "\n  [{}] {} ({}) -> {} ({})",
                        i, o.from, o.attacker_armies, o.to, o.defender_armies
                    ));
                }
            }
            Request::Occupy(occupation) => {
                text.push_str(&format!(
                    "{} taken! Move {} to {} armies in from {}.",
                    occupation.to, occupation.min, occupation.max, occupation.from
                ));
            }
            Request::Fortify { options } => {
                text.push_str("Possible fortifications:");
                for (i, o) in options.iter().enumerate() {
                    text.push_str(&format!(
                        "\n  [{}] {} -> {} (up to {})",
                        i, o.from, o.to, o.max_armies
                    ));
                }
            }
        }
        self.prompt.show(&text);
    }
}

// a token is either an index into the listed options or a territory name
fn pick(token: &str, names: &[String]) -> Option<String> {
    match token.parse::<usize>() {
        Ok(i) => names.get(i).cloned(),
        Err(_) => Some(token.to_string()),
    }
}

fn number<T: FromStr>(token: &str) -> Option<T> {
    token.parse::<T>().ok()
}

fn parse(request: &Request, tokens: &[&str]) -> Option<Decision> {
    match request {
        Request::Deploy { territories, .. } => match tokens {
            [territory, armies] => Some(Decision::Deploy {
                territory: pick(territory, territories)?,
                armies: number::<NumArmies>(armies)?,
            }),
            _ => None,
        },
        Request::Attack { options } => match tokens {
            [choice] => {
                let option = options.get(choice.parse::<usize>().ok()?)?;
                Some(Decision::Attack {
                    from: option.from.clone(),
                    to: option.to.clone(),
                })
            }
            [from, to] => Some(Decision::Attack {
                from: from.to_string(),
                to: to.to_string(),
            }),
            _ => None,
        },
        Request::Occupy(_) => match tokens {
            [armies] => Some(Decision::Occupy {
                armies: number(armies)?,
            }),
            _ => None,
        },
        Request::Fortify { options } => match tokens {
            [choice, armies] => {
                let option = options.get(choice.parse::<usize>().ok()?)?;
                Some(Decision::Fortify {
                    from: option.from.clone(),
                    to: option.to.clone(),
                    armies: number(armies)?,
                })
            }
            [from, to, armies] => Some(Decision::Fortify {
                from: from.to_string(),
                to: to.to_string(),
                armies: number(armies)?,
            }),
            _ => None,
        },
    }
}
