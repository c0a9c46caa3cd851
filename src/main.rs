use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use riskengine::{generate_players, ActionResult, Board, GameMaster, MapRenderer, Player, PlayerId, RandomDice};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Settings {
    /// Human seats, taken first in turn order
    #[arg(long, default_value_t = 1)]
    humans: usize,

    /// Total number of players
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(2..=6))]
    players: u8,

    /// Log more; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Redraw the map after every action
    #[arg(long)]
    gui: bool,

    /// Pause after each redraw, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Seed for the board, the computer players and the dice
    #[arg(long)]
    seed: Option<u64>,

    /// Play on the six territory practice map
    #[arg(long)]
    mini: bool,

    /// Stop after this many turns
    #[arg(long)]
    max_turns: Option<u32>,
}

fn log(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;
    Ok(())
}

fn print_banner() {
    let banner = r#"
    --==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==--
    ||                              Risk                               ||
    ||-----------------------------------------------------------------||
    || Risk is a turn-based game for two to six players, played on a   ||
    || map of the world divided into forty-two territories grouped     ||
    || into six continents. The object of the game is to occupy every  ||
    || territory on the board, eliminating all other players. Battles  ||
    || are decided by dice rolls.                                      ||
    ||-----------------------------------------------------------------||
    ||  Type 'pass' to end a phase, 'quit' to leave the game.          ||
    --==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==-==--
"#;
    println!("{}", banner.bold());
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    log(settings.verbose)?;
    print_banner();

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut board = if settings.mini {
        Board::mini()
    } else {
        Board::standard()
    };
    let players = generate_players(settings.humans, settings.players as usize, Some(rng.random()))?;
    let ids: Vec<PlayerId> = players.iter().map(Player::id).collect();
    board.distribute_randomly(&ids, &mut rng);

    let mut master = GameMaster::new(board, players, RandomDice::seeded(rng.random()))?;
    master.set_max_turns(settings.max_turns);
    master.add_end_turn_callback(|view, _, result| {
        if let ActionResult::TurnEnded { player, turn } = result {
            for p in view.players.iter().filter(|p| !p.is_eliminated()) {
                log::debug!(
                    "after turn {} ({}): {} holds {} territories",
                    turn,
                    view.player(*player).map_or("-", Player::name),
                    p,
                    p.territories()
                );
            }
        }
        Ok(())
    });
    if settings.gui {
        let delay = Some(Duration::from_millis(settings.delay_ms)).filter(|d| !d.is_zero());
        MapRenderer::new(master.players(), delay).attach(&mut master);
    }

    let summary = master.run()?;
    match summary.winner.and_then(|id| master.player(id)) {
        Some(winner) => println!("{} wins after {} turns!", winner.to_string().green().bold(), summary.turns),
        None if summary.quit => println!("Game abandoned on turn {}.", summary.turns),
        None => println!("No winner after {} turns.", summary.turns),
    }
    Ok(())
}
