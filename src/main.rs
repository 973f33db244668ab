use std::io;
use std::rc::Rc;

use clap::{Arg, ArgAction, Command};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use tilefall::position::{BoardObserver, Cell, Grid, SameGame};
use tilefall::scorer::{
    GameScorer, MultipliedScore, ScoreCalculator, SimpleCountScore, SquaredScore,
};
use tilefall::search::BestMovesSearch;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Narrates every board change at debug level.
struct LoggingObserver;

impl BoardObserver for LoggingObserver {
    fn tile_created(&mut self, cell: Cell, tile_type: u8) {
        debug!("created tile {} at {}", tile_type, cell);
    }

    fn tile_destroyed(&mut self, cell: Cell) {
        debug!("destroyed tile at {}", cell);
    }

    fn tile_moved(&mut self, from: Cell, to: Cell) {
        debug!("moved tile {} -> {}", from, to);
    }
}

pub fn main() -> io::Result<()> {
    let matches = Command::new("Tilefall solver")
        .version("0.1")
        .about("Plays one full game of Same Game with Monte Carlo tree search")
        .arg(
            Arg::new("width")
                .long("width")
                .env("WIDTH")
                .help("Board width in cells")
                .num_args(1)
                .default_value("8")
                .value_parser(clap::value_parser!(u16).range(1..)),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .env("HEIGHT")
                .help("Board height in cells")
                .num_args(1)
                .default_value("8")
                .value_parser(clap::value_parser!(u16).range(1..)),
        )
        .arg(
            Arg::new("tileTypes")
                .long("tile-types")
                .env("TILE_TYPES")
                .help("Number of distinct tile types")
                .num_args(1)
                .default_value("4")
                .value_parser(clap::value_parser!(u8).range(1..)),
        )
        .arg(
            Arg::new("minMatch")
                .long("min-match")
                .env("MIN_MATCH")
                .help("Smallest group size that counts as a match")
                .num_args(1)
                .default_value("3")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("iterations")
                .long("iterations")
                .env("ITERATIONS")
                .help("Search iteration budget")
                .num_args(1)
                .default_value("1000")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .env("SEED")
                .help("Seed for the board fill and the search. Random if not given")
                .num_args(1)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("scoring")
                .long("scoring")
                .env("SCORING")
                .help("Scoring function for destroyed groups")
                .num_args(1)
                .value_parser(["count", "multiplied", "squared"])
                .default_value("count"),
        )
        .arg(
            Arg::new("multiplier")
                .long("multiplier")
                .env("MULTIPLIER")
                .help("Points per tile for the multiplied scoring function")
                .num_args(1)
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("logfile")
                .short('l')
                .long("logfile")
                .env("LOGFILE")
                .value_name("tilefall.log")
                .help("Name of debug logfile")
                .num_args(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log per-move progress to stderr")
                .action(ArgAction::SetTrue)
                .num_args(0),
        )
        .get_matches();

    let log_dispatcher = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
            record.target(),
            record.level(),
            message
        ))
    });

    let stderr_level = if matches.get_flag("verbose") {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    if let Some(log_file) = matches.get_one::<String>("logfile") {
        log_dispatcher
            .chain(
                fern::Dispatch::new()
                    .level(log::LevelFilter::Debug)
                    .chain(fern::log_file(log_file)?),
            )
            .chain(
                fern::Dispatch::new()
                    .level(stderr_level)
                    .chain(io::stderr()),
            )
            .apply()
            .unwrap()
    } else {
        log_dispatcher
            .level(stderr_level)
            .chain(io::stderr())
            .apply()
            .unwrap()
    }

    let width = *matches.get_one::<u16>("width").unwrap();
    let height = *matches.get_one::<u16>("height").unwrap();
    let tile_types = *matches.get_one::<u8>("tileTypes").unwrap();
    let min_match = *matches.get_one::<u64>("minMatch").unwrap() as usize;
    let iterations = *matches.get_one::<u32>("iterations").unwrap();
    let seed = matches.get_one::<u64>("seed").copied();

    let calculator: Rc<dyn ScoreCalculator> =
        match matches.get_one::<String>("scoring").unwrap().as_str() {
            "count" => Rc::new(SimpleCountScore),
            "multiplied" => Rc::new(MultipliedScore::new(
                *matches.get_one::<u64>("multiplier").unwrap(),
            )),
            "squared" => Rc::new(SquaredScore),
            _ => unreachable!(),
        };

    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let mut game = SameGame::new(Grid::new(width, height), tile_types, min_match);
    let mut scorer = GameScorer::new(calculator);
    game.initialize(&mut rng, &mut LoggingObserver);

    println!("Starting board, {} tiles:", game.tile_count());
    print!("{}", game);

    let mut search = BestMovesSearch::new(&game, &scorer);
    if let Some(seed) = seed {
        search = search.with_seed(seed);
    }
    search.perform_search(iterations);
    let sequence = search.best_move_sequence();
    info!(
        "searched {} nodes, found a {} move line",
        search.tree_size(),
        sequence.len()
    );

    for cell in sequence {
        let match_size = game.destroy_matching_tiles_from_cell(cell, &mut LoggingObserver);
        scorer.register_move(match_size);
        info!(
            "selected {}, destroyed {} tiles, {} left",
            cell,
            match_size,
            game.tile_count()
        );
    }

    println!("Final board:");
    print!("{}", game);
    println!(
        "{} moves, {} points, {} tiles left{}",
        scorer.total_moves(),
        scorer.total_score(),
        game.tile_count(),
        if game.has_valid_moves() {
            " (moves remain)"
        } else {
            ""
        }
    );

    Ok(())
}
