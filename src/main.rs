use clap::Parser;
use paintbox::game::position::Position;
use paintbox::logging::setup_logging;
use paintbox::mcts::algorithm::AiContext;
use paintbox::mcts::hyperparameters::SearchParams;
use paintbox::protocol::run_match;
use paintbox::scoring::weights::ColorWeights;
use paintbox::utils::rng::FastRandom;
use std::io;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "paintbox", version, about)]
struct Config {
    /// Mode of operation
    #[arg(long, value_enum, default_value = "play")]
    mode: Mode,

    /// Seed for the fast generator; drawn from entropy when omitted
    #[arg(long)]
    seed: Option<u32>,

    /// Multiplier on the 30 s match budget
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,

    /// Random playouts to run in benchmark mode
    #[arg(long, default_value_t = 1_000_000)]
    playouts: u64,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum Mode {
    /// Referee protocol on stdin/stdout
    Play,
    /// Playout throughput measurement
    Benchmark,
}

fn run_benchmark(playouts: u64, seed: Option<u32>) -> paintbox::Result<()> {
    let mut rng = match seed {
        Some(seed) => FastRandom::new(seed),
        None => FastRandom::from_entropy(),
    };
    let weights = ColorWeights::init(1);
    let mut pos = Position::new("Hh123456h")?;
    pos.update_candidates();

    let start = Instant::now();
    let mut score = 0.0;
    for _ in 0..playouts {
        let mut playout = pos.clone();
        while let Some(info) = playout.get_random_move(&mut rng) {
            playout.play_chance_move(&mut rng);
            playout.do_move(info);
        }
        score += weights.expected_score(&playout, 1);
    }
    let dt = start.elapsed().as_secs_f64();
    log::info!("dt={dt:.2} speed={:.2} Ki/s", 0.001 * playouts as f64 / dt);
    log::info!("mean expected score {:.4}", score / playouts as f64);
    Ok(())
}

fn main() -> paintbox::Result<()> {
    let config = Config::parse();
    setup_logging();
    log::info!("{} {}", paintbox::NAME, paintbox::VERSION);

    match config.mode {
        Mode::Play => {
            let params = SearchParams {
                time_scale: config.time_scale,
                ..SearchParams::default()
            };
            // the real color arrives as the referee's first token
            let ctx = AiContext::new(1, params, config.seed);
            let stdin = io::stdin();
            let stdout = io::stdout();
            run_match(stdin.lock(), stdout.lock(), ctx)
        }
        Mode::Benchmark => run_benchmark(config.playouts, config.seed),
    }
}
