//! Referee dialog over stdin/stdout.
//!
//! The referee sends the engine's color, then the starting descriptor,
//! then alternates: an opponent move token (or `Start`), followed by the
//! engine's chance permutation. The engine answers each chance draw with
//! a 3-character placement. `Quit` or end of input ends the match.

use crate::game::moves::{parse_chance, parse_color, parse_moves};
use crate::game::position::Position;
use crate::game::tiles::tiles;
use crate::game::MAX_COLORS;
use crate::mcts::algorithm::{get_best_move, AiContext};
use crate::scoring::eval::delta_evals;
use crate::scoring::weights::ColorWeights;
use crate::{PaintboxError, Result};
use std::io::{BufRead, Write};

/// Whitespace-separated token stream over a buffered reader.
struct TokenReader<R> {
    input: R,
    pending: Vec<String>,
}

impl<R: BufRead> TokenReader<R> {
    fn new(input: R) -> Self {
        Self {
            input,
            pending: Vec::new(),
        }
    }

    /// Next token, or `None` on clean end of input.
    fn next_token(&mut self) -> Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().rev().map(str::to_owned));
        }
        Ok(self.pending.pop())
    }

    /// Next token, erroring out on end of input.
    fn expect_token(&mut self) -> Result<String> {
        self.next_token()?.ok_or(PaintboxError::UnexpectedEof)
    }
}

/// Drive one match. Returns cleanly on `Quit` or end of input.
pub fn run_match<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    mut ctx: AiContext,
) -> Result<()> {
    let mut reader = TokenReader::new(input);

    let color_token = reader.expect_token()?;
    let mut chars = color_token.chars();
    let color = match (chars.next(), chars.next()) {
        (Some(ch), None) => parse_color(ch)?,
        _ => return Err(PaintboxError::MalformedToken(color_token)),
    };
    log::info!("my-color={color}");
    ctx.color = color;
    ctx.weights = ColorWeights::init(color);

    let descriptor = reader.expect_token()?;
    log::info!("starting-tile={descriptor}");
    let mut pos = Position::new(&descriptor)?;
    let mut total_delta_evals = [0.0; MAX_COLORS];

    while let Some(token) = reader.next_token()? {
        if token == "Quit" {
            break;
        }
        if token != "Start" {
            log::info!("opponent={token}");
            let (chance, opponent_move) = parse_moves(&token)?;
            pos.set_chance_move(&chance)?;
            let info = tiles()
                .get(opponent_move.dot, opponent_move.orientation)
                .ok_or_else(|| PaintboxError::IllegalPlacement(opponent_move.to_string()))?;
            let deltas = delta_evals(&pos, info);
            for (total, delta) in total_delta_evals.iter_mut().zip(deltas.iter()) {
                *total += delta;
            }
            ctx.weights.update(&total_delta_evals, color);
            pos.do_move(info);
        }

        let chance_token = reader.expect_token()?;
        log::info!("chance={chance_token}");
        let chance = parse_chance(&chance_token)?;
        pos.set_chance_move(&chance)?;

        match get_best_move(&pos, &mut ctx) {
            Some(best_move) => {
                pos.do_player_move(best_move)?;
                writeln!(output, "{best_move}")?;
                output.flush()?;
            }
            // terminal: nothing to play, wait for Quit
            None => log::info!("no legal move left"),
        }
    }

    Ok(())
}
