//! Engine facade: maps a difficulty onto a search variant and times it
//!
//! - `easy`: fixed-depth alpha-beta at depth 5 with the fast evaluator
//! - `medium`: iterative deepening to depth 10 on a 0.4 s budget, fast
//!   evaluator
//! - `hard`: PVS at depth 10 with the strong evaluator
//!
//! The transposition table lives here so it persists across the requests of
//! a session; `reset` clears it.

use std::str::FromStr;
use std::time::{Duration, Instant};

use tracing::info;

use crate::board::{Board, Player, Pos};
use crate::eval::heuristic::{evaluate_position, evaluate_position_hard};
use crate::eval::{evaluation_percentage, EvalFn};
use crate::search::{Searcher, TranspositionTable, MAX_DEPTH};

/// Alpha-beta depth for the easy variant.
pub const EASY_DEPTH: i32 = 5;
/// Wall-clock budget for the medium variant.
pub const MEDIUM_TIME_LIMIT: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Error for difficulty strings outside `easy`/`medium`/`hard`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDifficulty(pub String);

impl std::fmt::Display for InvalidDifficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown difficulty: {}", self.0)
    }
}

impl std::error::Error for InvalidDifficulty {}

impl FromStr for Difficulty {
    type Err = InvalidDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(InvalidDifficulty(other.to_string())),
        }
    }
}

/// Outcome of a move request.
#[derive(Debug, Clone, Copy)]
pub struct MoveDecision {
    pub pos: Option<Pos>,
    pub elapsed: Duration,
}

/// Per-session engine state.
#[derive(Default)]
pub struct Engine {
    tt: TranspositionTable,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all cached search state.
    pub fn reset(&mut self) {
        self.tt.clear();
    }

    pub fn tt_len(&self) -> usize {
        self.tt.len()
    }

    /// Pick the next player's move. An empty board seeds the center, since
    /// candidate generation has no neighbors to work from.
    pub fn choose_move(&mut self, board: &mut Board, difficulty: Difficulty) -> MoveDecision {
        let started = Instant::now();
        let pos = if board.is_board_empty() {
            Some(Pos::center())
        } else {
            let mut searcher = Searcher::new(&mut self.tt, eval_for(difficulty));
            match difficulty {
                Difficulty::Easy => searcher.get_best_move(board, EASY_DEPTH),
                Difficulty::Medium => {
                    searcher.iterative_deepening(board, MAX_DEPTH, MEDIUM_TIME_LIMIT)
                }
                Difficulty::Hard => searcher.get_best_move_pvs(board, MAX_DEPTH),
            }
        };
        let elapsed = started.elapsed();
        if let Some(p) = pos {
            info!(mv = %p.notation(), ?difficulty, ms = elapsed.as_millis() as u64, "move chosen");
        }
        MoveDecision { pos, elapsed }
    }

    /// Both players' static evaluation at a cell, with display percentages:
    /// `((score_one, pct_one), (score_two, pct_two))`.
    pub fn evaluate_both(&self, board: &Board, x: i32, y: i32) -> ((i32, i32), (i32, i32)) {
        let one = evaluate_position(board, Player::One, x, y);
        let two = evaluate_position(board, Player::Two, x, y);
        (
            (one, evaluation_percentage(one)),
            (two, evaluation_percentage(two)),
        )
    }
}

fn eval_for(difficulty: Difficulty) -> EvalFn {
    match difficulty {
        Difficulty::Easy | Difficulty::Medium => evaluate_position,
        Difficulty::Hard => evaluate_position_hard,
    }
}
