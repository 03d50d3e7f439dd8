//! Position evaluation through precomputed packed-window pattern tables

pub mod heuristic;
pub mod patterns;

pub use heuristic::{evaluate_position, evaluate_position_hard, EvalFn};
pub use patterns::{evaluation_percentage, Score, MINIMAX_TERMINATION};
