//! Gomoku adversarial-search engine
//!
//! An AI for a capture-variant of Gomoku on the standard 19x19 board:
//! five-in-a-row wins, flanked pairs are captured (five captured pairs also
//! win), and an optional restriction forbids moves that create two free
//! threes at once.
//!
//! # Architecture
//!
//! - [`board`]: row-wise bitboards, reversible move application, and
//!   incremental Zobrist hashing
//! - [`rules`]: capture, win and double-three detection
//! - [`eval`]: heuristic evaluation through precomputed 9-cell
//!   packed-window tables (a fast and a strong variant)
//! - [`search`]: candidate generation, transposition table, alpha-beta
//!   with quiescence, iterative deepening with aspiration windows, and PVS
//! - [`engine`]: difficulty-to-variant mapping and timing
//! - [`protocol`]: the JSON message surface served over a persistent socket
//!
//! # Quick start
//!
//! ```
//! use gomoku::board::{Board, Cell, Player};
//! use gomoku::engine::{Difficulty, Engine};
//!
//! let mut board = Board::new();
//! board.set_cell(9, 9, Cell::One);
//! board.set_position_state(Player::One, Player::Two, 0, 0);
//!
//! let mut engine = Engine::new();
//! let decision = engine.choose_move(&mut board, Difficulty::Easy);
//! assert!(decision.pos.is_some());
//! ```

pub mod board;
pub mod engine;
pub mod eval;
pub mod protocol;
pub mod rules;
pub mod scenarios;
pub mod search;

// Re-export the types most callers need
pub use board::{Board, Cell, Player, Pos, BOARD_SIZE};
pub use engine::{Difficulty, Engine};
pub use protocol::Session;
