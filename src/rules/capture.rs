//! Pair capture detection
//!
//! A placement captures along a compass direction when the line from the
//! placed stone reads `own, opp, opp, own`: the two enclosed opponent
//! stones are removed and the capturing player scores one pair.

use arrayvec::ArrayVec;

use crate::board::board::MAX_CAPTURES_PER_MOVE;
use crate::board::{Board, CapturedStone, Cell, Player, Pos, DIRECTIONS};

/// Stones that placing `player` at `(x, y)` would capture, in direction
/// order. Pure; the board is not modified.
pub fn find_captured_stones(
    board: &Board,
    x: i32,
    y: i32,
    player: Player,
) -> ArrayVec<CapturedStone, MAX_CAPTURES_PER_MOVE> {
    let mut captured = ArrayVec::new();
    let opponent: Cell = player.opponent().into();
    let own: Cell = player.into();

    for &(dx, dy) in &DIRECTIONS {
        let (x1, y1) = (x + dx, y + dy);
        let (x2, y2) = (x + 2 * dx, y + 2 * dy);
        let (x3, y3) = (x + 3 * dx, y + 3 * dy);
        if board.get_cell(x1, y1) == opponent
            && board.get_cell(x2, y2) == opponent
            && board.get_cell(x3, y3) == own
        {
            captured.push(CapturedStone {
                pos: Pos::new(x1 as u8, y1 as u8),
                player: player.opponent(),
            });
            captured.push(CapturedStone {
                pos: Pos::new(x2 as u8, y2 as u8),
                player: player.opponent(),
            });
        }
    }
    captured
}

/// Detect captures for a placement and stage them on the board. Returns
/// whether anything was captured. The stones stay on the board; applying
/// and scoring the capture is the caller's job (`Board::make_move`).
pub fn detect_capture_stones(board: &mut Board, x: i32, y: i32, player: Player) -> bool {
    let captured = find_captured_stones(board, x, y, player);
    let any = !captured.is_empty();
    for stone in captured {
        board.store_captured(stone.pos, stone.player);
    }
    any
}

/// Pure predicate: would placing `player` at `(x, y)` capture anything?
pub fn detect_capture_stones_not_store(board: &Board, x: i32, y: i32, player: Player) -> bool {
    let opponent: Cell = player.opponent().into();
    let own: Cell = player.into();
    for &(dx, dy) in &DIRECTIONS {
        if board.get_cell(x + dx, y + dy) == opponent
            && board.get_cell(x + 2 * dx, y + 2 * dy) == opponent
            && board.get_cell(x + 3 * dx, y + 3 * dy) == own
        {
            return true;
        }
    }
    false
}
