//! Candidate move generation
//!
//! Candidates are empty cells within king-move distance of any stone,
//! computed row-wise: each row's neighbor mask is the OR of the row and its
//! vertical neighbors, each shifted left and right, masked to the 19 valid
//! columns. Iteration is row-major with ascending columns.
//!
//! On an empty board there are no neighbors and the candidate set is empty;
//! callers seed the center themselves.

use crate::board::{Board, Player, Pos, BOARD_SIZE, ROW_MASK};
use crate::rules;

#[inline]
fn shift_row_left(row: u64) -> u64 {
    (row << 1) & ROW_MASK
}

#[inline]
fn shift_row_right(row: u64) -> u64 {
    row >> 1
}

/// Per-row mask of cells adjacent to any occupied cell.
fn neighbor_masks(occupancy: &[u64; BOARD_SIZE]) -> [u64; BOARD_SIZE] {
    let mut neighbor = [0u64; BOARD_SIZE];
    for i in 0..BOARD_SIZE {
        let row = occupancy[i];
        let mut mask = shift_row_left(row) | shift_row_right(row) | row;
        if i > 0 {
            let above = occupancy[i - 1];
            mask |= above | shift_row_left(above) | shift_row_right(above);
        }
        if i < BOARD_SIZE - 1 {
            let below = occupancy[i + 1];
            mask |= below | shift_row_left(below) | shift_row_right(below);
        }
        neighbor[i] = mask;
    }
    neighbor
}

#[inline]
fn candidate_mask(occupancy_row: u64, neighbor_row: u64) -> u64 {
    neighbor_row & !occupancy_row & ROW_MASK
}

fn should_include(board: &Board, x: i32, y: i32, player: Player) -> bool {
    if !board.double_three_forbidden() {
        return true;
    }
    if !rules::forbidden::detect_double_three(board, x, y, player) {
        return true;
    }
    // A capture overrides the double-three restriction
    rules::capture::detect_capture_stones_not_store(board, x, y, player)
}

fn collect<F: Fn(&Board, i32, i32, Player) -> bool>(board: &Board, keep: F) -> Vec<Pos> {
    let occupancy = board.occupancy();
    let neighbor = neighbor_masks(&occupancy);
    let player = board.next_player();
    let mut moves = Vec::new();
    for y in 0..BOARD_SIZE {
        let mut candidates = candidate_mask(occupancy[y], neighbor[y]);
        while candidates != 0 {
            let x = candidates.trailing_zeros() as i32;
            candidates &= candidates - 1;
            if keep(board, x, y as i32, player) {
                moves.push(Pos::new(x as u8, y as u8));
            }
        }
    }
    moves
}

/// Legal candidate placements for the next player.
pub fn candidate_moves(board: &Board) -> Vec<Pos> {
    collect(board, should_include)
}

/// Candidates restricted to moves that capture at least one pair.
pub fn capture_moves(board: &Board) -> Vec<Pos> {
    collect(board, |b, x, y, p| {
        rules::capture::detect_capture_stones_not_store(b, x, y, p)
    })
}
