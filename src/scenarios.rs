//! Standard benchmark positions
//!
//! Three regression inputs shared by the criterion benchmark and the test
//! suite: an opening skirmish, a contested midgame, and a dense late
//! midgame. Player one (`X`) is to move in all of them, with captures and
//! the double-three restriction enabled.

use crate::board::{Board, Cell, Player};

fn build(stones_one: &[(i32, i32)], stones_two: &[(i32, i32)]) -> Board {
    let mut board = Board::new();
    for &(x, y) in stones_one {
        board.set_cell(x, y, Cell::One);
    }
    for &(x, y) in stones_two {
        board.set_cell(x, y, Cell::Two);
    }
    board.set_position_state(Player::Two, Player::One, 0, 0);
    board
}

/// Opening: a mildly tactical center fight, six stones each.
pub fn opening() -> Board {
    build(
        &[(9, 9), (12, 11), (7, 13), (5, 8), (14, 6), (10, 4)],
        &[(10, 10), (8, 12), (13, 7), (6, 9), (11, 5), (4, 11)],
    )
}

/// Midgame: overlapping attack and block lines, twelve stones each.
pub fn midgame() -> Board {
    build(
        &[
            (9, 9),
            (11, 10),
            (7, 11),
            (13, 8),
            (6, 6),
            (10, 13),
            (14, 12),
            (5, 10),
            (12, 6),
            (8, 14),
            (3, 8),
            (16, 9),
        ],
        &[
            (10, 9),
            (12, 10),
            (8, 11),
            (14, 8),
            (7, 6),
            (11, 13),
            (15, 12),
            (6, 10),
            (13, 6),
            (9, 14),
            (4, 8),
            (15, 9),
        ],
    )
}

/// Late midgame: a dense board that stresses pruning, twenty-four stones
/// each.
pub fn late_midgame() -> Board {
    build(
        &[
            (9, 9),
            (11, 10),
            (7, 11),
            (13, 8),
            (6, 6),
            (10, 13),
            (14, 12),
            (5, 10),
            (12, 6),
            (8, 14),
            (3, 8),
            (16, 9),
            (1, 1),
            (3, 3),
            (5, 5),
            (17, 3),
            (15, 5),
            (13, 3),
            (2, 16),
            (4, 14),
            (6, 16),
            (14, 16),
            (16, 14),
            (12, 17),
        ],
        &[
            (10, 9),
            (12, 10),
            (8, 11),
            (14, 8),
            (7, 6),
            (11, 13),
            (15, 12),
            (6, 10),
            (13, 6),
            (9, 14),
            (4, 8),
            (15, 9),
            (2, 1),
            (4, 3),
            (6, 5),
            (16, 3),
            (14, 5),
            (12, 3),
            (3, 16),
            (5, 14),
            (7, 16),
            (13, 16),
            (15, 14),
            (11, 17),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenarios_have_the_expected_stone_counts() {
        assert_eq!(opening().stone_count(), 12);
        assert_eq!(midgame().stone_count(), 24);
        assert_eq!(late_midgame().stone_count(), 48);
    }

    #[test]
    fn player_one_is_to_move() {
        for board in [opening(), midgame(), late_midgame()] {
            assert_eq!(board.next_player(), Player::One);
            assert!(board.captures_enabled());
            assert!(board.double_three_forbidden());
            assert_eq!(board.hash(), board.recompute_hash());
        }
    }
}
