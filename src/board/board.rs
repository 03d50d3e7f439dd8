//! Board state with reversible move application and incremental hashing

use arrayvec::ArrayVec;

use super::zobrist;
use super::{Bitboard, Cell, Player, Pos, BOARD_SIZE};

/// Upper bound on stones removed by a single placement: a pair in each of
/// the eight compass directions.
pub const MAX_CAPTURES_PER_MOVE: usize = 16;

/// A stone removed by a capture, with its former owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturedStone {
    pub pos: Pos,
    pub player: Player,
}

/// Everything needed to reverse one [`Board::make_move`]. Records are used
/// strictly LIFO.
#[derive(Debug, Clone)]
pub struct UndoInfo {
    pos: Pos,
    captured: ArrayVec<CapturedStone, MAX_CAPTURES_PER_MOVE>,
    prev_hash: u64,
    prev_last_pairs: u8,
    prev_next_pairs: u8,
}

impl UndoInfo {
    /// The placed stone.
    #[inline]
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Stones removed by the move, in detection order.
    #[inline]
    pub fn captured(&self) -> &[CapturedStone] {
        &self.captured
    }
}

/// Game board: two row-wise bitboards plus turn, capture and rule state.
///
/// The Zobrist hash is maintained incrementally through every mutation and
/// equals [`Board::recompute_hash`] at any quiescent state.
#[derive(Debug, Clone)]
pub struct Board {
    one: Bitboard,
    two: Bitboard,
    goal: u32,
    last_player: Player,
    next_player: Player,
    last_player_pairs: u8,
    next_player_pairs: u8,
    captures_enabled: bool,
    double_three_forbidden: bool,
    /// Captures of the most recent move, staged until flushed.
    captured: ArrayVec<CapturedStone, MAX_CAPTURES_PER_MOVE>,
    hash: u64,
}

impl Board {
    /// Empty board, five-in-a-row goal, both rule toggles on, player one to
    /// move.
    pub fn new() -> Self {
        Self::with_rules(5, true, true)
    }

    pub fn with_rules(goal: u32, captures_enabled: bool, double_three_forbidden: bool) -> Self {
        let mut board = Self {
            one: Bitboard::new(),
            two: Bitboard::new(),
            goal,
            last_player: Player::Two,
            next_player: Player::One,
            last_player_pairs: 0,
            next_player_pairs: 0,
            captures_enabled,
            double_three_forbidden,
            captured: ArrayVec::new(),
            hash: 0,
        };
        board.hash = board.recompute_hash();
        board
    }

    // --- Cell access -----------------------------------------------------

    /// Set a cell directly, keeping the hash in sync. Out-of-range
    /// coordinates are ignored.
    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        if !Pos::in_bounds(x, y) {
            return;
        }
        let pos = Pos::new(x as u8, y as u8);
        let keys = zobrist::keys();
        if let Some(old) = self.get_cell(x, y).player() {
            self.hash ^= keys.piece(pos, old);
        }
        self.one.clear(pos);
        self.two.clear(pos);
        if let Some(player) = cell.player() {
            self.bitboard_mut(player).set(pos);
            self.hash ^= keys.piece(pos, player);
        }
    }

    /// Cell value at `(x, y)`; [`Cell::OutOfBounds`] outside the grid.
    #[inline]
    pub fn get_cell(&self, x: i32, y: i32) -> Cell {
        if !Pos::in_bounds(x, y) {
            return Cell::OutOfBounds;
        }
        let pos = Pos::new(x as u8, y as u8);
        if self.one.get(pos) {
            Cell::One
        } else if self.two.get(pos) {
            Cell::Two
        } else {
            Cell::Empty
        }
    }

    #[inline]
    fn bitboard_mut(&mut self, player: Player) -> &mut Bitboard {
        match player {
            Player::One => &mut self.one,
            Player::Two => &mut self.two,
        }
    }

    #[inline]
    pub fn bitboard(&self, player: Player) -> &Bitboard {
        match player {
            Player::One => &self.one,
            Player::Two => &self.two,
        }
    }

    /// Row-wise OR of both players' bitboards.
    pub fn occupancy(&self) -> [u64; BOARD_SIZE] {
        let mut occ = [0u64; BOARD_SIZE];
        for (i, slot) in occ.iter_mut().enumerate() {
            *slot = self.one.row(i) | self.two.row(i);
        }
        occ
    }

    #[inline]
    pub fn stone_count(&self) -> u32 {
        self.one.count() + self.two.count()
    }

    #[inline]
    pub fn is_board_empty(&self) -> bool {
        self.one.is_empty() && self.two.is_empty()
    }

    // --- Turn / score state ----------------------------------------------

    #[inline]
    pub fn goal(&self) -> u32 {
        self.goal
    }

    #[inline]
    pub fn next_player(&self) -> Player {
        self.next_player
    }

    #[inline]
    pub fn last_player(&self) -> Player {
        self.last_player
    }

    #[inline]
    pub fn captures_enabled(&self) -> bool {
        self.captures_enabled
    }

    #[inline]
    pub fn double_three_forbidden(&self) -> bool {
        self.double_three_forbidden
    }

    /// Captured pairs held by `player`.
    #[inline]
    pub fn pairs(&self, player: Player) -> u8 {
        if player == self.last_player {
            self.last_player_pairs
        } else {
            self.next_player_pairs
        }
    }

    /// Assign turn identities and capture scores in one step, refreshing the
    /// hash. Used when reconstructing a board from a request snapshot.
    pub fn set_position_state(
        &mut self,
        last_player: Player,
        next_player: Player,
        last_pairs: u8,
        next_pairs: u8,
    ) {
        debug_assert_ne!(last_player, next_player);
        self.last_player = last_player;
        self.next_player = next_player;
        self.last_player_pairs = last_pairs;
        self.next_player_pairs = next_pairs;
        self.hash = self.recompute_hash();
    }

    /// Swap last/next player together with their scores and toggle the turn
    /// key in the hash.
    pub fn switch_turn(&mut self) {
        std::mem::swap(&mut self.last_player, &mut self.next_player);
        std::mem::swap(&mut self.last_player_pairs, &mut self.next_player_pairs);
        self.hash ^= zobrist::keys().turn();
    }

    // --- Hashing ---------------------------------------------------------

    /// Incrementally maintained Zobrist hash.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// From-scratch hash: XOR of every occupied cell's key, both players'
    /// capture-score keys, and the turn key when player two is to move.
    pub fn recompute_hash(&self) -> u64 {
        let keys = zobrist::keys();
        let mut h = 0u64;
        for pos in self.one.iter_ones() {
            h ^= keys.piece(pos, Player::One);
        }
        for pos in self.two.iter_ones() {
            h ^= keys.piece(pos, Player::Two);
        }
        h ^= keys.capture(Player::One, self.pairs(Player::One));
        h ^= keys.capture(Player::Two, self.pairs(Player::Two));
        if self.next_player == Player::Two {
            h ^= keys.turn();
        }
        h
    }

    // --- Move application ------------------------------------------------

    /// Place the next player's stone at `pos`, apply any captures it
    /// triggers, update the hash and pass the turn. The cell must be empty;
    /// callers pre-validate through move generation.
    pub fn make_move(&mut self, pos: Pos) -> UndoInfo {
        debug_assert_eq!(self.get_cell(pos.x as i32, pos.y as i32), Cell::Empty);
        let keys = zobrist::keys();
        let mover = self.next_player;

        let mut undo = UndoInfo {
            pos,
            captured: ArrayVec::new(),
            prev_hash: self.hash,
            prev_last_pairs: self.last_player_pairs,
            prev_next_pairs: self.next_player_pairs,
        };

        self.captured.clear();
        self.bitboard_mut(mover).set(pos);
        self.hash ^= keys.piece(pos, mover);

        if self.captures_enabled {
            crate::rules::capture::detect_capture_stones(self, pos.x as i32, pos.y as i32, mover);
            if !self.captured.is_empty() {
                for i in 0..self.captured.len() {
                    let stone = self.captured[i];
                    self.bitboard_mut(stone.player).clear(stone.pos);
                    self.hash ^= keys.piece(stone.pos, stone.player);
                }
                let pairs = (self.captured.len() / 2) as u8;
                let old = self.pairs(mover);
                let new = old + pairs;
                self.hash ^= keys.capture(mover, old) ^ keys.capture(mover, new);
                // mover is the next player until the turn flips below
                self.next_player_pairs = new;
                undo.captured = self.captured.clone();
            }
        }

        self.switch_turn();
        undo
    }

    /// Reverse a [`Board::make_move`]. Restores stones, scores, turn and
    /// hash exactly; the staging buffer is emptied.
    pub fn undo_move(&mut self, undo: UndoInfo) {
        std::mem::swap(&mut self.last_player, &mut self.next_player);
        std::mem::swap(&mut self.last_player_pairs, &mut self.next_player_pairs);
        let mover = self.next_player;
        self.bitboard_mut(mover).clear(undo.pos);
        for stone in &undo.captured {
            self.bitboard_mut(stone.player).set(stone.pos);
        }
        self.last_player_pairs = undo.prev_last_pairs;
        self.next_player_pairs = undo.prev_next_pairs;
        self.hash = undo.prev_hash;
        self.captured.clear();
    }

    /// Stage a captured stone. Called by capture detection during move
    /// application.
    pub(crate) fn store_captured(&mut self, pos: Pos, player: Player) {
        self.captured.push(CapturedStone { pos, player });
    }

    /// Captures staged by the most recent move.
    #[inline]
    pub fn captured_stones(&self) -> &[CapturedStone] {
        &self.captured
    }

    /// Empty the capture staging buffer.
    #[inline]
    pub fn flush_captures(&mut self) {
        self.captured.clear();
    }

    // --- Line windows ----------------------------------------------------

    /// Pack `length` cells starting one step from `(x, y)` along `(dx, dy)`
    /// into 2-bit codes, first step in the most significant position.
    /// Cells beyond the board pack as `0b11`.
    pub fn extract_line_bits(&self, x: i32, y: i32, dx: i32, dy: i32, length: u32) -> u32 {
        let mut pattern = 0u32;
        let (mut cx, mut cy) = (x, y);
        for _ in 0..length {
            cx += dx;
            cy += dy;
            pattern = (pattern << 2) | self.get_cell(cx, cy).bits();
        }
        pattern
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(board: &Board) -> (Bitboard, Bitboard, Player, Player, u8, u8, u64) {
        (
            *board.bitboard(Player::One),
            *board.bitboard(Player::Two),
            board.last_player(),
            board.next_player(),
            board.pairs(Player::One),
            board.pairs(Player::Two),
            board.hash(),
        )
    }

    #[test]
    fn set_get_cell_roundtrip() {
        let mut board = Board::new();
        board.set_cell(3, 4, Cell::One);
        assert_eq!(board.get_cell(3, 4), Cell::One);
        board.set_cell(3, 4, Cell::Two);
        assert_eq!(board.get_cell(3, 4), Cell::Two);
        board.set_cell(3, 4, Cell::Empty);
        assert_eq!(board.get_cell(3, 4), Cell::Empty);
    }

    #[test]
    fn out_of_range_get_is_out_of_bounds() {
        let board = Board::new();
        assert_eq!(board.get_cell(-1, 0), Cell::OutOfBounds);
        assert_eq!(board.get_cell(0, 19), Cell::OutOfBounds);
        assert_eq!(board.get_cell(19, 19), Cell::OutOfBounds);
    }

    #[test]
    fn at_most_one_bit_per_cell() {
        let mut board = Board::new();
        board.set_cell(6, 6, Cell::One);
        board.set_cell(6, 6, Cell::Two);
        assert!(!board.bitboard(Player::One).get(Pos::new(6, 6)));
        assert!(board.bitboard(Player::Two).get(Pos::new(6, 6)));
    }

    #[test]
    fn hash_tracks_set_cell() {
        let mut board = Board::new();
        board.set_cell(9, 9, Cell::One);
        board.set_cell(10, 9, Cell::Two);
        assert_eq!(board.hash(), board.recompute_hash());
        board.set_cell(10, 9, Cell::Empty);
        assert_eq!(board.hash(), board.recompute_hash());
    }

    #[test]
    fn turn_key_convention() {
        let mut board = Board::new();
        let h1 = board.hash();
        board.switch_turn();
        let h2 = board.hash();
        assert_ne!(h1, h2);
        assert_eq!(h2, board.recompute_hash());
        board.switch_turn();
        assert_eq!(board.hash(), h1);
    }

    #[test]
    fn make_undo_restores_everything() {
        let mut board = Board::new();
        board.set_cell(9, 9, Cell::Two);
        board.set_position_state(Player::Two, Player::One, 0, 0);
        let before = snapshot(&board);

        let undo = board.make_move(Pos::new(10, 9));
        board.undo_move(undo);
        assert_eq!(snapshot(&board), before);
        assert_eq!(board.hash(), board.recompute_hash());
    }

    #[test]
    fn make_undo_with_capture() {
        // X . O O X along row 5, playing X at (6,5) captures both O stones
        let mut board = Board::new();
        board.set_cell(5, 5, Cell::One);
        board.set_cell(7, 5, Cell::Two);
        board.set_cell(8, 5, Cell::Two);
        board.set_cell(9, 5, Cell::One);
        board.set_position_state(Player::Two, Player::One, 0, 0);
        let before = snapshot(&board);

        let undo = board.make_move(Pos::new(6, 5));
        assert_eq!(undo.captured().len(), 2);
        assert_eq!(board.get_cell(7, 5), Cell::Empty);
        assert_eq!(board.get_cell(8, 5), Cell::Empty);
        assert_eq!(board.pairs(Player::One), 1);
        assert_eq!(board.hash(), board.recompute_hash());

        board.undo_move(undo);
        assert_eq!(snapshot(&board), before);
        assert_eq!(board.get_cell(7, 5), Cell::Two);
        assert_eq!(board.get_cell(8, 5), Cell::Two);
    }

    #[test]
    fn hash_matches_recompute_over_sequence() {
        let mut board = Board::new();
        let moves = [
            Pos::new(9, 9),
            Pos::new(10, 9),
            Pos::new(9, 10),
            Pos::new(10, 10),
            Pos::new(9, 11),
        ];
        let mut undos = Vec::new();
        for &mv in &moves {
            undos.push(board.make_move(mv));
            board.flush_captures();
            assert_eq!(board.hash(), board.recompute_hash());
        }
        while let Some(undo) = undos.pop() {
            board.undo_move(undo);
            assert_eq!(board.hash(), board.recompute_hash());
        }
        assert!(board.is_board_empty());
    }

    #[test]
    fn extract_line_packs_msb_first() {
        let mut board = Board::new();
        board.set_cell(10, 9, Cell::One);
        board.set_cell(11, 9, Cell::Two);
        // From (9,9) heading east: X O . .
        let pattern = board.extract_line_bits(9, 9, 1, 0, 4);
        assert_eq!(pattern, 0b01_10_00_00);
    }

    #[test]
    fn extract_line_marks_out_of_bounds() {
        let board = Board::new();
        // From (1,0) heading west: (0,0) then two off-board cells
        let pattern = board.extract_line_bits(1, 0, -1, 0, 3);
        assert_eq!(pattern, 0b00_11_11);
    }

    #[test]
    fn capture_scores_swap_with_turn() {
        let mut board = Board::new();
        board.set_cell(0, 0, Cell::One);
        board.set_position_state(Player::Two, Player::One, 3, 1);
        assert_eq!(board.pairs(Player::Two), 3);
        assert_eq!(board.pairs(Player::One), 1);
        board.switch_turn();
        assert_eq!(board.pairs(Player::Two), 3);
        assert_eq!(board.pairs(Player::One), 1);
    }
}
