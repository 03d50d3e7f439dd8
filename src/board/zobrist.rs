//! Zobrist keys for incremental position hashing
//!
//! A process-wide table of 64-bit random keys: one per `(cell, player)`,
//! one per `(player, capture score 0..=7)`, and a single turn key that is
//! XORed in if and only if player two is to move. Keys are generated once,
//! seeded from wall-clock time, and any zero draw is regenerated so that
//! every key is non-zero.

use once_cell::sync::OnceCell;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Player, Pos, BOARD_SIZE};

/// Highest capture score with a dedicated key; larger scores clamp to it.
pub const CAPTURE_KEY_MAX: u8 = 7;

pub struct ZobristKeys {
    /// `[y][x][player]`
    piece: [[[u64; 2]; BOARD_SIZE]; BOARD_SIZE],
    /// `[player][score 0..=7]`
    capture: [[u64; CAPTURE_KEY_MAX as usize + 1]; 2],
    turn: u64,
}

impl ZobristKeys {
    /// Key for a stone of `player` at `pos`.
    #[inline]
    pub fn piece(&self, pos: Pos, player: Player) -> u64 {
        self.piece[pos.y as usize][pos.x as usize][player.index()]
    }

    /// Key for `player` holding `pairs` captured pairs (clamped to 7).
    #[inline]
    pub fn capture(&self, player: Player, pairs: u8) -> u64 {
        self.capture[player.index()][pairs.min(CAPTURE_KEY_MAX) as usize]
    }

    /// Turn key, present in the hash exactly when player two is to move.
    #[inline]
    pub fn turn(&self) -> u64 {
        self.turn
    }
}

/// Process-wide keys, generated on first use.
pub fn keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate(make_rng()))
}

fn make_rng() -> StdRng {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(seed)
}

fn generate(mut rng: StdRng) -> ZobristKeys {
    #[inline]
    fn non_zero(rng: &mut StdRng) -> u64 {
        let mut v = rng.next_u64();
        while v == 0 {
            v = rng.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[[0; 2]; BOARD_SIZE]; BOARD_SIZE],
        capture: [[0; CAPTURE_KEY_MAX as usize + 1]; 2],
        turn: 0,
    };

    for row in keys.piece.iter_mut() {
        for cell in row.iter_mut() {
            cell[0] = non_zero(&mut rng);
            cell[1] = non_zero(&mut rng);
        }
    }
    for player in keys.capture.iter_mut() {
        for key in player.iter_mut() {
            *key = non_zero(&mut rng);
        }
    }
    keys.turn = non_zero(&mut rng);
    keys
}
