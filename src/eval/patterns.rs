//! Pattern score tables over 9-cell packed line windows
//!
//! A window is the 4 cells on each side of a candidate placement plus the
//! center, packed 2 bits per cell (18 bits total). Both evaluators index a
//! precomputed `[i32; 2^18]` table with that pattern; the tables are built
//! once per process by scoring every possible window.
//!
//! Window cells use a player-relative alphabet: `0` empty, `1` own, `2`
//! opponent, `3` out of bounds. The center cell is always the hypothetical
//! own stone.

use once_cell::sync::Lazy;

/// Cells extracted on each side of the center.
pub const SIDE_WINDOW_SIZE: usize = 4;
/// Total window cells including the center.
pub const COMBINED_WINDOW_SIZE: usize = 2 * SIDE_WINDOW_SIZE + 1;
/// One entry per possible packed window.
pub const LOOKUP_TABLE_SIZE: usize = 1 << (2 * COMBINED_WINDOW_SIZE);

pub(crate) const EMPTY: u32 = 0;
pub(crate) const OWN: u32 = 1;
pub(crate) const OPP: u32 = 2;
pub(crate) const OUT_OF_BOUNDS: u32 = 3;

/// Heuristic score ladder. Relative order is what matters; the magnitudes
/// leave room to sum four axes in an `i32`.
pub struct Score;

impl Score {
    /// Five in a row through the placement.
    pub const GOMOKU: i32 = 10_000_000;
    /// Four with both ends open.
    pub const OPEN_FOUR: i32 = 100_000;
    /// Five stones on the axis with a single one-cell gap: filling the gap
    /// wins, but the opponent has one blocking point left.
    pub const BLOCKED_FIVE: i32 = 99_900;
    /// Four with one open end.
    pub const BLOCKED_FOUR: i32 = 10_000;
    pub const OPEN_THREE: i32 = 1_000;
    pub const BLOCKED_THREE: i32 = 100;
    pub const OPEN_TWO: i32 = 100;
    pub const BLOCKED_TWO: i32 = 10;
    pub const OPEN_ONE: i32 = 10;
    pub const BLOCKED_ONE: i32 = 1;
    /// Per capturable opponent pair created by the placement.
    pub const CAPTURE: i32 = 500;
}

/// Static evaluations at or above this are treated as terminal by the
/// search.
pub const MINIMAX_TERMINATION: i32 = Score::OPEN_FOUR;

/// Reverse the cell order of a packed pattern of `window` cells.
pub fn reverse_pattern(mut pattern: u32, window: usize) -> u32 {
    let mut reversed = 0u32;
    for _ in 0..window {
        reversed = (reversed << 2) | (pattern & 0x3);
        pattern >>= 2;
    }
    reversed
}

/// Decode a combined pattern into cells, line order, center forced to own.
fn decode(pattern: u32) -> [u32; COMBINED_WINDOW_SIZE] {
    let mut cells = [0u32; COMBINED_WINDOW_SIZE];
    for (i, cell) in cells.iter_mut().enumerate() {
        *cell = (pattern >> (2 * (COMBINED_WINDOW_SIZE - 1 - i))) & 0x3;
    }
    cells[SIDE_WINDOW_SIZE] = OWN;
    cells
}

/// Contiguous own run through the center and how many of its ends sit on an
/// empty cell. An end that runs off the window counts as blocked.
fn run_and_ends(cells: &[u32; COMBINED_WINDOW_SIZE]) -> (u32, u32) {
    let mut left_end: i32 = SIDE_WINDOW_SIZE as i32 - 1;
    while left_end >= 0 && cells[left_end as usize] == OWN {
        left_end -= 1;
    }
    let mut right_end = SIDE_WINDOW_SIZE + 1;
    while right_end < COMBINED_WINDOW_SIZE && cells[right_end] == OWN {
        right_end += 1;
    }
    let run = (right_end as i32 - left_end - 1) as u32;
    let mut open = 0;
    if left_end >= 0 && cells[left_end as usize] == EMPTY {
        open += 1;
    }
    if right_end < COMBINED_WINDOW_SIZE && cells[right_end] == EMPTY {
        open += 1;
    }
    (run, open)
}

/// Opponent pairs the placement captures (`own, opp, opp, own` from the
/// center outwards, both senses).
fn capture_pairs(cells: &[u32; COMBINED_WINDOW_SIZE]) -> i32 {
    let c = SIDE_WINDOW_SIZE;
    let mut pairs = 0;
    if cells[c + 1] == OPP && cells[c + 2] == OPP && cells[c + 3] == OWN {
        pairs += 1;
    }
    if cells[c - 1] == OPP && cells[c - 2] == OPP && cells[c - 3] == OWN {
        pairs += 1;
    }
    pairs
}

fn shape_score(run: u32, open: u32) -> i32 {
    match (run, open) {
        (5.., _) => Score::GOMOKU,
        (4, 2) => Score::OPEN_FOUR,
        (4, 1) => Score::BLOCKED_FOUR,
        (3, 2) => Score::OPEN_THREE,
        (3, 1) => Score::BLOCKED_THREE,
        (2, 2) => Score::OPEN_TWO,
        (2, 1) => Score::BLOCKED_TWO,
        (1, 2) => Score::OPEN_ONE,
        (1, 1) => Score::BLOCKED_ONE,
        _ => 0,
    }
}

fn score_pattern_easy(cells: &[u32; COMBINED_WINDOW_SIZE]) -> i32 {
    let (run, open) = run_and_ends(cells);
    let mut base = shape_score(run, open);
    if base < Score::GOMOKU {
        let (count, _, has_gap) = gap_run(cells);
        if has_gap && count >= 5 {
            base = Score::BLOCKED_FIVE;
        }
    }
    base + capture_pairs(cells) * Score::CAPTURE
}

/// Walk away from the center counting own stones, optionally stepping over
/// a single empty cell that has another own stone behind it. Returns the
/// stones counted, whether the walk ended on an empty cell, and whether the
/// gap was used.
fn scan_side(
    cells: &[u32; COMBINED_WINDOW_SIZE],
    start: i32,
    step: i32,
    allow_gap: bool,
) -> (u32, bool, bool) {
    let in_range = |i: i32| (0..COMBINED_WINDOW_SIZE as i32).contains(&i);
    let mut stones = 0u32;
    let mut used_gap = false;
    let mut i = start;
    loop {
        if in_range(i) && cells[i as usize] == OWN {
            stones += 1;
            i += step;
        } else if allow_gap
            && !used_gap
            && in_range(i)
            && cells[i as usize] == EMPTY
            && in_range(i + step)
            && cells[(i + step) as usize] == OWN
        {
            used_gap = true;
            i += step;
        } else {
            break;
        }
    }
    let open = in_range(i) && cells[i as usize] == EMPTY;
    (stones, open, used_gap)
}

/// Own run allowing a single one-cell gap, with end openness. The gap may
/// fall on either side; the longer resulting run wins, which keeps the
/// result symmetric under window reversal.
fn gap_run(cells: &[u32; COMBINED_WINDOW_SIZE]) -> (u32, u32, bool) {
    let c = SIDE_WINDOW_SIZE as i32;
    let plain_left = scan_side(cells, c - 1, -1, false);
    let plain_right = scan_side(cells, c + 1, 1, false);
    let gap_left = scan_side(cells, c - 1, -1, true);
    let gap_right = scan_side(cells, c + 1, 1, true);

    let left_variant = (
        1 + gap_left.0 + plain_right.0,
        gap_left.1 as u32 + plain_right.1 as u32,
        gap_left.2,
    );
    let right_variant = (
        1 + plain_left.0 + gap_right.0,
        plain_left.1 as u32 + gap_right.1 as u32,
        gap_right.2,
    );
    if (left_variant.0, left_variant.1) >= (right_variant.0, right_variant.1) {
        left_variant
    } else {
        right_variant
    }
}

/// Value of interrupting an adjacent live opponent run.
fn blocking_score(cells: &[u32; COMBINED_WINDOW_SIZE]) -> i32 {
    fn side(cells: &[u32; COMBINED_WINDOW_SIZE], start: i32, step: i32) -> i32 {
        let mut len = 0u32;
        let mut i = start;
        while (0..COMBINED_WINDOW_SIZE as i32).contains(&i) && cells[i as usize] == OPP {
            len += 1;
            i += step;
        }
        let live = (0..COMBINED_WINDOW_SIZE as i32).contains(&i) && cells[i as usize] == EMPTY;
        if !live {
            return 0;
        }
        match len {
            0 => 0,
            1 => Score::OPEN_ONE / 2,
            2 => Score::OPEN_TWO / 2,
            3 => Score::OPEN_THREE / 2,
            _ => Score::OPEN_FOUR / 2,
        }
    }
    let c = SIDE_WINDOW_SIZE as i32;
    side(cells, c - 1, -1) + side(cells, c + 1, 1)
}

/// Own pairs the placement completes that the opponent could capture next
/// move (`opp` on one flank, empty on the other).
fn vulnerable_pairs(cells: &[u32; COMBINED_WINDOW_SIZE]) -> i32 {
    let c = SIDE_WINDOW_SIZE;
    let mut pairs = 0;
    if cells[c + 1] == OWN {
        let (before, after) = (cells[c - 1], cells[c + 2]);
        if (before == OPP && after == EMPTY) || (before == EMPTY && after == OPP) {
            pairs += 1;
        }
    }
    if cells[c - 1] == OWN {
        let (before, after) = (cells[c - 2], cells[c + 1]);
        if (before == OPP && after == EMPTY) || (before == EMPTY && after == OPP) {
            pairs += 1;
        }
    }
    pairs
}

fn score_pattern_hard(cells: &[u32; COMBINED_WINDOW_SIZE]) -> i32 {
    let (run, open) = run_and_ends(cells);
    let contiguous = shape_score(run, open);

    let (count, gap_open, has_gap) = gap_run(cells);
    let gapped = if has_gap {
        match (count, gap_open) {
            (5.., _) => Score::BLOCKED_FIVE,
            (4, _) => Score::BLOCKED_FOUR,
            (3, 2) => Score::OPEN_THREE,
            (3, 1) => Score::BLOCKED_THREE,
            _ => 0,
        }
    } else {
        0
    };

    contiguous.max(gapped) + capture_pairs(cells) * Score::CAPTURE + blocking_score(cells)
        - vulnerable_pairs(cells) * 2 * Score::CAPTURE
}

fn build_table(score: fn(&[u32; COMBINED_WINDOW_SIZE]) -> i32) -> Vec<i32> {
    (0..LOOKUP_TABLE_SIZE)
        .map(|pattern| score(&decode(pattern as u32)))
        .collect()
}

static EASY_TABLE: Lazy<Vec<i32>> = Lazy::new(|| build_table(score_pattern_easy));
static HARD_TABLE: Lazy<Vec<i32>> = Lazy::new(|| build_table(score_pattern_hard));

/// Fast evaluator's table.
pub fn easy_table() -> &'static [i32] {
    &EASY_TABLE
}

/// Strong evaluator's table.
pub fn hard_table() -> &'static [i32] {
    &HARD_TABLE
}

/// Map a score onto `[0, 100]` for display: 50 is balanced, the ends
/// saturate at a decided game.
pub fn evaluation_percentage(score: i32) -> i32 {
    let clamped = score.clamp(-Score::GOMOKU, Score::GOMOKU) as i64;
    (50 + clamped * 50 / Score::GOMOKU as i64) as i32
}
