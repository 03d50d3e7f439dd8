//! Alpha-beta minimax with transposition table, killer moves, quiescence
//! over capture moves, and iterative deepening with aspiration windows
//!
//! The search is a plain minimax (not negamax): `is_max` flags whose bound
//! the node updates, and static evaluations are taken from the perspective
//! of the player who just moved. Any static evaluation at or above
//! [`MINIMAX_TERMINATION`] is treated as terminal.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::board::{Board, Player, Pos};
use crate::eval::{EvalFn, MINIMAX_TERMINATION};

use super::movegen;
use super::tt::TranspositionTable;

/// Deepest supported search; also sizes the killer-move table.
pub const MAX_DEPTH: i32 = 10;

/// A candidate with its ordering score and killer flag.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScoredMove {
    pub score: i32,
    pub pos: Pos,
    pub is_killer: bool,
}

/// Wall-clock budget for the root. The unlimited deadline never fires.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    pub fn new(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit: Some(limit),
        }
    }

    pub fn unlimited() -> Self {
        Self {
            start: Instant::now(),
            limit: None,
        }
    }

    #[inline]
    pub fn exceeded(&self) -> bool {
        match self.limit {
            Some(limit) => self.start.elapsed() >= limit,
            None => false,
        }
    }
}

/// Result of one fully completed root depth.
#[derive(Debug, Clone, Copy, Default)]
struct DepthResult {
    best_move: Option<Pos>,
    score: i32,
    depth: i32,
}

/// The search engine. Owns the killer table; the transposition table is
/// borrowed from the session so it survives across searches.
pub struct Searcher<'a> {
    pub(crate) tt: &'a mut TranspositionTable,
    pub(crate) eval: EvalFn,
    killers: [[Option<Pos>; 2]; (MAX_DEPTH + 1) as usize],
}

impl<'a> Searcher<'a> {
    pub fn new(tt: &'a mut TranspositionTable, eval: EvalFn) -> Self {
        Self {
            tt,
            eval,
            killers: [[None; 2]; (MAX_DEPTH + 1) as usize],
        }
    }

    pub fn reset_killers(&mut self) {
        self.killers = [[None; 2]; (MAX_DEPTH + 1) as usize];
    }

    pub(crate) fn is_killer(&self, depth: i32, pos: Pos) -> bool {
        match self.killers.get(depth as usize) {
            Some(slot) => slot[0] == Some(pos) || slot[1] == Some(pos),
            None => false,
        }
    }

    /// Record a cutoff move, shifting the older killer down.
    pub(crate) fn note_killer(&mut self, depth: i32, pos: Pos) {
        if let Some(slot) = self.killers.get_mut(depth as usize) {
            if slot[0] != Some(pos) && slot[1] != Some(pos) {
                slot[1] = slot[0];
                slot[0] = Some(pos);
            }
        }
    }

    /// Score every candidate with the evaluator and sort: killers first,
    /// then score descending for the maximizer, ascending for the minimizer.
    pub(crate) fn score_and_sort(
        &self,
        board: &Board,
        moves: &[Pos],
        player: Player,
        depth: i32,
        max_side: bool,
    ) -> Vec<ScoredMove> {
        let mut scored: Vec<ScoredMove> = moves
            .iter()
            .map(|&pos| ScoredMove {
                score: (self.eval)(board, player, pos.x as i32, pos.y as i32),
                pos,
                is_killer: self.is_killer(depth, pos),
            })
            .collect();
        if max_side {
            scored.sort_by(|a, b| b.is_killer.cmp(&a.is_killer).then(b.score.cmp(&a.score)));
        } else {
            scored.sort_by(|a, b| b.is_killer.cmp(&a.is_killer).then(a.score.cmp(&b.score)));
        }
        scored
    }

    /// Quiescence: at the horizon with captures enabled, settle the position
    /// by searching only capture moves against the stand-pat score.
    fn quiescence(
        &mut self,
        board: &mut Board,
        mut alpha: i32,
        mut beta: i32,
        is_max: bool,
        x: i32,
        y: i32,
    ) -> i32 {
        let to_move = board.next_player();
        let stand_pat = (self.eval)(board, to_move, x, y);

        if is_max {
            if stand_pat >= beta {
                board.flush_captures();
                return beta;
            }
            alpha = alpha.max(stand_pat);
        } else {
            if stand_pat <= alpha {
                board.flush_captures();
                return alpha;
            }
            beta = beta.min(stand_pat);
        }
        board.flush_captures();

        let capture_moves = movegen::capture_moves(board);
        if capture_moves.is_empty() {
            return stand_pat;
        }

        let mut best_eval = stand_pat;
        for mv in capture_moves {
            let undo = board.make_move(mv);
            let eval = self.quiescence(board, alpha, beta, !is_max, mv.x as i32, mv.y as i32);
            board.undo_move(undo);

            if is_max {
                best_eval = best_eval.max(eval);
                alpha = alpha.max(eval);
            } else {
                best_eval = best_eval.min(eval);
                beta = beta.min(eval);
            }
            if beta <= alpha {
                break;
            }
        }
        best_eval
    }

    /// Try the transposition table's best move before generating anything.
    /// Returns true on cutoff. `best_move`/`best_eval` are left holding the
    /// hash move's result either way.
    fn process_hash_move(
        &mut self,
        board: &mut Board,
        mv: Option<Pos>,
        depth: i32,
        alpha: &mut i32,
        beta: &mut i32,
        is_max: bool,
        best_move: &mut Option<Pos>,
        best_eval: &mut i32,
    ) -> bool {
        let Some(mv) = mv else {
            return false;
        };
        let undo = board.make_move(mv);
        let score = self.minimax(board, depth - 1, *alpha, *beta, !is_max, Some(mv));
        board.undo_move(undo);

        *best_eval = score;
        *best_move = Some(mv);
        if is_max {
            *alpha = (*alpha).max(score);
        } else {
            *beta = (*beta).min(score);
        }
        *alpha >= *beta
    }

    /// Make `mv`, recurse, undo, fold the result into the bounds. On cutoff,
    /// records the killer, stores the node and returns true.
    #[allow(clippy::too_many_arguments)]
    fn try_move_and_cutoff(
        &mut self,
        board: &mut Board,
        mv: Pos,
        depth: i32,
        alpha: &mut i32,
        beta: &mut i32,
        is_max: bool,
        alpha0: i32,
        hash: u64,
        best_move: &mut Option<Pos>,
        best_eval: &mut i32,
    ) -> bool {
        let undo = board.make_move(mv);
        let eval = self.minimax(board, depth - 1, *alpha, *beta, !is_max, Some(mv));
        board.undo_move(undo);

        update_best_and_bounds(is_max, eval, mv, best_eval, best_move, alpha, beta);

        if *alpha >= *beta {
            self.note_killer(depth, mv);
            self.tt.store(hash, depth, *best_move, *best_eval, alpha0, *beta);
            return true;
        }
        false
    }

    /// The alpha-beta recursion.
    pub fn minimax(
        &mut self,
        board: &mut Board,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        is_max: bool,
        last: Option<Pos>,
    ) -> i32 {
        let alpha0 = alpha;
        let pre_hash = board.hash();

        let probe = self.tt.probe(pre_hash, depth, &mut alpha, &mut beta);
        if let Some(score) = probe.score {
            board.flush_captures();
            return score;
        }

        // Static evaluation from the mover's perspective; at or above the
        // termination score the line is already decided.
        let mover = board.last_player();
        let (last_x, last_y) = match last {
            Some(p) => (p.x as i32, p.y as i32),
            None => (-1, -1),
        };
        let mut eval_score = (self.eval)(board, mover, last_x, last_y);
        if last.is_some() && eval_score >= MINIMAX_TERMINATION {
            board.flush_captures();
            // At a max node the mover was the minimizer, so their decided
            // line counts against the side to maximize.
            return if is_max { -eval_score } else { eval_score };
        }

        if depth == 0 {
            if board.captures_enabled() {
                eval_score = self.quiescence(board, alpha, beta, is_max, last_x, last_y);
            }
            board.flush_captures();
            return eval_score;
        }

        let mut best_eval = initial_extreme(is_max);
        let mut best_move: Option<Pos> = None;

        if self.process_hash_move(
            board,
            probe.hint,
            depth,
            &mut alpha,
            &mut beta,
            is_max,
            &mut best_move,
            &mut best_eval,
        ) {
            self.tt.store(pre_hash, depth, best_move, best_eval, alpha0, beta);
            return best_eval;
        }

        board.flush_captures();
        let current_hash = board.hash();

        let moves = movegen::candidate_moves(board);
        if moves.is_empty() {
            let to_move = board.next_player();
            let final_eval = (self.eval)(board, to_move, last_x, last_y);
            self.tt.store_exact(current_hash, depth, None, final_eval);
            return final_eval;
        }

        let scored = self.score_and_sort(board, &moves, board.next_player(), depth, is_max);
        for sm in &scored {
            if self.try_move_and_cutoff(
                board,
                sm.pos,
                depth,
                &mut alpha,
                &mut beta,
                is_max,
                alpha0,
                current_hash,
                &mut best_move,
                &mut best_eval,
            ) {
                return best_eval;
            }
        }

        self.tt.store(current_hash, depth, best_move, best_eval, alpha0, beta);
        best_eval
    }

    /// Maximizing root with deadline checks at entry, after the hash move
    /// and between candidates. Returns true when the caller should stop
    /// iterating (cutoff or timeout); `timed_out` tells the two apart.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn root_search(
        &mut self,
        board: &mut Board,
        depth: i32,
        alpha: &mut i32,
        beta: &mut i32,
        deadline: &Deadline,
        timed_out: &mut bool,
        best_move: &mut Option<Pos>,
        best_score: &mut i32,
    ) -> bool {
        if deadline.exceeded() {
            *timed_out = true;
            return true;
        }

        let h0 = board.hash();
        let alpha0 = *alpha;
        let tt_move = self.tt.best_move(h0);
        if let Some(mv) = tt_move {
            debug!(x = mv.x, y = mv.y, "ordering with stored best move");
        }

        if self.process_hash_move(
            board, tt_move, depth, alpha, beta, true, best_move, best_score,
        ) {
            self.tt.store(h0, depth, *best_move, *best_score, alpha0, *beta);
            return true;
        }

        if deadline.exceeded() {
            *timed_out = true;
            return true;
        }

        let moves = movegen::candidate_moves(board);
        if moves.is_empty() {
            warn!("no candidate moves at root");
            return false;
        }

        let scored = self.score_and_sort(board, &moves, board.next_player(), depth, true);

        // A first-ordered candidate at the termination score wins outright.
        if scored[0].score >= MINIMAX_TERMINATION {
            info!(
                mv = %scored[0].pos.notation(),
                depth,
                "immediate heuristic win at root"
            );
            *best_move = Some(scored[0].pos);
            *best_score = scored[0].score;
            return true;
        }

        *best_score = i32::MIN;
        for sm in &scored {
            if deadline.exceeded() {
                debug!(depth, "time limit exceeded inside root loop");
                *timed_out = true;
                return true;
            }
            let undo = board.make_move(sm.pos);
            let val = self.minimax(board, depth - 1, *alpha, *beta, false, Some(sm.pos));
            board.undo_move(undo);

            update_best_and_bounds(true, val, sm.pos, best_score, best_move, alpha, beta);
        }

        self.tt.store(h0, depth, *best_move, *best_score, alpha0, *beta);
        false
    }

    /// Fixed-depth alpha-beta root.
    pub fn get_best_move(&mut self, board: &mut Board, depth: i32) -> Option<Pos> {
        let mut alpha = i32::MIN;
        let mut beta = i32::MAX;
        let mut best_move = None;
        let mut best_score = i32::MIN;
        let mut timed_out = false;
        self.root_search(
            board,
            depth,
            &mut alpha,
            &mut beta,
            &Deadline::unlimited(),
            &mut timed_out,
            &mut best_move,
            &mut best_score,
        );
        best_move
    }

    /// Deepen from 1 to `max_depth` within a wall-clock budget. The window
    /// carried between depths acts as the aspiration window; a root score
    /// falling outside it triggers one full-window re-search. A timed-out
    /// depth is discarded and the last fully completed depth's move wins.
    pub fn iterative_deepening(
        &mut self,
        board: &mut Board,
        max_depth: i32,
        time_limit: Duration,
    ) -> Option<Pos> {
        let deadline = Deadline::new(time_limit);
        self.reset_killers();

        let mut best_so_far = DepthResult::default();
        let mut root_alpha = i32::MIN;
        let mut root_beta = i32::MAX;

        for depth in 1..=max_depth {
            let mut best_move = None;
            let mut best_score = i32::MIN;
            let mut timed_out = false;
            let (alpha_entry, beta_entry) = (root_alpha, root_beta);

            let mut cutoff = self.root_search(
                board,
                depth,
                &mut root_alpha,
                &mut root_beta,
                &deadline,
                &mut timed_out,
                &mut best_move,
                &mut best_score,
            );
            if timed_out {
                break;
            }

            // Fail-low or fail-high against the window this depth started
            // with: widen fully and search the depth again.
            if !cutoff && (best_score <= alpha_entry || best_score >= beta_entry) {
                root_alpha = i32::MIN;
                root_beta = i32::MAX;
                cutoff = self.root_search(
                    board,
                    depth,
                    &mut root_alpha,
                    &mut root_beta,
                    &deadline,
                    &mut timed_out,
                    &mut best_move,
                    &mut best_score,
                );
                if timed_out {
                    break;
                }
            }

            if cutoff {
                return best_move;
            }

            debug!(depth, score = best_score, "completed depth");
            best_so_far = DepthResult {
                best_move,
                score: best_score,
                depth,
            };
        }

        if best_so_far.depth > 0 {
            info!(
                depth = best_so_far.depth,
                score = best_so_far.score,
                "iterative deepening settled"
            );
        }
        best_so_far.best_move
    }
}

#[inline]
pub(crate) fn initial_extreme(is_max: bool) -> i32 {
    if is_max {
        i32::MIN
    } else {
        i32::MAX
    }
}

/// Fold one child result into the running best and the shared window.
pub(crate) fn update_best_and_bounds(
    is_max: bool,
    eval: i32,
    mv: Pos,
    best_eval: &mut i32,
    best_move: &mut Option<Pos>,
    alpha: &mut i32,
    beta: &mut i32,
) {
    if is_max {
        if eval > *best_eval {
            *best_eval = eval;
            *best_move = Some(mv);
        }
        *alpha = (*alpha).max(eval);
    } else {
        if eval < *best_eval {
            *best_eval = eval;
            *best_move = Some(mv);
        }
        *beta = (*beta).min(eval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::eval::heuristic::evaluate_position;

    fn searcher(tt: &mut TranspositionTable) -> Searcher<'_> {
        Searcher::new(tt, evaluate_position)
    }

    #[test]
    fn finds_the_winning_extension() {
        let mut board = Board::new();
        for x in 9..13 {
            board.set_cell(x, 9, Cell::One);
        }
        board.set_position_state(Player::Two, Player::One, 0, 0);

        let mut tt = TranspositionTable::new();
        let mv = searcher(&mut tt).get_best_move(&mut board, 3).unwrap();
        assert!(mv == Pos::new(13, 9) || mv == Pos::new(8, 9), "got {mv:?}");
    }

    #[test]
    fn blocks_the_opponent_four() {
        let mut board = Board::new();
        for x in 9..13 {
            board.set_cell(x, 9, Cell::Two);
        }
        board.set_position_state(Player::Two, Player::One, 0, 0);

        // The strong evaluator carries the blocking signal that breaks the
        // tie between equally lost continuations
        let mut tt = TranspositionTable::new();
        let mut s = Searcher::new(&mut tt, crate::eval::heuristic::evaluate_position_hard);
        let mv = s.get_best_move(&mut board, 3).unwrap();
        assert!(mv == Pos::new(13, 9) || mv == Pos::new(8, 9), "got {mv:?}");
    }

    #[test]
    fn depth_one_matches_static_argmax() {
        // Captures off so the horizon returns the static evaluation itself
        let mut board = Board::with_rules(5, false, true);
        board.set_cell(9, 9, Cell::One);
        board.set_cell(10, 9, Cell::Two);
        board.set_cell(9, 10, Cell::One);
        board.set_position_state(Player::One, Player::Two, 0, 0);

        let moves = movegen::candidate_moves(&board);
        let statically_best = moves
            .iter()
            .map(|&m| (evaluate_position(&board, Player::Two, m.x as i32, m.y as i32), m))
            .max_by_key(|&(s, _)| s)
            .unwrap();

        let mut tt = TranspositionTable::new();
        let mv = searcher(&mut tt).get_best_move(&mut board, 1).unwrap();
        let chosen = evaluate_position(&board, Player::Two, mv.x as i32, mv.y as i32);
        assert_eq!(chosen, statically_best.0);
    }

    #[test]
    fn board_is_unchanged_after_search() {
        let mut board = Board::new();
        board.set_cell(9, 9, Cell::One);
        board.set_cell(10, 10, Cell::Two);
        board.set_position_state(Player::Two, Player::One, 0, 0);
        let hash_before = board.hash();
        let occupancy_before = board.occupancy();

        let mut tt = TranspositionTable::new();
        let _ = searcher(&mut tt).get_best_move(&mut board, 3);

        assert_eq!(board.hash(), hash_before);
        assert_eq!(board.occupancy(), occupancy_before);
        assert_eq!(board.hash(), board.recompute_hash());
    }

    #[test]
    fn repeat_search_uses_the_table() {
        let mut board = Board::new();
        board.set_cell(9, 9, Cell::One);
        board.set_position_state(Player::One, Player::Two, 0, 0);

        let mut tt = TranspositionTable::new();
        let first = searcher(&mut tt).get_best_move(&mut board, 3);
        assert!(first.is_some());
        assert!(tt.len() > 0);
        // The stored best move now seeds the next search as the hash move
        assert!(tt.best_move(board.hash()).is_some());
        let second = searcher(&mut tt).get_best_move(&mut board, 3);
        assert!(second.is_some());
    }

    #[test]
    fn iterative_deepening_returns_within_budget() {
        let mut board = Board::new();
        board.set_cell(9, 9, Cell::One);
        board.set_cell(10, 9, Cell::Two);
        board.set_cell(8, 8, Cell::One);
        board.set_cell(11, 10, Cell::Two);
        board.set_position_state(Player::Two, Player::One, 0, 0);

        let mut tt = TranspositionTable::new();
        let started = Instant::now();
        let mv = searcher(&mut tt).iterative_deepening(
            &mut board,
            MAX_DEPTH,
            Duration::from_millis(100),
        );
        assert!(mv.is_some());
        // Generous bound: the deadline is only checked between root moves
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn quiescence_settles_capture_exchanges() {
        // At the horizon with player two to move and a capture available at
        // (8,5): quiescence must recurse through it and unwind cleanly
        let mut board = Board::new();
        board.set_cell(5, 5, Cell::Two);
        board.set_cell(6, 5, Cell::One);
        board.set_cell(7, 5, Cell::One);
        board.set_position_state(Player::One, Player::Two, 0, 0);
        assert_eq!(movegen::capture_moves(&board), vec![Pos::new(8, 5)]);
        let hash_before = board.hash();

        let mut tt = TranspositionTable::new();
        let mut s = searcher(&mut tt);
        let _ = s.minimax(&mut board, 0, i32::MIN, i32::MAX, false, Some(Pos::new(7, 5)));

        assert_eq!(board.hash(), hash_before);
        assert_eq!(board.hash(), board.recompute_hash());
        assert!(board.captured_stones().is_empty());
        assert_eq!(board.get_cell(6, 5), Cell::One);
        assert_eq!(board.get_cell(7, 5), Cell::One);
    }
}
