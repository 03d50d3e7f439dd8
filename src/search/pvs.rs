//! Principal-variation search
//!
//! Same transposition-table preamble and termination handling as the
//! alpha-beta recursion. The first child of every node gets the full
//! window; later children are probed with a null window `[α, α+1]` and only
//! re-searched at full width when the probe lands strictly inside `(α, β)`.

use tracing::info;

use crate::board::{Board, Pos};
use crate::eval::MINIMAX_TERMINATION;

use super::alphabeta::{initial_extreme, update_best_and_bounds, Searcher};
use super::movegen;

impl Searcher<'_> {
    /// PVS recursion.
    pub fn pvs(
        &mut self,
        board: &mut Board,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        is_max: bool,
        last: Option<Pos>,
    ) -> i32 {
        let alpha0 = alpha;
        let hash = board.hash();

        let probe = self.tt.probe(hash, depth, &mut alpha, &mut beta);
        if let Some(score) = probe.score {
            board.flush_captures();
            return score;
        }

        let mover = board.last_player();
        let (last_x, last_y) = match last {
            Some(p) => (p.x as i32, p.y as i32),
            None => (-1, -1),
        };
        let eval_score = (self.eval)(board, mover, last_x, last_y);
        if last.is_some() && eval_score >= MINIMAX_TERMINATION {
            board.flush_captures();
            return if is_max { -eval_score } else { eval_score };
        }
        if depth == 0 {
            board.flush_captures();
            return eval_score;
        }
        board.flush_captures();

        let moves = movegen::candidate_moves(board);
        if moves.is_empty() {
            let to_move = board.next_player();
            return (self.eval)(board, to_move, last_x, last_y);
        }
        let scored = self.score_and_sort(board, &moves, board.next_player(), depth, is_max);

        let mut first_child = true;
        let mut best_move: Option<Pos> = None;
        let mut best_eval = initial_extreme(is_max);

        for sm in &scored {
            let undo = board.make_move(sm.pos);
            let score = if first_child {
                first_child = false;
                self.pvs(board, depth - 1, alpha, beta, !is_max, Some(sm.pos))
            } else {
                let probe_score = self.pvs(
                    board,
                    depth - 1,
                    alpha,
                    alpha.saturating_add(1),
                    !is_max,
                    Some(sm.pos),
                );
                if probe_score > alpha && probe_score < beta {
                    self.pvs(board, depth - 1, alpha, beta, !is_max, Some(sm.pos))
                } else {
                    probe_score
                }
            };
            board.undo_move(undo);

            update_best_and_bounds(
                is_max,
                score,
                sm.pos,
                &mut best_eval,
                &mut best_move,
                &mut alpha,
                &mut beta,
            );
            if alpha >= beta {
                self.note_killer(depth, sm.pos);
                break;
            }
        }

        self.tt.store(hash, depth, best_move, best_eval, alpha0, beta);
        best_eval
    }

    /// One-shot PVS root: children are opponent (minimizing) nodes and the
    /// root keeps the maximum of their scores.
    pub fn get_best_move_pvs(&mut self, board: &mut Board, depth: i32) -> Option<Pos> {
        self.reset_killers();

        let moves = movegen::candidate_moves(board);
        if moves.is_empty() {
            return None;
        }
        let scored = self.score_and_sort(board, &moves, board.next_player(), depth, true);
        if scored[0].score >= MINIMAX_TERMINATION {
            info!(mv = %scored[0].pos.notation(), "immediate heuristic win at PVS root");
            return Some(scored[0].pos);
        }

        let mut alpha = i32::MIN;
        let beta = i32::MAX;
        let mut best_move = None;
        let mut best_score = i32::MIN;

        for sm in &scored {
            let undo = board.make_move(sm.pos);
            let score = self.pvs(board, depth - 1, alpha, beta, false, Some(sm.pos));
            board.undo_move(undo);

            if score >= MINIMAX_TERMINATION {
                return Some(sm.pos);
            }
            if score > best_score {
                best_score = score;
                best_move = Some(sm.pos);
            }
            alpha = alpha.max(score);
        }
        best_move
    }
}
