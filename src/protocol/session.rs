//! Session handling: one connected client's request dispatch
//!
//! A session owns its engine (and therefore its transposition table) and
//! remembers the last difficulty the client asked for. `reset` clears both.

use serde_json::Value;
use tracing::{info, warn};

use crate::board::{Board, Player, Pos};
use crate::engine::{Difficulty, Engine};

use super::{
    board_to_grid, build_board, extract_fields, parse_board_grid, parse_scores, CapturedStoneMsg,
    Coordinate, ErrorCategory, ErrorResponse, EvalScoreMsg, EvaluateResponse, ExecutionTime,
    LastPlayMsg, MoveResponse, ProtocolError,
};

#[derive(Default)]
pub struct Session {
    engine: Engine,
    difficulty: Option<Difficulty>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one raw message. `None` means no response is sent (reset).
    pub fn handle(&mut self, raw: &str) -> Option<String> {
        let doc: Value = match serde_json::from_str(raw) {
            Ok(doc) => doc,
            Err(_) => return Some(error_json(&ProtocolError::unknown("JSON Parse Error"))),
        };
        let Some(kind) = doc.get("type").and_then(Value::as_str) else {
            return Some(error_json(&ProtocolError::unknown("Invalid 'type' field")));
        };

        match kind {
            "move" => Some(self.handle_move(&doc).unwrap_or_else(|e| error_json(&e))),
            "evaluate" => Some(self.handle_evaluate(&doc).unwrap_or_else(|e| error_json(&e))),
            "test" => Some(handle_test()),
            "ping" => Some(r#"{"type":"pong"}"#.to_string()),
            "reset" => {
                info!("session reset");
                self.difficulty = None;
                self.engine.reset();
                None
            }
            other => {
                warn!(kind = other, "unknown request type");
                Some(error_json(&ProtocolError::unknown("Unknown type")))
            }
        }
    }

    fn handle_move(&mut self, doc: &Value) -> Result<String, ProtocolError> {
        let fields = extract_fields(doc, false)?;
        let grid = parse_board_grid(doc)?;
        let (last_score, next_score) = parse_scores(doc, fields.last_player, fields.next_player)?;

        // The difficulty may be omitted on follow-up requests; remember it.
        let difficulty = match &fields.difficulty {
            Some(s) => s
                .parse::<Difficulty>()
                .map_err(|_| ProtocolError::new(ErrorCategory::GameDifficulty))?,
            None => self
                .difficulty
                .ok_or_else(|| ProtocolError::new(ErrorCategory::GameDifficulty))?,
        };
        self.difficulty = Some(difficulty);

        let mut board = build_board(&grid, &fields, last_score, next_score);
        let decision = self.engine.choose_move(&mut board, difficulty);
        let pos = decision
            .pos
            .ok_or_else(|| ProtocolError::unknown("No move available"))?;

        // Apply the engine's move so the response carries the updated board
        // and the stones it captured.
        let mover = board.next_player();
        let undo = board.make_move(pos);
        if crate::rules::detect_win(&board, pos.x as i32, pos.y as i32, mover)
            || crate::rules::detect_capture_win(&board, mover)
        {
            info!(mv = %pos.notation(), stone = %mover.stone(), "winning move");
        }
        let captured_stones = undo
            .captured()
            .iter()
            .map(|c| CapturedStoneMsg {
                x: c.pos.x as i32,
                y: c.pos.y as i32,
                stone: c.player.stone().to_string(),
            })
            .collect();
        board.flush_captures();

        let response = MoveResponse {
            kind: "move",
            status: "success",
            board: board_to_grid(&board),
            last_play: LastPlayMsg {
                coordinate: Coordinate {
                    x: pos.x as i32,
                    y: pos.y as i32,
                },
                stone: mover.stone().to_string(),
            },
            captured_stones,
            execution_time: ExecutionTime::from_duration(decision.elapsed),
        };
        serde_json::to_string(&response).map_err(|e| ProtocolError::unknown(e.to_string()))
    }

    fn handle_evaluate(&mut self, doc: &Value) -> Result<String, ProtocolError> {
        let fields = extract_fields(doc, true)?;
        let grid = parse_board_grid(doc)?;
        let (last_score, next_score) = parse_scores(doc, fields.last_player, fields.next_player)?;
        let board = build_board(&grid, &fields, last_score, next_score);

        let ((score_one, pct_one), (score_two, pct_two)) =
            self.engine
                .evaluate_both(&board, fields.last_x, fields.last_y);

        let response = EvaluateResponse {
            kind: "evaluate",
            eval_scores: vec![
                EvalScoreMsg {
                    player: Player::Two.stone().to_string(),
                    eval_scores: score_two,
                    percentage: pct_two,
                },
                EvalScoreMsg {
                    player: Player::One.stone().to_string(),
                    eval_scores: score_one,
                    percentage: pct_one,
                },
            ],
        };
        serde_json::to_string(&response).map_err(|e| ProtocolError::unknown(e.to_string()))
    }
}

fn error_json(err: &ProtocolError) -> String {
    serde_json::to_string(&ErrorResponse::from_error(err))
        .unwrap_or_else(|_| r#"{"type":"error","error":"Unknown error"}"#.to_string())
}

/// Self-check: play a short scripted sequence and verify the incremental
/// hash against recomputation, then unwind and verify the board is back to
/// its start state.
fn handle_test() -> String {
    let mut board = Board::new();
    let script = [
        Pos::new(9, 9),
        Pos::new(10, 9),
        Pos::new(9, 10),
        Pos::new(10, 10),
        Pos::new(9, 11),
    ];
    let initial_hash = board.hash();
    let mut undos = Vec::new();
    let mut ok = true;
    for &mv in &script {
        undos.push(board.make_move(mv));
        board.flush_captures();
        ok &= board.hash() == board.recompute_hash();
    }
    while let Some(undo) = undos.pop() {
        board.undo_move(undo);
        ok &= board.hash() == board.recompute_hash();
    }
    ok &= board.hash() == initial_hash && board.is_board_empty();

    if ok {
        r#"{"type":"test","status":"success"}"#.to_string()
    } else {
        r#"{"type":"test","status":"failure"}"#.to_string()
    }
}
