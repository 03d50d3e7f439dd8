//! Wire protocol: JSON request parsing and response building
//!
//! Requests arrive as JSON objects with a `type` field (`move`, `evaluate`,
//! `test`, `ping`, `reset`). Parsing is field-by-field so that failures map
//! onto the error categories clients expect rather than a generic
//! deserialization error.

pub mod session;

use serde::Serialize;
use serde_json::Value;

use crate::board::{Board, Cell, Player, BOARD_SIZE};

pub use session::Session;

// --- Errors --------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidBoard,
    InvalidScores,
    GameDifficulty,
    Unknown,
}

impl ErrorCategory {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::InvalidBoard => "Invalid board field",
            ErrorCategory::InvalidScores => "Invalid scores field",
            ErrorCategory::GameDifficulty => "Game Difficulty Error",
            ErrorCategory::Unknown => "Unknown error",
        }
    }
}

/// A categorized protocol failure, rendered as
/// `"<category>[: details]"` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    pub category: ErrorCategory,
    pub details: Option<String>,
}

impl ProtocolError {
    pub fn new(category: ErrorCategory) -> Self {
        Self {
            category,
            details: None,
        }
    }

    pub fn with_details(category: ErrorCategory, details: impl Into<String>) -> Self {
        Self {
            category,
            details: Some(details.into()),
        }
    }

    pub fn unknown(details: impl Into<String>) -> Self {
        Self::with_details(ErrorCategory::Unknown, details)
    }
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {}", self.category.as_str(), details),
            None => write!(f, "{}", self.category.as_str()),
        }
    }
}

impl std::error::Error for ProtocolError {}

// --- Response messages ---------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Serialize)]
pub struct LastPlayMsg {
    pub coordinate: Coordinate,
    pub stone: String,
}

#[derive(Debug, Serialize)]
pub struct CapturedStoneMsg {
    pub x: i32,
    pub y: i32,
    pub stone: String,
}

#[derive(Debug, Serialize)]
pub struct ExecutionTime {
    pub s: f64,
    pub ms: f64,
    pub ns: f64,
}

impl ExecutionTime {
    pub fn from_duration(elapsed: std::time::Duration) -> Self {
        let seconds = elapsed.as_secs_f64();
        Self {
            s: seconds,
            ms: seconds * 1e3,
            ns: seconds * 1e9,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub status: &'static str,
    pub board: Vec<Vec<String>>,
    pub last_play: LastPlayMsg,
    pub captured_stones: Vec<CapturedStoneMsg>,
    pub execution_time: ExecutionTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalScoreMsg {
    pub player: String,
    pub eval_scores: i32,
    pub percentage: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub eval_scores: Vec<EvalScoreMsg>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub error: String,
}

impl ErrorResponse {
    pub fn from_error(err: &ProtocolError) -> Self {
        Self {
            kind: "error",
            error: err.to_string(),
        }
    }
}

// --- Request parsing -----------------------------------------------------

/// Fields shared by `move` and `evaluate` requests, before board
/// reconstruction.
#[derive(Debug)]
pub struct RequestFields {
    pub last_x: i32,
    pub last_y: i32,
    pub last_player: Player,
    pub next_player: Player,
    pub goal: u32,
    pub difficulty: Option<String>,
    pub enable_capture: bool,
    pub enable_double_three: bool,
}

fn parse_player(value: Option<&Value>) -> Option<Player> {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.chars().next())
        .and_then(Player::from_stone)
}

/// Pull the scalar fields out of a request. `lastPlay` is optional for
/// `move` requests; when `require_last_play` is set (evaluate) its absence
/// is an error.
pub fn extract_fields(doc: &Value, require_last_play: bool) -> Result<RequestFields, ProtocolError> {
    let missing = || ProtocolError::unknown("Missing required fields.");

    let next_player = parse_player(doc.get("nextPlayer")).ok_or_else(missing)?;

    let (last_x, last_y, last_player) = match doc.get("lastPlay") {
        Some(last_play) => {
            let coordinate = last_play.get("coordinate").ok_or_else(missing)?;
            let x = coordinate.get("x").and_then(Value::as_i64).ok_or_else(missing)? as i32;
            let y = coordinate.get("y").and_then(Value::as_i64).ok_or_else(missing)? as i32;
            let stone = parse_player(last_play.get("stone")).unwrap_or(next_player.opponent());
            (x, y, stone)
        }
        None if require_last_play => return Err(missing()),
        None => (-1, -1, next_player.opponent()),
    };

    let goal = doc.get("goal").and_then(Value::as_u64).ok_or_else(missing)? as u32;
    let difficulty = doc
        .get("difficulty")
        .and_then(Value::as_str)
        .map(str::to_string);
    let enable_capture = doc
        .get("enableCapture")
        .and_then(Value::as_bool)
        .ok_or_else(missing)?;
    let enable_double_three = doc
        .get("enableDoubleThreeRestriction")
        .and_then(Value::as_bool)
        .ok_or_else(missing)?;

    Ok(RequestFields {
        last_x,
        last_y,
        last_player,
        next_player,
        goal,
        difficulty,
        enable_capture,
        enable_double_three,
    })
}

/// Parse the 19x19 `board` field of `"X"` / `"O"` / `"."` cells.
pub fn parse_board_grid(doc: &Value) -> Result<Vec<Vec<char>>, ProtocolError> {
    let rows = doc
        .get("board")
        .and_then(Value::as_array)
        .ok_or_else(|| ProtocolError::new(ErrorCategory::InvalidBoard))?;
    if rows.len() != BOARD_SIZE {
        return Err(ProtocolError::new(ErrorCategory::InvalidBoard));
    }
    let mut grid = Vec::with_capacity(BOARD_SIZE);
    for row in rows {
        let cells = row
            .as_array()
            .ok_or_else(|| ProtocolError::new(ErrorCategory::InvalidBoard))?;
        if cells.len() != BOARD_SIZE {
            return Err(ProtocolError::new(ErrorCategory::InvalidBoard));
        }
        let mut chars = Vec::with_capacity(BOARD_SIZE);
        for cell in cells {
            let c = cell
                .as_str()
                .and_then(|s| s.chars().next())
                .ok_or_else(|| ProtocolError::new(ErrorCategory::InvalidBoard))?;
            chars.push(c);
        }
        grid.push(chars);
    }
    Ok(grid)
}

/// Parse the `scores` array into `(last_player_score, next_player_score)`.
pub fn parse_scores(
    doc: &Value,
    last_player: Player,
    next_player: Player,
) -> Result<(u8, u8), ProtocolError> {
    let scores = doc
        .get("scores")
        .and_then(Value::as_array)
        .ok_or_else(|| ProtocolError::new(ErrorCategory::InvalidScores))?;
    let mut last_score = 0u8;
    let mut next_score = 0u8;
    for entry in scores {
        let player = entry
            .get("player")
            .and_then(Value::as_str)
            .and_then(|s| s.chars().next())
            .ok_or_else(|| ProtocolError::new(ErrorCategory::InvalidScores))?;
        let score = entry
            .get("score")
            .and_then(Value::as_u64)
            .ok_or_else(|| ProtocolError::new(ErrorCategory::InvalidScores))?
            .min(u8::MAX as u64) as u8;
        if player == last_player.stone() {
            last_score = score;
        } else if player == next_player.stone() {
            next_score = score;
        }
    }
    Ok((last_score, next_score))
}

/// Reconstruct a [`Board`] from parsed request pieces.
pub fn build_board(
    grid: &[Vec<char>],
    fields: &RequestFields,
    last_score: u8,
    next_score: u8,
) -> Board {
    let mut board = Board::with_rules(
        fields.goal,
        fields.enable_capture,
        fields.enable_double_three,
    );
    for (y, row) in grid.iter().enumerate() {
        for (x, &c) in row.iter().enumerate() {
            if let Some(player) = Player::from_stone(c) {
                board.set_cell(x as i32, y as i32, player.into());
            }
        }
    }
    board.set_position_state(
        fields.last_player,
        fields.next_player,
        last_score,
        next_score,
    );
    board
}

/// Serialize a board back into the wire grid.
pub fn board_to_grid(board: &Board) -> Vec<Vec<String>> {
    (0..BOARD_SIZE as i32)
        .map(|y| {
            (0..BOARD_SIZE as i32)
                .map(|x| match board.get_cell(x, y) {
                    Cell::One => "X".to_string(),
                    Cell::Two => "O".to_string(),
                    _ => ".".to_string(),
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_grid() -> Vec<Value> {
        (0..BOARD_SIZE)
            .map(|_| Value::Array(vec![Value::String(".".into()); BOARD_SIZE]))
            .collect()
    }

    #[test]
    fn extract_fields_with_last_play() {
        let doc = json!({
            "nextPlayer": "O",
            "lastPlay": {"coordinate": {"x": 9, "y": 9}, "stone": "X"},
            "goal": 5,
            "difficulty": "easy",
            "enableCapture": true,
            "enableDoubleThreeRestriction": false,
        });
        let fields = extract_fields(&doc, false).unwrap();
        assert_eq!(fields.last_x, 9);
        assert_eq!(fields.last_player, Player::One);
        assert_eq!(fields.next_player, Player::Two);
        assert_eq!(fields.goal, 5);
        assert_eq!(fields.difficulty.as_deref(), Some("easy"));
        assert!(fields.enable_capture);
        assert!(!fields.enable_double_three);
    }

    #[test]
    fn extract_fields_without_last_play() {
        let doc = json!({
            "nextPlayer": "X",
            "goal": 5,
            "enableCapture": true,
            "enableDoubleThreeRestriction": true,
        });
        let fields = extract_fields(&doc, false).unwrap();
        assert_eq!((fields.last_x, fields.last_y), (-1, -1));
        assert_eq!(fields.last_player, Player::Two);
        assert!(extract_fields(&doc, true).is_err());
    }

    #[test]
    fn missing_board_is_categorized() {
        let doc = json!({"type": "move"});
        let err = parse_board_grid(&doc).unwrap_err();
        assert_eq!(err.category, ErrorCategory::InvalidBoard);
        assert_eq!(err.to_string(), "Invalid board field");
    }

    #[test]
    fn wrong_shape_board_is_rejected() {
        let mut rows = empty_grid();
        rows.pop();
        let doc = json!({"board": rows});
        assert!(parse_board_grid(&doc).is_err());
    }

    #[test]
    fn valid_board_parses() {
        let doc = json!({"board": empty_grid()});
        let grid = parse_board_grid(&doc).unwrap();
        assert_eq!(grid.len(), BOARD_SIZE);
        assert!(grid.iter().all(|row| row.len() == BOARD_SIZE));
    }

    #[test]
    fn scores_map_to_players() {
        let doc = json!({
            "scores": [
                {"player": "X", "score": 2},
                {"player": "O", "score": 1},
            ],
        });
        let (last, next) = parse_scores(&doc, Player::One, Player::Two).unwrap();
        assert_eq!((last, next), (2, 1));
        let (last, next) = parse_scores(&doc, Player::Two, Player::One).unwrap();
        assert_eq!((last, next), (1, 2));
    }

    #[test]
    fn missing_scores_is_categorized() {
        let doc = json!({});
        let err = parse_scores(&doc, Player::One, Player::Two).unwrap_err();
        assert_eq!(err.category, ErrorCategory::InvalidScores);
        assert_eq!(err.to_string(), "Invalid scores field");
    }

    #[test]
    fn error_rendering_includes_details() {
        let err = ProtocolError::unknown("JSON Parse Error");
        assert_eq!(err.to_string(), "Unknown error: JSON Parse Error");
        let rendered = serde_json::to_string(&ErrorResponse::from_error(&err)).unwrap();
        assert!(rendered.contains("\"type\":\"error\""));
    }

    #[test]
    fn board_roundtrips_through_the_grid() {
        let mut grid = vec![vec!['.'; BOARD_SIZE]; BOARD_SIZE];
        grid[9][9] = 'X';
        grid[10][9] = 'O';
        let fields = RequestFields {
            last_x: 9,
            last_y: 9,
            last_player: Player::One,
            next_player: Player::Two,
            goal: 5,
            difficulty: None,
            enable_capture: true,
            enable_double_three: true,
        };
        let board = build_board(&grid, &fields, 0, 0);
        assert_eq!(board.get_cell(9, 9), Cell::One);
        assert_eq!(board.get_cell(9, 10), Cell::Two);
        let out = board_to_grid(&board);
        assert_eq!(out[9][9], "X");
        assert_eq!(out[10][9], "O");
        assert_eq!(out[0][0], ".");
    }
}
