//! End-to-end message handling through a session, mirroring the wire
//! traffic of a real client.

use serde_json::{json, Value};

use gomoku::protocol::{board_to_grid, Session};
use gomoku::scenarios;

fn move_request(board: Value, next_player: &str, difficulty: &str) -> String {
    json!({
        "type": "move",
        "board": board,
        "nextPlayer": next_player,
        "goal": 5,
        "difficulty": difficulty,
        "enableCapture": true,
        "enableDoubleThreeRestriction": true,
        "scores": [{"player": "X", "score": 0}, {"player": "O", "score": 0}],
    })
    .to_string()
}

#[test]
fn full_move_flow_on_the_opening_scenario() {
    let board = scenarios::opening();
    let grid = board_to_grid(&board);

    // Medium is deadline-bounded, which keeps this test fast in any build
    let mut session = Session::new();
    let response = session
        .handle(&move_request(json!(grid), "X", "medium"))
        .unwrap();
    let doc: Value = serde_json::from_str(&response).unwrap();

    assert_eq!(doc["type"], "move");
    assert_eq!(doc["status"], "success");
    assert_eq!(doc["lastPlay"]["stone"], "X");

    let x = doc["lastPlay"]["coordinate"]["x"].as_i64().unwrap();
    let y = doc["lastPlay"]["coordinate"]["y"].as_i64().unwrap();
    assert!((0..19).contains(&x) && (0..19).contains(&y));
    // The cell the engine picked was empty in the request
    assert_eq!(grid[y as usize][x as usize], ".");
    // And holds the engine's stone in the response
    assert_eq!(doc["board"][y as usize][x as usize], "X");

    let time = &doc["executionTime"];
    assert!(time["s"].as_f64().unwrap() >= 0.0);
    assert!(time["ms"].as_f64().unwrap() >= time["s"].as_f64().unwrap());
}

#[test]
fn empty_board_move_plays_center() {
    let grid = vec![vec![".".to_string(); 19]; 19];
    let mut session = Session::new();
    let response = session
        .handle(&move_request(json!(grid), "X", "easy"))
        .unwrap();
    let doc: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(doc["lastPlay"]["coordinate"]["x"], 9);
    assert_eq!(doc["lastPlay"]["coordinate"]["y"], 9);
}

#[test]
fn capture_is_reported_on_the_wire() {
    // X . O O X on row 5: playing (6,5) would capture both O stones. The
    // engine may prefer another move, so assert consistency of whatever it
    // reports rather than the exact square.
    let mut grid = vec![vec![".".to_string(); 19]; 19];
    grid[5][5] = "X".to_string();
    grid[5][7] = "O".to_string();
    grid[5][8] = "O".to_string();
    grid[5][9] = "X".to_string();

    let mut session = Session::new();
    let response = session
        .handle(&move_request(json!(grid), "X", "medium"))
        .unwrap();
    let doc: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(doc["status"], "success");

    let captured = doc["capturedStones"].as_array().unwrap();
    let x = doc["lastPlay"]["coordinate"]["x"].as_i64().unwrap();
    let y = doc["lastPlay"]["coordinate"]["y"].as_i64().unwrap();
    if (x, y) == (6, 5) {
        // The capture variant: both O stones are gone and reported
        assert_eq!(captured.len(), 2);
        assert_eq!(doc["board"][5][7], ".");
        assert_eq!(doc["board"][5][8], ".");
        for stone in captured {
            assert_eq!(stone["stone"], "O");
        }
    } else {
        assert!(captured.is_empty());
    }
}

#[test]
fn ping_reset_and_errors() {
    let mut session = Session::new();

    assert_eq!(
        session.handle(r#"{"type":"ping"}"#).unwrap(),
        r#"{"type":"pong"}"#
    );
    assert!(session.handle(r#"{"type":"reset"}"#).is_none());

    let bad_board = json!({
        "type": "move",
        "board": "not an array",
        "nextPlayer": "X",
        "goal": 5,
        "difficulty": "easy",
        "enableCapture": true,
        "enableDoubleThreeRestriction": true,
        "scores": [],
    });
    let response = session.handle(&bad_board.to_string()).unwrap();
    assert!(response.contains("Invalid board field"));

    let bad_scores = json!({
        "type": "move",
        "board": vec![vec!["."; 19]; 19],
        "nextPlayer": "X",
        "goal": 5,
        "difficulty": "easy",
        "enableCapture": true,
        "enableDoubleThreeRestriction": true,
    });
    let response = session.handle(&bad_scores.to_string()).unwrap();
    assert!(response.contains("Invalid scores field"));
}

#[test]
fn evaluate_flow_on_a_strong_position() {
    let mut grid = vec![vec![".".to_string(); 19]; 19];
    for x in 8..12 {
        grid[9][x] = "X".to_string();
    }

    let request = json!({
        "type": "evaluate",
        "board": grid,
        "lastPlay": {"coordinate": {"x": 11, "y": 9}, "stone": "X"},
        "nextPlayer": "O",
        "goal": 5,
        "enableCapture": true,
        "enableDoubleThreeRestriction": true,
        "scores": [{"player": "X", "score": 0}, {"player": "O", "score": 0}],
    });

    let mut session = Session::new();
    let response = session.handle(&request.to_string()).unwrap();
    let doc: Value = serde_json::from_str(&response).unwrap();

    let scores = doc["evalScores"].as_array().unwrap();
    assert_eq!(scores[0]["player"], "O");
    assert_eq!(scores[1]["player"], "X");
    let x_pct = scores[1]["percentage"].as_i64().unwrap();
    let o_pct = scores[0]["percentage"].as_i64().unwrap();
    // X holds a four; its outlook must not trail O's
    assert!(x_pct >= o_pct);
}
