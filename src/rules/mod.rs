//! Game rules: pair captures, win detection, forbidden double-threes

pub mod capture;
pub mod forbidden;
pub mod win;

pub use capture::{detect_capture_stones, detect_capture_stones_not_store, find_captured_stones};
pub use forbidden::detect_double_three;
pub use win::{detect_capture_win, detect_win};
