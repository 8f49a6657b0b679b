//! Fish Frenzy core crate.
//!
//! The wasm build exposes the arcade game (`start_game()` and friends) and the
//! leaderboard client. The same crate, built with `--features server`, provides
//! the REST service that stores scores.

use wasm_bindgen::prelude::*;

pub mod constants;
pub mod game;
pub mod leaderboard;
pub mod score;

#[cfg(feature = "server")]
pub mod server;

pub use game::world::{Entity, StepOutcome, Velocity, World};
pub use score::{NewScore, Score};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// JS entrypoints
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_game(canvas_id: &str, username: &str) -> Result<(), JsValue> {
    game::start_game(canvas_id, username)
}

#[wasm_bindgen]
pub fn stop_game() {
    game::stop_game()
}

#[wasm_bindgen]
pub fn set_game_control(dir: &str, active: bool) {
    game::set_game_control(dir, active)
}

#[wasm_bindgen]
pub fn on_exit(callback: js_sys::Function) {
    game::on_exit(callback)
}

/// Flip background music mute; returns whether it is now muted.
#[wasm_bindgen]
pub fn toggle_mute() -> bool {
    game::toggle_mute()
}

#[wasm_bindgen]
pub fn is_muted() -> bool {
    game::audio::is_muted()
}

#[wasm_bindgen]
pub fn current_score() -> u32 {
    game::current_score()
}

/// Same rules the server applies; lets the join form reject names early.
#[wasm_bindgen]
pub fn is_valid_username(name: &str) -> bool {
    score::validate_username(name).is_ok()
}
