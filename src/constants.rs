//! Gameplay tuning shared by the simulation, the renderer and the tests.
//! All distances are in logical canvas pixels; the canvas is scaled by CSS.

pub const CANVAS_WIDTH: f64 = 1200.0;
pub const CANVAS_HEIGHT: f64 = 800.0;

pub const INITIAL_PLAYER_RADIUS: f64 = 15.0;
pub const PLAYER_COLOR: &str = "#0ea5e9";
/// Fraction of the remaining distance to the pointer covered each frame.
pub const PLAYER_EASING: f64 = 0.08;
/// Pointer travel per frame while a direction key / on-screen control is held.
pub const CONTROL_NUDGE: f64 = 8.0;

pub const MAX_ENEMIES: usize = 15;
pub const SPAWN_INTERVAL_MS: f64 = 1000.0;
/// Enemies appear this far outside the chosen edge.
pub const SPAWN_OFFSET: f64 = 50.0;
/// Enemies further than this outside the canvas are dropped.
pub const DESPAWN_MARGIN: f64 = 100.0;

pub const ENEMY_MIN_RADIUS: f64 = 5.0;
pub const ENEMY_MAX_RADIUS: f64 = 100.0;
pub const SMALLER_ENEMY_CHANCE: f64 = 0.7;
pub const SMALLER_ENEMY_MULTIPLIER: f64 = 0.6;
pub const LARGER_ENEMY_MULTIPLIER: f64 = 1.5;

/// Growth per meal is `sqrt(eaten_radius) * GROWTH_FACTOR` (sub-linear).
pub const GROWTH_FACTOR: f64 = 0.2;

pub const ENEMY_COLORS: &[&str] = &["#f43f5e", "#8b5cf6", "#10b981", "#f59e0b", "#ec4899"];

/// Looping background track, served next to the page.
pub const BACKGROUND_MUSIC_SRC: &str = "/audio/sea_background.mp3";
