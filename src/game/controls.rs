//! Directional controls (arrow keys / WASD / on-screen pad) and pointer
//! coordinate mapping.

use crate::constants::{CANVAS_HEIGHT, CANVAS_WIDTH, CONTROL_NUDGE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Name used by the on-screen buttons (`"up"`, `"down"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" | "W" => Some(Direction::Up),
            "ArrowDown" | "s" | "S" => Some(Direction::Down),
            "ArrowLeft" | "a" | "A" => Some(Direction::Left),
            "ArrowRight" | "d" | "D" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Events on an on-screen pad button and whether each one presses (`true`)
/// or releases it. Sliding off a held button counts as a release.
pub const PAD_EVENTS: [(&str, bool); 5] = [
    ("mousedown", true),
    ("mouseup", false),
    ("mouseleave", false),
    ("touchstart", true),
    ("touchend", false),
];

/// Which directions are currently held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl Controls {
    pub fn set(&mut self, dir: Direction, active: bool) {
        match dir {
            Direction::Up => self.up = active,
            Direction::Down => self.down = active,
            Direction::Left => self.left = active,
            Direction::Right => self.right = active,
        }
    }

    pub fn release_all(&mut self) {
        *self = Controls::default();
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Pointer displacement for one frame. Opposite directions cancel.
    pub fn delta(&self) -> (f64, f64) {
        let axis = |neg: bool, pos: bool| match (neg, pos) {
            (true, false) => -CONTROL_NUDGE,
            (false, true) => CONTROL_NUDGE,
            _ => 0.0,
        };
        (axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Map a client-space point to logical canvas coordinates given the canvas
/// bounding box (`left, top, width, height`). The canvas is CSS-scaled, so the
/// box rarely matches the 1200x800 backing store.
pub fn to_canvas_coords(client_x: f64, client_y: f64, rect: (f64, f64, f64, f64)) -> Option<(f64, f64)> {
    let (left, top, width, height) = rect;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some((
        (client_x - left) * (CANVAS_WIDTH / width),
        (client_y - top) * (CANVAS_HEIGHT / height),
    ))
}
