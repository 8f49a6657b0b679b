//! Browser runtime for the fish tank: canvas setup, input listeners, the
//! `requestAnimationFrame` loop and the Ready / Playing / GameOver phases.
//!
//! All simulation rules live in [`world`]; this module only wires them to the
//! DOM. State is thread-local because the loop, the input listeners and the
//! panel buttons all run as separate JS callbacks on the one browser thread.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, window};

use crate::constants::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::score::{NewScore, validate_username};

pub mod audio;
pub mod controls;
pub(crate) mod hud;
mod render;
pub mod world;

use controls::{Controls, Direction, to_canvas_coords};
use world::{StepOutcome, World};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Playing,
    GameOver,
}

struct GameState {
    ctx: CanvasRenderingContext2d,
    world: World,
    rng: StdRng,
    username: String,
    phase: Phase,
    controls: Controls,
    /// Pending animation frame request, cancelled by `stop_game`.
    frame_handle: Option<i32>,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

thread_local! {
    static GAME_STATE: RefCell<Option<GameState>> = const { RefCell::new(None) };
    static FRAME_LOOP: FrameCallback = Rc::new(RefCell::new(None));
    static EXIT_CALLBACK: RefCell<Option<js_sys::Function>> = const { RefCell::new(None) };
    static KEYS_BOUND: Cell<bool> = const { Cell::new(false) };
}

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn warn(msg: &str) {
    log::warn!("{msg}");
    web_sys::console::warn_1(&JsValue::from_str(msg));
}

/// Attach the game to canvas `canvas_id` (created if absent) for `username`
/// and show the start panel. A canvas without a 2D context is left alone.
pub fn start_game(canvas_id: &str, username: &str) -> Result<(), JsValue> {
    let username = validate_username(username).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(canvas_id) {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id(canvas_id);
        c.set_attribute("style", "display:block; width:100%; max-width:1200px; margin:0 auto; background:#e0f2fe; border:4px solid rgba(255,255,255,0.5); border-radius:24px;")?;
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
        c
    };
    canvas.set_width(CANVAS_WIDTH as u32);
    canvas.set_height(CANVAS_HEIGHT as u32);

    let ctx: CanvasRenderingContext2d = match canvas.get_context("2d")? {
        Some(ctx) => ctx.dyn_into()?,
        None => {
            warn("canvas has no 2d context; game not started");
            return Ok(());
        }
    };

    // A previous session may still be running (player switched names).
    stop_game();

    let state = GameState {
        ctx,
        world: World::new(now_ms()),
        rng: StdRng::from_entropy(),
        username,
        phase: Phase::Ready,
        controls: Controls::default(),
        frame_handle: None,
    };
    let shown_name = state.username.clone();
    GAME_STATE.with(|s| s.replace(Some(state)));

    bind_pointer(&canvas)?;
    bind_keys()?;
    ensure_frame_loop();

    hud::show_touch_controls(apply_control)?;
    hud::show_mute_button(audio::is_muted(), toggle_mute)?;
    audio::join();

    hud::show_start_panel(&shown_name, begin_round, exit_to_menu)
}

/// Cancel the frame loop, tear down overlays and pause the music (unmount).
pub fn stop_game() {
    GAME_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            if let (Some(handle), Some(win)) = (state.frame_handle.take(), window()) {
                let _ = win.cancel_animation_frame(handle);
            }
            if state.phase == Phase::Playing {
                state.phase = Phase::Ready;
            }
            state.controls.release_all();
        }
    });
    hud::hide_panel();
    hud::hide_score();
    hud::hide_game_controls();
    audio::leave();
}

/// Register a JS function invoked by "Change Player" / "Leaderboard".
pub fn on_exit(callback: js_sys::Function) {
    EXIT_CALLBACK.with(|c| *c.borrow_mut() = Some(callback));
}

/// On-screen control pad hook: `dir` is "up" / "down" / "left" / "right".
pub fn set_game_control(dir: &str, active: bool) {
    if let Some(dir) = Direction::from_name(dir) {
        apply_control(dir, active);
    }
}

fn apply_control(dir: Direction, active: bool) {
    GAME_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            state.controls.set(dir, active);
        }
    });
}

/// Mute button handler; also reachable from JS.
pub fn toggle_mute() -> bool {
    let muted = audio::toggle_mute();
    hud::set_mute_label(muted);
    muted
}

pub fn current_score() -> u32 {
    GAME_STATE.with(|cell| cell.borrow().as_ref().map(|s| s.world.score).unwrap_or(0))
}

pub fn current_phase() -> Option<Phase> {
    GAME_STATE.with(|cell| cell.borrow().as_ref().map(|s| s.phase))
}

fn begin_round() {
    hud::hide_panel();
    let started = GAME_STATE.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let Some(state) = borrow.as_mut() else {
            return false;
        };
        state.world = World::new(now_ms());
        state.controls.release_all();
        state.phase = Phase::Playing;
        true
    });
    if started {
        if let Err(e) = hud::show_score(0) {
            web_sys::console::warn_1(&e);
        }
        request_frame();
    }
}

fn exit_to_menu() {
    stop_game();
    let callback = EXIT_CALLBACK.with(|c| c.borrow().clone());
    if let Some(f) = callback {
        if let Err(e) = f.call0(&JsValue::NULL) {
            web_sys::console::warn_1(&e);
        }
    }
}

fn bind_pointer(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    if canvas.get_attribute("data-ff-bound").is_some() {
        return Ok(());
    }
    let target = canvas.clone();
    let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
        let rect = target.get_bounding_client_rect();
        let Some((x, y)) = to_canvas_coords(
            evt.client_x() as f64,
            evt.client_y() as f64,
            (rect.left(), rect.top(), rect.width(), rect.height()),
        ) else {
            return;
        };
        GAME_STATE.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                state.world.set_pointer(x, y);
            }
        });
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
    closure.forget();
    canvas.set_attribute("data-ff-bound", "1")?;
    Ok(())
}

fn bind_keys() -> Result<(), JsValue> {
    if KEYS_BOUND.with(Cell::get) {
        return Ok(());
    }
    let doc = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    for (event, active) in [("keydown", true), ("keyup", false)] {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            let Some(dir) = Direction::from_key(&evt.key()) else {
                return;
            };
            GAME_STATE.with(|cell| {
                if let Some(state) = cell.borrow_mut().as_mut() {
                    if state.phase == Phase::Playing {
                        evt.prevent_default();
                    }
                    state.controls.set(dir, active);
                }
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    KEYS_BOUND.with(|b| b.set(true));
    Ok(())
}

/// The loop closure is built once and re-armed per frame; a round ends by
/// simply not requesting the next frame.
fn ensure_frame_loop() {
    FRAME_LOOP.with(|f| {
        if f.borrow().is_some() {
            return;
        }
        *f.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            let keep_going = GAME_STATE.with(|cell| match cell.borrow_mut().as_mut() {
                Some(state) => {
                    state.frame_handle = None;
                    game_tick(state, ts)
                }
                None => false,
            });
            if keep_going {
                request_frame();
            }
        }) as Box<dyn FnMut(f64)>));
    });
}

fn request_frame() {
    let Some(win) = window() else {
        return;
    };
    let handle = FRAME_LOOP.with(|f| {
        f.borrow()
            .as_ref()
            .and_then(|cb| win.request_animation_frame(cb.as_ref().unchecked_ref()).ok())
    });
    GAME_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            state.frame_handle = handle;
        }
    });
}

/// One frame. Returns whether another frame should be requested.
fn game_tick(state: &mut GameState, now: f64) -> bool {
    if state.phase != Phase::Playing {
        return false;
    }
    if state.controls.any() {
        let (dx, dy) = state.controls.delta();
        state.world.nudge_pointer(dx, dy);
    }

    let score_before = state.world.score;
    let outcome = state.world.step(now, &mut state.rng);

    if let Err(e) = render::render_world(&state.ctx, &state.world) {
        web_sys::console::warn_1(&e);
    }
    if state.world.score != score_before {
        let _ = hud::show_score(state.world.score);
    }

    match outcome {
        StepOutcome::Running => true,
        StepOutcome::Eaten { final_score } => {
            finish_round(state, final_score);
            false
        }
        StepOutcome::Over => false,
    }
}

fn finish_round(state: &mut GameState, final_score: u32) {
    state.phase = Phase::GameOver;
    state.controls.release_all();
    hud::hide_score();
    log::info!("{} was eaten with {} points", state.username, final_score);

    if let Err(e) = hud::show_game_over_panel(final_score, begin_round, exit_to_menu) {
        web_sys::console::warn_1(&e);
    }

    // Fire-and-forget; the outcome is only reported through a toast.
    let submission = NewScore::new(state.username.clone(), i64::from(final_score));
    wasm_bindgen_futures::spawn_local(async move {
        match crate::leaderboard::submit_score(&submission).await {
            Ok(_) => hud::toast(
                "Game Over!",
                &format!("You scored {final_score} points."),
                false,
            ),
            Err(e) => {
                warn(&format!("score submission failed: {e}"));
                hud::toast(
                    "Error saving score",
                    "Could not save your score to the leaderboard.",
                    true,
                );
            }
        }
    });
}
