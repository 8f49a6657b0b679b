//! DOM overlays drawn above the canvas: score HUD, start / game-over panels,
//! the on-screen direction pad, the mute button and transient toasts.
//! Elements are created lazily and reused by id.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, window};

use super::controls::{Direction, PAD_EVENTS};

const SCORE_ID: &str = "ff-score";
const PANEL_ID: &str = "ff-panel";
const PAD_ID: &str = "ff-pad";
const MUTE_ID: &str = "ff-mute";
const TOAST_ID: &str = "ff-toast";
const TOAST_MS: i32 = 3500;

const PAD_BUTTON_STYLE: &str = "width:64px; height:64px; border:none; border-radius:16px; background:#0ea5e9; color:#fff; font-size:28px; box-shadow:0 10px 20px rgba(0,0,0,0.3); user-select:none; touch-action:none;";

type Listener = Closure<dyn FnMut(Event)>;

struct ToastTimer {
    handle: i32,
    _dismiss: Closure<dyn FnMut()>,
}

thread_local! {
    /// Listeners keyed by the overlay that owns them; dropped with the overlay.
    static LISTENERS: RefCell<Vec<(&'static str, Listener)>> = const { RefCell::new(Vec::new()) };
    static TOAST_TIMER: RefCell<Option<ToastTimer>> = const { RefCell::new(None) };
}

fn document() -> Result<Document, JsValue> {
    window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn ensure_element(doc: &Document, id: &str, style: &str) -> Result<Element, JsValue> {
    if let Some(el) = doc.get_element_by_id(id) {
        return Ok(el);
    }
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
    let el = doc.create_element("div")?;
    el.set_id(id);
    el.set_attribute("style", style)?;
    body.append_child(&el)?;
    Ok(el)
}

/// Minimal escaping for user-provided text placed into `innerHTML`.
pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn listen<F>(owner: &'static str, el: &Element, event: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    el.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    LISTENERS.with(|l| l.borrow_mut().push((owner, closure)));
    Ok(())
}

/// Remove overlay `id` and release the listeners registered for it. Safe to
/// call from one of those listeners.
fn remove_overlay(id: &'static str) {
    if let Ok(doc) = document() {
        if let Some(el) = doc.get_element_by_id(id) {
            el.remove();
        }
    }
    let released: Vec<(&'static str, Listener)> = LISTENERS.with(|l| {
        let mut all = l.borrow_mut();
        let (gone, kept) = all.drain(..).partition(|(owner, _)| *owner == id);
        *all = kept;
        gone
    });
    drop(released);
}

#[cfg(test)]
fn listener_count(owner: &str) -> usize {
    LISTENERS.with(|l| l.borrow().iter().filter(|(o, _)| *o == owner).count())
}

pub(super) fn show_score(score: u32) -> Result<(), JsValue> {
    let doc = document()?;
    let el = ensure_element(&doc, SCORE_ID, "position:fixed; top:24px; left:24px; font-family:'Fira Code', monospace; font-size:28px; font-weight:900; padding:8px 20px; background:rgba(255,255,255,0.9); border:2px solid rgba(255,255,255,0.5); border-radius:16px; color:#0ea5e9; z-index:45; pointer-events:none;")?;
    el.set_text_content(Some(&format!("Score {score}")));
    Ok(())
}

pub(super) fn hide_score() {
    if let Ok(doc) = document() {
        if let Some(el) = doc.get_element_by_id(SCORE_ID) {
            el.remove();
        }
    }
}

pub(super) fn hide_panel() {
    remove_overlay(PANEL_ID);
}

fn on_click<F>(doc: &Document, id: &str, mut handler: F) -> Result<(), JsValue>
where
    F: FnMut() + 'static,
{
    let el = doc
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str("missing panel button"))?;
    listen(PANEL_ID, &el, "click", move |_| handler())
}

fn show_panel(html: &str) -> Result<Document, JsValue> {
    let doc = document()?;
    hide_panel();
    let panel = ensure_element(&doc, PANEL_ID, "position:fixed; inset:0; display:flex; align-items:center; justify-content:center; background:rgba(0,0,0,0.5); z-index:50; font-family:sans-serif;")?;
    panel.set_inner_html(html);
    Ok(doc)
}

pub(super) fn show_start_panel<S, E>(username: &str, on_start: S, on_exit: E) -> Result<(), JsValue>
where
    S: FnMut() + 'static,
    E: FnMut() + 'static,
{
    let html = format!(
        "<div style='background:#fff; padding:32px; border-radius:18px; text-align:center; max-width:420px;'>\
           <h2 style='color:#0ea5e9; margin:0 0 8px;'>Ready to Fish?</h2>\
           <p>Eat smaller fish to grow. Avoid bigger fish or get eaten!</p>\
           <p style='font-size:12px; text-transform:uppercase; color:#2563eb;'>Playing as</p>\
           <p style='font-size:24px; font-weight:bold;'>{}</p>\
           <button id='ff-start' style='font-size:20px; padding:12px 32px;'>Start Game</button>\
           <br/><button id='ff-exit' style='margin-top:12px;'>Change Player</button>\
         </div>",
        escape_html(username)
    );
    let doc = show_panel(&html)?;
    on_click(&doc, "ff-start", on_start)?;
    on_click(&doc, "ff-exit", on_exit)
}

pub(super) fn show_game_over_panel<R, L>(score: u32, on_retry: R, on_leaderboard: L) -> Result<(), JsValue>
where
    R: FnMut() + 'static,
    L: FnMut() + 'static,
{
    let html = format!(
        "<div style='background:#fff; padding:32px; border-radius:18px; text-align:center; max-width:420px;'>\
           <h2 style='color:#ef4444; margin:0 0 8px;'>OM NOM NOM!</h2>\
           <p>You were eaten by a bigger fish.</p>\
           <p style='font-size:12px; text-transform:uppercase; color:#64748b;'>Final Score</p>\
           <p style='font-size:48px; font-weight:900; color:#0ea5e9; margin:0 0 16px;'>{score}</p>\
           <button id='ff-leaderboard'>Leaderboard</button>\
           <button id='ff-retry' style='margin-left:12px;'>Try Again</button>\
         </div>"
    );
    let doc = show_panel(&html)?;
    on_click(&doc, "ff-retry", on_retry)?;
    on_click(&doc, "ff-leaderboard", on_leaderboard)
}

fn pad_button_id(dir: Direction) -> String {
    format!("{PAD_ID}-{}", dir.name())
}

/// Four direction buttons in the bottom-right corner. Each press and release
/// is reported through `on_control`.
pub(super) fn show_touch_controls(on_control: fn(Direction, bool)) -> Result<(), JsValue> {
    let doc = document()?;
    remove_overlay(PAD_ID);
    let pad = ensure_element(&doc, PAD_ID, "position:fixed; bottom:40px; right:40px; display:flex; flex-direction:column; align-items:center; gap:8px; z-index:60; user-select:none; touch-action:none;")?;
    let button = |dir: Direction, glyph: &str| {
        format!(
            "<button id='{}' aria-label='{}' style='{PAD_BUTTON_STYLE}'>{glyph}</button>",
            pad_button_id(dir),
            dir.name()
        )
    };
    pad.set_inner_html(&format!(
        "{}<div style='display:flex; gap:8px;'>{}{}{}</div>",
        button(Direction::Up, "&#9650;"),
        button(Direction::Left, "&#9664;"),
        button(Direction::Down, "&#9660;"),
        button(Direction::Right, "&#9654;"),
    ));

    for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
        let el = doc
            .get_element_by_id(&pad_button_id(dir))
            .ok_or_else(|| JsValue::from_str("missing pad button"))?;
        for (event, active) in PAD_EVENTS {
            listen(PAD_ID, &el, event, move |evt: Event| {
                evt.prevent_default();
                on_control(dir, active);
            })?;
        }
    }
    Ok(())
}

pub(super) fn show_mute_button(muted: bool, on_toggle: fn() -> bool) -> Result<(), JsValue> {
    let doc = document()?;
    remove_overlay(MUTE_ID);
    let wrap = ensure_element(&doc, MUTE_ID, "position:fixed; top:40px; right:40px; z-index:60;")?;
    wrap.set_inner_html("<button style='width:48px; height:48px; border-radius:12px; border:1px solid rgba(255,255,255,0.2); background:rgba(255,255,255,0.1); color:#fff; font-size:22px;'></button>");
    set_mute_label(muted);
    listen(MUTE_ID, &wrap, "click", move |_| {
        on_toggle();
    })
}

pub(super) fn set_mute_label(muted: bool) {
    let Some(button) = document()
        .ok()
        .and_then(|d| d.get_element_by_id(MUTE_ID))
        .and_then(|wrap| wrap.first_element_child())
    else {
        return;
    };
    let (glyph, label) = if muted { ("\u{1F507}", "Unmute") } else { ("\u{1F50A}", "Mute") };
    button.set_text_content(Some(glyph));
    let _ = button.set_attribute("aria-label", label);
    let _ = button.set_attribute("aria-pressed", if muted { "true" } else { "false" });
}

/// Pad and mute button; they only exist while the game screen is up.
pub(super) fn hide_game_controls() {
    remove_overlay(PAD_ID);
    remove_overlay(MUTE_ID);
}

/// Show a toast for a few seconds. Failures are styled as destructive.
pub(crate) fn toast(title: &str, description: &str, destructive: bool) {
    if let Err(e) = try_toast(title, description, destructive) {
        web_sys::console::warn_1(&e);
    }
}

fn try_toast(title: &str, description: &str, destructive: bool) -> Result<(), JsValue> {
    let doc = document()?;
    let bg = if destructive { "#ef4444" } else { "#0f172a" };
    let el = ensure_element(&doc, TOAST_ID, "")?;
    el.set_attribute(
        "style",
        &format!("position:fixed; bottom:24px; right:24px; padding:14px 20px; border-radius:12px; color:#fff; background:{bg}; font-family:sans-serif; z-index:70; max-width:320px;"),
    )?;
    el.set_inner_html(&format!(
        "<strong>{}</strong><div>{}</div>",
        escape_html(title),
        escape_html(description)
    ));

    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    // A newer toast restarts the countdown.
    if let Some(previous) = TOAST_TIMER.with(|t| t.borrow_mut().take()) {
        win.clear_timeout_with_handle(previous.handle);
    }
    let dismiss = Closure::wrap(Box::new(|| {
        if let Some(el) = window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(TOAST_ID))
        {
            el.remove();
        }
        let finished = TOAST_TIMER.with(|t| t.borrow_mut().take());
        drop(finished);
    }) as Box<dyn FnMut()>);
    let handle = win.set_timeout_with_callback_and_timeout_and_arguments_0(
        dismiss.as_ref().unchecked_ref(),
        TOAST_MS,
    )?;
    TOAST_TIMER.with(|t| *t.borrow_mut() = Some(ToastTimer { handle, _dismiss: dismiss }));
    Ok(())
}
