// Canvas drawing for one frame of the fish tank.

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::world::{Entity, World};
use crate::constants::{CANVAS_HEIGHT, CANVAS_WIDTH};

pub(super) fn render_world(ctx: &CanvasRenderingContext2d, world: &World) -> Result<(), JsValue> {
    ctx.clear_rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);

    for enemy in &world.enemies {
        circle(ctx, enemy)?;
        ctx.set_fill_style_str(enemy.color);
        ctx.fill();
        ctx.set_stroke_style_str("rgba(0,0,0,0.1)");
        ctx.set_line_width(2.0);
        ctx.stroke();
        ctx.close_path();
    }

    let p = &world.player;
    circle(ctx, p)?;
    ctx.set_fill_style_str(p.color);
    ctx.fill();
    ctx.set_stroke_style_str("#fff");
    ctx.set_line_width(3.0);
    ctx.stroke();

    draw_eyes(ctx, p, world.pointer)
}

fn circle(ctx: &CanvasRenderingContext2d, e: &Entity) -> Result<(), JsValue> {
    ctx.begin_path();
    ctx.arc(e.x, e.y, e.radius, 0.0, TAU)
}

/// Eyes glance toward the pointer so the player can tell where the fish heads.
fn draw_eyes(ctx: &CanvasRenderingContext2d, p: &Entity, pointer: (f64, f64)) -> Result<(), JsValue> {
    let look_x = (pointer.0 - p.x) * 0.05;
    let look_y = (pointer.1 - p.y) * 0.05;
    let spread = p.radius * 0.3;

    ctx.set_fill_style_str("white");
    ctx.begin_path();
    ctx.arc(p.x + look_x + spread, p.y + look_y - spread, p.radius * 0.25, 0.0, TAU)?;
    ctx.arc(p.x + look_x - spread, p.y + look_y - spread, p.radius * 0.25, 0.0, TAU)?;
    ctx.fill();

    ctx.set_fill_style_str("black");
    ctx.begin_path();
    ctx.arc(p.x + look_x * 1.5 + spread, p.y + look_y * 1.5 - spread, p.radius * 0.1, 0.0, TAU)?;
    ctx.arc(p.x + look_x * 1.5 - spread, p.y + look_y * 1.5 - spread, p.radius * 0.1, 0.0, TAU)?;
    ctx.fill();
    ctx.close_path();
    Ok(())
}
