//! Canvas 2D painter
//!
//! Neon look: every frame starts with a translucent fill instead of a clear,
//! so moving sprites leave fading trails, and outlines glow via shadow blur.

use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use super::frame::{RenderFrame, Shape, Sprite};
use crate::sim::EnemyKind;

/// Backdrop wash; its alpha sets the trail length
const TRAIL_FILL: &str = "rgba(5, 5, 16, 0.3)";
const LINE_WIDTH: f64 = 2.0;
/// Depth of the notch cut into the ship's tail
const SHIP_NOTCH: f64 = 10.0;
const PAUSED_COLOR: &str = "#00f3ff";
const PAUSED_FONT: &str = "24px monospace";

pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
}

impl CanvasPainter {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    pub fn paint(&self, frame: &RenderFrame) {
        let ctx = &self.ctx;
        ctx.set_global_alpha(1.0);
        ctx.set_shadow_blur(0.0);
        ctx.set_fill_style_str(TRAIL_FILL);
        ctx.fill_rect(0.0, 0.0, frame.width as f64, frame.height as f64);

        for sprite in &frame.sprites {
            self.sprite(sprite);
        }

        ctx.set_global_alpha(1.0);
        ctx.set_shadow_blur(0.0);

        if frame.paused {
            ctx.set_fill_style_str(PAUSED_COLOR);
            ctx.set_font(PAUSED_FONT);
            ctx.set_text_align("center");
            let _ = ctx.fill_text("PAUSED", frame.width as f64 / 2.0, frame.height as f64 / 2.0);
        }
    }

    fn sprite(&self, sprite: &Sprite) {
        let ctx = &self.ctx;
        let css = sprite.color.to_css();
        ctx.set_global_alpha(sprite.alpha as f64);
        ctx.set_shadow_blur(sprite.glow as f64);
        if sprite.glow > 0.0 {
            ctx.set_shadow_color(&css);
        }

        let r = sprite.rect;
        let (x, y, w, h) = (r.pos.x as f64, r.pos.y as f64, r.size.x as f64, r.size.y as f64);

        match sprite.shape {
            Shape::Bolt | Shape::Spark => {
                ctx.set_fill_style_str(&css);
                ctx.fill_rect(x, y, w, h);
            }
            Shape::Ship => {
                ctx.set_stroke_style_str(&css);
                ctx.set_line_width(LINE_WIDTH);
                ctx.begin_path();
                ctx.move_to(x + w / 2.0, y);
                ctx.line_to(x + w, y + h);
                ctx.line_to(x + w / 2.0, y + h - SHIP_NOTCH);
                ctx.line_to(x, y + h);
                ctx.close_path();
                ctx.stroke();
            }
            Shape::Invader(kind) => {
                ctx.set_stroke_style_str(&css);
                ctx.set_line_width(LINE_WIDTH);
                let (cx, cy, rad) = (x + w / 2.0, y + h / 2.0, w / 2.0);
                ctx.begin_path();
                match kind {
                    EnemyKind::Squid => {
                        ctx.move_to(cx - rad, cy - rad / 2.0);
                        ctx.line_to(cx + rad, cy - rad / 2.0);
                        ctx.line_to(cx + rad, cy + rad);
                        ctx.line_to(cx - rad, cy + rad);
                    }
                    EnemyKind::Crab => {
                        ctx.move_to(cx, cy - rad);
                        ctx.line_to(cx + rad, cy);
                        ctx.line_to(cx, cy + rad);
                        ctx.line_to(cx - rad, cy);
                    }
                    EnemyKind::Octopus => {
                        if ctx.arc(cx, cy, rad * 0.8, 0.0, TAU).is_err() {
                            log::debug!("arc rejected at ({cx}, {cy})");
                        }
                    }
                }
                ctx.close_path();
                ctx.stroke();
            }
        }
    }
}
