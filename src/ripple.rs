//! Press ripple for preference rows.
//!
//! A pure per-frame function: given the time since the press and where it
//! landed, produce what to draw. The caller keeps the press timestamp and
//! schedules another frame while `needs_redraw()` holds.

use serde::Serialize;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleStyle {
    pub duration: Duration,
    pub max_radius: f32,
    pub peak_alpha: f32,
}

impl Default for RippleStyle {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(300),
            max_radius: 48.0,
            peak_alpha: 0.25,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PressPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderInstruction {
    Circle {
        center: PressPoint,
        radius: f32,
        alpha: f32,
    },
    Idle,
}

impl RenderInstruction {
    pub fn needs_redraw(&self) -> bool {
        matches!(self, RenderInstruction::Circle { .. })
    }
}

/// Ripple state `elapsed` after a press at `press`.
pub fn frame(style: &RippleStyle, elapsed: Duration, press: PressPoint) -> RenderInstruction {
    let total = style.duration.as_secs_f32();
    if total <= 0.0 {
        return RenderInstruction::Idle;
    }
    let t = (elapsed.as_secs_f32() / total).clamp(0.0, 1.0);
    if t >= 1.0 {
        return RenderInstruction::Idle;
    }
    RenderInstruction::Circle {
        center: press,
        radius: style.max_radius * ease_out(t),
        alpha: style.peak_alpha * (1.0 - t),
    }
}

fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}
