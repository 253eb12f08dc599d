//! Public types and constants for the visualization module.

use crate::models::Metric;
use plotters::style::RGBAColor;

/// Fixed frame axes, shared by every animation frame so the scale never jumps.
pub const FRAME_LIFE_EXP_RANGE: (f64, f64) = (0.0, 90.0);
pub const FRAME_FERTILITY_RANGE: (f64, f64) = (0.0, 10.0);

/// Population is divided by this before it becomes a marker area.
pub const POPULATION_DIVISOR: f64 = 50_000.0;

/// Marker opacity in animation frames.
pub const FRAME_ALPHA: f64 = 0.4;

/// Palette positions used by frame markers span `[0, PALETTE_SPAN]`.
pub const PALETTE_SPAN: f64 = 0.9;

/// Default earliest-year trim for the time-series chart.
pub const DEFAULT_SKIP_YEARS: usize = 150;

/// One line of the time-series chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub country: String,
    pub metric: Metric,
    /// (year, value), ascending by year.
    pub points: Vec<(i32, f64)>,
}

impl Series {
    pub fn label(&self) -> String {
        format!("{}, {}", self.country, self.metric)
    }
}

/// One marker of an animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bubble {
    pub life_exp: f64,
    pub fertility: f64,
    pub radius: i32,
    pub color: RGBAColor,
}
