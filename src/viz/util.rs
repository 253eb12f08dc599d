//! Utility functions for visualization: colors, axis ranges, marker sizes.

use plotters::prelude::*;

use super::types::{PALETTE_SPAN, POPULATION_DIVISOR};

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> RGBAColor {
    OFFICE10[idx % OFFICE10.len()].to_rgba()
}

/// Stops of the continuous frame palette (NCAR-style: navy, cyan, green,
/// yellow, red, magenta, near white).
const NCAR_STOPS: [(f64, (u8, u8, u8)); 9] = [
    (0.00, (0, 0, 128)),
    (0.12, (0, 100, 255)),
    (0.25, (0, 230, 230)),
    (0.38, (0, 220, 60)),
    (0.50, (130, 255, 0)),
    (0.62, (255, 230, 0)),
    (0.75, (255, 60, 0)),
    (0.85, (240, 0, 240)),
    (1.00, (255, 240, 255)),
];

/// Sample the continuous palette at `t` in `[0, 1]` (clamped).
pub fn continuous_color(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let upper = NCAR_STOPS
        .iter()
        .position(|(pos, _)| *pos >= t)
        .unwrap_or(NCAR_STOPS.len() - 1)
        .max(1);
    let (p0, c0) = NCAR_STOPS[upper - 1];
    let (p1, c1) = NCAR_STOPS[upper];
    let f = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    RGBColor(lerp(c0.0, c1.0), lerp(c0.1, c1.1), lerp(c0.2, c1.2))
}

/// `n` colors at evenly spaced palette positions over `[0, PALETTE_SPAN]`.
pub fn palette_by_position(n: usize) -> Vec<RGBColor> {
    match n {
        0 => Vec::new(),
        1 => vec![continuous_color(0.0)],
        _ => (0..n)
            .map(|i| continuous_color(PALETTE_SPAN * i as f64 / (n - 1) as f64))
            .collect(),
    }
}

/// Marker radius in pixels for a population, on a plot `width_px` wide.
///
/// The marker *area* is proportional to `population / POPULATION_DIVISOR`
/// (read as square points on a 20in, 100dpi figure).
pub fn marker_radius(population: f64, width_px: u32) -> i32 {
    if !population.is_finite() || population <= 0.0 {
        return 1;
    }
    let diameter_pt = (population / POPULATION_DIVISOR).sqrt();
    let px_per_pt = 100.0 / 72.0 * (width_px as f64 / 2000.0);
    ((diameter_pt * px_per_pt / 2.0).round() as i32).max(1)
}

/// Data bounds of `values` with a little padding; a flat range is widened by one.
/// `None` when there are no finite values.
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.into_iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo > hi {
        return None;
    }
    if (hi - lo).abs() < f64::EPSILON {
        return Some((lo - 1.0, hi + 1.0));
    }
    let pad = (hi - lo) * 0.05;
    Some((lo - pad, hi + pad))
}

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Left label area wide enough for the widest formatted tick label.
pub fn left_label_area_px<'a>(labels: impl IntoIterator<Item = &'a str>, font_px: u32) -> u32 {
    let widest = labels
        .into_iter()
        .map(|s| estimate_text_width_px(s, font_px))
        .max()
        .unwrap_or(0);
    // room for the axis title and tick marks
    (widest + font_px + 30).clamp(56, 160)
}

/// Tick label with precision shrinking as magnitude grows.
pub fn format_tick(v: f64) -> String {
    let a = v.abs();
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    format!("{:.*}", prec, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_spans_start_to_ninety_percent() {
        let p = palette_by_position(5);
        assert_eq!(p.len(), 5);
        assert_eq!(p[0], continuous_color(0.0));
        assert_eq!(p[4], continuous_color(0.9));
        assert_eq!(continuous_color(0.0), RGBColor(0, 0, 128));
        assert_eq!(continuous_color(1.0), RGBColor(255, 240, 255));
        assert!(palette_by_position(0).is_empty());
    }

    #[test]
    fn marker_area_grows_with_population() {
        let small = marker_radius(1.0e6, 2000);
        let big = marker_radius(1.0e8, 2000);
        // area ratio 100 -> radius ratio 10
        assert!((big as f64 / small as f64 - 10.0).abs() < 1.5);
        assert_eq!(marker_radius(f64::NAN, 2000), 1);
        assert_eq!(marker_radius(0.0, 2000), 1);
    }

    #[test]
    fn padded_range_handles_flat_and_empty() {
        assert_eq!(padded_range([3.0, 3.0]), Some((2.0, 4.0)));
        assert_eq!(padded_range(std::iter::empty()), None);
        let (lo, hi) = padded_range([0.0, 10.0, f64::NAN]).unwrap();
        assert!(lo < 0.0 && hi > 10.0);
    }
}
