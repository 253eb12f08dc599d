//! Visualization: render charts from the tidy table to **SVG** or **PNG**.
//!
//! - Time series of life expectancy and fertility for chosen countries
//! - Life expectancy vs. fertility scatter, over all years or one year
//! - Animation frame: one year, marker size by population, fixed axes
//!
//! The backend follows the output extension (`.svg` -> SVG, anything else -> PNG).
//! Absent countries or years never fail a chart; they leave it empty.

pub mod types;
pub mod util;

pub use types::{Bubble, DEFAULT_SKIP_YEARS, Series};

use crate::models::{Metric, Observation};
use crate::tidy::TidyTable;
use anyhow::{Context, Result, anyhow};
use log::{debug, warn};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::LineSeries;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Once;

use types::{FRAME_ALPHA, FRAME_FERTILITY_RANGE, FRAME_LIFE_EXP_RANGE};
use util::{
    format_tick, left_label_area_px, marker_radius, office_color, padded_range,
    palette_by_position,
};

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        // from `src/viz/mod.rs` → project root → `assets/DejaVuSans.ttf`
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

const BLUE_TITLE: RGBColor = RGBColor(0, 0, 255);
const GREEN_TITLE: RGBColor = RGBColor(0, 128, 0);

/// A chart that can draw itself onto any Plotters backend.
trait Render {
    fn render<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> Result<()>;
}

fn render_to_path<R: Render>(chart: &R, out_path: &Path, width: u32, height: u32) -> Result<()> {
    ensure_fonts_registered();
    let path_string = out_path.to_string_lossy().into_owned();
    let drawn = if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        chart.render(root)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        chart.render(root)
    };
    drawn.with_context(|| format!("render {}", out_path.display()))?;
    debug!("wrote {}", out_path.display());
    Ok(())
}

// ----------------------------
// Time series
// ----------------------------

/// Life expectancy and fertility series for `countries`, after dropping the
/// earliest `skip_years` distinct years of the table.
///
/// Countries without any value are left out (and logged).
pub fn life_expectancy_series(
    table: &TidyTable,
    countries: &[String],
    skip_years: usize,
) -> Vec<Series> {
    let years = table.years();
    let (Some(&first), Some(&last)) = (years.get(skip_years), years.last()) else {
        warn!(
            "time series: table has {} years, all dropped by a trim of {}",
            years.len(),
            skip_years
        );
        return Vec::new();
    };

    let mut out = Vec::with_capacity(countries.len() * 2);
    for country in countries {
        let slice = table.select().country(country).years(first..=last);
        if slice.is_empty() {
            warn!("time series: no rows for {country:?}");
            continue;
        }
        for metric in [Metric::LifeExp, Metric::Fertility] {
            let points: Vec<(i32, f64)> = slice
                .clone()
                .metric(metric)
                .rows()
                .filter_map(|r| r.value.map(|v| (r.year, v)))
                .collect();
            out.push(Series {
                country: country.clone(),
                metric,
                points,
            });
        }
    }
    out
}

/// Line chart of life expectancy and fertility over time for `countries`.
pub fn plot_life_expectancy<P: AsRef<Path>>(
    table: &TidyTable,
    countries: &[String],
    skip_years: usize,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<Vec<Series>> {
    let series = life_expectancy_series(table, countries, skip_years);
    let chart = TimeSeriesChart {
        title: "Life expectancy and offspring changes in subset countries",
        series: &series,
    };
    render_to_path(&chart, out_path.as_ref(), width, height)?;
    Ok(series)
}

struct TimeSeriesChart<'a> {
    title: &'a str,
    series: &'a [Series],
}

impl Render for TimeSeriesChart<'_> {
    fn render<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

        let all = self.series.iter().flat_map(|s| s.points.iter());
        let (x_min, x_max) = padded_range(all.clone().map(|(y, _)| *y as f64)).unwrap_or((0.0, 1.0));
        let (y_min, y_max) = padded_range(all.map(|(_, v)| *v)).unwrap_or((0.0, 1.0));

        let y_ticks: Vec<String> = [y_min, y_max].iter().map(|v| format_tick(*v)).collect();
        let left = left_label_area_px(y_ticks.iter().map(String::as_str), 14);

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(
                self.title,
                TextStyle::from((FontFamily::SansSerif, 28)).color(&BLUE_TITLE),
            )
            .set_label_area_size(LabelAreaPosition::Left, left)
            .set_label_area_size(LabelAreaPosition::Bottom, 56)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| anyhow!("{:?}", e))?;

        let x_label_fmt = |x: &f64| (x.round() as i32).to_string();
        let y_label_fmt = |v: &f64| format_tick(*v);
        chart
            .configure_mesh()
            .x_desc("Years")
            .y_desc("Rate of change")
            .x_labels(12)
            .y_labels(10)
            .x_label_formatter(&x_label_fmt)
            .y_label_formatter(&y_label_fmt)
            .label_style((FontFamily::SansSerif, 14))
            .axis_desc_style((FontFamily::SansSerif, 16))
            .draw()
            .map_err(|e| anyhow!("{:?}", e))?;

        for (idx, s) in self.series.iter().enumerate() {
            let color = office_color(idx);
            let style = ShapeStyle {
                color,
                filled: false,
                stroke_width: 2,
            };
            let points: Vec<(f64, f64)> = s.points.iter().map(|(y, v)| (*y as f64, *v)).collect();
            chart
                .draw_series(LineSeries::new(points, style))
                .map_err(|e| anyhow!("{:?}", e))?
                .label(s.label())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(2)));
        }

        if !self.series.is_empty() {
            chart
                .configure_series_labels()
                .border_style(BLACK)
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.85))
                .label_font((FontFamily::SansSerif, 14))
                .draw()
                .map_err(|e| anyhow!("{:?}", e))?;
        }

        root.present().map_err(|e| anyhow!("{:?}", e))?;
        Ok(())
    }
}

// ----------------------------
// Scatter
// ----------------------------

/// Life expectancy vs. fertility for every (country, year) pair.
pub fn plot_life_exp_vs_fertility<P: AsRef<Path>>(
    table: &TidyTable,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<usize> {
    let points = scatter_points(&table.observations());
    let chart = ScatterChart {
        title: "Life expectancy and offspring changes overtime".to_string(),
        title_color: BLUE_TITLE,
        marker: RGBColor(255, 0, 0),
        points: &points,
    };
    render_to_path(&chart, out_path.as_ref(), width, height)?;
    Ok(points.len())
}

/// Life expectancy vs. fertility for a single year.
pub fn plot_life_exp_vs_fertility_year<P: AsRef<Path>>(
    table: &TidyTable,
    year: i32,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<usize> {
    let slice = table.select().year(year);
    if slice.is_empty() {
        warn!("scatter: no rows for {year}");
    }
    let points = scatter_points(&slice.observations());
    let chart = ScatterChart {
        title: format!("Life expectancy and offspring changes in {year}"),
        title_color: GREEN_TITLE,
        marker: GREEN_TITLE,
        points: &points,
    };
    render_to_path(&chart, out_path.as_ref(), width, height)?;
    Ok(points.len())
}

fn scatter_points(observations: &[Observation]) -> Vec<(f64, f64)> {
    observations
        .iter()
        .filter_map(Observation::life_fertility)
        .collect()
}

struct ScatterChart<'a> {
    title: String,
    title_color: RGBColor,
    marker: RGBColor,
    points: &'a [(f64, f64)],
}

impl Render for ScatterChart<'_> {
    fn render<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

        let x = padded_range(self.points.iter().map(|p| p.0)).unwrap_or(FRAME_LIFE_EXP_RANGE);
        let y = padded_range(self.points.iter().map(|p| p.1)).unwrap_or(FRAME_FERTILITY_RANGE);

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(
                &self.title,
                TextStyle::from((FontFamily::SansSerif, 28)).color(&self.title_color),
            )
            .set_label_area_size(LabelAreaPosition::Left, 72)
            .set_label_area_size(LabelAreaPosition::Bottom, 56)
            .build_cartesian_2d(x.0..x.1, y.0..y.1)
            .map_err(|e| anyhow!("{:?}", e))?;

        let x_label_fmt = |v: &f64| format!("{:.0}", v);
        let y_label_fmt = |v: &f64| format!("{:.1}", v);
        chart
            .configure_mesh()
            .x_desc("Life expectancy(Years)")
            .y_desc("Number of children")
            .x_label_formatter(&x_label_fmt)
            .y_label_formatter(&y_label_fmt)
            .label_style((FontFamily::SansSerif, 14))
            .axis_desc_style((FontFamily::SansSerif, 16))
            .draw()
            .map_err(|e| anyhow!("{:?}", e))?;

        let style = self.marker.filled();
        chart
            .draw_series(self.points.iter().map(|(x, y)| Circle::new((*x, *y), 1, style)))
            .map_err(|e| anyhow!("{:?}", e))?;

        root.present().map_err(|e| anyhow!("{:?}", e))?;
        Ok(())
    }
}

// ----------------------------
// Animation frame
// ----------------------------

/// Markers for one year: every observation of that year gets a palette
/// position by row order; those with both axes and a population are drawn.
pub fn frame_bubbles(table: &TidyTable, year: i32, width_px: u32) -> Vec<Bubble> {
    let observations = table.select().year(year).observations();
    let palette = palette_by_position(observations.len());
    observations
        .iter()
        .zip(palette)
        .filter_map(|(o, color)| {
            let (life_exp, fertility) = o.life_fertility()?;
            let population = o.growth?;
            Some(Bubble {
                life_exp,
                fertility,
                radius: marker_radius(population, width_px),
                color: color.mix(FRAME_ALPHA),
            })
        })
        .collect()
}

/// Frame chart for `year` with fixed axes, titled with the whole animation range.
pub fn plot_one_year<P: AsRef<Path>>(
    table: &TidyTable,
    year: i32,
    first: i32,
    last: i32,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<usize> {
    let bubbles = frame_bubbles(table, year, width);
    if bubbles.is_empty() {
        warn!("frame {year}: nothing to draw");
    }
    let chart = FrameChart {
        title: format!("Life expectancy versus offspring from {first} to {last}"),
        year,
        bubbles: &bubbles,
    };
    render_to_path(&chart, out_path.as_ref(), width, height)?;
    Ok(bubbles.len())
}

struct FrameChart<'a> {
    title: String,
    year: i32,
    bubbles: &'a [Bubble],
}

impl Render for FrameChart<'_> {
    fn render<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

        let (x0, x1) = FRAME_LIFE_EXP_RANGE;
        let (y0, y1) = FRAME_FERTILITY_RANGE;
        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(
                &self.title,
                TextStyle::from((FontFamily::SansSerif, 28)).color(&GREEN_TITLE),
            )
            .set_label_area_size(LabelAreaPosition::Left, 64)
            .set_label_area_size(LabelAreaPosition::Bottom, 56)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(|e| anyhow!("{:?}", e))?;

        let x_label_fmt = |v: &f64| format!("{:.0}", v);
        let y_label_fmt = |v: &f64| format!("{:.0}", v);
        chart
            .configure_mesh()
            .x_desc("Life Expectancy (Years)")
            .y_desc("Number of Children")
            .x_label_formatter(&x_label_fmt)
            .y_label_formatter(&y_label_fmt)
            .label_style((FontFamily::SansSerif, 14))
            .axis_desc_style((FontFamily::SansSerif, 16))
            .draw()
            .map_err(|e| anyhow!("{:?}", e))?;

        // year stamp at 85% / 85% of the plot area
        let year_style =
            TextStyle::from((FontFamily::SansSerif, 80)).pos(Pos::new(HPos::Center, VPos::Center));
        chart
            .draw_series(std::iter::once(Text::new(
                self.year.to_string(),
                (x0 + (x1 - x0) * 0.85, y0 + (y1 - y0) * 0.85),
                year_style,
            )))
            .map_err(|e| anyhow!("{:?}", e))?;

        chart
            .draw_series(self.bubbles.iter().map(|b| {
                Circle::new((b.life_exp, b.fertility), b.radius, b.color.filled())
            }))
            .map_err(|e| anyhow!("{:?}", e))?;

        root.present().map_err(|e| anyhow!("{:?}", e))?;
        Ok(())
    }
}
