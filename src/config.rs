//! Pipeline configuration.
//!
//! Every field has a default (see [`PipelineConfig::default`]), so a JSON
//! config file only needs the keys it wants to change:
//!
//! ```json
//! { "countries": ["Japan", "Brazil"], "first_year": 1900, "last_year": 1950 }
//! ```

use crate::animate;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed output file names inside `out_dir`.
pub const LIFE_EXPECTANCY_CHART: &str = "LifeExpectancy.svg";
pub const LIFE_VS_FERTILITY_CHART: &str = "LifeExpectancy_and_fertility.svg";
pub const ANIMATION_FILE: &str = "FertilityVsLifeExpectancy.gif";

/// Single-year scatter file name for `year`.
pub fn life_vs_fertility_year_chart(year: i32) -> String {
    format!("LifeExpectancy_and_fertility_{year}.svg")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub fertility: PathBuf,
    pub life_expectancy: PathBuf,
    pub population: PathBuf,
    pub out_dir: PathBuf,
    /// Countries drawn in the time-series chart.
    pub countries: Vec<String>,
    /// Year of the single-year scatter chart.
    pub scatter_year: i32,
    /// Inclusive animation range.
    pub first_year: i32,
    pub last_year: i32,
    /// Earliest distinct years dropped from the time-series chart.
    pub skip_years: usize,
    /// Year columns removed from the life expectancy table before normalization.
    pub drop_life_years: Vec<i32>,
    pub chart_width: u32,
    pub chart_height: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub fps: u32,
    pub animate: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fertility: PathBuf::from("data/gapminder_total_fertility.csv"),
            life_expectancy: PathBuf::from("data/gapminder_lifeexpectancy.xlsx"),
            population: PathBuf::from("data/gapminder_population.xlsx"),
            out_dir: PathBuf::from("plots"),
            countries: vec!["Germany".into(), "France".into(), "Sweden".into()],
            scatter_year: 1950,
            first_year: 1960,
            last_year: 2015,
            skip_years: 150,
            drop_life_years: vec![2016],
            chart_width: 1400,
            chart_height: 1000,
            frame_width: 1200,
            frame_height: 840,
            fps: 5,
            animate: true,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file; missing keys keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings no run could honor.
    ///
    /// An inverted animation range is not rejected here; the animator reports it.
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            bail!("fps must be at least 1");
        }
        if self.chart_width == 0 || self.chart_height == 0 {
            bail!("chart size must be non-zero");
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            bail!("frame size must be non-zero");
        }
        if self.animate && self.first_year <= self.last_year {
            animate::frame_count(self.first_year, self.last_year)?;
        }
        Ok(())
    }

    pub fn output(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = PipelineConfig::from_json(r#"{"countries": ["Japan"], "fps": 10}"#).unwrap();
        assert_eq!(cfg.countries, vec!["Japan".to_string()]);
        assert_eq!(cfg.fps, 10);
        assert_eq!(cfg.first_year, 1960);
        assert_eq!(cfg.out_dir, PathBuf::from("plots"));
    }

    #[test]
    fn unknown_keys_and_zero_fps_are_rejected() {
        assert!(PipelineConfig::from_json(r#"{"colour": "red"}"#).is_err());
        assert!(PipelineConfig::from_json(r#"{"fps": 0}"#).is_err());
    }

    #[test]
    fn absurd_animation_span_is_rejected() {
        let wide = r#"{"first_year": -2147483648, "last_year": 2147483647}"#;
        let err = PipelineConfig::from_json(wide).unwrap_err();
        assert!(err.to_string().contains("spans more than"), "{err}");
        // inverted ranges are left to the animator
        assert!(PipelineConfig::from_json(r#"{"first_year": 2000, "last_year": 1990}"#).is_ok());
        let off = r#"{"first_year": 0, "last_year": 100000, "animate": false}"#;
        assert!(PipelineConfig::from_json(off).is_ok());
    }

    #[test]
    fn year_chart_name_embeds_year() {
        assert_eq!(
            life_vs_fertility_year_chart(1950),
            "LifeExpectancy_and_fertility_1950.svg"
        );
    }
}
