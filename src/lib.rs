//! gapminder_rs
//!
//! Reshape the Gapminder fertility, life expectancy and population tables into
//! one tidy (country, year, metric) table, then chart it and animate it.
//! Pairs with the `gapminder` CLI.
//!
//! ### Features
//! - Load wide tables from CSV or spreadsheets (xlsx/xls/ods)
//! - Tidy table with slicing by country, year and metric
//! - SVG/PNG charts: time series and life expectancy vs. fertility scatters
//! - Animated GIF of one frame per year
//! - Export the tidy table as CSV or JSON, with grouped summary statistics
//!
//! ### Example
//! ```no_run
//! use gapminder_rs::{PipelineConfig, pipeline};
//!
//! let cfg = PipelineConfig {
//!     first_year: 1990,
//!     last_year: 2000,
//!     ..PipelineConfig::default()
//! };
//! let report = pipeline::run(&cfg)?;
//! println!("{} tidy rows, {} charts", report.tidy_rows, report.charts.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod animate;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod stats;
pub mod storage;
pub mod tidy;
pub mod viz;

pub use config::PipelineConfig;
pub use error::Error;
pub use models::{Metric, Observation, TidyRow, WideTable};
pub use tidy::{TidyTable, TidyView};
