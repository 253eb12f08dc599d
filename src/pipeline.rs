//! End-to-end run: load, reshape, chart, animate.

use crate::animate::{self, AnimationOptions, AnimationReport};
use crate::config::{
    ANIMATION_FILE, LIFE_EXPECTANCY_CHART, LIFE_VS_FERTILITY_CHART, PipelineConfig,
    life_vs_fertility_year_chart,
};
use crate::loader;
use crate::models::Metric;
use crate::tidy::TidyTable;
use crate::viz;
use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub tidy_rows: usize,
    pub charts: Vec<PathBuf>,
    pub animation: Option<AnimationReport>,
}

/// Load the three source tables and reshape them.
pub fn load_tidy(cfg: &PipelineConfig) -> Result<TidyTable> {
    let fertility = loader::load_table(&cfg.fertility, Metric::Fertility)
        .context("load fertility table")?;
    let mut life = loader::load_table(&cfg.life_expectancy, Metric::LifeExp)
        .context("load life expectancy table")?;
    let population = loader::load_table(&cfg.population, Metric::Growth)
        .context("load population table")?;

    life.drop_years(&cfg.drop_life_years);
    let (fertility, life, population) =
        loader::normalize_years(fertility, life, population).context("normalize year labels")?;
    Ok(TidyTable::build(&fertility, &life, &population))
}

/// Run every stage with `cfg`.
pub fn run(cfg: &PipelineConfig) -> Result<RunReport> {
    cfg.validate()?;
    let table = load_tidy(cfg)?;
    render_all(&table, cfg)
}

/// Charts and animation from an already built table.
pub fn render_all(table: &TidyTable, cfg: &PipelineConfig) -> Result<RunReport> {
    std::fs::create_dir_all(&cfg.out_dir)
        .with_context(|| format!("create output directory {}", cfg.out_dir.display()))?;
    let (w, h) = (cfg.chart_width, cfg.chart_height);
    let mut charts = Vec::new();

    let path = cfg.output(LIFE_EXPECTANCY_CHART);
    let series = viz::plot_life_expectancy(table, &cfg.countries, cfg.skip_years, &path, w, h)?;
    info!("{}: {} series", path.display(), series.len());
    charts.push(path);

    let path = cfg.output(LIFE_VS_FERTILITY_CHART);
    let n = viz::plot_life_exp_vs_fertility(table, &path, w, h)?;
    info!("{}: {} points", path.display(), n);
    charts.push(path);

    let path = cfg.output(&life_vs_fertility_year_chart(cfg.scatter_year));
    let n = viz::plot_life_exp_vs_fertility_year(table, cfg.scatter_year, &path, w, h)?;
    info!("{}: {} points", path.display(), n);
    charts.push(path);

    let animation = if cfg.animate {
        let opts = AnimationOptions {
            width: cfg.frame_width,
            height: cfg.frame_height,
            fps: cfg.fps,
        };
        let out = cfg.output(ANIMATION_FILE);
        let report = animate::animate(
            table,
            cfg.first_year,
            cfg.last_year,
            &cfg.out_dir,
            &out,
            &opts,
        )
        .with_context(|| format!("animate {}..={}", cfg.first_year, cfg.last_year))?;
        Some(report)
    } else {
        None
    };

    Ok(RunReport {
        tidy_rows: table.len(),
        charts,
        animation,
    })
}
