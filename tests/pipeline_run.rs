mod common;

use common::{COUNTRIES, write_fixture};
use gapminder_rs::{PipelineConfig, pipeline};
use tempfile::tempdir;

#[test]
fn json_config_drives_a_full_run() {
    let dir = tempdir().unwrap();
    let years: Vec<i32> = (1990..=1995).collect();
    let fx = write_fixture(&dir.path().join("data"), &COUNTRIES, &years);
    let plots = dir.path().join("plots");

    let json = serde_json::json!({
        "fertility": fx.fertility,
        "life_expectancy": fx.life_expectancy,
        "population": fx.population,
        "out_dir": plots,
        "countries": ["France"],
        "skip_years": 2,
        "scatter_year": 1993,
        "first_year": 1992,
        "last_year": 1994,
        "chart_width": 640,
        "chart_height": 480,
        "frame_width": 320,
        "frame_height": 224
    });
    let cfg_path = dir.path().join("config.json");
    std::fs::write(&cfg_path, json.to_string()).unwrap();

    let cfg = PipelineConfig::load(&cfg_path).unwrap();
    let report = pipeline::run(&cfg).unwrap();

    assert_eq!(report.tidy_rows, 3 * years.len() * 3);
    assert_eq!(
        report.charts,
        vec![
            plots.join("LifeExpectancy.svg"),
            plots.join("LifeExpectancy_and_fertility.svg"),
            plots.join("LifeExpectancy_and_fertility_1993.svg"),
        ]
    );
    assert!(report.charts.iter().all(|p| p.exists()));

    let anim = report.animation.expect("animation enabled by default");
    assert_eq!(anim.years, vec![1992, 1993, 1994]);
    assert_eq!(anim.frames_removed, 3);
    assert!(plots.join("FertilityVsLifeExpectancy.gif").exists());
}

#[test]
fn inverted_animation_range_fails_the_run_after_static_charts() {
    let dir = tempdir().unwrap();
    let fx = write_fixture(&dir.path().join("data"), &COUNTRIES, &[2000, 2001]);
    let plots = dir.path().join("plots");
    let cfg = PipelineConfig {
        fertility: fx.fertility,
        life_expectancy: fx.life_expectancy,
        population: fx.population,
        out_dir: plots.clone(),
        first_year: 2001,
        last_year: 2000,
        chart_width: 400,
        chart_height: 300,
        ..PipelineConfig::default()
    };
    let err = pipeline::run(&cfg).unwrap_err();
    assert!(format!("{err:#}").contains("empty year range"));
    assert!(plots.join("LifeExpectancy.svg").exists());
    assert!(!plots.join("FertilityVsLifeExpectancy.gif").exists());
}

#[test]
fn disabled_animation_skips_frames() {
    let dir = tempdir().unwrap();
    let fx = write_fixture(&dir.path().join("data"), &COUNTRIES, &[2000, 2001]);
    let cfg = PipelineConfig {
        fertility: fx.fertility,
        life_expectancy: fx.life_expectancy,
        population: fx.population,
        out_dir: dir.path().join("plots"),
        animate: false,
        chart_width: 400,
        chart_height: 300,
        ..PipelineConfig::default()
    };
    let report = pipeline::run(&cfg).unwrap();
    assert!(report.animation.is_none());
    assert_eq!(report.charts.len(), 3);
}
