mod common;

use common::{COUNTRIES, gapminder_years, write_fixture};
use gapminder_rs::loader::{load_table, normalize_years};
use gapminder_rs::{Metric, PipelineConfig, TidyTable, pipeline};
use tempfile::tempdir;

fn build(dir: &std::path::Path, years: &[i32]) -> TidyTable {
    let fx = write_fixture(dir, &COUNTRIES, years);
    let f = load_table(&fx.fertility, Metric::Fertility).unwrap();
    let l = load_table(&fx.life_expectancy, Metric::LifeExp).unwrap();
    let p = load_table(&fx.population, Metric::Growth).unwrap();
    let (f, l, p) = normalize_years(f, l, p).unwrap();
    TidyTable::build(&f, &l, &p)
}

#[test]
fn shared_year_domain_gives_full_grid() {
    let dir = tempdir().unwrap();
    let years = gapminder_years();
    let table = build(dir.path(), &years);
    assert_eq!(table.len(), COUNTRIES.len() * years.len() * 3);
    assert_eq!(table.years().first(), Some(&1800));
    assert_eq!(table.years().last(), Some(&2015));
    assert!(table.rows().iter().all(|r| r.value.is_some()));
}

#[test]
fn reshaping_twice_is_identical() {
    let dir = tempdir().unwrap();
    let years: Vec<i32> = (1990..=2000).collect();
    assert_eq!(build(dir.path(), &years), build(dir.path(), &years));
}

#[test]
fn year_then_country_slice_has_at_most_one_value_per_metric() {
    let dir = tempdir().unwrap();
    let years: Vec<i32> = (1990..=2000).collect();
    let table = build(dir.path(), &years);
    for year in [1989, 1990, 1995, 2000] {
        for country in ["Germany", "Sweden", "Narnia"] {
            let slice = table.select().year(year).country(country);
            for m in Metric::ALL {
                assert!(slice.rows().filter(|r| r.metric == m).count() <= 1);
            }
        }
    }
    let obs = table.select().year(1995).country("France").observations();
    assert_eq!(obs.len(), 1);
    assert!((obs[0].life_exp.unwrap() - (30.0 + 195.0 * 0.2 + 1.0)).abs() < 1e-9);
}

#[test]
fn pipeline_load_drops_configured_life_years() {
    let dir = tempdir().unwrap();
    let years: Vec<i32> = (2013..=2016).collect();
    let fx = write_fixture(dir.path(), &COUNTRIES, &years);
    // fertility lacks 2016, like the real data set
    let fert_years: Vec<i32> = (2013..=2015).collect();
    let fert_only = write_fixture(&dir.path().join("f"), &COUNTRIES, &fert_years);
    let cfg = PipelineConfig {
        fertility: fert_only.fertility,
        life_expectancy: fx.life_expectancy,
        population: fx.population,
        ..PipelineConfig::default()
    };
    let table = pipeline::load_tidy(&cfg).unwrap();
    // population still carries 2016, which reappears with missing fertility/lifeExp
    assert_eq!(table.years(), vec![2013, 2014, 2015, 2016]);
    let y2016 = table.select().year(2016);
    assert_eq!(y2016.value(Metric::LifeExp), None);
    assert_eq!(y2016.value(Metric::Fertility), None);
    assert!(y2016.value(Metric::Growth).is_some());
}

#[test]
fn mismatched_fertility_columns_fail_normalization() {
    let dir = tempdir().unwrap();
    let fx = write_fixture(dir.path(), &COUNTRIES, &[2000, 2001, 2002]);
    let short = write_fixture(&dir.path().join("short"), &COUNTRIES, &[2000, 2001]);
    let cfg = PipelineConfig {
        fertility: short.fertility,
        life_expectancy: fx.life_expectancy,
        population: fx.population,
        drop_life_years: vec![],
        ..PipelineConfig::default()
    };
    let err = pipeline::load_tidy(&cfg).unwrap_err();
    assert!(format!("{err:#}").contains("year columns"));
}
