#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const COUNTRIES: [&str; 3] = ["Germany", "France", "Sweden"];

pub struct Fixture {
    pub fertility: PathBuf,
    pub life_expectancy: PathBuf,
    pub population: PathBuf,
}

fn fertility(ci: usize, year: i32) -> f64 {
    6.0 - (year - 1800) as f64 * 0.02 - ci as f64 * 0.1
}

fn life_exp(ci: usize, year: i32) -> f64 {
    30.0 + (year - 1800) as f64 * 0.2 + ci as f64
}

fn population(ci: usize, year: i32) -> f64 {
    1.0e6 * (ci + 1) as f64 * (1.0 + (year - 1800) as f64 / 100.0)
}

fn write_table(
    path: &Path,
    index_label: &str,
    years: &[i32],
    countries: &[&str],
    value: fn(usize, i32) -> f64,
) {
    let mut s = String::from(index_label);
    for y in years {
        write!(s, ",{y}").unwrap();
    }
    s.push('\n');
    for (ci, c) in countries.iter().enumerate() {
        s.push_str(c);
        for y in years {
            write!(s, ",{}", value(ci, *y)).unwrap();
        }
        s.push('\n');
    }
    fs::write(path, s).unwrap();
}

/// Three CSV tables sharing `years` for `countries`.
pub fn write_fixture(dir: &Path, countries: &[&str], years: &[i32]) -> Fixture {
    fs::create_dir_all(dir).unwrap();
    let fx = Fixture {
        fertility: dir.join("fertility.csv"),
        life_expectancy: dir.join("life.csv"),
        population: dir.join("population.csv"),
    };
    write_table(&fx.fertility, "Total fertility rate", years, countries, fertility);
    write_table(&fx.life_expectancy, "Life expectancy", years, countries, life_exp);
    write_table(&fx.population, "Total population", years, countries, population);
    fx
}

pub fn gapminder_years() -> Vec<i32> {
    (1800..=2015).collect()
}
