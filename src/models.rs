use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// The three series carried by the tidy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "fertility")]
    Fertility,
    #[serde(rename = "lifeExp")]
    LifeExp,
    /// Total population.
    #[serde(rename = "growth")]
    Growth,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Fertility, Metric::LifeExp, Metric::Growth];

    /// Short key used in exports and legends.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Fertility => "fertility",
            Metric::LifeExp => "lifeExp",
            Metric::Growth => "growth",
        }
    }

    /// Human readable name for log lines and chart text.
    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::Fertility => "Total fertility rate",
            Metric::LifeExp => "Life expectancy",
            Metric::Growth => "Total population",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column label that may denote a year.
pub trait YearLabel {
    fn year(&self) -> Option<i32>;
}

impl YearLabel for i32 {
    fn year(&self) -> Option<i32> {
        Some(*self)
    }
}

impl YearLabel for String {
    fn year(&self) -> Option<i32> {
        parse_year(self)
    }
}

/// Parse a year label as written by spreadsheets and CSV exports.
///
/// Accepts `1800`, ` 1800 ` and `1800.0`; anything else is `None`.
pub fn parse_year(label: &str) -> Option<i32> {
    static YEAR_RE: OnceLock<Regex> = OnceLock::new();
    let re = YEAR_RE.get_or_init(|| {
        Regex::new(r"^\s*(-?\d{1,6})(?:\.0*)?\s*$").expect("static year pattern is valid")
    });
    re.captures(label)?.get(1)?.as_str().parse().ok()
}

/// One country row of a wide table.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub country: String,
    pub values: Vec<Option<f64>>,
}

/// Country x year grid for a single metric.
///
/// `C` is the column label type: raw `String`s straight from the source file,
/// or `i32` years once normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable<C> {
    pub metric: Metric,
    /// Header of the index column, e.g. "Total fertility rate".
    pub index_label: String,
    pub columns: Vec<C>,
    pub rows: Vec<WideRow>,
}

impl<C> WideTable<C> {
    pub fn new(metric: Metric, index_label: impl Into<String>, columns: Vec<C>) -> Self {
        Self {
            metric,
            index_label: index_label.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; short rows are padded with missing cells.
    pub fn push_row(&mut self, country: impl Into<String>, mut values: Vec<Option<f64>>) {
        values.resize(self.columns.len(), None);
        self.rows.push(WideRow {
            country: country.into(),
            values,
        });
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.country.as_str())
    }

    /// Replace the column labels, keeping cells in place.
    ///
    /// Callers guarantee `columns.len()` matches the current column count.
    pub(crate) fn relabel<D>(self, columns: Vec<D>) -> WideTable<D> {
        debug_assert_eq!(columns.len(), self.columns.len());
        WideTable {
            metric: self.metric,
            index_label: self.index_label,
            columns,
            rows: self.rows,
        }
    }
}

impl<C: YearLabel> WideTable<C> {
    /// Remove every column whose label denotes one of `years`.
    pub fn drop_years(&mut self, years: &[i32]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| c.year().is_none_or(|y| !years.contains(&y)))
            .collect();
        if keep.iter().all(|k| *k) {
            return;
        }
        let mut idx = 0;
        self.columns.retain(|_| {
            idx += 1;
            keep[idx - 1]
        });
        for row in &mut self.rows {
            let mut idx = 0;
            row.values.retain(|_| {
                idx += 1;
                keep[idx - 1]
            });
        }
    }
}

/// Tidy structure used by this crate (one row = one (country, year, metric) value).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TidyRow {
    pub country: String,
    pub year: i32,
    pub metric: Metric,
    pub value: Option<f64>,
}

/// All three metrics of one (country, year) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub country: String,
    pub year: i32,
    pub fertility: Option<f64>,
    pub life_exp: Option<f64>,
    pub growth: Option<f64>,
}

impl Observation {
    pub fn new(country: impl Into<String>, year: i32) -> Self {
        Self {
            country: country.into(),
            year,
            fertility: None,
            life_exp: None,
            growth: None,
        }
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Fertility => self.fertility,
            Metric::LifeExp => self.life_exp,
            Metric::Growth => self.growth,
        }
    }

    pub(crate) fn set(&mut self, metric: Metric, value: Option<f64>) {
        match metric {
            Metric::Fertility => self.fertility = value,
            Metric::LifeExp => self.life_exp = value,
            Metric::Growth => self.growth = value,
        }
    }

    /// (life expectancy, fertility) when both are present.
    pub fn life_fertility(&self) -> Option<(f64, f64)> {
        Some((self.life_exp?, self.fertility?))
    }
}

/// Grouping key used in stats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub metric: Metric,
    pub country: String,
}
