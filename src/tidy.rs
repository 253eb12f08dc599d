//! Long-form table keyed by (country, year, metric).
//!
//! Built once from the three wide tables, then only read. Rows are kept
//! sorted by key and indexed three ways so any combination of country, year
//! and metric can be sliced without scanning the whole table.

use crate::models::{Metric, Observation, TidyRow, WideTable, YearLabel};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TidyTable {
    rows: Vec<TidyRow>,
    by_country: BTreeMap<String, Vec<usize>>,
    by_year: BTreeMap<i32, Vec<usize>>,
    by_metric: BTreeMap<Metric, Vec<usize>>,
}

type Key = (String, i32);

impl TidyTable {
    /// Flatten each table row-major, union the (country, year) keys and emit
    /// one row per metric for every merged key. A metric lacking a key gets
    /// a missing value.
    pub fn build<P: YearLabel>(
        fertility: &WideTable<i32>,
        life_expectancy: &WideTable<i32>,
        population: &WideTable<P>,
    ) -> Self {
        let mut merged: BTreeMap<Key, [Option<f64>; 3]> = BTreeMap::new();
        merge_into(&mut merged, Metric::Fertility, flatten(fertility));
        merge_into(&mut merged, Metric::LifeExp, flatten(life_expectancy));
        merge_into(&mut merged, Metric::Growth, flatten(population));

        let mut table = TidyTable::default();
        table.rows.reserve(merged.len() * Metric::ALL.len());
        for ((country, year), values) in merged {
            for metric in Metric::ALL {
                let i = table.rows.len();
                table.by_country.entry(country.clone()).or_default().push(i);
                table.by_year.entry(year).or_default().push(i);
                table.by_metric.entry(metric).or_default().push(i);
                table.rows.push(TidyRow {
                    country: country.clone(),
                    year,
                    metric,
                    value: values[metric as usize],
                });
            }
        }
        info!(
            "tidy table: {} rows ({} countries x {} years x {} metrics)",
            table.rows.len(),
            table.by_country.len(),
            table.by_year.len(),
            Metric::ALL.len()
        );
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[TidyRow] {
        &self.rows
    }

    /// Distinct countries, sorted.
    pub fn countries(&self) -> Vec<&str> {
        self.by_country.keys().map(String::as_str).collect()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.by_year.keys().copied().collect()
    }

    /// Start a slice covering the whole table.
    pub fn select(&self) -> TidyView<'_> {
        TidyView {
            table: self,
            idx: (0..self.rows.len()).collect(),
        }
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.select().observations()
    }
}

/// A subset of a [`TidyTable`], narrowed by chained filters.
#[derive(Debug, Clone)]
pub struct TidyView<'a> {
    table: &'a TidyTable,
    idx: Vec<usize>,
}

impl<'a> TidyView<'a> {
    pub fn country(mut self, name: &str) -> Self {
        let hits = self.table.by_country.get(name).map(Vec::as_slice);
        self.idx = intersect(&self.idx, hits.unwrap_or(&[]));
        self
    }

    pub fn countries(mut self, names: &[&str]) -> Self {
        let hits = union(names.iter().filter_map(|n| self.table.by_country.get(*n)));
        self.idx = intersect(&self.idx, &hits);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        let hits = self.table.by_year.get(&year).map(Vec::as_slice);
        self.idx = intersect(&self.idx, hits.unwrap_or(&[]));
        self
    }

    pub fn years(mut self, range: RangeInclusive<i32>) -> Self {
        if range.is_empty() {
            self.idx.clear();
            return self;
        }
        let hits = union(self.table.by_year.range(range).map(|(_, v)| v));
        self.idx = intersect(&self.idx, &hits);
        self
    }

    pub fn metric(mut self, metric: Metric) -> Self {
        let hits = self.table.by_metric.get(&metric).map(Vec::as_slice);
        self.idx = intersect(&self.idx, hits.unwrap_or(&[]));
        self
    }

    pub fn len(&self) -> usize {
        self.idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a TidyRow> + '_ {
        let rows = &self.table.rows;
        self.idx.iter().map(move |&i| &rows[i])
    }

    /// First present value of `metric` in the slice.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.rows()
            .filter(|r| r.metric == metric)
            .find_map(|r| r.value)
    }

    /// Pivot back to one record per (country, year), ordered by country then year.
    pub fn observations(&self) -> Vec<Observation> {
        let mut out: Vec<Observation> = Vec::new();
        for row in self.rows() {
            match out.last_mut() {
                Some(o) if o.country == row.country && o.year == row.year => {
                    o.set(row.metric, row.value)
                }
                _ => {
                    let mut o = Observation::new(row.country.clone(), row.year);
                    o.set(row.metric, row.value);
                    out.push(o);
                }
            }
        }
        out
    }

    /// Distinct years in the slice, ascending.
    pub fn distinct_years(&self) -> Vec<i32> {
        let set: BTreeSet<i32> = self.rows().map(|r| r.year).collect();
        set.into_iter().collect()
    }
}

fn flatten<C: YearLabel>(table: &WideTable<C>) -> Vec<(Key, Option<f64>)> {
    let years: Vec<Option<i32>> = table.columns.iter().map(YearLabel::year).collect();
    let skipped = years.iter().filter(|y| y.is_none()).count();
    if skipped > 0 {
        warn!(
            "{}: {} column(s) without a year label left out of the tidy table",
            table.metric, skipped
        );
    }
    let mut out = Vec::with_capacity(table.rows.len() * years.len());
    for row in &table.rows {
        for (year, value) in years.iter().zip(&row.values) {
            if let Some(year) = year {
                out.push(((row.country.clone(), *year), *value));
            }
        }
    }
    out
}

fn merge_into(
    merged: &mut BTreeMap<Key, [Option<f64>; 3]>,
    metric: Metric,
    pairs: Vec<(Key, Option<f64>)>,
) {
    let slot = metric as usize;
    let mut duplicates = 0usize;
    for (key, value) in pairs {
        let entry = merged.entry(key).or_default();
        if entry[slot].is_some() && value.is_some() {
            duplicates += 1;
        }
        entry[slot] = entry[slot].or(value);
    }
    if duplicates > 0 {
        warn!("{metric}: {duplicates} duplicate (country, year) cells, first value kept");
    }
    debug!("{metric}: merged, {} keys so far", merged.len());
}

/// Both inputs ascending.
fn intersect(a: &[usize], b: &[usize]) -> Vec<usize> {
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

fn union<'a>(lists: impl Iterator<Item = &'a Vec<usize>>) -> Vec<usize> {
    let mut out: Vec<usize> = lists.flatten().copied().collect();
    out.sort_unstable();
    out.dedup();
    out
}
