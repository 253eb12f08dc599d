use crate::models::{GroupKey, TidyRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics for a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub key: GroupKey,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute grouped statistics by (metric, country).
///
/// Groups made only of missing values are reported with `count == 0`.
pub fn grouped_summary<'a>(rows: impl IntoIterator<Item = &'a TidyRow>) -> Vec<Summary> {
    let mut groups: BTreeMap<GroupKey, (Vec<f64>, usize)> = BTreeMap::new();
    for r in rows {
        let key = GroupKey {
            metric: r.metric,
            country: r.country.clone(),
        };
        let entry = groups.entry(key).or_default();
        match r.value {
            Some(v) => entry.0.push(v),
            None => entry.1 += 1,
        }
    }

    let mut out = Vec::with_capacity(groups.len());
    for (key, (mut vals, missing)) in groups {
        vals.sort_by(f64::total_cmp);
        let count = vals.len();
        let min = vals.first().copied();
        let max = vals.last().copied();
        let mean = (count > 0).then(|| vals.iter().sum::<f64>() / count as f64);
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        out.push(Summary {
            key,
            count,
            missing,
            min,
            max,
            mean,
            median,
        });
    }
    out
}
