use gapminder_rs::Metric;
use gapminder_rs::models::{GroupKey, TidyRow};
use gapminder_rs::stats::grouped_summary;

fn row(metric: Metric, country: &str, year: i32, v: Option<f64>) -> TidyRow {
    TidyRow {
        country: country.into(),
        year,
        metric,
        value: v,
    }
}

#[test]
fn grouped_stats_handle_missing_and_median_even_odd() {
    // (fertility, France) with [1,2,3,4] -> median = (2+3)/2 = 2.5
    // (fertility, Sweden) with [10, None, 30] -> missing = 1, median = 20
    let rows = vec![
        row(Metric::Fertility, "France", 2018, Some(1.0)),
        row(Metric::Fertility, "France", 2019, Some(2.0)),
        row(Metric::Fertility, "France", 2020, Some(3.0)),
        row(Metric::Fertility, "France", 2021, Some(4.0)),
        row(Metric::Fertility, "Sweden", 2018, Some(10.0)),
        row(Metric::Fertility, "Sweden", 2019, None),
        row(Metric::Fertility, "Sweden", 2020, Some(30.0)),
    ];
    let got = grouped_summary(&rows);
    assert_eq!(got.len(), 2);

    let a = &got[0];
    assert_eq!(
        a.key,
        GroupKey {
            metric: Metric::Fertility,
            country: "France".into()
        }
    );
    assert_eq!(a.count, 4);
    assert_eq!(a.missing, 0);
    assert_eq!(a.min, Some(1.0));
    assert_eq!(a.max, Some(4.0));
    assert!((a.mean.unwrap() - 2.5).abs() < 1e-9);
    assert!((a.median.unwrap() - 2.5).abs() < 1e-9);

    let b = &got[1];
    assert_eq!(b.key.country, "Sweden");
    assert_eq!(b.count, 2);
    assert_eq!(b.missing, 1);
    assert_eq!(b.mean, Some(20.0));
    assert_eq!(b.median, Some(20.0));
}

#[test]
fn all_missing_group_is_reported_empty() {
    let rows = vec![
        row(Metric::Growth, "Atlantis", 1800, None),
        row(Metric::Growth, "Atlantis", 1801, None),
    ];
    let got = grouped_summary(&rows);
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].count, 0);
    assert_eq!(got[0].missing, 2);
    assert_eq!(got[0].mean, None);
    assert_eq!(got[0].median, None);
}
