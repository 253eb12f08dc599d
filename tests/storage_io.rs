use gapminder_rs::models::TidyRow;
use gapminder_rs::{Metric, storage};
use std::fs;
use tempfile::tempdir;

fn sample(n: usize) -> Vec<TidyRow> {
    (0..n)
        .map(|i| TidyRow {
            country: "Germany".into(),
            year: 2000 + i as i32,
            metric: Metric::Fertility,
            value: if i == 1 { None } else { Some(1.4 + i as f64) },
        })
        .collect()
}

#[test]
fn save_csv_and_json() {
    let rows = sample(3);
    let dir = tempdir().unwrap();

    let csv_path = dir.path().join("tidy.csv");
    storage::save_csv(&rows, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("country,year,metric,value\n"));
    assert_eq!(csv_txt.lines().count(), 1 + rows.len());
    // missing value -> empty cell
    assert!(csv_txt.contains("Germany,2001,fertility,\n"));

    let json_path = dir.path().join("tidy.json");
    storage::save_json(&rows, &json_path).unwrap();
    let json_txt = fs::read_to_string(&json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json_txt).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), rows.len());
    assert_eq!(arr[0]["metric"], "fertility");
    assert!(arr[1]["value"].is_null());
}

// A country cell opened in a spreadsheet must not run as a formula.
#[test]
fn csv_cells_are_prefixed_to_avoid_formulas() {
    let rows = vec![TidyRow {
        country: "=HYPERLINK(\"http://evil\")".into(),
        year: 2020,
        metric: Metric::LifeExp,
        value: Some(1.0),
    }];
    let dir = tempdir().unwrap();
    let path = dir.path().join("injection.csv");
    storage::save_csv(&rows, &path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let row = rdr.records().next().expect("one data row expected").unwrap();
    let country = row.get(0).unwrap();
    assert!(country.starts_with('\''), "country not prefixed: {country}");
    assert!(country.contains("=HYPERLINK"));
}
