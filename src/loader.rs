//! Read the three wide source tables and normalize their year labels.
//!
//! Fertility ships as CSV; life expectancy and population ship as spreadsheets.
//! Either kind is accepted for every metric, chosen by file extension.
//!
//! ### Layout
//! - First header cell: index label (e.g. `Total fertility rate`)
//! - Remaining header cells: year labels
//! - First cell of each data row: country name
//!
//! ### Known fragility
//! The population table keeps its own labels. If its year domain differs from
//! the other two, nothing fails here; the reshaper fills the gaps with missing
//! values.

use crate::error::{Error, Result};
use crate::models::{Metric, WideTable, parse_year};
use calamine::{Data, Reader, open_workbook_auto};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use std::fs::File;
use std::path::Path;

/// Load one wide table, dispatching on the file extension.
pub fn load_table<P: AsRef<Path>>(path: P, metric: Metric) -> Result<WideTable<String>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let table = match ext.as_str() {
        "csv" => load_csv(path, metric)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_spreadsheet(path, metric)?,
        other => {
            return Err(Error::data_format(
                path.display().to_string(),
                format!("unsupported table format {other:?} (expected csv, xlsx, xls or ods)"),
            ));
        }
    };
    let (rows, cols) = table.shape();
    info!(
        "loaded {} table from {}: {} countries x {} columns",
        metric,
        path.display(),
        rows,
        cols
    );
    Ok(table)
}

/// Load a wide table from a delimited text file.
pub fn load_csv<P: AsRef<Path>>(path: P, metric: Metric) -> Result<WideTable<String>> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);
    let csv_err = |e: csv::Error| Error::data_format(&name, e.to_string());

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let mut labels = headers.iter().map(|h| h.trim().to_string());
    let index_label = labels
        .next()
        .filter(|_| headers.len() > 1)
        .ok_or_else(|| Error::data_format(&name, "header row has no year columns"))?;
    let mut table = WideTable::new(metric, index_label, labels.collect());

    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_err)?;
        // header is line 1
        let line = i + 2;
        let country = record.get(0).unwrap_or("").trim();
        if country.is_empty() {
            warn!("{name}: skipping line {line} without a country");
            continue;
        }
        if record.len() > table.columns.len() + 1 {
            return Err(Error::data_format(
                &name,
                format!(
                    "line {line} has {} value cells but the header has {} year columns",
                    record.len() - 1,
                    table.columns.len()
                ),
            ));
        }
        let values = record
            .iter()
            .skip(1)
            .enumerate()
            .map(|(col, cell)| parse_text_cell(cell, &name, line, col + 2))
            .collect::<Result<Vec<_>>>()?;
        table.push_row(country, values);
    }

    if table.rows.is_empty() {
        return Err(Error::data_format(&name, "table has no data rows"));
    }
    Ok(table)
}

/// Load a wide table from the first worksheet of a spreadsheet.
pub fn load_spreadsheet<P: AsRef<Path>>(path: P, metric: Metric) -> Result<WideTable<String>> {
    let path = path.as_ref();
    let name = path.display().to_string();
    std::fs::metadata(path).map_err(|e| Error::io(path, e))?;

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::data_format(&name, "workbook has no worksheets"))??;
    debug!("{name}: first worksheet spans {:?}", range.get_size());

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| Error::data_format(&name, "worksheet is empty"))?;
    if header.len() < 2 {
        return Err(Error::data_format(&name, "header row has no year columns"));
    }
    let index_label = cell_label(&header[0]);
    let columns = header[1..].iter().map(cell_label).collect();
    let mut table = WideTable::new(metric, index_label, columns);

    for (i, row) in rows.enumerate() {
        let line = i + 2;
        let country = row.first().map(cell_label).unwrap_or_default();
        if country.is_empty() {
            if row.iter().skip(1).any(|c| !matches!(c, Data::Empty)) {
                warn!("{name}: skipping row {line} without a country");
            }
            continue;
        }
        let values = row
            .iter()
            .skip(1)
            .enumerate()
            .map(|(col, cell)| parse_data_cell(cell, &name, line, col + 2))
            .collect::<Result<Vec<_>>>()?;
        table.push_row(country, values);
    }

    if table.rows.is_empty() {
        return Err(Error::data_format(&name, "table has no data rows"));
    }
    Ok(table)
}

/// Give fertility and life expectancy the same integer year columns.
///
/// Life expectancy labels are parsed as years and assigned by position to the
/// fertility table. Population labels pass through unchanged.
pub fn normalize_years(
    fertility: WideTable<String>,
    life_expectancy: WideTable<String>,
    population: WideTable<String>,
) -> Result<(WideTable<i32>, WideTable<i32>, WideTable<String>)> {
    let source = life_expectancy.metric.display_name();
    let years = life_expectancy
        .columns
        .iter()
        .enumerate()
        .map(|(i, label)| {
            parse_year(label).ok_or_else(|| {
                Error::data_format(
                    source,
                    format!("column {} label {label:?} is not a year", i + 2),
                )
            })
        })
        .collect::<Result<Vec<i32>>>()?;

    if fertility.columns.len() != years.len() {
        return Err(Error::data_format(
            fertility.metric.display_name(),
            format!(
                "{} year columns, but life expectancy has {}",
                fertility.columns.len(),
                years.len()
            ),
        ));
    }
    for (label, year) in fertility.columns.iter().zip(&years) {
        match parse_year(label) {
            Some(y) if y != *year => {
                warn!("fertility column {label:?} relabeled as {year}");
            }
            None => warn!("fertility column {label:?} is not a year; relabeled as {year}"),
            _ => {}
        }
    }

    if let (Some(first), Some(last)) = (years.first(), years.last()) {
        debug!("normalized year columns {first}..={last}");
    }
    Ok((
        fertility.relabel(years.clone()),
        life_expectancy.relabel(years),
        population,
    ))
}

fn cell_label(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn parse_text_cell(text: &str, source: &str, line: usize, col: usize) -> Result<Option<f64>> {
    let t = text.trim();
    if matches!(t, "" | "nan" | "NaN" | "NAN" | "NA" | "N/A" | "#N/A") {
        return Ok(None);
    }
    match t.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(Error::data_format(
            source,
            format!("line {line}, column {col}: {t:?} is not a number"),
        )),
    }
}

fn parse_data_cell(cell: &Data, source: &str, line: usize, col: usize) -> Result<Option<f64>> {
    match cell {
        Data::Float(v) if v.is_nan() => Ok(None),
        Data::Float(v) => Ok(Some(*v)),
        Data::Int(v) => Ok(Some(*v as f64)),
        Data::Empty | Data::Error(_) => Ok(None),
        Data::String(s) => parse_text_cell(s, source, line, col),
        other => Err(Error::data_format(
            source,
            format!("row {line}, column {col}: unexpected cell {other:?}"),
        )),
    }
}
