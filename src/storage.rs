use crate::models::TidyRow;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix cells that a spreadsheet would evaluate as a formula.
fn sanitize_cell(s: &str) -> Cow<'_, str> {
    if s.starts_with(['=', '+', '-', '@']) {
        Cow::Owned(format!("'{s}"))
    } else {
        Cow::Borrowed(s)
    }
}

/// Save tidy rows as CSV with header `country,year,metric,value`.
pub fn save_csv<P: AsRef<Path>>(rows: &[TidyRow], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.write_record(["country", "year", "metric", "value"])?;
    for r in rows {
        wtr.serialize((
            &*sanitize_cell(&r.country),
            r.year,
            r.metric.as_str(),
            r.value,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save tidy rows as a pretty JSON array.
pub fn save_json<P: AsRef<Path>>(rows: &[TidyRow], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
