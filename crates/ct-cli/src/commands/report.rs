//! Report command: one day's breakdown from the stored month document.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::Local;

use ct_core::{TimeSpan, date_key};
use ct_store::{JsonStore, MonthKey, Store};

pub fn run<W: Write>(
    writer: &mut W,
    store: &JsonStore,
    date: Option<&str>,
    json: bool,
) -> Result<()> {
    let date = date.map_or_else(|| date_key(Local::now().date_naive()), str::to_string);
    let key = parse_month_key(&date)?;

    if !store.month_exists(key) {
        writeln!(writer, "No data recorded for {date}.")?;
        return Ok(());
    }
    let month = store.load_month(key, "report")?;
    let Some(day) = month.day(&date) else {
        writeln!(writer, "No data recorded for {date}.")?;
        return Ok(());
    };

    if json {
        serde_json::to_writer_pretty(&mut *writer, day)
            .context("failed to serialize day record")?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "{date}: {}", format_span(day.totals))?;
    writeln!(writer)?;
    writeln!(writer, "Languages:")?;
    for (language, bucket) in &day.languages {
        writeln!(writer, "- {language}: {}", format_span(bucket.totals))?;
    }
    writeln!(writer)?;
    writeln!(writer, "Projects:")?;
    for (project, record) in &day.projects {
        writeln!(writer, "- {project}: {}", format_span(record.totals))?;
        for (language, bucket) in &record.languages {
            writeln!(writer, "  - {language}: {}", format_span(bucket.totals))?;
        }
    }
    Ok(())
}

/// Extracts the month addressed by a `YYYY/M/D` date string.
fn parse_month_key(date: &str) -> Result<MonthKey> {
    let parts: Vec<&str> = date.split('/').collect();
    let &[year, month, day] = parts.as_slice() else {
        bail!("invalid date {date:?}: expected YYYY/M/D");
    };
    let year: i32 = year
        .parse()
        .with_context(|| format!("invalid year in {date:?}"))?;
    let month: u32 = month
        .parse()
        .with_context(|| format!("invalid month in {date:?}"))?;
    day.parse::<u32>()
        .with_context(|| format!("invalid day in {date:?}"))?;
    if !(1..=12).contains(&month) {
        bail!("invalid month in {date:?}");
    }
    Ok(MonthKey { year, month })
}

/// Full `Xh Ym Zs` rendering for report lines.
fn format_span(span: TimeSpan) -> String {
    format!("{}h {}m {}s", span.hours, span.minutes, span.seconds)
}
