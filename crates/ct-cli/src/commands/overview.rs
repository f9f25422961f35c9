//! Overview command: the flat day sequence fed to visualizations.

use std::io::Write;

use anyhow::Result;

use ct_store::{JsonStore, Store};

pub fn run<W: Write>(writer: &mut W, store: &JsonStore) -> Result<()> {
    if !store.overview_exists() {
        writeln!(writer, "No days recorded yet.")?;
        return Ok(());
    }

    let overview = store.load_overview("overview listing")?;
    for (date, hours) in overview.entries() {
        writeln!(writer, "- {date}: {hours:.6} h")?;
    }
    Ok(())
}
