use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use printcal_core::config::UserConfig;
use printcal_core::dates::{self, DateRange};
use printcal_core::index::index_by_date;
use printcal_core::storage::load_collection;
use printcal_core::Tz;

use crate::render::{format_date_label, render_occurrence};

pub fn run(config: &UserConfig, dir: &Path, range: DateRange, zone: &Tz) -> Result<()> {
    let (collection, failures) = load_collection(dir);

    for (name, error) in &failures {
        eprintln!("{} {}: {}", "Skipped".yellow(), name, error);
    }

    let index = index_by_date(&collection, &range, zone, |name| config.is_disabled(name));
    let today = dates::today(zone);

    let mut printed_any = false;
    for (day, occurrences) in index.iter().filter(|(_, o)| !o.is_empty()) {
        if printed_any {
            println!();
        }
        println!("{}", format_date_label(*day, today).bold());

        for occurrence in occurrences {
            let colors = config.colors(&occurrence.source_calendar);
            println!("{}", render_occurrence(occurrence, colors, zone));
        }
        printed_any = true;
    }

    if !printed_any {
        println!("{}", "No events found".dimmed());
    }

    Ok(())
}
