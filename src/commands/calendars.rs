use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use printcal_core::config::UserConfig;
use printcal_core::storage::load_collection;

pub fn run(config: &UserConfig, dir: &Path) -> Result<()> {
    let (collection, failures) = load_collection(dir);

    println!("{}", dir.display().dimmed());

    for (name, calendar) in collection.calendars_to_persist() {
        let count = calendar.events.len();
        let events = format!("{} {}", count, if count == 1 { "event" } else { "events" });

        if config.is_disabled(name) {
            println!("  📅 {} {} {}", name.dimmed(), events.dimmed(), "(disabled)".dimmed());
        } else {
            println!("  📅 {} {}", name.bold(), events.dimmed());
        }
    }

    for (name, error) in &failures {
        println!("  {} {} {}", "✗".red(), name, error.to_string().red());
    }

    Ok(())
}
