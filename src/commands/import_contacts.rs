use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use printcal_core::contacts::convert_contacts;
use printcal_core::storage::save_calendar;

pub fn run(csv: &Path, name: &str, dir: &Path) -> Result<()> {
    let content = std::fs::read_to_string(csv)?;

    let calendar = match convert_contacts(&content) {
        Ok(calendar) => calendar,
        Err(errors) => {
            for error in &errors {
                eprintln!("  {} {}", "✗".red(), error);
            }
            anyhow::bail!(
                "Could not import {} ({} {})",
                csv.display(),
                errors.len(),
                if errors.len() == 1 { "error" } else { "errors" }
            );
        }
    };

    save_calendar(dir, name, &calendar)?;

    println!(
        "{} Imported {} events into {}",
        "✓".green(),
        calendar.events.len(),
        name.bold()
    );

    Ok(())
}
