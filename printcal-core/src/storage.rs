//! Calendar files on disk: one `<name>.ics` per calendar in a directory.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use crate::calendar::{Calendar, Collection};
use crate::error::{CalendarParseError, PrintCalError, PrintCalResult};
use crate::ics::{parse_calendar, serialize_calendar};

/// Raw text of every `.ics` file in `dir`, keyed by file stem.
///
/// Files that exist but can't be read map to `None`. A missing directory
/// yields an empty map.
pub fn read_named_calendars(dir: &Path) -> BTreeMap<String, Option<String>> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return BTreeMap::new();
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == "ics"))
        .filter_map(|path| {
            let name = path.file_stem()?.to_str()?.to_string();
            let content = std::fs::read_to_string(&path)
                .inspect_err(|e| warn!(path = %path.display(), error = %e, "Unreadable calendar file"))
                .ok();
            Some((name, content))
        })
        .collect()
}

/// Write `text` to `<dir>/<name>.ics`, creating `dir` if needed.
///
/// `name` must be a plain file stem; anything that would leave `dir` is
/// rejected before touching the filesystem.
pub fn write_calendar(dir: &Path, name: &str, text: &str) -> PrintCalResult<()> {
    if !is_valid_name(name) {
        return Err(PrintCalError::InvalidCalendarName(name.to_string()));
    }
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(format!("{}.ics", name)), text)?;
    Ok(())
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Load and parse every calendar in `dir`.
///
/// A file that fails to parse is reported alongside the collection instead
/// of failing the whole load. Unreadable files are left out.
pub fn load_collection(dir: &Path) -> (Collection, Vec<(String, CalendarParseError)>) {
    let mut collection = Collection::new();
    let mut failures = Vec::new();

    for (name, content) in read_named_calendars(dir) {
        let Some(content) = content else {
            continue;
        };
        match parse_calendar(&content) {
            Ok(calendar) => collection.insert(name, calendar),
            Err(e) => failures.push((name, e)),
        }
    }

    (collection, failures)
}

/// Write every calendar still present in `collection` to `dir`.
pub fn save_collection(dir: &Path, collection: &Collection) -> PrintCalResult<()> {
    for (name, calendar) in collection.calendars_to_persist() {
        save_calendar(dir, name, calendar)?;
    }
    Ok(())
}

pub fn save_calendar(dir: &Path, name: &str, calendar: &Calendar) -> PrintCalResult<()> {
    write_calendar(dir, name, &serialize_calendar(calendar)?)
}
