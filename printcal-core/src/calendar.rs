//! Calendars and the named collection of calendars a user keeps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event::Event;

pub const DEFAULT_VERSION: &str = "2.0";
pub const DEFAULT_PROD_ID: &str = "printcal/printcal";

/// Name of the calendar that always exists in a [`Collection`].
pub const DEFAULT_CALENDAR_NAME: &str = "default";

/// A VCALENDAR: format version, product identifier and its events in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub version: String,
    pub prod_id: String,
    pub events: Vec<Event>,
}

impl Calendar {
    pub fn new() -> Self {
        Calendar {
            version: DEFAULT_VERSION.to_string(),
            prod_id: DEFAULT_PROD_ID.to_string(),
            events: Vec::new(),
        }
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Remove the event with `uid`, returning it if present.
    pub fn remove_event(&mut self, uid: &str) -> Option<Event> {
        let index = self.events.iter().position(|e| e.uid == uid)?;
        Some(self.events.remove(index))
    }

    pub fn event(&self, uid: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.uid == uid)
    }

    pub fn event_mut(&mut self, uid: &str) -> Option<&mut Event> {
        self.events.iter_mut().find(|e| e.uid == uid)
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Calendar::new()
    }
}

/// See [`Calendar::new`].
pub fn default_calendar() -> Calendar {
    Calendar::new()
}

/// Named calendars, keyed by unique name.
///
/// A removed calendar keeps its slot as `None` so callers can tell it apart
/// from one that never existed; removed slots are never written back.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    calendars: BTreeMap<String, Option<Calendar>>,
}

impl Collection {
    /// A collection holding only an empty `default` calendar.
    pub fn new() -> Self {
        let mut calendars = BTreeMap::new();
        calendars.insert(DEFAULT_CALENDAR_NAME.to_string(), Some(Calendar::new()));
        Collection { calendars }
    }

    pub fn insert(&mut self, name: impl Into<String>, calendar: Calendar) {
        self.calendars.insert(name.into(), Some(calendar));
    }

    /// Mark `name` removed. The default calendar is emptied instead.
    pub fn remove(&mut self, name: &str) -> Option<Calendar> {
        if name == DEFAULT_CALENDAR_NAME {
            return self
                .calendars
                .insert(name.to_string(), Some(Calendar::new()))
                .flatten();
        }
        self.calendars.get_mut(name).and_then(Option::take)
    }

    pub fn get(&self, name: &str) -> Option<&Calendar> {
        self.calendars.get(name).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Calendar> {
        self.calendars.get_mut(name).and_then(Option::as_mut)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Every slot in name order, including removed ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Calendar>)> {
        self.calendars
            .iter()
            .map(|(name, calendar)| (name.as_str(), calendar.as_ref()))
    }

    /// Calendars still present, in name order.
    pub fn calendars_to_persist(&self) -> impl Iterator<Item = (&str, &Calendar)> {
        self.iter()
            .filter_map(|(name, calendar)| calendar.map(|c| (name, c)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.calendars_to_persist().map(|(name, _)| name)
    }
}

impl Default for Collection {
    fn default() -> Self {
        Collection::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_always_has_default() {
        let mut collection = Collection::new();
        assert!(collection.contains(DEFAULT_CALENDAR_NAME));

        collection.get_mut(DEFAULT_CALENDAR_NAME).unwrap().add_event(Event::new());
        let removed = collection.remove(DEFAULT_CALENDAR_NAME).unwrap();

        assert_eq!(removed.events.len(), 1);
        assert!(collection.get(DEFAULT_CALENDAR_NAME).unwrap().events.is_empty());
    }

    #[test]
    fn test_removed_calendar_keeps_empty_slot() {
        let mut collection = Collection::new();
        collection.insert("birthdays", Calendar::new());

        assert!(collection.remove("birthdays").is_some());
        assert!(!collection.contains("birthdays"));
        assert_eq!(collection.iter().count(), 2);

        let persisted: Vec<_> = collection.names().collect();
        assert_eq!(persisted, vec![DEFAULT_CALENDAR_NAME]);
    }

    #[test]
    fn test_edit_and_remove_events_by_uid() {
        let mut calendar = Calendar::new();
        let event = Event::new();
        let uid = event.uid.clone();
        calendar.add_event(event);

        calendar.event_mut(&uid).unwrap().summary = "Dentist".to_string();
        assert_eq!(calendar.event(&uid).unwrap().summary, "Dentist");

        assert!(calendar.remove_event(&uid).is_some());
        assert!(calendar.remove_event(&uid).is_none());
        assert!(calendar.events.is_empty());
    }
}
