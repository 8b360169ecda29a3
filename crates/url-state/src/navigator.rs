//! Push/replace navigation driven by the codec.

use tracing::debug;

use crate::codec::LocationStateCodec;
use crate::error::LocationStateError;
use crate::location::Location;
use crate::projection::{IdentityProjection, StateProjection};

/// Routing layer that owns the current location.
pub trait History {
    fn location(&self) -> &Location;

    /// Adds a new entry after the current one.
    fn push(&mut self, location: Location);

    /// Overwrites the current entry.
    fn replace(&mut self, location: Location);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Pushed,
    Replaced,
    /// The encoded location equals the current one; the history was not touched.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavigationMode {
    Push,
    Replace,
}

/// Reads and writes view state through a [`History`].
///
/// Every call reads the history's current location first, so consecutive
/// updates merge on top of each other.
#[derive(Debug, Clone)]
pub struct StateNavigator<P = IdentityProjection> {
    codec: LocationStateCodec<P>,
}

impl<P: StateProjection> StateNavigator<P> {
    pub fn new(codec: LocationStateCodec<P>) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &LocationStateCodec<P> {
        &self.codec
    }

    pub fn state<H: History + ?Sized>(&self, history: &H) -> Result<P::State, LocationStateError> {
        self.codec.decode(history.location())
    }

    pub fn push_state<H: History + ?Sized>(
        &self,
        history: &mut H,
        state: &P::State,
    ) -> Result<NavigationOutcome, LocationStateError> {
        self.navigate(history, state, NavigationMode::Push)
    }

    pub fn replace_state<H: History + ?Sized>(
        &self,
        history: &mut H,
        state: &P::State,
    ) -> Result<NavigationOutcome, LocationStateError> {
        self.navigate(history, state, NavigationMode::Replace)
    }

    fn navigate<H: History + ?Sized>(
        &self,
        history: &mut H,
        state: &P::State,
        mode: NavigationMode,
    ) -> Result<NavigationOutcome, LocationStateError> {
        let current = history.location();
        let next = self.codec.encode(state, current)?;
        if next == *current {
            return Ok(NavigationOutcome::Unchanged);
        }
        debug!(location = %next, ?mode, "navigating to new location state");
        Ok(match mode {
            NavigationMode::Push => {
                history.push(next);
                NavigationOutcome::Pushed
            }
            NavigationMode::Replace => {
                history.replace(next);
                NavigationOutcome::Replaced
            }
        })
    }
}

/// History kept in memory.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<Location>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn entries(&self) -> &[Location] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn go_back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn go_forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }
}

impl History for MemoryHistory {
    fn location(&self) -> &Location {
        &self.entries[self.index]
    }

    fn push(&mut self, location: Location) {
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index = self.entries.len() - 1;
    }

    fn replace(&mut self, location: Location) {
        self.entries[self.index] = location;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn push_then_replace() {
        let navigator = StateNavigator::new(LocationStateCodec::new());
        let mut history = MemoryHistory::new(Location::parse("/app?foo=bar"));

        let outcome = navigator
            .push_state(&mut history, &object(json!({"a": 1})))
            .unwrap();
        assert_eq!(outcome, NavigationOutcome::Pushed);
        assert_eq!(history.len(), 2);

        let outcome = navigator
            .replace_state(&mut history, &object(json!({"b": 2})))
            .unwrap();
        assert_eq!(outcome, NavigationOutcome::Replaced);
        assert_eq!(history.len(), 2);
        assert_eq!(
            Value::Object(navigator.state(&history).unwrap()),
            json!({"a": 1, "b": 2})
        );

        assert!(history.go_back());
        assert_eq!(history.location().to_string(), "/app?foo=bar");
    }

    #[test]
    fn unchanged_state_does_not_navigate() {
        let navigator = StateNavigator::new(LocationStateCodec::new());
        let mut history = MemoryHistory::new(Location::parse("/app?_a=a:1"));
        let outcome = navigator
            .push_state(&mut history, &object(json!({"a": 1})))
            .unwrap();
        assert_eq!(outcome, NavigationOutcome::Unchanged);
        assert_eq!(history.len(), 1);

        let outcome = navigator.push_state(&mut history, &Map::new()).unwrap();
        assert_eq!(outcome, NavigationOutcome::Unchanged);
    }

    #[test]
    fn push_discards_forward_entries() {
        let navigator = StateNavigator::new(LocationStateCodec::new());
        let mut history = MemoryHistory::new(Location::parse("/"));
        navigator
            .push_state(&mut history, &object(json!({"p": 1})))
            .unwrap();
        navigator
            .push_state(&mut history, &object(json!({"p": 2})))
            .unwrap();
        assert!(history.go_back());
        navigator
            .push_state(&mut history, &object(json!({"p": 3})))
            .unwrap();
        assert_eq!(history.len(), 3);
        assert!(!history.go_forward());
        assert_eq!(
            Value::Object(navigator.state(&history).unwrap()),
            json!({"p": 3})
        );
    }
}
