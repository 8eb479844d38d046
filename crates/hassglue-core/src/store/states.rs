// ── State machine ──
//
// Last known state per entity ID. Only the state string matters to the
// migration: an entity reporting anything but `unavailable` is live.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

pub const STATE_UNAVAILABLE: &str = "unavailable";
pub const STATE_UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub state: String,
    pub last_updated: DateTime<Utc>,
}

pub struct StateMachine {
    states: DashMap<String, State>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    pub fn get(&self, entity_id: &str) -> Option<State> {
        self.states.get(entity_id).map(|r| r.value().clone())
    }

    /// Record a new state. `last_updated` only moves when the value changes.
    pub fn set(&self, entity_id: &str, state: impl Into<String>) {
        let state = state.into();
        let mut slot = self
            .states
            .entry(entity_id.to_owned())
            .or_insert_with(|| State {
                state: String::new(),
                last_updated: Utc::now(),
            });
        if slot.state != state {
            slot.state = state;
            slot.last_updated = Utc::now();
        }
    }

    pub fn remove(&self, entity_id: &str) -> Option<State> {
        self.states.remove(entity_id).map(|(_, s)| s)
    }

    /// Plain state strings by entity ID.
    pub fn all(&self) -> BTreeMap<String, String> {
        self.states
            .iter()
            .map(|r| (r.key().clone(), r.value().state.clone()))
            .collect()
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_only_touches_timestamp_on_change() {
        let states = StateMachine::new();
        states.set("sensor.apk", "2025-01-01");
        let first = states.get("sensor.apk").unwrap();
        states.set("sensor.apk", "2025-01-01");
        assert_eq!(states.get("sensor.apk").unwrap(), first);

        states.set("sensor.apk", STATE_UNAVAILABLE);
        assert_eq!(states.get("sensor.apk").unwrap().state, "unavailable");
    }
}
