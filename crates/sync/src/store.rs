//! Reducer-driven record store
//!
//! The store is the single source of truth for a resource's client state.
//! [`reduce`] is pure and total; [`Store::dispatch`] applies it under the
//! channel's write lock so updates land in dispatch order, and every
//! subscriber sees the resulting snapshot.

use medrec_api_client::{Record, RecordId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;

/// Snapshot of a resource's client state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    /// Ordered list as last fetched (or patched)
    pub records: Vec<Record>,
    /// Currently selected record
    pub record: Option<Record>,
    /// A request is in flight
    pub loading: bool,
    /// Message of the last failure, cleared by the next success
    pub error: Option<String>,
}

impl StoreState {
    /// Find a record in the list by ID
    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.has_id(id))
    }
}

/// State transitions
///
/// Serialized as `{"type": "SET_RECORDS", "payload": [...]}`. Unrecognized
/// types deserialize to [`Action::Unknown`], which leaves state unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// A request started
    FetchStart,
    /// Replace the list
    SetRecords(Vec<Record>),
    /// Replace the selected record
    SetRecord(Option<Record>),
    /// Record a failure
    SetError(String),
    /// Append a record
    AddRecord(Record),
    /// Replace the record with the same ID
    UpdateRecord(Record),
    /// Drop records with this ID
    RemoveRecord(RecordId),
    /// Anything else
    #[serde(other)]
    Unknown,
}

/// Apply an action to a state, producing the next state
pub fn reduce(state: &StoreState, action: &Action) -> StoreState {
    let mut next = state.clone();

    match action {
        Action::FetchStart => {
            next.loading = true;
            next.error = None;
        }
        Action::SetRecords(records) => {
            next.records.clone_from(records);
            next.loading = false;
            next.error = None;
        }
        Action::SetRecord(record) => {
            next.record.clone_from(record);
            next.loading = false;
            next.error = None;
        }
        Action::SetError(message) => {
            next.error = Some(message.clone());
            next.loading = false;
        }
        Action::AddRecord(record) => {
            next.records.push(record.clone());
        }
        Action::UpdateRecord(record) => {
            if let Some(id) = record.id() {
                for slot in next.records.iter_mut().filter(|r| r.has_id(&id)) {
                    slot.clone_from(record);
                }
                if next.record.as_ref().is_some_and(|r| r.has_id(&id)) {
                    next.record = Some(record.clone());
                }
            }
        }
        Action::RemoveRecord(id) => {
            next.records.retain(|r| !r.has_id(id));
            if next.record.as_ref().is_some_and(|r| r.has_id(id)) {
                next.record = None;
            }
        }
        Action::Unknown => {}
    }

    next
}

/// Shared handle to a store
///
/// Cloning is cheap; all clones observe the same state.
#[derive(Debug, Clone)]
pub struct Store {
    tx: Arc<watch::Sender<StoreState>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreState::default())
    }
}

impl Store {
    /// Create a store with an initial state
    pub fn new(initial: StoreState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Apply an action
    pub fn dispatch(&self, action: Action) {
        trace!(?action, "dispatch");
        self.tx.send_modify(|state| *state = reduce(state, &action));
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> StoreState {
        self.tx.borrow().clone()
    }

    /// Receive a notification after every dispatch
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn rec(id: &str, name: &str) -> Record {
        Record::new(json!({"RecordID": id, "Name": name}))
    }

    fn loaded(records: Vec<Record>) -> StoreState {
        reduce(&StoreState::default(), &Action::SetRecords(records))
    }

    #[test]
    fn test_fetch_start_sets_loading_and_clears_error() {
        let failed = reduce(&StoreState::default(), &Action::SetError("boom".into()));
        let state = reduce(&failed, &Action::FetchStart);
        assert!(state.loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_set_records_replaces_list() {
        let state = loaded(vec![rec("a", "A")]);
        let state = reduce(&state, &Action::SetRecords(vec![rec("b", "B"), rec("c", "C")]));
        assert_eq!(state.records.len(), 2);
        assert!(state.find("a").is_none());
        assert!(!state.loading);
    }

    #[test]
    fn test_set_error_keeps_data() {
        let state = loaded(vec![rec("a", "A")]);
        let state = reduce(&state, &Action::FetchStart);
        let state = reduce(&state, &Action::SetError("Network error".into()));
        assert_eq!(state.error.as_deref(), Some("Network error"));
        assert!(!state.loading);
        assert_eq!(state.records.len(), 1);
    }

    #[test]
    fn test_update_in_place_preserves_order() {
        let state = loaded(vec![rec("a", "A"), rec("b", "B"), rec("c", "C")]);
        let state = reduce(&state, &Action::SetRecord(Some(rec("b", "B"))));
        let state = reduce(&state, &Action::UpdateRecord(rec("b", "Bee")));

        let names: Vec<_> = state.records.iter().map(|r| r.get("Name").cloned()).collect();
        assert_eq!(names, vec![Some(json!("A")), Some(json!("Bee")), Some(json!("C"))]);
        assert_eq!(state.record, Some(rec("b", "Bee")));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let state = loaded(vec![rec("a", "A")]);
        assert_eq!(reduce(&state, &Action::UpdateRecord(rec("zzz", "Z"))), state);

        let no_id = Record::new(json!({"Name": "anonymous"}));
        assert_eq!(reduce(&state, &Action::UpdateRecord(no_id)), state);
    }

    #[test]
    fn test_remove_clears_selection() {
        let state = loaded(vec![rec("a", "A"), rec("b", "B")]);
        let state = reduce(&state, &Action::SetRecord(Some(rec("a", "A"))));
        let state = reduce(&state, &Action::RemoveRecord("a".into()));
        assert!(state.record.is_none());
        assert_eq!(state.records, vec![rec("b", "B")]);
    }

    #[test]
    fn test_unknown_action_passes_through() {
        let state = loaded(vec![rec("a", "A")]);
        let action: Action = serde_json::from_value(json!({"type": "RESET_FILTERS"})).unwrap();
        assert_eq!(action, Action::Unknown);
        assert_eq!(reduce(&state, &action), state);
    }

    #[test]
    fn test_action_wire_format() {
        let action = Action::RemoveRecord("r-9".into());
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"type": "REMOVE_RECORD", "payload": "r-9"})
        );

        let parsed: Action =
            serde_json::from_value(json!({"type": "ADD_RECORD", "payload": {"RecordID": "x"}}))
                .unwrap();
        assert_eq!(parsed, Action::AddRecord(Record::new(json!({"RecordID": "x"}))));
    }

    #[test]
    fn test_store_dispatch_and_subscribe() {
        let store = Store::default();
        let mut rx = store.subscribe();
        let other = store.clone();

        store.dispatch(Action::AddRecord(rec("a", "A")));

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().records.len(), 1);
        assert_eq!(other.snapshot().records, vec![rec("a", "A")]);
    }

    proptest! {
        #[test]
        fn prop_add_then_remove_restores_list(
            existing in prop::collection::btree_set("[a-z0-9]{1,6}", 0..12),
            new_id in "[A-Z]{1,6}",
        ) {
            let records: Vec<Record> = existing.iter().map(|id| rec(id, id)).collect();
            let before = loaded(records);

            let added = reduce(&before, &Action::AddRecord(rec(&new_id, "new")));
            prop_assert_eq!(added.records.len(), before.records.len() + 1);

            let after = reduce(&added, &Action::RemoveRecord(new_id.clone()));
            prop_assert_eq!(after.records, before.records);
        }

        #[test]
        fn prop_reduce_never_touches_list_on_errors(
            message in ".{0,40}",
            ids in prop::collection::vec("[a-z]{1,4}", 0..8),
        ) {
            let before = loaded(ids.iter().map(|id| rec(id, "x")).collect());
            let after = reduce(&before, &Action::SetError(message));
            prop_assert_eq!(after.records, before.records);
            prop_assert!(!after.loading);
        }
    }
}
