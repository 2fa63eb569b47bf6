use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;

use crate::entry::NavEntry;

#[derive(Debug, Error)]
pub enum HistoryError {
    /// The host refuses history access (e.g. a sandboxed iframe).
    #[error("history mechanism unavailable")]
    Unavailable,
}

/// One physical back/forward notification.
///
/// The payload is whatever state the host attached to the entry it landed
/// on. It carries no reliability guarantee and must never drive the next
/// action; the next action is always decided by stack depth and the exit
/// guard.
#[derive(Debug, Clone)]
pub struct BackForwardEvent {
    pub state: Option<Value>,
}

/// Seam to the host's physical history mechanism.
///
/// Everything the subsystem does to real history goes through this trait,
/// so the controller can run against the in-memory emulation in tests and
/// against nothing at all when the host refuses access.
pub trait HistoryBackend {
    fn push_state(&mut self, payload: Value, fragment: Option<&str>) -> Result<(), HistoryError>;
    fn replace_state(&mut self, payload: Value, fragment: Option<&str>)
        -> Result<(), HistoryError>;
    /// Does the current physical entry carry a state payload?
    fn has_state(&self) -> Result<bool, HistoryError>;
    fn fragment(&self) -> Result<Option<String>, HistoryError>;
    /// Ask the host for one real back navigation.
    fn back(&mut self) -> Result<(), HistoryError>;
    /// Next queued back/forward notification, if any.
    fn poll_back_or_forward(&mut self) -> Result<Option<BackForwardEvent>, HistoryError>;
}

/// The only component that talks to physical history.
///
/// Translates stack operations into physical pushes and absorbs backend
/// failures: when the host refuses, every operation degrades to a logged
/// no-op and the logical stack keeps working on its own.
pub struct HistoryBridge {
    backend: Box<dyn HistoryBackend>,
}

impl HistoryBridge {
    pub fn new(backend: impl HistoryBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Record a new physical entry for `entry`, setting the visible
    /// fragment for product views and clearing it otherwise.
    pub fn push_physical(&mut self, entry: &NavEntry) {
        let fragment = entry.fragment();
        if let Err(e) = self
            .backend
            .push_state(entry.to_payload(), fragment.as_deref())
        {
            log::warn!("push_physical({}) degraded to no-op: {e}", entry.describe());
        }
    }

    /// Startup only: if the landing entry has no state payload, replace it
    /// in place so the floor does not cost an extra back-press to reach.
    pub fn replace_physical_if_missing(&mut self, entry: &NavEntry) {
        match self.backend.has_state() {
            Ok(true) => {}
            Ok(false) => {
                let fragment = entry.fragment();
                if let Err(e) = self
                    .backend
                    .replace_state(entry.to_payload(), fragment.as_deref())
                {
                    log::warn!("replace_physical_if_missing degraded to no-op: {e}");
                }
            }
            Err(e) => log::warn!("replace_physical_if_missing degraded to no-op: {e}"),
        }
    }

    /// One real back navigation. Used only after exit is confirmed.
    pub fn trigger_physical_back(&mut self) {
        if let Err(e) = self.backend.back() {
            log::warn!("trigger_physical_back degraded to no-op: {e}");
        }
    }

    /// Push a no-op entry at the same logical position, neutralizing one
    /// unwanted physical back so the next back-press re-triggers the same
    /// decision point.
    pub fn trap_current_position(&mut self, entry: &NavEntry) {
        let fragment = entry.fragment();
        if let Err(e) = self
            .backend
            .push_state(entry.to_payload(), fragment.as_deref())
        {
            log::warn!("trap_current_position degraded to no-op: {e}");
        } else {
            log::debug!("trapped position at {}", entry.describe());
        }
    }

    pub fn fragment(&self) -> Option<String> {
        match self.backend.fragment() {
            Ok(f) => f,
            Err(e) => {
                log::warn!("fragment read degraded to None: {e}");
                None
            }
        }
    }

    pub fn poll_back_or_forward(&mut self) -> Option<BackForwardEvent> {
        match self.backend.poll_back_or_forward() {
            Ok(ev) => ev,
            Err(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Record {
    payload: Option<Value>,
    fragment: Option<String>,
}

#[derive(Debug, Default)]
struct HistoryState {
    records: Vec<Record>,
    cursor: usize,
    pending: VecDeque<BackForwardEvent>,
}

impl HistoryState {
    fn move_cursor(&mut self, to: usize) {
        self.cursor = to;
        let event = BackForwardEvent {
            state: self.records[to].payload.clone(),
        };
        self.pending.push_back(event);
    }
}

/// Emulation of the host's linear history, shared between the bridge and
/// the "browser chrome" (tests, the replay binary).
///
/// Record 0 stands for the external page the user arrived from; landing
/// back on it means the user has left the site. Cloning the handle clones
/// the `Rc`, so chrome and bridge drive the same history. Single-threaded
/// by design, like the host event loop it stands in for.
#[derive(Clone)]
pub struct InMemoryHistory {
    state: Rc<RefCell<HistoryState>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::with_fragment(None)
    }

    /// Page load with an address fragment already present (deep link).
    pub fn with_fragment(fragment: Option<&str>) -> Self {
        let state = HistoryState {
            records: vec![
                // the site the user came from
                Record::default(),
                Record {
                    payload: None,
                    fragment: fragment.map(str::to_owned),
                },
            ],
            cursor: 1,
            pending: VecDeque::new(),
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// User presses the physical back button.
    pub fn press_back(&self) {
        let mut st = self.state.borrow_mut();
        if st.cursor > 0 {
            let to = st.cursor - 1;
            st.move_cursor(to);
        }
    }

    /// User presses the physical forward button.
    pub fn press_forward(&self) {
        let mut st = self.state.borrow_mut();
        if st.cursor + 1 < st.records.len() {
            let to = st.cursor + 1;
            st.move_cursor(to);
        }
    }

    /// True once navigation has landed back on the pre-site entry, i.e.
    /// the user has left the app.
    pub fn on_external_page(&self) -> bool {
        self.state.borrow().cursor == 0
    }

    pub fn current_fragment(&self) -> Option<String> {
        let st = self.state.borrow();
        st.records[st.cursor].fragment.clone()
    }

    /// Physical entries currently recorded, the external seed included.
    pub fn record_count(&self) -> usize {
        self.state.borrow().records.len()
    }

    pub fn pending_events(&self) -> usize {
        self.state.borrow().pending.len()
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBackend for InMemoryHistory {
    fn push_state(&mut self, payload: Value, fragment: Option<&str>) -> Result<(), HistoryError> {
        let mut st = self.state.borrow_mut();
        let cut = st.cursor + 1;
        st.records.truncate(cut); // pushing discards forward history
        st.records.push(Record {
            payload: Some(payload),
            fragment: fragment.map(str::to_owned),
        });
        st.cursor += 1;
        Ok(())
    }

    fn replace_state(
        &mut self,
        payload: Value,
        fragment: Option<&str>,
    ) -> Result<(), HistoryError> {
        let mut st = self.state.borrow_mut();
        let cursor = st.cursor;
        st.records[cursor] = Record {
            payload: Some(payload),
            fragment: fragment.map(str::to_owned),
        };
        Ok(())
    }

    fn has_state(&self) -> Result<bool, HistoryError> {
        let st = self.state.borrow();
        Ok(st.records[st.cursor].payload.is_some())
    }

    fn fragment(&self) -> Result<Option<String>, HistoryError> {
        let st = self.state.borrow();
        Ok(st.records[st.cursor].fragment.clone())
    }

    fn back(&mut self) -> Result<(), HistoryError> {
        self.press_back();
        Ok(())
    }

    fn poll_back_or_forward(&mut self) -> Result<Option<BackForwardEvent>, HistoryError> {
        Ok(self.state.borrow_mut().pending.pop_front())
    }
}

/// Backend for hosts that refuse history access entirely. Every call
/// fails, which the bridge absorbs into no-ops.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableHistory;

impl HistoryBackend for UnavailableHistory {
    fn push_state(&mut self, _: Value, _: Option<&str>) -> Result<(), HistoryError> {
        Err(HistoryError::Unavailable)
    }

    fn replace_state(&mut self, _: Value, _: Option<&str>) -> Result<(), HistoryError> {
        Err(HistoryError::Unavailable)
    }

    fn has_state(&self) -> Result<bool, HistoryError> {
        Err(HistoryError::Unavailable)
    }

    fn fragment(&self) -> Result<Option<String>, HistoryError> {
        Err(HistoryError::Unavailable)
    }

    fn back(&mut self) -> Result<(), HistoryError> {
        Err(HistoryError::Unavailable)
    }

    fn poll_back_or_forward(&mut self) -> Result<Option<BackForwardEvent>, HistoryError> {
        Err(HistoryError::Unavailable)
    }
}
