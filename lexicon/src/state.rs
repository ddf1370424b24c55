use std::collections::BTreeMap;

/// Index of a state within a [`Store`]. State `0` is always the start state.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct StateId(pub u32);

impl StateId {
    pub const START: StateId = StateId(0);

    #[inline]
    pub fn usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for StateId {
    fn from(v: u32) -> Self {
        StateId(v)
    }
}

/// A single state's outgoing transitions and acceptance count.
///
/// `BTreeMap` gives both O(log k) per-symbol lookup and free ascending-order iteration, which is
/// exactly what the store's read contract requires (used by enumeration and DOT export).
#[derive(Clone, Debug, Eq, PartialEq)]
struct StoreState<T> {
    transitions: BTreeMap<T, StateId>,
    final_count: u32,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self { transitions: BTreeMap::new(), final_count: 0 }
    }
}

/// Flat, index-addressed representation of a MADFA's states.
///
/// Physically a `Vec<StoreState<T>>` indexed by [`StateId`]. Read access is available to anyone
/// holding a `&Store`; the mutating methods (`append_state`, `set_transition`,
/// `increment_final`, `add_final_count`, `truncate_last`) are only ever called by
/// [`crate::Builder`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Store<T> {
    states: Vec<StoreState<T>>,
}

impl<T: Ord> Store<T> {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { states: Vec::with_capacity(capacity) }
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn is_final(&self, s: StateId) -> bool {
        self.final_count(s) > 0
    }

    #[inline]
    pub fn final_count(&self, s: StateId) -> u32 {
        self.states[s.usize()].final_count
    }

    /// Child reached from `s` by `sym`, if any.
    pub fn transition(&self, s: StateId, sym: &T) -> Option<StateId> {
        self.states[s.usize()].transitions.get(sym).copied()
    }

    /// Outgoing transitions of `s`, in ascending symbol order.
    pub fn transitions_of(&self, s: StateId) -> impl Iterator<Item = (&T, StateId)> {
        self.states[s.usize()].transitions.iter().map(|(sym, &child)| (sym, child))
    }

    pub fn fan_out(&self, s: StateId) -> usize {
        self.states[s.usize()].transitions.len()
    }

    /// Appends a fresh, non-final state with no outgoing transitions and returns its id.
    pub(crate) fn append_state(&mut self) -> StateId {
        self.states.push(StoreState::default());
        StateId((self.states.len() - 1) as u32)
    }

    pub(crate) fn set_transition(&mut self, s: StateId, sym: T, child: StateId) {
        self.states[s.usize()].transitions.insert(sym, child);
    }

    pub(crate) fn increment_final(&mut self, s: StateId) {
        self.states[s.usize()].final_count += 1;
    }

    pub(crate) fn add_final_count(&mut self, s: StateId, n: u32) {
        self.states[s.usize()].final_count += n;
    }

    /// Removes the highest-indexed state, together with its outgoing transitions.
    ///
    /// The caller must ensure no remaining state holds a transition to it.
    pub(crate) fn truncate_last(&mut self) {
        let popped = self.states.pop();
        debug_assert!(popped.is_some(), "truncate_last called on an empty store");
    }

    #[inline]
    pub(crate) fn highest_index(&self) -> StateId {
        StateId((self.states.len() - 1) as u32)
    }
}
