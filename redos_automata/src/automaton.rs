//! Storage shared by the NFA and the DFA: a directed, labelled multigraph with
//! a distinguished start state, indexed by the `from` side of each edge.

use std::collections::BTreeMap;

use crate::state::{Label, StateId, Transition};
use crate::{CompileError, CompileErrorKind, CompileResult};

/// A labelled multigraph mapping every owned state to its outgoing
/// transitions.
///
/// Every transition's `from` and `to` belong to the graph; this is checked
/// when the transition is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    start: StateId,
    states: BTreeMap<StateId, Vec<Transition>>,
}

impl Automaton {
    /// Creates a graph owning only its start state.
    pub fn new(start: StateId) -> Self {
        let mut states = BTreeMap::new();
        states.insert(start, Vec::new());
        Self { start, states }
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    /// Takes ownership of `id`. Adding a state twice is a no-op.
    pub fn add_state(&mut self, id: StateId) {
        self.states.entry(id).or_default();
    }

    /// Adds a transition between two owned states.
    pub fn add_transition(&mut self, from: StateId, to: StateId, label: Label) -> CompileResult<()> {
        if !self.contains(to) || !self.contains(from) {
            return Err(CompileError::new(CompileErrorKind::InvalidEdge { from, to, label }));
        }
        if let Some(outgoing) = self.states.get_mut(&from) {
            outgoing.push(Transition::new(from, to, label));
        }
        Ok(())
    }

    /// Absorbs the states and transitions of `other`. Nothing is deduplicated:
    /// sub-automata are assembled from fresh states, never shared.
    pub fn merge(&mut self, other: Automaton) {
        for (id, outgoing) in other.states {
            self.states.entry(id).or_default().extend(outgoing);
        }
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    /// All owned states in ascending id order.
    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.keys().copied()
    }

    /// All transitions, grouped by their `from` state.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> + '_ {
        self.states.values().flatten()
    }

    /// The outgoing transitions of `id`, empty if `id` is not owned.
    pub fn transitions_from(&self, id: StateId) -> &[Transition] {
        self.states.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn state_len(&self) -> usize {
        self.states.len()
    }

    pub fn transition_len(&self) -> usize {
        self.states.values().map(Vec::len).sum()
    }
}
