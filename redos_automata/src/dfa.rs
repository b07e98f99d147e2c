//! Subset construction from an [`Nfa`] into a [`Dfa`].

use std::collections::{BTreeMap, BTreeSet};

use crate::automaton::Automaton;
use crate::nfa::Nfa;
use crate::state::{IdGen, Label, StateId};
use crate::CompileResult;

/// A deterministic automaton: no epsilon transitions and at most one
/// transition per `(state, label)` pair.
///
/// Anchor labels are ordinary symbols of the alphabet here. [`Dfa::is_match`]
/// applies them at their positions only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    graph: Automaton,
    accepting: BTreeSet<StateId>,
    /// The sorted NFA state ids each DFA state stands for.
    subsets: BTreeMap<StateId, Vec<StateId>>,
}

impl Dfa {
    /// Classic worklist subset construction. No minimization is done.
    ///
    /// The start state stands for the epsilon closure of the NFA's start, and
    /// a DFA state accepts iff its subset contains the NFA's finish.
    pub fn from_nfa(nfa: &Nfa) -> CompileResult<Dfa> {
        let alphabet = nfa.alphabet();
        let mut ids = IdGen::new();

        let seed: BTreeSet<StateId> = nfa.epsilon_reachable(&BTreeSet::from([nfa.start()]));
        let start = ids.next_id();
        let mut dfa = Dfa {
            graph: Automaton::new(start),
            accepting: BTreeSet::new(),
            subsets: BTreeMap::new(),
        };
        dfa.record(start, &seed, nfa);

        let mut known: BTreeMap<Vec<StateId>, StateId> = BTreeMap::new();
        known.insert(seed.iter().copied().collect(), start);
        let mut worklist = vec![(seed, start)];

        while let Some((subset, from)) = worklist.pop() {
            for &label in &alphabet {
                let next = nfa.epsilon_closure(&subset, label);
                if next.is_empty() {
                    continue;
                }
                let key: Vec<StateId> = next.iter().copied().collect();
                let to = match known.get(&key) {
                    Some(&to) => to,
                    None => {
                        let to = ids.next_id();
                        dfa.graph.add_state(to);
                        dfa.record(to, &next, nfa);
                        known.insert(key, to);
                        worklist.push((next, to));
                        to
                    }
                };
                dfa.graph.add_transition(from, to, label)?;
            }
        }

        debug!(
            "subset construction: {} NFA states became {} DFA states ({} accepting)",
            nfa.automaton().state_len(),
            dfa.graph.state_len(),
            dfa.accepting.len()
        );
        Ok(dfa)
    }

    fn record(&mut self, id: StateId, subset: &BTreeSet<StateId>, nfa: &Nfa) {
        if subset.contains(&nfa.finish()) {
            self.accepting.insert(id);
        }
        self.subsets.insert(id, subset.iter().copied().collect());
    }

    pub fn start(&self) -> StateId {
        self.graph.start()
    }

    pub fn accepting(&self) -> &BTreeSet<StateId> {
        &self.accepting
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self.accepting.contains(&id)
    }

    /// Read-only access to the states and transitions.
    pub fn automaton(&self) -> &Automaton {
        &self.graph
    }

    /// The NFA states behind a DFA state.
    pub fn subset(&self, id: StateId) -> Option<&[StateId]> {
        self.subsets.get(&id).map(Vec::as_slice)
    }

    /// The unique successor of `id` on `label`, if any.
    pub fn next_state(&self, id: StateId, label: Label) -> Option<StateId> {
        self.graph
            .transitions_from(id)
            .iter()
            .find(|t| t.label == label)
            .map(|t| t.to)
    }

    /// Whether the entire input is in the language of this DFA.
    ///
    /// Characters are followed deterministically. An anchor edge may be taken
    /// without consuming input where the anchor holds, so a small set of
    /// current states is tracked.
    pub fn is_match(&self, input: &str) -> bool {
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();

        let mut current = self.anchor_closure(BTreeSet::from([self.start()]), 0, len);
        for (i, &ch) in chars.iter().enumerate() {
            let next: BTreeSet<StateId> = current
                .iter()
                .filter_map(|&id| self.next_state(id, Label::Char(ch)))
                .collect();
            if next.is_empty() {
                return false;
            }
            current = self.anchor_closure(next, i + 1, len);
        }
        current.iter().any(|id| self.accepting.contains(id))
    }

    fn anchor_closure(&self, mut set: BTreeSet<StateId>, offset: usize, len: usize) -> BTreeSet<StateId> {
        let mut stack: Vec<StateId> = set.iter().copied().collect();
        while let Some(id) = stack.pop() {
            for t in self.graph.transitions_from(id) {
                if t.label.anchor_holds(offset, len) && set.insert(t.to) {
                    stack.push(t.to);
                }
            }
        }
        set
    }
}
