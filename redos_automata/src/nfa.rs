use std::collections::BTreeSet;

use crate::automaton::Automaton;
use crate::compiler::Compiler;
use crate::dfa::Dfa;
use crate::matcher::{Matcher, Span};
use crate::state::{Label, StateId};
use crate::{CompileResult, SearchResult};

/// A Thompson NFA with a single start and a single finish state.
///
/// Built once per pattern and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    graph: Automaton,
    finish: StateId,
}

impl Nfa {
    /// Compile `pattern` with a fresh state numbering.
    pub fn new(pattern: &str) -> CompileResult<Nfa> {
        Compiler::new().compile(pattern)
    }

    pub(crate) fn from_parts(mut graph: Automaton, finish: StateId) -> Self {
        graph.add_state(finish);
        Self { graph, finish }
    }

    pub(crate) fn into_parts(self) -> (Automaton, StateId) {
        (self.graph, self.finish)
    }

    /// Take over the states and transitions of another fragment.
    pub(crate) fn absorb(&mut self, graph: Automaton) {
        self.graph.merge(graph);
    }

    pub(crate) fn connect(&mut self, from: StateId, to: StateId, label: Label) -> CompileResult<()> {
        self.graph.add_transition(from, to, label)
    }

    pub fn start(&self) -> StateId {
        self.graph.start()
    }

    pub fn finish(&self) -> StateId {
        self.finish
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        id == self.finish
    }

    /// Read-only access to the states and transitions.
    pub fn automaton(&self) -> &Automaton {
        &self.graph
    }

    /// Every distinct non-epsilon label, anchors included.
    pub fn alphabet(&self) -> BTreeSet<Label> {
        self.graph
            .transitions()
            .map(|t| t.label)
            .filter(|label| !label.is_epsilon())
            .collect()
    }

    /// The states reachable from any of `state_ids` by exactly one transition
    /// labelled `on`, followed by any number of epsilon transitions.
    pub fn epsilon_closure(&self, state_ids: &BTreeSet<StateId>, on: Label) -> BTreeSet<StateId> {
        let targets = state_ids
            .iter()
            .flat_map(|&id| self.graph.transitions_from(id))
            .filter(|t| t.label == on)
            .map(|t| t.to);
        self.follow(targets, |label| label.is_epsilon())
    }

    /// `state_ids` together with everything reachable from them by epsilon
    /// transitions alone.
    pub fn epsilon_reachable(&self, state_ids: &BTreeSet<StateId>) -> BTreeSet<StateId> {
        self.follow(state_ids.iter().copied(), |label| label.is_epsilon())
    }

    /// Closes `seeds` under every transition whose label satisfies `passable`.
    fn follow<I, F>(&self, seeds: I, passable: F) -> BTreeSet<StateId>
    where
        I: IntoIterator<Item = StateId>,
        F: Fn(Label) -> bool,
    {
        let mut closure = BTreeSet::new();
        let mut stack: Vec<StateId> = seeds.into_iter().collect();
        while let Some(id) = stack.pop() {
            if !closure.insert(id) {
                continue;
            }
            for t in self.graph.transitions_from(id) {
                if passable(t.label) && !closure.contains(&t.to) {
                    stack.push(t.to);
                }
            }
        }
        closure
    }

    /// Whether the entire input is in the language of this NFA.
    ///
    /// This is the deduplicating, linear-time set simulation. Use a
    /// [`Matcher`] to see every path instead.
    pub fn is_match(&self, input: &str) -> bool {
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let zero_width = move |offset: usize| move |label: Label| label.passable_at(offset, len);

        let mut current = self.follow([self.start()], zero_width(0));
        for (i, &ch) in chars.iter().enumerate() {
            let targets: Vec<StateId> = current
                .iter()
                .flat_map(|&id| self.graph.transitions_from(id))
                .filter(|t| t.label == Label::Char(ch))
                .map(|t| t.to)
                .collect();
            if targets.is_empty() {
                return false;
            }
            current = self.follow(targets, zero_width(i + 1));
        }
        current.contains(&self.finish)
    }

    /// Subset construction.
    pub fn to_dfa(&self) -> CompileResult<Dfa> {
        Dfa::from_nfa(self)
    }

    /// Every `(start, end)` span that some path of the exhaustive matcher
    /// accepts, under the default [`matcher::Config`](crate::matcher::Config).
    pub fn matches(&self, input: &str) -> SearchResult<BTreeSet<Span>> {
        Ok(Matcher::new(self).search(input)?.spans())
    }
}
