//! Structural test for super-exploitable automata.
//!
//! A state `q` makes an NFA super-exploitable when
//!
//! 1. `q` is reachable from the start state,
//! 2. two different paths lead from `q` back to `q` while consuming the same
//!    non-empty word, so every repetition of that word doubles the number of
//!    paths a backtracking engine explores, and
//! 3. from `q` the automaton can get stuck: some state reachable from `q` is
//!    not the finish and cannot reach it without consuming more input.
//!
//! The search for (2) runs over the NFA paired with itself. A pair advances
//! when both sides consume the same character, each through its own *route*:
//! a simple run of epsilon transitions followed by one character transition.
//! Only states entered by a character transition take part, so every cycle
//! through the pattern's loops is covered. `q` is flagged when `(q, q)`
//! reaches itself again along a pair of route sequences that differ
//! somewhere. Anchors never sit between two consumed characters, so routes
//! do not cross them.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::nfa::Nfa;
use crate::state::{Label, StateId, Transition};
use crate::{SearchError, SearchResult};

/// Limits for a [`Checker`].
#[derive(Clone, Debug)]
pub struct Config {
    max_steps: Option<usize>,
}

impl Config {
    /// Returns a default configuration allowing 1,000,000 cycle enumeration
    /// steps.
    pub fn new() -> Config {
        Config { max_steps: Some(1_000_000) }
    }

    /// Caps the number of edges the cycle enumeration may follow. `None`
    /// removes the cap.
    pub fn max_steps(mut self, limit: Option<usize>) -> Config {
        self.max_steps = limit;
        self
    }

    pub fn get_max_steps(&self) -> Option<usize> {
        self.max_steps
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

/// Evidence that an automaton is super-exploitable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness {
    /// The state both cycles pass through.
    pub state: StateId,
    /// The word both cycles consume.
    pub word: String,
    pub first: Vec<Transition>,
    pub second: Vec<Transition>,
}

/// The outcome of a check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Verdict {
    witness: Option<Witness>,
}

impl Verdict {
    pub fn is_vulnerable(&self) -> bool {
        self.witness.is_some()
    }

    pub fn witness(&self) -> Option<&Witness> {
        self.witness.as_ref()
    }
}

/// Decides whether an NFA's shape guarantees super-linear backtracking.
#[derive(Clone, Debug, Default)]
pub struct Checker {
    config: Config,
}

impl Checker {
    pub fn new() -> Checker {
        Checker::with_config(Config::new())
    }

    pub fn with_config(config: Config) -> Checker {
        Checker { config }
    }

    pub fn check(&self, nfa: &Nfa) -> SearchResult<Verdict> {
        let mut budget = Budget { limit: self.config.max_steps, steps: 0 };
        let reachable = reach(nfa, nfa.start());
        let entered: BTreeSet<StateId> = nfa
            .automaton()
            .transitions()
            .filter(|t| matches!(t.label, Label::Char(_)) && reachable.contains(&t.to))
            .map(|t| t.to)
            .collect();

        let mut routes = BTreeMap::new();
        for &s in &entered {
            routes.insert(s, routes_from(nfa, s, &mut budget)?);
        }

        for &q in &entered {
            let (first, second) = match twin_cycles(q, &routes, &mut budget)? {
                Some(pair) => pair,
                None => continue,
            };
            if !can_get_stuck(nfa, q) {
                trace!("state {} is ambiguous but always accepts", q);
                continue;
            }

            let word = consumed(&first);
            debug!("state {} repeats {:?} along two distinct cycles", q, word);
            return Ok(Verdict {
                witness: Some(Witness { state: q, word, first, second }),
            });
        }

        debug!("no ambiguous cycles after {} steps", budget.steps);
        Ok(Verdict::default())
    }
}

/// Counts the edges followed by one check against `max_steps`.
struct Budget {
    limit: Option<usize>,
    steps: usize,
}

impl Budget {
    fn tick(&mut self) -> SearchResult<()> {
        self.steps += 1;
        match self.limit {
            Some(limit) if self.steps > limit => {
                debug!("checker gave up after {} steps", limit);
                Err(SearchError::PathLimitExceeded { limit })
            }
            _ => Ok(()),
        }
    }
}

/// Epsilon transitions along a simple path, then one character transition.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Route {
    prefix: Vec<Transition>,
    edge: Transition,
}

impl Route {
    fn ch(&self) -> Option<char> {
        match self.edge.label {
            Label::Char(ch) => Some(ch),
            _ => None,
        }
    }
}

/// The routes leaving `from`. Two different routes onto the same character
/// transition are enough to tell the transition is ambiguous, so at most two
/// are kept per transition.
fn routes_from(nfa: &Nfa, from: StateId, budget: &mut Budget) -> SearchResult<Vec<Route>> {
    let mut search = RouteSearch {
        nfa,
        budget,
        prefix: Vec::new(),
        on_path: BTreeSet::from([from]),
        routes: Vec::new(),
    };
    search.walk(from)?;
    Ok(search.routes)
}

struct RouteSearch<'a> {
    nfa: &'a Nfa,
    budget: &'a mut Budget,
    prefix: Vec<Transition>,
    on_path: BTreeSet<StateId>,
    routes: Vec<Route>,
}

impl RouteSearch<'_> {
    fn walk(&mut self, at: StateId) -> SearchResult<()> {
        for &t in self.nfa.automaton().transitions_from(at) {
            self.budget.tick()?;
            match t.label {
                Label::Char(_) => {
                    if self.routes.iter().filter(|r| r.edge == t).count() < 2 {
                        self.routes.push(Route { prefix: self.prefix.clone(), edge: t });
                    }
                }
                Label::Epsilon => {
                    if self.on_path.insert(t.to) {
                        self.prefix.push(t);
                        self.walk(t.to)?;
                        self.prefix.pop();
                        self.on_path.remove(&t.to);
                    }
                }
                Label::StartAnchor | Label::EndAnchor => {}
            }
        }
        Ok(())
    }
}

/// A position in the self-product: both sides' states, and whether the two
/// route sequences leading here differ yet.
type Pair = (StateId, StateId, bool);

/// Breadth-first search from `(q, q)` back to `(q, q)` along route sequences
/// that differ somewhere. Returns the two cycles as transition lists.
fn twin_cycles(
    q: StateId,
    routes: &BTreeMap<StateId, Vec<Route>>,
    budget: &mut Budget,
) -> SearchResult<Option<(Vec<Transition>, Vec<Transition>)>> {
    let none: &[Route] = &[];
    let origin: Pair = (q, q, false);
    let target: Pair = (q, q, true);
    // Each pair maps to the pair it was reached from and the two routes taken.
    let mut parents: HashMap<Pair, (Pair, &Route, &Route)> = HashMap::new();
    let mut seen = HashSet::from([origin]);
    let mut queue = VecDeque::from([origin]);

    while let Some(pair @ (left, right, diverged)) = queue.pop_front() {
        let lhs = routes.get(&left).map_or(none, Vec::as_slice);
        let rhs = routes.get(&right).map_or(none, Vec::as_slice);
        for r1 in lhs {
            for r2 in rhs {
                if r1.ch() != r2.ch() {
                    continue;
                }
                budget.tick()?;
                let next = (r1.edge.to, r2.edge.to, diverged || r1 != r2);
                if !seen.insert(next) {
                    continue;
                }
                parents.insert(next, (pair, r1, r2));
                if next == target {
                    return Ok(Some(unwind(&parents, origin, target)));
                }
                queue.push_back(next);
            }
        }
    }
    Ok(None)
}

/// Follows `parents` from `target` back to `origin`, joining the routes on
/// each side into one cycle.
fn unwind(
    parents: &HashMap<Pair, (Pair, &Route, &Route)>,
    origin: Pair,
    target: Pair,
) -> (Vec<Transition>, Vec<Transition>) {
    let mut steps = Vec::new();
    let mut at = target;
    while at != origin {
        match parents.get(&at) {
            Some(&(prev, r1, r2)) => {
                steps.push((r1, r2));
                at = prev;
            }
            None => break,
        }
    }
    steps.reverse();

    let (mut first, mut second) = (Vec::new(), Vec::new());
    for (r1, r2) in steps {
        first.extend(r1.prefix.iter().copied());
        first.push(r1.edge);
        second.extend(r2.prefix.iter().copied());
        second.push(r2.edge);
    }
    (first, second)
}

/// The characters consumed along `path`.
fn consumed(path: &[Transition]) -> String {
    path.iter()
        .filter_map(|t| match t.label {
            Label::Char(ch) => Some(ch),
            _ => None,
        })
        .collect()
}

/// Every state reachable from `from` along any transitions, `from` included.
fn reach(nfa: &Nfa, from: StateId) -> BTreeSet<StateId> {
    let mut seen = BTreeSet::from([from]);
    let mut stack = vec![from];
    while let Some(id) = stack.pop() {
        for t in nfa.automaton().transitions_from(id) {
            if seen.insert(t.to) {
                stack.push(t.to);
            }
        }
    }
    seen
}

/// Whether some state reachable from `q` needs more input to accept. Input
/// that ends there, or that continues with a character it cannot take, is
/// rejected, forcing a backtracking engine through every alternative.
fn can_get_stuck(nfa: &Nfa, q: StateId) -> bool {
    reach(nfa, q).into_iter().any(|r| {
        !nfa.is_accepting(r) && !nfa.epsilon_reachable(&BTreeSet::from([r])).contains(&nfa.finish())
    })
}
