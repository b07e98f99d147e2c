//! Exhaustive path simulation.
//!
//! The [`Matcher`] expands every path through an [`Nfa`] in synchronized
//! rounds and never merges two paths that reach the same state at the same
//! offset. Merging them is what makes Thompson simulation linear; not merging
//! them reproduces the work a naive backtracking engine does, which is the
//! quantity being measured. Expect exponential time on ambiguous patterns and
//! bound it with [`Config`].

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::nfa::Nfa;
use crate::state::{Label, StateId};
use crate::{SearchError, SearchResult};

/// Limits and loop handling for a [`Matcher`].
#[derive(Clone, Debug)]
pub struct Config {
    max_rounds: Option<usize>,
    max_paths: Option<usize>,
    prune_loops: bool,
}

impl Config {
    /// Returns a default configuration: at most 10,000 rounds, at most
    /// 1,000,000 live paths, and looped paths are pruned.
    pub fn new() -> Config {
        Config {
            max_rounds: Some(10_000),
            max_paths: Some(1_000_000),
            prune_loops: true,
        }
    }

    /// Caps the number of expansion rounds. `None` removes the cap.
    pub fn max_rounds(mut self, limit: Option<usize>) -> Config {
        self.max_rounds = limit;
        self
    }

    /// Caps the number of paths alive after any round. `None` removes the cap.
    pub fn max_paths(mut self, limit: Option<usize>) -> Config {
        self.max_paths = limit;
        self
    }

    /// Whether a path that revisits one of its own `(state, offset)`
    /// configurations stops being expanded.
    ///
    /// Looped paths are reported either way. Disabling pruning reproduces the
    /// unbounded behavior of a naive engine: a pattern whose NFA has an
    /// epsilon-only cycle, such as `(a*)*`, then only terminates through the
    /// round or path limit.
    pub fn prune_loops(mut self, yes: bool) -> Config {
        self.prune_loops = yes;
        self
    }

    pub fn get_max_rounds(&self) -> Option<usize> {
        self.max_rounds
    }

    pub fn get_max_paths(&self) -> Option<usize> {
        self.max_paths
    }

    pub fn get_prune_loops(&self) -> bool {
        self.prune_loops
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

/// A half-open range of character offsets, `start..end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One path that reached the finish state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathMatch {
    pub span: Span,
    /// Number of transitions taken.
    pub steps: usize,
}

/// One path that came back to a configuration it had already visited.
#[derive(Clone, Debug)]
pub struct Loop {
    /// From the path's start offset to the offset where the revisit happened.
    pub span: Span,
    pub state: StateId,
    head: Rc<Step>,
}

impl Loop {
    /// The configurations visited by the path, oldest first, ending with the
    /// revisited one.
    pub fn history(&self) -> Vec<(StateId, usize)> {
        self.head.history()
    }
}

/// Everything one exhaustive run observed.
#[derive(Clone, Debug, Default)]
pub struct Search {
    matches: Vec<PathMatch>,
    loops: Vec<Loop>,
    rounds: usize,
    peak_paths: usize,
    ambiguity: usize,
}

impl Search {
    /// Every accepting path. The same span appears once per distinct path.
    pub fn matches(&self) -> &[PathMatch] {
        &self.matches
    }

    /// Every looped path.
    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    /// The distinct spans of all accepting paths.
    pub fn spans(&self) -> BTreeSet<Span> {
        self.matches.iter().map(|m| m.span).collect()
    }

    pub fn is_match(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Accepting and looped paths kept in this report.
    pub fn records(&self) -> usize {
        self.matches.len() + self.loops.len()
    }

    /// Number of expansion rounds that were run.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Largest number of live paths after any round.
    pub fn peak_paths(&self) -> usize {
        self.peak_paths
    }

    /// The largest number of distinct paths from one start offset that
    /// reached the same `(state, offset)` configuration. Anything above 1
    /// means the pattern can consume the same text in more than one way.
    pub fn ambiguity(&self) -> usize {
        self.ambiguity
    }
}

/// A visited configuration, linked to the one before it. Successor paths
/// share their common history.
#[derive(Debug)]
struct Step {
    state: StateId,
    offset: usize,
    prev: Option<Rc<Step>>,
}

impl Step {
    fn iter(&self) -> impl Iterator<Item = &Step> {
        std::iter::successors(Some(self), |step| step.prev.as_deref())
    }

    fn history(&self) -> Vec<(StateId, usize)> {
        let mut history: Vec<_> = self.iter().map(|step| (step.state, step.offset)).collect();
        history.reverse();
        history
    }
}

/// A live search node.
#[derive(Clone, Debug)]
struct Path {
    start: usize,
    steps: usize,
    head: Rc<Step>,
}

impl Path {
    fn seed(state: StateId, start: usize) -> Path {
        Path {
            start,
            steps: 0,
            head: Rc::new(Step { state, offset: start, prev: None }),
        }
    }

    fn state(&self) -> StateId {
        self.head.state
    }

    fn offset(&self) -> usize {
        self.head.offset
    }

    fn visited(&self, state: StateId, offset: usize) -> bool {
        self.head.iter().any(|step| step.state == state && step.offset == offset)
    }

    fn advance(&self, state: StateId, offset: usize) -> Path {
        Path {
            start: self.start,
            steps: self.steps + 1,
            head: Rc::new(Step {
                state,
                offset,
                prev: Some(Rc::clone(&self.head)),
            }),
        }
    }
}

/// An exhaustive, non-deduplicating simulator over one NFA.
pub struct Matcher<'a> {
    nfa: &'a Nfa,
    config: Config,
}

impl<'a> Matcher<'a> {
    /// Create a new matcher with the default [`Config`]
    pub fn new(nfa: &'a Nfa) -> Self {
        Self::with_config(nfa, Config::new())
    }

    pub fn with_config(nfa: &'a Nfa, config: Config) -> Self {
        Self { nfa, config }
    }

    /// Run every path from every start offset `0..=len` to exhaustion.
    ///
    /// A path reaching the finish state is recorded and keeps going, since
    /// longer matches may follow.
    pub fn search(&self, input: &str) -> SearchResult<Search> {
        let chars: Vec<char> = input.chars().collect();
        let finish = self.nfa.finish();
        let mut search = Search::default();
        let mut arrivals: HashMap<(usize, StateId, usize), usize> = HashMap::new();

        let mut paths: Vec<Path> = (0..=chars.len())
            .map(|start| Path::seed(self.nfa.start(), start))
            .collect();

        while !paths.is_empty() {
            if let Some(limit) = self.config.max_rounds {
                if search.rounds >= limit {
                    debug!("matcher gave up after {} rounds", limit);
                    return Err(SearchError::RoundLimitExceeded { limit });
                }
            }
            search.rounds += 1;

            let mut next = Vec::new();
            for path in &paths {
                for t in self.nfa.automaton().transitions_from(path.state()) {
                    let offset = match self.step(t.label, &chars, path.offset()) {
                        Some(offset) => offset,
                        None => continue,
                    };
                    let looped = path.visited(t.to, offset);
                    let successor = path.advance(t.to, offset);
                    if looped {
                        search.loops.push(Loop {
                            span: Span { start: path.start, end: offset },
                            state: t.to,
                            head: Rc::clone(&successor.head),
                        });
                        self.check_records(&search)?;
                        if self.config.prune_loops {
                            continue;
                        }
                    } else {
                        let count = arrivals.entry((path.start, t.to, offset)).or_insert(0);
                        *count += 1;
                        search.ambiguity = search.ambiguity.max(*count);
                    }

                    if t.to == finish {
                        search.matches.push(PathMatch {
                            span: Span { start: path.start, end: offset },
                            steps: successor.steps,
                        });
                        self.check_records(&search)?;
                    }
                    next.push(successor);
                    if let Some(limit) = self.config.max_paths {
                        if next.len() > limit {
                            debug!("matcher gave up with more than {} live paths", limit);
                            return Err(SearchError::PathLimitExceeded { limit });
                        }
                    }
                }
            }

            trace!("round {}: {} live paths", search.rounds, next.len());
            search.peak_paths = search.peak_paths.max(next.len());
            paths = next;
        }

        debug!(
            "matcher: {} matches, {} loops, {} rounds, peak {} paths, ambiguity {}",
            search.matches.len(),
            search.loops.len(),
            search.rounds,
            search.peak_paths,
            search.ambiguity
        );
        Ok(search)
    }

    /// Kept matches and loops count against the path cap too, since every
    /// record holds on to its path's history.
    fn check_records(&self, search: &Search) -> SearchResult<()> {
        match self.config.max_paths {
            Some(limit) if search.records() > limit => {
                debug!("matcher gave up with more than {} recorded paths", limit);
                Err(SearchError::PathLimitExceeded { limit })
            }
            _ => Ok(()),
        }
    }

    /// The offset after traversing `label` at `offset`, if it can be
    /// traversed there.
    fn step(&self, label: Label, chars: &[char], offset: usize) -> Option<usize> {
        match label {
            Label::Char(ch) if chars.get(offset) == Some(&ch) => Some(offset + 1),
            zero_width if zero_width.passable_at(offset, chars.len()) => Some(offset),
            _ => None,
        }
    }
}
