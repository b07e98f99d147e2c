/*!
This crate decides whether a regular expression is vulnerable to catastrophic
backtracking, also known as Regular Expression Denial of Service (ReDoS).

It never runs a regex engine. A pattern is compiled into a Thompson NFA, and
the NFA's shape is examined: a pattern is *super-exploitable* when some state
can be left and re-entered along two different paths that consume the same
text, so that each extra repetition of that text doubles the work of a
backtracking engine.

# Example

```
use redos_detector::is_super_exploitable;

assert!(is_super_exploitable("(a+)+$")?);
assert!(!is_super_exploitable("a+$")?);
# Ok::<(), redos_detector::Error>(())
```

The compiled automata are available too. An [`Nfa`] can be converted into an
equivalent [`Dfa`], and its [`Nfa::matches`] method runs the exhaustive
matcher, which explores every path a naive backtracking engine would:

```
use redos_detector::compile;

let nfa = compile("a|b")?;
assert!(!nfa.matches("a")?.is_empty());
assert!(nfa.matches("c")?.is_empty());

let dfa = nfa.to_dfa()?;
assert!(dfa.is_match("b"));
# Ok::<(), redos_detector::Error>(())
```

# Supported syntax

Literals, concatenation, alternation `|`, the repetitions `*`, `+` and `?`,
groups `(...)`, flat character classes `[abc]` and the anchors `^` and `$`.
Escape sequences, bounded repetition and lazy quantifiers are not supported.

# Limits

The exhaustive matcher is exponential on exactly the patterns this crate looks
for. An [`Analyzer`] carries the caps on rounds, live paths and checker steps;
hitting one yields [`Error::Search`], which is distinct from both "no match"
and "not vulnerable".

# Crate features

* **logging** - Emits construction, search and verdict events through the
  `log` crate.
*/

#![deny(missing_docs)]

use std::collections::BTreeSet;

pub use redos_automata::checker::{self, Checker, Verdict, Witness};
pub use redos_automata::matcher::{self, Loop, Matcher, PathMatch, Search, Span};
pub use redos_automata::{
    Automaton, CompileError, CompileErrorKind, Compiler, Dfa, IdGen, Label, Nfa, SearchError,
    StateId, Transition,
};

/// An error from compiling a pattern or from a capped search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The pattern is malformed or uses unsupported syntax.
    Compile(CompileError),
    /// The matcher or the checker hit a configured limit. The outcome is
    /// unknown; retrying with higher limits may settle it.
    Search(SearchError),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Compile(err) => Some(err),
            Error::Search(err) => Some(err),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Compile(err) => write!(f, "{}", err),
            Error::Search(err) => write!(f, "{}", err),
        }
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Error {
        Error::Compile(err)
    }
}

impl From<SearchError> for Error {
    fn from(err: SearchError) -> Error {
        Error::Search(err)
    }
}

/// Compiles `pattern` into a Thompson NFA.
pub fn compile(pattern: &str) -> Result<Nfa, Error> {
    Ok(Nfa::new(pattern)?)
}

/// Whether `pattern` is super-exploitable, under the default limits.
pub fn is_super_exploitable(pattern: &str) -> Result<bool, Error> {
    Ok(Analyzer::new().check(pattern)?.is_vulnerable())
}

/// Runs the matcher and the checker with one set of limits.
#[derive(Clone, Debug, Default)]
pub struct Analyzer {
    matcher: matcher::Config,
    checker: checker::Config,
}

impl Analyzer {
    /// An analyzer with the default limits.
    pub fn new() -> Analyzer {
        Analyzer::default()
    }

    /// Returns a builder for configuring limits.
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Compiles `pattern` and decides whether it is super-exploitable.
    pub fn check(&self, pattern: &str) -> Result<Verdict, Error> {
        let nfa = compile(pattern)?;
        Ok(Checker::with_config(self.checker.clone()).check(&nfa)?)
    }

    /// Compiles `pattern` and runs the exhaustive matcher over `input`.
    pub fn search(&self, pattern: &str, input: &str) -> Result<Search, Error> {
        let nfa = compile(pattern)?;
        Ok(Matcher::with_config(&nfa, self.matcher.clone()).search(input)?)
    }

    /// The distinct spans of `input` that `pattern` matches.
    pub fn matches(&self, pattern: &str, input: &str) -> Result<BTreeSet<Span>, Error> {
        Ok(self.search(pattern, input)?.spans())
    }
}

/// A builder for an [`Analyzer`].
#[derive(Clone, Debug, Default)]
pub struct AnalyzerBuilder {
    analyzer: Analyzer,
}

impl AnalyzerBuilder {
    /// A builder starting from the default limits.
    pub fn new() -> AnalyzerBuilder {
        AnalyzerBuilder::default()
    }

    /// Caps the matcher's expansion rounds.
    pub fn max_rounds(&mut self, limit: Option<usize>) -> &mut AnalyzerBuilder {
        self.analyzer.matcher = self.analyzer.matcher.clone().max_rounds(limit);
        self
    }

    /// Caps the matcher's live paths.
    pub fn max_paths(&mut self, limit: Option<usize>) -> &mut AnalyzerBuilder {
        self.analyzer.matcher = self.analyzer.matcher.clone().max_paths(limit);
        self
    }

    /// Whether the matcher stops expanding looped paths.
    pub fn prune_loops(&mut self, yes: bool) -> &mut AnalyzerBuilder {
        self.analyzer.matcher = self.analyzer.matcher.clone().prune_loops(yes);
        self
    }

    /// Caps the checker's cycle enumeration.
    pub fn max_steps(&mut self, limit: Option<usize>) -> &mut AnalyzerBuilder {
        self.analyzer.checker = self.analyzer.checker.clone().max_steps(limit);
        self
    }

    /// Returns the configured analyzer.
    pub fn build(&self) -> Analyzer {
        self.analyzer.clone()
    }
}

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
