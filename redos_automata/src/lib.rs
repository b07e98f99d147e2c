//! Automata for Regular Expression Denial of Service analysis
//!
//! This library compiles a small regular expression dialect into a Thompson
//! NFA and then studies the NFA's shape instead of running a regex engine over
//! it. The pieces are:
//!
//! - a parser producing a syntax tree with character offsets ([`parser`]),
//! - Thompson construction from that tree into an [`Nfa`] ([`compiler`]),
//! - subset construction from an NFA into a [`Dfa`] ([`dfa`]),
//! - an exhaustive, non-deduplicating path simulator that reproduces the
//!   search-space explosion of a naive backtracking engine ([`matcher`]),
//! - a structural checker deciding whether an NFA is super-exploitable,
//!   i.e. whether it admits catastrophic backtracking ([`checker`]).
//!
//! The supported dialect is literals, concatenation, `|`, `*`, `+`, `?`,
//! groups, flat character classes such as `[abc]`, and the anchors `^` and
//! `$`. Escape sequences are rejected.

#[macro_use]
mod macros;

pub mod ast;
pub mod automaton;
pub mod checker;
pub mod compiler;
pub mod dfa;
pub mod matcher;
pub mod nfa;
pub mod parser;
pub mod state;

pub use automaton::Automaton;
pub use checker::{Checker, Verdict, Witness};
pub use compiler::Compiler;
pub use dfa::Dfa;
pub use matcher::{Matcher, Search, Span};
pub use nfa::Nfa;
pub use state::{IdGen, Label, StateId, Transition};

/// The result of compiling a pattern.
pub type CompileResult<T> = Result<T, CompileError>;

/// The result of running the matcher or the checker.
pub type SearchResult<T> = Result<T, SearchError>;

/// An error that occurred while turning a pattern into an automaton.
///
/// No partial automaton is ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    kind: CompileErrorKind,
    offset: Option<usize>,
}

/// The kind of a [`CompileError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// A transition referenced a state the automaton does not own. This is an
    /// internal invariant violation, never a property of the pattern.
    InvalidEdge { from: StateId, to: StateId, label: Label },
    /// The pattern uses a construct outside the supported dialect.
    UnsupportedSyntax(String),
    /// A `(` without its `)`, or a `)` without its `(`.
    UnbalancedGroup,
    /// A `[` without its `]`.
    UnterminatedClass,
    /// A `*`, `+` or `?` with nothing to repeat.
    RepetitionMissing,
    /// A class with no members, `[]`.
    EmptyClass,
}

impl CompileError {
    pub(crate) fn new(kind: CompileErrorKind) -> Self {
        Self { kind, offset: None }
    }

    pub(crate) fn at(kind: CompileErrorKind, offset: usize) -> Self {
        Self { kind, offset: Some(offset) }
    }

    pub fn kind(&self) -> &CompileErrorKind {
        &self.kind
    }

    /// The character offset in the pattern the error points at, if known.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

impl std::fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileErrorKind::InvalidEdge { from, to, label } => {
                write!(f, "invalid edge ({}) -{}-> ({})", from, label, to)
            }
            CompileErrorKind::UnsupportedSyntax(what) => write!(f, "unsupported syntax: {}", what),
            CompileErrorKind::UnbalancedGroup => write!(f, "unbalanced group"),
            CompileErrorKind::UnterminatedClass => write!(f, "unterminated character class"),
            CompileErrorKind::RepetitionMissing => write!(f, "repetition operator missing expression"),
            CompileErrorKind::EmptyClass => write!(f, "empty character class"),
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} at offset {}", self.kind, offset),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for CompileError {}

/// The matcher or the checker gave up because a configured cap was reached.
///
/// This is distinct from "no match" and "not vulnerable": the search was
/// cut short and its outcome is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    /// More expansion rounds were needed than allowed.
    RoundLimitExceeded { limit: usize },
    /// More live paths (or checker steps) were needed than allowed.
    PathLimitExceeded { limit: usize },
}

impl SearchError {
    /// The cap that was hit.
    pub fn limit(&self) -> usize {
        match *self {
            SearchError::RoundLimitExceeded { limit } | SearchError::PathLimitExceeded { limit } => {
                limit
            }
        }
    }
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::RoundLimitExceeded { limit } => {
                write!(f, "search limit exceeded: more than {} rounds", limit)
            }
            SearchError::PathLimitExceeded { limit } => {
                write!(f, "search limit exceeded: more than {} paths", limit)
            }
        }
    }
}

impl std::error::Error for SearchError {}
