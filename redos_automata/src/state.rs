//! Graph primitives shared by every automaton: state identities, edge labels
//! and transitions.

use std::fmt;

/// The identity of an automaton state.
///
/// Identities are handed out by an [`IdGen`] in creation order. Two states are
/// the same state if and only if their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u32);

impl StateId {
    /// Returns the raw integer behind this identity.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A source of fresh, monotonically increasing state identities.
///
/// One generator belongs to one construction context. Ids are only reused
/// after an explicit [`IdGen::reset`], which exists for deterministic test
/// fixtures.
#[derive(Debug, Clone, Default)]
pub struct IdGen {
    next: u32,
}

impl IdGen {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Mints a new state identity.
    pub fn next_id(&mut self) -> StateId {
        let id = StateId(self.next);
        self.next += 1;
        id
    }

    /// The number of identities minted since creation or the last reset.
    pub fn issued(&self) -> usize {
        self.next as usize
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// The label of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    /// Consumes exactly this character.
    Char(char),
    /// Consumes nothing.
    Epsilon,
    /// Zero-width assertion produced by `^`: only passable at offset 0.
    StartAnchor,
    /// Zero-width assertion produced by `$`: only passable at the end of input.
    EndAnchor,
}

impl Label {
    /// Translates a pattern character into a label, mapping `^` and `$` to
    /// their anchors.
    pub fn from_pattern_char(ch: char) -> Self {
        match ch {
            '^' => Label::StartAnchor,
            '$' => Label::EndAnchor,
            ch => Label::Char(ch),
        }
    }

    pub fn is_epsilon(self) -> bool {
        self == Label::Epsilon
    }

    /// Whether this label can be crossed without consuming input at `offset`
    /// in an input of `len` characters. Epsilon always can, an anchor only
    /// where it holds, and a character never.
    pub fn passable_at(self, offset: usize, len: usize) -> bool {
        self.is_epsilon() || self.anchor_holds(offset, len)
    }

    /// Whether an anchor label holds at `offset` in an input of `len`
    /// characters. Always false for characters and epsilon.
    pub fn anchor_holds(self, offset: usize, len: usize) -> bool {
        match self {
            Label::StartAnchor => offset == 0,
            Label::EndAnchor => offset == len,
            Label::Char(_) | Label::Epsilon => false,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Label::Char(ch) => write!(f, "{}", ch),
            Label::Epsilon => write!(f, "epsilon"),
            Label::StartAnchor => write!(f, "(start)"),
            Label::EndAnchor => write!(f, "(end)"),
        }
    }
}

/// A directed, labelled edge between two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
    pub label: Label,
}

impl Transition {
    pub fn new(from: StateId, to: StateId, label: Label) -> Self {
        Transition { from, to, label }
    }

    /// Creates an epsilon transition.
    pub fn epsilon(from: StateId, to: StateId) -> Self {
        Transition::new(from, to, Label::Epsilon)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) -{}-> ({})", self.from, self.label, self.to)
    }
}
