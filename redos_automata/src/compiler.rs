use crate::ast::Ast;
use crate::automaton::Automaton;
use crate::nfa::Nfa;
use crate::parser;
use crate::state::{IdGen, Label};
use crate::CompileResult;

/// Compiler that turns patterns into Thompson NFAs.
///
/// Every sub-expression is compiled into a fresh NFA with fresh states, and
/// the combinators below consume their operands, so no state is ever shared
/// between two fragments.
pub struct Compiler {
    ids: IdGen,
}

impl Compiler {
    /// Create a new compiler
    pub fn new() -> Self {
        Self { ids: IdGen::new() }
    }

    /// Parse and compile a pattern.
    ///
    /// State ids keep increasing across calls on the same compiler until
    /// [`Compiler::reset`] is called.
    pub fn compile(&mut self, pattern: &str) -> CompileResult<Nfa> {
        let ast = parser::parse(pattern)?;
        let nfa = self.compile_ast(&ast)?;
        debug!(
            "compiled {:?}: {} states, {} transitions",
            pattern,
            nfa.automaton().state_len(),
            nfa.automaton().transition_len()
        );
        Ok(nfa)
    }

    /// Compile a syntax tree node.
    pub fn compile_ast(&mut self, ast: &Ast) -> CompileResult<Nfa> {
        match ast {
            Ast::Empty => self.empty(),
            Ast::Literal(ch) => self.simple(*ch),
            Ast::Class(members) => self.class(members),
            Ast::Concat(items) => {
                let mut items = items.iter();
                let mut nfa = match items.next() {
                    Some(first) => self.compile_ast(first)?,
                    None => return self.empty(),
                };
                for item in items {
                    let next = self.compile_ast(item)?;
                    nfa = self.concatenation(nfa, next)?;
                }
                Ok(nfa)
            }
            Ast::Alternation(lhs, rhs) => {
                let lhs = self.compile_ast(lhs)?;
                let rhs = self.compile_ast(rhs)?;
                self.alternation(lhs, rhs)
            }
            Ast::Star(inner) => {
                let inner = self.compile_ast(inner)?;
                self.closure(inner)
            }
            Ast::Plus(inner) => {
                let inner = self.compile_ast(inner)?;
                self.required_closure(inner)
            }
            Ast::Optional(inner) => {
                let inner = self.compile_ast(inner)?;
                self.optional(inner)
            }
            Ast::Group(inner) => self.compile_ast(inner),
        }
    }

    /// Restart state numbering at zero.
    pub fn reset(&mut self) {
        self.ids.reset();
    }

    /// A fresh start and finish state, not yet connected.
    fn bracket(&mut self) -> Nfa {
        let start = self.ids.next_id();
        let finish = self.ids.next_id();
        let mut graph = Automaton::new(start);
        graph.add_state(finish);
        Nfa::from_parts(graph, finish)
    }

    /// Two states joined by an epsilon edge.
    fn empty(&mut self) -> CompileResult<Nfa> {
        let mut nfa = self.bracket();
        nfa.connect(nfa.start(), nfa.finish(), Label::Epsilon)?;
        Ok(nfa)
    }

    /// Two states joined by one edge labelled with `ch`, or with an anchor
    /// for `^` and `$`.
    fn simple(&mut self, ch: char) -> CompileResult<Nfa> {
        let mut nfa = self.bracket();
        nfa.connect(nfa.start(), nfa.finish(), Label::from_pattern_char(ch))?;
        Ok(nfa)
    }

    /// `[abc]` as `a|b|c`, folded from the left.
    fn class(&mut self, members: &[char]) -> CompileResult<Nfa> {
        let mut members = members.iter();
        let mut nfa = match members.next() {
            Some(&first) => self.simple(first)?,
            None => return self.empty(),
        };
        for &ch in members {
            let next = self.simple(ch)?;
            nfa = self.alternation(nfa, next)?;
        }
        Ok(nfa)
    }

    /// `rs`: an epsilon edge from `r`'s finish to `s`'s start.
    fn concatenation(&mut self, lhs: Nfa, rhs: Nfa) -> CompileResult<Nfa> {
        let (lhs_graph, lhs_finish) = lhs.into_parts();
        let (rhs_graph, rhs_finish) = rhs.into_parts();
        let rhs_start = rhs_graph.start();

        let mut nfa = Nfa::from_parts(lhs_graph, rhs_finish);
        nfa.absorb(rhs_graph);
        nfa.connect(lhs_finish, rhs_start, Label::Epsilon)?;
        Ok(nfa)
    }

    /// `r|s`: a new start fanning out to both operands and a new finish they
    /// both converge on.
    fn alternation(&mut self, lhs: Nfa, rhs: Nfa) -> CompileResult<Nfa> {
        let mut nfa = self.bracket();
        let (start, finish) = (nfa.start(), nfa.finish());
        for operand in [lhs, rhs] {
            let (graph, operand_finish) = operand.into_parts();
            let operand_start = graph.start();
            nfa.absorb(graph);
            nfa.connect(start, operand_start, Label::Epsilon)?;
            nfa.connect(operand_finish, finish, Label::Epsilon)?;
        }
        Ok(nfa)
    }

    /// Brackets `inner` with a new start and finish. `skip` adds the edge
    /// that bypasses `inner`, `repeat` the edge that loops back into it.
    fn wrap(&mut self, inner: Nfa, skip: bool, repeat: bool) -> CompileResult<Nfa> {
        let mut nfa = self.bracket();
        let (start, finish) = (nfa.start(), nfa.finish());
        let (graph, inner_finish) = inner.into_parts();
        let inner_start = graph.start();
        nfa.absorb(graph);

        nfa.connect(start, inner_start, Label::Epsilon)?;
        nfa.connect(inner_finish, finish, Label::Epsilon)?;
        if skip {
            nfa.connect(start, finish, Label::Epsilon)?;
        }
        if repeat {
            nfa.connect(inner_finish, inner_start, Label::Epsilon)?;
        }
        Ok(nfa)
    }

    /// `r*`
    fn closure(&mut self, inner: Nfa) -> CompileResult<Nfa> {
        self.wrap(inner, true, true)
    }

    /// `r+`: like `r*` without the skip edge.
    fn required_closure(&mut self, inner: Nfa) -> CompileResult<Nfa> {
        self.wrap(inner, false, true)
    }

    /// `r?`: like `r*` without the loop back.
    fn optional(&mut self, inner: Nfa) -> CompileResult<Nfa> {
        self.wrap(inner, true, false)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
