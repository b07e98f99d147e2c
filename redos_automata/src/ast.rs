//! Syntax tree for the supported pattern dialect.
//!
//! # Grammar
//!
//! ```ebnf
//!     expression ::= sequence (VERTICAL expression)?;
//!     sequence   ::= repeat*;
//!     repeat     ::= atom QUANTIFIER*;
//!     atom       ::= CHARACTER | group | class;
//!     group      ::= LEFT_PAREN expression RIGHT_PAREN;
//!     class      ::= LEFT_BRACKET CHARACTER+ RIGHT_BRACKET;
//! ```

use std::fmt;

/// A parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    /// Matches the empty string (e.g., `()`, either side of `a|`).
    Empty,
    /// A single pattern character. `^` and `$` are kept as written and turned
    /// into anchors during compilation.
    Literal(char),
    /// A flat alternation of characters (e.g., `[abc]`).
    Class(Vec<char>),
    /// Juxtaposition of two or more expressions.
    Concat(Vec<Ast>),
    /// `r|s`. Chains nest to the right: `a|b|c` is `a|(b|c)`.
    Alternation(Box<Ast>, Box<Ast>),
    /// `r*`
    Star(Box<Ast>),
    /// `r+`
    Plus(Box<Ast>),
    /// `r?`
    Optional(Box<Ast>),
    /// `(r)`
    Group(Box<Ast>),
}

impl Ast {
    /// Nesting depth of groups, which is also the parser's recursion depth.
    pub fn group_depth(&self) -> usize {
        match self {
            Ast::Empty | Ast::Literal(_) | Ast::Class(_) => 0,
            Ast::Concat(items) => items.iter().map(Ast::group_depth).max().unwrap_or(0),
            Ast::Alternation(lhs, rhs) => lhs.group_depth().max(rhs.group_depth()),
            Ast::Star(inner) | Ast::Plus(inner) | Ast::Optional(inner) => inner.group_depth(),
            Ast::Group(inner) => inner.group_depth() + 1,
        }
    }
}

/// Renders the tree back into pattern text that parses to the same tree.
impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Empty => Ok(()),
            Ast::Literal(ch) => write!(f, "{}", ch),
            Ast::Class(members) => {
                write!(f, "[")?;
                for ch in members {
                    write!(f, "{}", ch)?;
                }
                write!(f, "]")
            }
            Ast::Concat(items) => items.iter().try_for_each(|item| write!(f, "{}", item)),
            Ast::Alternation(lhs, rhs) => write!(f, "{}|{}", lhs, rhs),
            Ast::Star(inner) => write!(f, "{}*", inner),
            Ast::Plus(inner) => write!(f, "{}+", inner),
            Ast::Optional(inner) => write!(f, "{}?", inner),
            Ast::Group(inner) => write!(f, "({})", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Ast;

    fn lit(ch: char) -> Box<Ast> {
        Box::new(Ast::Literal(ch))
    }

    #[test]
    fn renders_pattern_text() {
        let ast = Ast::Concat(vec![
            Ast::Literal('^'),
            Ast::Plus(Box::new(Ast::Group(Box::new(Ast::Plus(lit('a')))))),
            Ast::Class(vec!['x', 'y']),
            Ast::Literal('$'),
        ]);
        assert_eq!(ast.to_string(), "^(a+)+[xy]$");

        let alt = Ast::Alternation(lit('a'), Box::new(Ast::Alternation(lit('b'), lit('c'))));
        assert_eq!(alt.to_string(), "a|b|c");
    }

    #[test]
    fn group_depth() {
        assert_eq!(Ast::Literal('a').group_depth(), 0);
        let nested = Ast::Group(Box::new(Ast::Star(Box::new(Ast::Group(lit('a'))))));
        assert_eq!(nested.group_depth(), 2);
    }
}
