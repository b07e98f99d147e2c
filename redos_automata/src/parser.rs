//! Recursive descent parser from pattern text to an [`Ast`].
//!
//! Offsets in errors count characters, not bytes.

use crate::ast::Ast;
use crate::{CompileError, CompileErrorKind, CompileResult};

/// Parses `pattern` into a syntax tree.
pub fn parse(pattern: &str) -> CompileResult<Ast> {
    Parser::new(pattern).parse()
}

/// Recursive descent parser over the characters of one pattern.
pub struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    pub fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            pos: 0,
        }
    }

    /// Parses the whole pattern.
    pub fn parse(&mut self) -> CompileResult<Ast> {
        let ast = self.expression()?;
        match self.peek() {
            // Only a `)` stops an expression before the end of input.
            Some(_) => Err(CompileError::at(CompileErrorKind::UnbalancedGroup, self.pos)),
            None => Ok(ast),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    /// Rule: `expression ::= sequence (VERTICAL expression)?`
    fn expression(&mut self) -> CompileResult<Ast> {
        let lhs = self.sequence()?;
        if self.peek() == Some('|') {
            self.bump();
            let rhs = self.expression()?;
            return Ok(Ast::Alternation(Box::new(lhs), Box::new(rhs)));
        }
        Ok(lhs)
    }

    /// Rule: `sequence ::= repeat*`
    fn sequence(&mut self) -> CompileResult<Ast> {
        let mut items = Vec::new();
        while let Some(ch) = self.peek() {
            if ch == '|' || ch == ')' {
                break;
            }
            items.push(self.repeat()?);
        }
        Ok(match items.len() {
            0 => Ast::Empty,
            1 => items.remove(0),
            _ => Ast::Concat(items),
        })
    }

    /// Rule: `repeat ::= atom QUANTIFIER*`
    ///
    /// Quantifiers bind to the atom immediately before them only.
    fn repeat(&mut self) -> CompileResult<Ast> {
        let mut ast = self.atom()?;
        loop {
            ast = match self.peek() {
                Some('*') => Ast::Star(Box::new(ast)),
                Some('+') => Ast::Plus(Box::new(ast)),
                Some('?') => Ast::Optional(Box::new(ast)),
                _ => return Ok(ast),
            };
            self.bump();
        }
    }

    /// Rule: `atom ::= CHARACTER | group | class`
    fn atom(&mut self) -> CompileResult<Ast> {
        let offset = self.pos;
        match self.bump() {
            Some('(') => self.group(offset),
            Some('[') => self.class(offset),
            Some('\\') => Err(self.escape(offset)),
            Some('*') | Some('+') | Some('?') => {
                Err(CompileError::at(CompileErrorKind::RepetitionMissing, offset))
            }
            Some(ch) => Ok(Ast::Literal(ch)),
            // `sequence` only calls us with input left.
            None => Ok(Ast::Empty),
        }
    }

    /// Rule: `group ::= LEFT_PAREN expression RIGHT_PAREN`
    fn group(&mut self, open: usize) -> CompileResult<Ast> {
        let inner = self.expression()?;
        match self.bump() {
            Some(')') => Ok(Ast::Group(Box::new(inner))),
            _ => Err(CompileError::at(CompileErrorKind::UnbalancedGroup, open)),
        }
    }

    /// Rule: `class ::= LEFT_BRACKET CHARACTER+ RIGHT_BRACKET`
    fn class(&mut self, open: usize) -> CompileResult<Ast> {
        let mut members = Vec::new();
        loop {
            let offset = self.pos;
            match self.bump() {
                Some(']') => break,
                Some('\\') => return Err(self.escape(offset)),
                Some(ch) => members.push(ch),
                None => return Err(CompileError::at(CompileErrorKind::UnterminatedClass, open)),
            }
        }
        if members.is_empty() {
            return Err(CompileError::at(CompileErrorKind::EmptyClass, open));
        }
        Ok(Ast::Class(members))
    }

    fn escape(&self, offset: usize) -> CompileError {
        let what = match self.peek() {
            Some(ch) => format!("escape sequence \\{}", ch),
            None => "trailing backslash".to_string(),
        };
        CompileError::at(CompileErrorKind::UnsupportedSyntax(what), offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(ch: char) -> Box<Ast> {
        Box::new(Ast::Literal(ch))
    }

    fn kind(pattern: &str) -> CompileErrorKind {
        parse(pattern).unwrap_err().kind().clone()
    }

    #[test]
    fn quantifiers_bind_to_previous_atom() {
        assert_eq!(
            parse("ab*").unwrap(),
            Ast::Concat(vec![Ast::Literal('a'), Ast::Star(lit('b'))])
        );
        assert_eq!(
            parse("(ab)+").unwrap(),
            Ast::Plus(Box::new(Ast::Group(Box::new(Ast::Concat(vec![
                Ast::Literal('a'),
                Ast::Literal('b'),
            ])))))
        );
        assert_eq!(parse("a*?").unwrap(), Ast::Optional(Box::new(Ast::Star(lit('a')))));
    }

    #[test]
    fn alternation_scopes_to_enclosing_group() {
        assert_eq!(
            parse("x(a|b)y").unwrap(),
            Ast::Concat(vec![
                Ast::Literal('x'),
                Ast::Group(Box::new(Ast::Alternation(lit('a'), lit('b')))),
                Ast::Literal('y'),
            ])
        );
        assert_eq!(
            parse("a|b|c").unwrap(),
            Ast::Alternation(lit('a'), Box::new(Ast::Alternation(lit('b'), lit('c'))))
        );
    }

    #[test]
    fn empty_pieces() {
        assert_eq!(parse("").unwrap(), Ast::Empty);
        assert_eq!(parse("()").unwrap(), Ast::Group(Box::new(Ast::Empty)));
        assert_eq!(parse("a|").unwrap(), Ast::Alternation(lit('a'), Box::new(Ast::Empty)));
    }

    #[test]
    fn classes_and_stray_brackets() {
        assert_eq!(parse("[ab]").unwrap(), Ast::Class(vec!['a', 'b']));
        assert_eq!(parse("[(|]").unwrap(), Ast::Class(vec!['(', '|']));
        assert_eq!(parse("a]").unwrap(), Ast::Concat(vec![Ast::Literal('a'), Ast::Literal(']')]));
    }

    #[test]
    fn anchors_are_literals_here() {
        assert_eq!(
            parse("^a$").unwrap(),
            Ast::Concat(vec![Ast::Literal('^'), Ast::Literal('a'), Ast::Literal('$')])
        );
    }

    #[test]
    fn malformed_patterns() {
        assert_eq!(kind("(a"), CompileErrorKind::UnbalancedGroup);
        assert_eq!(kind("a)"), CompileErrorKind::UnbalancedGroup);
        assert_eq!(kind("[ab"), CompileErrorKind::UnterminatedClass);
        assert_eq!(kind("[]"), CompileErrorKind::EmptyClass);
        assert_eq!(kind("*a"), CompileErrorKind::RepetitionMissing);
        assert_eq!(kind("a|+"), CompileErrorKind::RepetitionMissing);
        assert!(matches!(kind("a\\d"), CompileErrorKind::UnsupportedSyntax(_)));
        assert!(matches!(kind("[a\\]]"), CompileErrorKind::UnsupportedSyntax(_)));
        assert!(matches!(kind("a\\"), CompileErrorKind::UnsupportedSyntax(_)));
    }

    #[test]
    fn error_offsets() {
        assert_eq!(parse("ab(cd").unwrap_err().offset(), Some(2));
        assert_eq!(parse("ab)").unwrap_err().offset(), Some(2));
        assert_eq!(parse("x[ab").unwrap_err().offset(), Some(1));
        assert_eq!(parse("a\\d").unwrap_err().offset(), Some(1));
    }

    #[test]
    fn display_round_trips() {
        for pattern in ["^(a+)+$", "a|b|c", "x(a|b)*y", "[abc]?d", "a**", "(|a)"] {
            assert_eq!(parse(pattern).unwrap().to_string(), pattern);
        }
    }
}
