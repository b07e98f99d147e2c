use redos_detector::{
    compile, is_super_exploitable, Analyzer, CompileErrorKind, Error, Label, SearchError, Span,
};

use crate::init_logging;

#[test]
fn alternation_matches_either_branch() -> anyhow::Result<()> {
    init_logging();
    let nfa = compile("a|b")?;
    assert_eq!(nfa.matches("a")?.into_iter().collect::<Vec<_>>(), vec![Span { start: 0, end: 1 }]);
    assert_eq!(nfa.matches("b")?.into_iter().collect::<Vec<_>>(), vec![Span { start: 0, end: 1 }]);
    assert!(nfa.matches("c")?.is_empty());
    Ok(())
}

#[test]
fn star_and_plus() -> anyhow::Result<()> {
    init_logging();
    let star = compile("a*")?;
    assert!(star.matches("")?.contains(&Span { start: 0, end: 0 }));
    let found = star.matches("aaa")?;
    assert!(found.contains(&Span { start: 0, end: 3 }));

    let plus = compile("a+")?;
    assert!(plus.matches("")?.is_empty());
    assert!(plus.matches("a")?.contains(&Span { start: 0, end: 1 }));
    Ok(())
}

#[test]
fn dfa_of_alternation() -> anyhow::Result<()> {
    let dfa = compile("a|b")?.to_dfa()?;
    let start = dfa.start();
    assert!(!dfa.is_accepting(start));
    for ch in ['a', 'b'] {
        let next = dfa.next_state(start, Label::Char(ch));
        assert!(next.map_or(false, |id| dfa.is_accepting(id)), "no accepting edge on {}", ch);
    }
    assert_eq!(dfa.next_state(start, Label::Char('c')), None);
    Ok(())
}

#[test]
fn malformed_patterns() {
    let cases = [
        ("(a", CompileErrorKind::UnbalancedGroup, 0),
        ("a)", CompileErrorKind::UnbalancedGroup, 1),
        ("[ab", CompileErrorKind::UnterminatedClass, 0),
        ("x[]", CompileErrorKind::EmptyClass, 1),
        ("*a", CompileErrorKind::RepetitionMissing, 0),
        ("a|+", CompileErrorKind::RepetitionMissing, 2),
    ];
    for (pattern, kind, offset) in cases {
        match compile(pattern) {
            Err(Error::Compile(err)) => {
                assert_eq!(err.kind(), &kind, "{}", pattern);
                assert_eq!(err.offset(), Some(offset), "{}", pattern);
            }
            other => panic!("{:?} compiled to {:?}", pattern, other),
        }
    }

    match compile("a\\d") {
        Err(Error::Compile(err)) => {
            assert!(matches!(err.kind(), CompileErrorKind::UnsupportedSyntax(_)));
            assert_eq!(err.offset(), Some(1));
        }
        other => panic!("escape compiled to {:?}", other),
    }
}

#[test]
fn errors_chain_to_their_source() {
    let err = compile("(a").unwrap_err();
    let source = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(source, Some(err.to_string()));
}

#[test]
fn path_limit_is_an_error_not_a_verdict() {
    init_logging();
    let analyzer = Analyzer::builder().max_paths(Some(500)).build();
    let err = analyzer.search("(a|a)*(a|a)*(a|a)*b", "aaaaaaaaaaaaaaaa").unwrap_err();
    assert_eq!(err, Error::Search(SearchError::PathLimitExceeded { limit: 500 }));
}

#[test]
fn loop_records_are_capped_with_live_paths() {
    let analyzer = Analyzer::builder().max_paths(Some(20_000)).build();
    let err = analyzer.search("(a*)*", &"a".repeat(20)).unwrap_err();
    assert_eq!(err, Error::Search(SearchError::PathLimitExceeded { limit: 20_000 }));

    let search = analyzer.search("(a*)*", "aaa").unwrap();
    assert!(search.records() <= 20_000);
    assert_eq!(search.records(), search.matches().len() + search.loops().len());
}

#[test]
fn round_limit_from_the_builder() {
    let analyzer = Analyzer::builder().max_rounds(Some(1)).build();
    let err = analyzer.search("ab", "ab").unwrap_err();
    assert_eq!(err, Error::Search(SearchError::RoundLimitExceeded { limit: 1 }));
}

#[test]
fn unpruned_epsilon_cycles_terminate_through_limits() {
    let analyzer = Analyzer::builder()
        .prune_loops(false)
        .max_rounds(Some(40))
        .max_paths(Some(5_000))
        .build();
    let err = analyzer.search("(a*)*", "aa").unwrap_err();
    assert!(matches!(err, Error::Search(_)));

    let pruned = Analyzer::new().search("(a*)*", "aa").unwrap();
    assert!(!pruned.loops().is_empty());
}

#[test]
fn ambiguity_grows_with_nesting() -> anyhow::Result<()> {
    let analyzer = Analyzer::new();
    let plain = analyzer.search("a+", "aaaaa")?;
    let nested = analyzer.search("(a+)+", "aaaaa")?;
    assert_eq!(plain.ambiguity(), 1);
    assert!(nested.ambiguity() > plain.ambiguity());
    assert_eq!(analyzer.matches("(a+)+", "aaaaa")?, plain.spans());
    Ok(())
}

#[test]
fn super_exploitable() -> anyhow::Result<()> {
    init_logging();
    for pattern in [
        "(a+)+",
        "^(a+)+$",
        "(a*)*b",
        "(a|a)*c",
        "([ab]|b)+x",
        "(a|aa)*b",
        "(aa|a)+b",
        "(a|aa)+$",
        "(a|ab|b)*c",
    ] {
        assert!(is_super_exploitable(pattern)?, "{} should be flagged", pattern);
    }
    for pattern in ["a+", "a*b", "(a|b)*c", "^[ab]+$", "abc", ""] {
        assert!(!is_super_exploitable(pattern)?, "{} should not be flagged", pattern);
    }
    Ok(())
}

#[test]
fn witness_points_into_the_nfa() -> anyhow::Result<()> {
    let nfa = compile("x(a+)*y")?;
    let verdict = Analyzer::new().check("x(a+)*y")?;
    let witness = verdict.witness().ok_or_else(|| anyhow::anyhow!("no witness"))?;
    assert!(nfa.automaton().contains(witness.state));
    assert_eq!(witness.word, "a");
    Ok(())
}

#[test]
fn checker_step_limit() {
    let analyzer = Analyzer::builder().max_steps(Some(2)).build();
    assert!(matches!(analyzer.check("(a|b)*c"), Err(Error::Search(_))));
    assert!(Analyzer::builder().max_steps(None).build().check("(a|b)*c").is_ok());
}
