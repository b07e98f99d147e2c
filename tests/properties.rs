use quickcheck::{quickcheck, Arbitrary, Gen, TestResult};
use redos_detector::{compile, Span};

/// A well-formed pattern over `a` and `b`. Repetition operands are always
/// grouped, so the text parses back to the tree it was built from.
#[derive(Clone, Debug)]
struct Pattern(String);

impl Pattern {
    fn build(g: &mut Gen, depth: usize) -> String {
        let leaf = depth == 0 || usize::arbitrary(g) % 3 == 0;
        if leaf {
            let leaves = ["a", "b", "[ab]", "()"];
            return leaves[usize::arbitrary(g) % leaves.len()].to_string();
        }
        let lhs = Pattern::build(g, depth - 1);
        match usize::arbitrary(g) % 5 {
            0 => format!("{}{}", lhs, Pattern::build(g, depth - 1)),
            1 => format!("({}|{})", lhs, Pattern::build(g, depth - 1)),
            2 => format!("({})*", lhs),
            3 => format!("({})+", lhs),
            _ => format!("({})?", lhs),
        }
    }
}

impl Arbitrary for Pattern {
    fn arbitrary(g: &mut Gen) -> Pattern {
        Pattern(Pattern::build(g, 4))
    }
}

/// Every string over `a` and `b` up to length `max`.
fn inputs(max: usize) -> Vec<String> {
    let mut all = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max {
        let mut next = Vec::new();
        for s in &frontier {
            for ch in ['a', 'b'] {
                let mut t = s.clone();
                t.push(ch);
                next.push(t);
            }
        }
        all.extend(next.iter().cloned());
        frontier = next;
    }
    all
}

/// Maps arbitrary bytes onto lowercase letters, so the result is a pattern
/// without metacharacters.
fn literal(bytes: &[u8]) -> String {
    bytes.iter().take(8).map(|b| (b'a' + b % 26) as char).collect()
}

quickcheck! {
    fn literal_matches_itself(bytes: Vec<u8>) -> bool {
        let text = literal(&bytes);
        let nfa = match compile(&text) {
            Ok(nfa) => nfa,
            Err(_) => return false,
        };
        let spans = match nfa.matches(&text) {
            Ok(spans) => spans,
            Err(_) => return false,
        };
        nfa.is_match(&text) && spans.contains(&Span { start: 0, end: text.chars().count() })
    }

    fn literal_rejects_one_changed_char(bytes: Vec<u8>, at: usize) -> TestResult {
        let text = literal(&bytes);
        if text.is_empty() {
            return TestResult::discard();
        }
        let mut changed: Vec<char> = text.chars().collect();
        let i = at % changed.len();
        changed[i] = if changed[i] == 'z' { 'a' } else { (changed[i] as u8 + 1) as char };
        let changed: String = changed.into_iter().collect();

        let nfa = match compile(&text) {
            Ok(nfa) => nfa,
            Err(_) => return TestResult::failed(),
        };
        let dfa = match nfa.to_dfa() {
            Ok(dfa) => dfa,
            Err(_) => return TestResult::failed(),
        };
        TestResult::from_bool(!nfa.is_match(&changed) && !dfa.is_match(&changed))
    }

    fn dfa_accepts_the_same_language(pattern: Pattern) -> bool {
        let nfa = match compile(&pattern.0) {
            Ok(nfa) => nfa,
            Err(_) => return false,
        };
        let dfa = match nfa.to_dfa() {
            Ok(dfa) => dfa,
            Err(_) => return false,
        };
        inputs(5).iter().all(|input| nfa.is_match(input) == dfa.is_match(input))
    }

    fn dfa_is_deterministic(pattern: Pattern) -> bool {
        let dfa = match compile(&pattern.0).and_then(|nfa| Ok(nfa.to_dfa()?)) {
            Ok(dfa) => dfa,
            Err(_) => return false,
        };
        let mut seen = std::collections::HashSet::new();
        let deterministic = dfa
            .automaton()
            .transitions()
            .all(|t| !t.label.is_epsilon() && seen.insert((t.from, t.label)));
        deterministic
    }

    fn subset_construction_is_repeatable(pattern: Pattern) -> bool {
        let nfa = match compile(&pattern.0) {
            Ok(nfa) => nfa,
            Err(_) => return false,
        };
        match (nfa.to_dfa(), nfa.to_dfa()) {
            (Ok(first), Ok(second)) => first == second,
            _ => false,
        }
    }

    fn matcher_agrees_with_set_simulation(pattern: Pattern) -> bool {
        let nfa = match compile(&pattern.0) {
            Ok(nfa) => nfa,
            Err(_) => return false,
        };
        inputs(3).iter().all(|input| {
            let whole = Span { start: 0, end: input.len() };
            match nfa.matches(input) {
                Ok(spans) => spans.contains(&whole) == nfa.is_match(input),
                // Nested repetitions may legitimately exhaust the limits.
                Err(_) => true,
            }
        })
    }
}
