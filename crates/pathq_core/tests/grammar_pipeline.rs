use pathq_core::{
    BoolMatrixAutomaton, Cfg, Ecfg, Label, Value, cyk, equivalent, minimize_rsm, regex_to_min_dfa,
    to_wcnf,
};

use pathq_core::matrix::BoolMatrix;

const WORDS: [&str; 10] = ["", "a", "b", "ab", "ba", "aabb", "abab", "aab", "abb", "aaabbb"];

#[test]
fn test_wcnf_preserves_language() {
    for text in [
        "S -> a S b | a b",
        "S ->\nS -> a S b",
        "S -> A B\nA -> a | a A\nB -> b",
        "S -> S S | a b |",
    ] {
        let cfg = Cfg::from_text(text, "S").unwrap();
        let wcnf = to_wcnf(&cfg);
        for word in WORDS {
            assert_eq!(
                cyk(word, &cfg),
                cyk(word, &wcnf),
                "membership of {word:?} changed under WCNF for {text:?}"
            );
        }
    }
}

#[test]
fn test_ecfg_round_trip_matches_direct_min_dfa() {
    for text in ["S -> a | b", "S -> (a | b)* | c", "S -> (d*) | (a b c)"] {
        let ecfg = Ecfg::from_text(text, "S").unwrap();
        let minimized = minimize_rsm(&ecfg.to_rsm());
        for (head, dfa) in minimized.boxes() {
            let pattern = text.split_once("->").unwrap().1.trim();
            let direct = regex_to_min_dfa(pattern).unwrap();
            assert!(
                equivalent(dfa, &direct),
                "box {head} of {text:?} differs from the direct minimal DFA"
            );
        }
    }
}

#[test]
fn test_star_box_accepts_empty_word() {
    let ecfg = Ecfg::from_text("S -> (a | b)* | c", "S").unwrap();
    let rsm = minimize_rsm(&ecfg.to_rsm());
    let s_box = rsm.box_for("S").unwrap();
    assert!(s_box.accepts_empty(), "(a|b)* derives the empty word");
    assert!(s_box.accepts(&["c"]));
    assert!(s_box.accepts(&["a", "b", "a"]));
    assert!(!s_box.accepts(&["c", "a"]));
}

#[test]
fn test_rsm_matrix_view_layout() {
    let cfg = Cfg::from_text("S ->\nS -> a S b", "S").unwrap();
    let rsm = Ecfg::from_cfg(&cfg).to_rsm();
    let bma: BoolMatrixAutomaton = BoolMatrixAutomaton::from_rsm(&rsm);

    assert_eq!(bma.state_count(), 4);
    let starts: Vec<&Value> = bma.start_states().collect();
    assert_eq!(
        starts,
        [&Value::pair(Value::from("S"), Value::Int(0))],
        "the box entry state is the automaton start"
    );
    // The ε alternative makes the entry state accepting alongside the state
    // closing `a S b`.
    let finals: Vec<&Value> = bma.final_states().collect();
    assert_eq!(finals.len(), 2);
    assert!(finals.contains(&&Value::pair(Value::from("S"), Value::Int(0))));

    let a = bma.mat(&Label::sym("a")).unwrap();
    let s = bma.mat(&Label::sym("S")).unwrap();
    let b = bma.mat(&Label::sym("b")).unwrap();
    assert_eq!(a.nonzeros(), vec![(0, 1)]);
    assert_eq!(s.nonzeros(), vec![(1, 2)]);
    assert_eq!(b.nonzeros(), vec![(2, 3)]);
}

#[test]
fn test_rsm_matrix_view_of_terminal_grammar() {
    let cfg = Cfg::from_text("S -> a", "S").unwrap();
    let rsm = Ecfg::from_cfg(&cfg).to_rsm();
    let bma: BoolMatrixAutomaton = BoolMatrixAutomaton::from_rsm(&rsm);
    assert_eq!(bma.state_count(), 2);
    assert_eq!(bma.labels().count(), 1);
    assert_eq!(bma.mat(&Label::sym("a")).unwrap().nonzeros(), vec![(0, 1)]);
}

#[test]
fn test_cyk_and_cfg_text_agree_on_balanced_language() {
    let cfg = Cfg::from_text("S -> a S b | a b", "S").unwrap();
    for (word, expected) in [("ab", true), ("aabb", true), ("abab", false), ("", false)] {
        assert_eq!(cyk(word, &cfg), expected, "cyk({word:?})");
    }
}

#[test]
fn test_minimize_rsm_keeps_box_count() {
    let ecfg = Ecfg::from_text("S -> a B\nB -> b*", "S").unwrap();
    let rsm = ecfg.to_rsm();
    let minimized = minimize_rsm(&rsm);
    assert_eq!(rsm.box_count(), minimized.box_count());
    for (head, dfa) in rsm.boxes() {
        assert!(equivalent(dfa, minimized.box_for(head).unwrap()));
    }
}
