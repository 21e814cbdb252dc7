use parinfer::{indent_mode, paren_mode, smart_mode, ErrorName, Options, ParenTrail};

#[test]
fn indent_mode_closes_paren_on_dedent() {
    let text = "(defn foo [x]\n  (+ x 1";
    let answer = indent_mode(text, Options::new());
    assert!(answer.success, "{:?}", answer.error);
    assert_eq!(answer.text, "(defn foo [x]\n  (+ x 1))");
}

#[test]
fn indent_mode_keeps_structure_when_indentation_is_already_consistent() {
    let text = "(a (b c)\n   (d e))";
    let answer = indent_mode(text, Options::new());
    assert!(answer.success);
    assert_eq!(answer.text, text);
}

#[test]
fn paren_mode_realigns_indentation_to_match_existing_parens() {
    let text = "(defn foo [x]\n(+ x 1))";
    let answer = paren_mode(text, Options::new());
    assert!(answer.success, "{:?}", answer.error);
    assert!(answer.text.starts_with("(defn foo [x]\n "));
}

#[test]
fn paren_mode_output_is_a_stable_fixed_point() {
    // §8: process(paren, process(indent, text).text) is stable — a second
    // pass over already-realigned output changes nothing.
    let text = "(defn foo [x]\n(+ x 1))";
    let first = paren_mode(text, Options::new());
    assert!(first.success, "{:?}", first.error);
    let second = paren_mode(&first.text, Options::new());
    assert!(second.success, "{:?}", second.error);
    assert_eq!(second.text, first.text);
}

#[test]
fn paren_mode_reports_unclosed_paren() {
    let text = "(defn foo [x]\n  (+ x 1)";
    let answer = paren_mode(text, Options::new());
    assert!(!answer.success);
    assert_eq!(answer.error.unwrap().name, ErrorName::UnclosedParen);
}

#[test]
fn paren_mode_stray_closer_matches_spec_scenario_five() {
    let answer = paren_mode(")", Options::new());
    assert!(!answer.success);
    let err = answer.error.unwrap();
    assert_eq!(err.name, ErrorName::UnmatchedCloseParen);
    assert_eq!(err.x, 0);
    assert_eq!(err.line_no, 0);
}

#[test]
fn indent_mode_reports_leading_close_paren() {
    let text = ")foo";
    let answer = indent_mode(text, Options::new());
    assert!(!answer.success);
    assert_eq!(answer.error.unwrap().name, ErrorName::LeadingCloseParen);
}

#[test]
fn smart_mode_restart_matches_plain_paren_mode_exactly() {
    // §8 restart invariant: once smart mode raises Restart on `T`,
    // process(smart, T) must equal process(paren, T) — smart's leniency
    // does not survive the fallback, only the fallback itself does.
    let text = ")foo";
    let smart = smart_mode(text, Options::new());
    let paren = paren_mode(text, Options::new());
    assert_eq!(smart.success, paren.success);
    assert_eq!(smart.text, paren.text);
    assert_eq!(smart.error.map(|e| e.name), paren.error.map(|e| e.name));
}

#[test]
fn smart_mode_disagrees_with_plain_indent_mode_on_a_leading_close_paren() {
    // Indent mode fails fast on the cached leading-close-paren error;
    // smart mode instead restarts into paren mode, which fails later and
    // differently (the stray closer never matches anything on the stack).
    let text = ")foo";
    let indent = indent_mode(text, Options::new());
    let smart = smart_mode(text, Options::new());
    assert_eq!(indent.error.unwrap().name, ErrorName::LeadingCloseParen);
    assert_eq!(smart.error.unwrap().name, ErrorName::UnmatchedCloseParen);
}

#[test]
fn unclosed_quote_is_reported() {
    let text = "(println \"hello)";
    let answer = indent_mode(text, Options::new());
    assert!(!answer.success);
    assert_eq!(answer.error.unwrap().name, ErrorName::UnclosedQuote);
}

#[test]
fn line_comment_is_ignored_by_paren_matching() {
    let text = "(a ; (b\n   c)";
    let answer = indent_mode(text, Options::new());
    assert!(answer.success, "{:?}", answer.error);
}

#[test]
fn escaped_quote_inside_string_does_not_close_it() {
    let text = r#"(println "a\"b")"#;
    let answer = indent_mode(text, Options::new());
    assert!(answer.success, "{:?}", answer.error);
    assert_eq!(answer.text, text);
}

#[test]
fn quote_danger_inside_comment_is_reported() {
    let text = "(a) ; a stray \" in a comment";
    let answer = indent_mode(text, Options::new());
    assert!(!answer.success);
    assert_eq!(answer.error.unwrap().name, ErrorName::QuoteDanger);
}

#[test]
fn nested_dedent_closes_multiple_parens_at_once() {
    let text = "(a (b (c\nd";
    let answer = indent_mode(text, Options::new());
    assert!(answer.success, "{:?}", answer.error);
    assert_eq!(answer.text, "(a (b (c)))\nd");
}

#[test]
fn tab_in_code_context_is_replaced_with_two_spaces() {
    let answer = indent_mode("(a\tb)", Options::new());
    assert!(answer.success, "{:?}", answer.error);
    assert_eq!(answer.text, "(a  b)");
}

#[test]
fn force_balance_silently_elides_an_unmatched_close_paren() {
    let mut options = Options::new();
    options.force_balance = true;
    let answer = indent_mode("(a))", options);
    assert!(answer.success, "{:?}", answer.error);
    assert_eq!(answer.text, "(a)");
}

#[test]
fn partial_result_reports_the_working_text_on_a_leading_close_paren_failure() {
    // Spec scenario 6: indent mode, force_balance=false, leading `)`.
    let mut options = Options::new();
    options.partial_result = true;
    let answer = indent_mode(")abc", options);
    assert!(!answer.success);
    assert_eq!(answer.error.unwrap().name, ErrorName::LeadingCloseParen);
    assert_eq!(answer.text, "abc");
}

#[test]
fn without_partial_result_a_failure_reports_the_original_text_unchanged() {
    let answer = indent_mode(")abc", Options::new());
    assert!(!answer.success);
    assert_eq!(answer.text, ")abc");
}

#[test]
fn return_parens_populates_the_paren_tree() {
    let mut options = Options::new();
    options.return_parens = true;
    let answer = indent_mode("(a)", options);
    assert!(answer.success, "{:?}", answer.error);
    assert_eq!(answer.parens.len(), 1);
    let opener = &answer.parens[0];
    assert_eq!(opener.ch, '(');
    let closer = opener.closer.expect("matched close paren");
    assert_eq!(closer.ch, ')');
    assert_eq!(closer.x, 2);
}

#[test]
fn cursor_tracking_and_tab_stops_are_populated_on_the_cursor_line() {
    let mut options = Options::new();
    options.cursor_x = Some(3);
    options.cursor_line = Some(0);
    let answer = indent_mode("(a b)", options);
    assert!(answer.success, "{:?}", answer.error);
    assert_eq!(answer.cursor_x, Some(3));
    assert_eq!(answer.cursor_line, Some(0));
    assert_eq!(answer.tab_stops.len(), 2);
    assert_eq!(answer.tab_stops[0].ch, '(');
    assert_eq!(answer.tab_stops[0].x, 0);
    assert_eq!(answer.tab_stops[1].ch, 'a');
    assert_eq!(answer.tab_stops[1].arg_x, Some(2));
    assert_eq!(
        answer.paren_trails,
        vec![ParenTrail {
            line_no: 0,
            start_x: 5,
            end_x: 6,
        }]
    );
}
