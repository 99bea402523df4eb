//! Combinator behavior: primitives, composition laws, and the exact printer
//! format, checked over small documents.

use terrace_parse::combinator::{
    any_char, bol, char_if, choice, empty, eof, eol, fail, lazy, literal, literal_as, literals,
    lookahead, many, many1, modify_label, modify_result, not, opt, separated, seq, with_label,
};
use terrace_parse::{result_to_string, Parser, Success, TreeKind};
use terrace_text::{Document, Position, Span};

type P = Parser<(), String>;

fn pos(line: usize, column: usize) -> Position {
    Position::new(line, column)
}

fn span(start: (usize, usize), end: (usize, usize)) -> Span {
    Span::new(pos(start.0, start.1), pos(end.0, end.1))
}

fn digits() -> P {
    many1(char_if(|c| c.as_char().is_ascii_digit()))
}

fn run(p: &P, source: &str, line: usize, col: usize) -> Option<Success<(), String>> {
    p.parse((), &Document::new(source), line, col)
}

// ── Primitives ─────────────────────────────────────────────────────────

#[test]
fn empty_consumes_nothing() {
    let out = run(&empty(), "abc", 0, 1).unwrap();
    assert_eq!(out.result.span, span((0, 1), (0, 1)));
    assert_eq!(out.result.kind, TreeKind::Structural);
}

#[test]
fn fail_always_fails() {
    assert!(run(&fail(), "abc", 0, 0).is_none());
}

#[test]
fn char_if_matches_one_character() {
    let p: P = char_if(|c| c.as_char() == 'a');
    let out = run(&p, "abc", 0, 0).unwrap();
    assert_eq!(out.result.span, span((0, 0), (0, 1)));
    assert_eq!(out.result.kind, TreeKind::Discarded);
    assert!(run(&p, "abc", 0, 1).is_none());
    // Line ends are positions, not characters.
    assert!(run(&p, "abc", 0, 3).is_none());
    assert!(run(&any_char(), "a", 0, 1).is_none());
}

#[test]
fn newline_spans_the_line_transition() {
    let p: P = terrace_parse::combinator::newline();
    let out = run(&p, "ab\ncd", 0, 2).unwrap();
    assert_eq!(out.result.span, span((0, 2), (1, 0)));
    assert!(run(&p, "ab\ncd", 0, 1).is_none());
}

#[test]
fn newline_fails_at_the_end_of_the_last_line() {
    // Only eof may succeed there; eol goes through eof.
    let newline: P = terrace_parse::combinator::newline();
    assert!(run(&newline, "ab", 0, 2).is_none());
    let out = run(&eof(), "ab", 0, 2).unwrap();
    assert!(out.result.span.is_empty());
    let out = run(&eol(), "ab", 0, 2).unwrap();
    assert!(out.result.span.is_empty());
}

#[test]
fn eol_prefers_eof_but_takes_newlines_mid_document() {
    let out = run(&eol(), "ab\ncd", 0, 2).unwrap();
    assert_eq!(out.result.span, span((0, 2), (1, 0)));
}

#[test]
fn bol_only_at_column_zero_of_a_line() {
    assert!(run(&bol(), "ab\ncd", 1, 0).is_some());
    assert!(run(&bol(), "ab\ncd", 1, 1).is_none());
    assert!(run(&bol(), "ab", 1, 0).is_none()); // post-document
}

#[test]
fn not_succeeds_exactly_when_inner_fails() {
    let p: P = not(literal("a"));
    assert!(run(&p, "ab", 0, 0).is_none());
    let out = run(&p, "ba", 0, 0).unwrap();
    assert!(out.result.span.is_empty());
}

#[test]
fn lookahead_consumes_nothing() {
    let p: P = lookahead(literal("ab"));
    let out = run(&p, "ab", 0, 0).unwrap();
    assert!(out.result.span.is_empty());
    assert!(run(&p, "ba", 0, 0).is_none());
}

// ── Literals ───────────────────────────────────────────────────────────

#[test]
fn labeled_literal_matches_and_labels() {
    let out = run(&literal_as("abc", "A".to_string()), "abc", 0, 0).unwrap();
    assert_eq!(out.result.kind, TreeKind::Labeled("A".to_string()));
    assert_eq!(out.result.span, span((0, 0), (0, 3)));
    assert!(out.result.children.is_empty());
    assert!(out.result.prune()[0].children.is_empty());
}

#[test]
fn literal_fails_on_partial_or_split_lines() {
    let p: P = literal("abc");
    assert!(run(&p, "abd", 0, 0).is_none());
    assert!(run(&p, "ab", 0, 0).is_none());
    assert!(run(&p, "ab\nc", 0, 0).is_none());
}

#[test]
fn literal_compares_normalized_characters() {
    // A decomposed e-acute in the source matches a composed one in the
    // literal, both sides going through NFC.
    let p: P = literal("caf\u{00E9}");
    assert!(run(&p, "cafe\u{0301}", 0, 0).is_some());
}

#[test]
fn literals_takes_the_first_match() {
    let p: P = literals(&["ab", "a"]);
    let out = run(&p, "ab", 0, 0).unwrap();
    assert_eq!(out.result.span.end, pos(0, 2));
    let out = run(&p, "ax", 0, 0).unwrap();
    assert_eq!(out.result.span.end, pos(0, 1));
}

// ── Composition ────────────────────────────────────────────────────────

#[test]
fn seq_threads_the_cursor_across_lines() {
    let p: P = seq(vec![
        literal("ab"),
        terrace_parse::combinator::newline(),
        literal_as("cd", "Tail".to_string()),
    ]);
    let out = run(&p, "ab\ncd", 0, 0).unwrap();
    assert_eq!(out.result.span, span((0, 0), (1, 2)));
    // Discarded newline filtered; structural literal and labeled tail kept.
    assert_eq!(out.result.children.len(), 2);
}

#[test]
fn seq_fails_when_any_element_fails() {
    let p: P = seq(vec![literal("ab"), literal("xy")]);
    assert!(run(&p, "abcd", 0, 0).is_none());
}

#[test]
fn choice_takes_the_first_success() {
    let p: P = choice(vec![
        literal_as("ab", "long".to_string()),
        literal_as("a", "short".to_string()),
    ]);
    let out = run(&p, "ab", 0, 0).unwrap();
    assert_eq!(out.result.label(), Some(&"long".to_string()));
}

#[test]
fn repetition_is_greedy_and_total() {
    let p: P = many(char_if(|c| c.as_char().is_ascii_digit()));
    let out = run(&p, "12ab", 0, 0).unwrap();
    assert_eq!(out.result.span, span((0, 0), (0, 2)));
    assert!(out.result.prune().is_empty());
    // Zero repetitions still succeed.
    let out = run(&p, "ab", 0, 0).unwrap();
    assert!(out.result.span.is_empty());
}

#[test]
fn repetition_stops_on_a_zero_width_success() {
    let p: P = many(empty());
    let out = run(&p, "ab", 0, 0).unwrap();
    assert!(out.result.span.is_empty());
}

#[test]
fn many1_requires_one_occurrence() {
    assert!(run(&digits(), "ab", 0, 0).is_none());
    assert!(run(&digits(), "1ab", 0, 0).is_some());
}

#[test]
fn separated_parses_interleaved_elements() {
    let p: P = separated(digits(), literal(","));
    let out = run(&p, "1,22,3x", 0, 0).unwrap();
    assert_eq!(out.result.span, span((0, 0), (0, 6)));
}

#[test]
fn lazy_supports_recursive_grammars() {
    // parens := "(" parens ")" | ""
    fn parens() -> P {
        lazy(|| choice(vec![seq(vec![literal("("), parens(), literal(")")]), empty()]))
    }
    let p = parens();
    let out = run(&p, "((()))x", 0, 0).unwrap();
    assert_eq!(out.result.span.end, pos(0, 6));
    let out = run(&p, "((", 0, 0).unwrap();
    assert!(out.result.span.is_empty());
}

#[test]
fn modify_result_can_reject_a_success() {
    let p: P = modify_result(digits(), |success| {
        // Only two-digit runs pass.
        (success.result.span.end.column - success.result.span.start.column == 2)
            .then_some(success)
    });
    assert!(run(&p, "12", 0, 0).is_some());
    assert!(run(&p, "123", 0, 0).is_none());
}

#[test]
fn modify_label_rewrites_the_top_kind() {
    let p: P = modify_label(literal_as("a", "x".to_string()), |label| {
        label.map(|l| l.to_uppercase())
    });
    let out = run(&p, "a", 0, 0).unwrap();
    assert_eq!(out.result.label(), Some(&"X".to_string()));
    // None means structural.
    let p: P = modify_label(literal_as("a", "x".to_string()), |_| None);
    let out = run(&p, "a", 0, 0).unwrap();
    assert_eq!(out.result.kind, TreeKind::Structural);
}

#[test]
fn with_label_labels_a_structural_result() {
    let p: P = with_label(digits(), "Num".to_string());
    let out = run(&p, "42", 0, 0).unwrap();
    assert_eq!(out.result.label(), Some(&"Num".to_string()));
}

// ── Laws ───────────────────────────────────────────────────────────────

fn assert_same(a: &P, b: &P, sources: &[&str]) {
    for source in sources {
        let doc = Document::new(source);
        let left = a.parse((), &doc, 0, 0).map(|s| s.result);
        let right = b.parse((), &doc, 0, 0).map(|s| s.result);
        assert_eq!(left, right, "parsers disagree on {source:?}");
    }
}

#[test]
fn composition_laws_hold() {
    let inputs = ["", "a", "ab", "1a", "12,3", ",", "x,y"];
    assert_same(&seq(vec![]), &empty(), &inputs);
    assert_same(&seq(vec![digits()]), &digits(), &inputs);
    assert_same(&choice(vec![fail(), digits()]), &digits(), &inputs);
    assert_same(&choice(vec![digits(), fail()]), &digits(), &inputs);
    assert_same(&opt(digits()), &choice(vec![digits(), empty()]), &inputs);
    assert_same(&many1(digits()), &seq(vec![digits(), many(digits())]), &inputs);
    assert_same(
        &separated(digits(), literal(",")),
        &seq(vec![digits(), many(seq(vec![literal(","), digits()]))]),
        &inputs,
    );
}

#[test]
fn parsing_is_deterministic() {
    let p: P = separated(digits(), literal(","));
    let doc = Document::new("1,2,3");
    let first = p.parse((), &doc, 0, 0).unwrap().result;
    let second = p.parse((), &doc, 0, 0).unwrap().result;
    assert_eq!(first, second);
}

#[test]
fn result_spans_start_at_the_entry_position() {
    let doc = Document::new("ab 12\ncd");
    let parsers: Vec<P> = vec![
        empty(),
        any_char(),
        digits(),
        many(any_char()),
        opt(literal("1")),
        literal("12"),
    ];
    for p in &parsers {
        if let Some(out) = p.parse((), &doc, 0, 3) {
            assert_eq!(out.result.span.start, pos(0, 3));
        }
    }
}

// ── Printer ────────────────────────────────────────────────────────────

#[test]
fn printer_formats_an_atomic_labeled_node() {
    let doc = Document::new("abc");
    let out = run(&literal_as("abc", "A".to_string()), "abc", 0, 0).unwrap();
    let printed = result_to_string(&doc, &out.result, &|l| l.clone(), &|_| false);
    assert_eq!(printed, "[00:00 to 00:03[   A = \"abc\"\n");
}

#[test]
fn printer_prunes_before_printing() {
    let doc = Document::new("12ab");
    let p: P = seq(vec![
        with_label(digits(), "Num".to_string()),
        with_label(many(char_if(|c| c.as_char().is_ascii_lowercase())), "Word".to_string()),
    ]);
    let out = p.parse((), &doc, 0, 0).unwrap();
    // The structural seq root dissolves into two top-level lines.
    let printed = result_to_string(&doc, &out.result, &|l| l.clone(), &|_| false);
    assert_eq!(
        printed,
        "[00:00 to 00:02[   Num = \"12\"\n[00:02 to 00:04[   Word = \"ab\"\n"
    );
}

// ── State threading ────────────────────────────────────────────────────

/// A parser that consumes one character and increments a counter state.
fn counting() -> Parser<u32, String> {
    modify_result(any_char(), |success: Success<u32, String>| {
        Some(Success { state: success.state + 1, result: success.result })
    })
}

#[test]
fn state_threads_through_sequences_and_repetition() {
    let doc = Document::new("abc");
    let out = many(counting()).parse(0, &doc, 0, 0).unwrap();
    assert_eq!(out.state, 3);
}

#[test]
fn failed_branches_leak_no_state() {
    let doc = Document::new("ab");
    // First branch counts two characters then fails; second branch counts one.
    let p = choice(vec![
        seq(vec![counting(), counting(), fail()]),
        counting(),
    ]);
    let out = p.parse(0, &doc, 0, 0).unwrap();
    assert_eq!(out.state, 1);
}

#[test]
fn lookahead_and_not_discard_inner_state() {
    let doc = Document::new("ab");
    let out = lookahead(counting()).parse(0, &doc, 0, 0).unwrap();
    assert_eq!(out.state, 0);
    let out = not(seq(vec![counting(), fail()])).parse(0, &doc, 0, 0).unwrap();
    assert_eq!(out.state, 0);
}

#[test]
#[should_panic(expected = "invalid position")]
fn parsers_reject_invalid_entry_positions() {
    let doc = Document::new("ab");
    let _ = empty::<(), String>().parse((), &doc, 0, 5);
}

#[test]
fn eof_holds_on_the_empty_document() {
    assert!(run(&eof(), "", 0, 0).is_some());
    let doc = Document::from_lines(Vec::new());
    assert!(eof::<(), String>().parse((), &doc, 0, 0).is_some());
}
