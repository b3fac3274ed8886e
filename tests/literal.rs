//! String-literal scanner edge cases.

use logtemplate_rs::{StringKind, scan_all_string_literals, scan_string_literal};
use pretty_assertions::assert_eq;

// -----------------------------------------------------------
// Literal kinds.
// -----------------------------------------------------------

#[test]
fn regular_round_trip_without_escapes() {
    let text = r#"Log.Information("Order {Id} shipped", id);"#;
    let lit = scan_string_literal(text, 16).expect("scan");
    assert_eq!(lit.kind, StringKind::Regular);
    assert_eq!(lit.content, &text[lit.content_start..lit.content_end]);
    assert_eq!(lit.content, "Order {Id} shipped");
}

#[test]
fn regular_escaped_backslash_before_quote() {
    let text = r#""C:\\" + x"#;
    let lit = scan_string_literal(text, 0).expect("scan");
    assert_eq!(lit.content, r"C:\\");
    assert_eq!(lit.end, 5);
}

#[test]
fn regular_stops_at_newline() {
    let text = "\"abc\nnext\"";
    let lit = scan_string_literal(text, 0).expect("scan");
    assert!(!lit.terminated);
    assert_eq!(lit.content, "abc");
    assert_eq!(lit.end, 3);
}

#[test]
fn trailing_backslash_stops_at_newline() {
    let text = "x(\"C:\\\nnext(\"y\")";
    let all = scan_all_string_literals(text);
    assert_eq!(all.len(), 2);
    assert!(!all[0].terminated);
    assert_eq!(all[0].content, "C:\\");
    assert_eq!(all[1].content, "y");
}

#[test]
fn verbatim_spans_lines() {
    let text = "@\"first {A}\nsecond {B}\" + x";
    let lit = scan_string_literal(text, 0).expect("scan");
    assert_eq!(lit.kind, StringKind::Verbatim);
    assert_eq!(lit.content, "first {A}\nsecond {B}");
    assert!(lit.terminated);
}

#[test]
fn verbatim_backslash_is_literal() {
    let text = r#"@"C:\temp\" rest"#;
    let lit = scan_string_literal(text, 0).expect("scan");
    assert_eq!(lit.content, r"C:\temp\");
}

#[test]
fn verbatim_ends_with_doubled_quote_content() {
    let text = r#"@"a """ b"#;
    let lit = scan_string_literal(text, 0).expect("scan");
    assert_eq!(lit.content, r#"a """#);
    assert_eq!(lit.end, 6);
}

#[test]
fn raw_with_longer_delimiter() {
    let text = r#"""""has """ inside"""" x"#;
    let lit = scan_string_literal(text, 0).expect("scan");
    assert_eq!(lit.kind, StringKind::Raw);
    assert_eq!(lit.content, r#"has """ inside"#);
    assert_eq!(lit.content_start, 4);
}

#[test]
fn raw_multiline() {
    let text = "\"\"\"\n    {A}\n    \"\"\";";
    let lit = scan_string_literal(text, 0).expect("scan");
    assert_eq!(lit.kind, StringKind::Raw);
    assert_eq!(lit.content, "\n    {A}\n    ");
    assert_eq!(&text[lit.end + 1..], ";");
}

#[test]
fn interpolated_raw_is_raw() {
    let text = r#"$"""{x}""""#;
    let lit = scan_string_literal(text, 0).expect("scan");
    assert_eq!(lit.kind, StringKind::Raw);
    assert_eq!(lit.content, "{x}");
}

#[test]
fn interpolated_nested_braces() {
    let text = r#"$"{new { A = 1 }.A} end" + y"#;
    let lit = scan_string_literal(text, 0).expect("scan");
    assert_eq!(lit.kind, StringKind::Interpolated);
    assert_eq!(lit.content, "{new { A = 1 }.A} end");
}

#[test]
fn interpolated_quote_inside_hole() {
    let text = r#"$"{d["k"]}" tail"#;
    let lit = scan_string_literal(text, 0).expect("scan");
    assert_eq!(lit.content, r#"{d["k"]}"#);
}

#[test]
fn verbatim_interpolated_spans_lines() {
    let text = "f(@$\"a {x}\n  ) ( {y}\", x, y);";
    let all = scan_all_string_literals(text);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].kind, StringKind::Interpolated);
    assert_eq!(all[0].content, "a {x}\n  ) ( {y}");
    assert!(all[0].terminated);
}

#[test]
fn verbatim_interpolated_doubled_quote_in_text() {
    let text = r#"$@"say ""{word}"" now" + z"#;
    let lit = scan_string_literal(text, 0).expect("scan");
    assert_eq!(lit.content, r#"say ""{word}"" now"#);
    assert_eq!(lit.end, 21);
}

#[test]
fn multi_dollar_raw() {
    let text = r#"$$"""{{x}} {y}""" tail"#;
    let lit = scan_string_literal(text, 0).expect("scan");
    assert_eq!(lit.kind, StringKind::Raw);
    assert_eq!(lit.content, "{{x}} {y}");
}

#[test]
fn empty_regular_string() {
    let lit = scan_string_literal(r#""""#, 0).expect("scan");
    assert_eq!(lit.kind, StringKind::Regular);
    assert_eq!(lit.content, "");
    assert_eq!((lit.content_start, lit.content_end, lit.end), (1, 1, 1));
}

// -----------------------------------------------------------
// Contract violations and unterminated input.
// -----------------------------------------------------------

#[test]
fn offset_past_end_is_none() {
    assert!(scan_string_literal("abc", 10).is_none());
}

#[test]
fn unterminated_kinds_reach_end() {
    for text in ["@\"abc", "\"\"\"abc\"\"", "$\"a {b", "\"abc"] {
        let lit = scan_string_literal(text, 0).expect("scan");
        assert!(!lit.terminated, "{text}");
        assert_eq!(lit.end, text.len() - 1, "{text}");
        assert_eq!(lit.content_end, text.len(), "{text}");
    }
}

// -----------------------------------------------------------
// Scanning a whole buffer.
// -----------------------------------------------------------

#[test]
fn finds_every_kind_in_order() {
    let text = r#"f("a", @"b", $"c", """d""");"#;
    let kinds: Vec<_> = scan_all_string_literals(text)
        .into_iter()
        .map(|l| (l.kind, l.content))
        .collect();
    assert_eq!(
        kinds,
        [
            (StringKind::Regular, "a".to_string()),
            (StringKind::Verbatim, "b".to_string()),
            (StringKind::Interpolated, "c".to_string()),
            (StringKind::Raw, "d".to_string()),
        ]
    );
}

#[test]
fn escaped_quote_does_not_split_literal() {
    let all = scan_all_string_literals(r#"x("say \"hi\"", y)"#);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].content, r#"say \"hi\""#);
}

#[test]
fn scanning_is_idempotent() {
    let text = r#"a("{X}") + @"{Y}" + "unterminated"#;
    assert_eq!(scan_all_string_literals(text), scan_all_string_literals(text));
}
