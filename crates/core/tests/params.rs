//! Tests for the read-only parameter-list queries and in-place removal.
//!
//! Covers: counting, extraction of each parameter form, length measurement,
//! capacity handling, the escape rules at top level and inside arrays,
//! removal, whole-key access, and quoting helpers.

use itemkey_core::{
    Param, ParamError, ParamType, SyntaxErrorKind, count, extract, extract_owned, key_count,
    key_param, measure, quote_param, remove, split, unquote_param,
};

fn value(list: &str, index: usize) -> String {
    extract_owned(list, index)
        .unwrap_or_else(|e| panic!("{list:?}[{index}]: {e}"))
        .value
}

fn removed(list: &str, index: usize) -> String {
    let mut s = list.to_string();
    remove(&mut s, index);
    s
}

/// Number of commas outside quotes and arrays, computed independently of
/// the tokenizer for well-formed input.
fn top_level_commas(list: &str) -> usize {
    let mut quoted = false;
    let mut depth = 0;
    let mut prev = '\0';
    let mut n = 0;
    for c in list.chars() {
        match c {
            '"' if !(quoted && prev == '\\') => quoted = !quoted,
            '[' if !quoted => depth += 1,
            ']' if !quoted => depth -= 1,
            ',' if !quoted && depth == 0 => n += 1,
            _ => {}
        }
        prev = c;
    }
    n
}

const WELL_FORMED: &[&str] = &[
    "",
    "   ",
    "a",
    "a,b,c",
    ",,",
    r#""a,b",c"#,
    r#"[1,2,3]"#,
    r#"x, [ "a]" , b ] , "y\"z" "#,
    r#"/,used"#,
    r#""",[],"#,
    r#"[a,"b\"c",d],e"#,
];

// ── Count ───────────────────────────────────────────────────────────────────

#[test]
fn count_is_one_plus_top_level_commas() {
    for list in WELL_FORMED {
        assert_eq!(
            count(list),
            Ok(1 + top_level_commas(list)),
            "count({list:?})"
        );
    }
}

#[test]
fn count_of_empty_list_is_one() {
    assert_eq!(count(""), Ok(1));
    assert_eq!(count("     "), Ok(1));
}

#[test]
fn count_array_recursion() {
    assert_eq!(count("1,2,3"), Ok(3));
    assert_eq!(count(&value("[1,2,3]", 1)), Ok(3));
}

#[test]
fn count_fails_on_syntax_errors() {
    let cases = [
        ("a,\"b", SyntaxErrorKind::UnterminatedQuote),
        ("a,[b", SyntaxErrorKind::UnterminatedArray),
        ("a]", SyntaxErrorKind::UnbalancedBracket),
        ("a,[[b]]", SyntaxErrorKind::NestedArray),
    ];
    for (list, kind) in cases {
        let err = count(list).unwrap_err();
        assert_eq!(err.kind, kind, "{list:?}");
    }
}

// ── Measure / Extract ───────────────────────────────────────────────────────

#[test]
fn measure_matches_extracted_length() {
    for list in WELL_FORMED {
        let n = count(list).unwrap();
        for i in 1..=n {
            let len = measure(list, i).unwrap();
            assert_eq!(len, value(list, i).len(), "{list:?}[{i}]");
        }
    }
}

#[test]
fn overflow_iff_capacity_too_small() {
    for list in WELL_FORMED {
        let n = count(list).unwrap();
        for i in 1..=n {
            let len = measure(list, i).unwrap();
            for cap in 0..len + 3 {
                let res = extract(list, i, cap);
                let overflow = cap == 0 || cap - 1 < len;
                assert_eq!(
                    matches!(res, Err(ParamError::Overflow { .. })),
                    overflow,
                    "{list:?}[{i}] cap {cap}: {res:?}"
                );
                if let Err(ParamError::Overflow { needed, capacity }) = res {
                    assert_eq!(needed, len + 1);
                    assert_eq!(capacity, cap);
                }
            }
        }
    }
}

#[test]
fn extract_basic_forms() {
    assert_eq!(value("a", 1), "a");
    assert_eq!(value("\"a\"", 1), "a");
    assert_eq!(value("[1,2,3]", 1), "1,2,3");
    assert_eq!(
        extract_owned("[1,2,3]", 1),
        Ok(Param {
            value: "1,2,3".to_string(),
            ty: ParamType::Array
        })
    );
}

#[test]
fn extract_skips_leading_spaces_and_keeps_trailing() {
    assert_eq!(value("  a  ,b", 1), "a  ");
    assert_eq!(value("a,  \"b\"  ", 2), "b");
}

#[test]
fn array_elements_lose_separating_spaces() {
    assert_eq!(value("[ 1 , 2 ]", 1), "1 ,2 ");
}

#[test]
fn out_of_range_indexes_are_missing() {
    assert_eq!(measure("a,b", 3), Err(ParamError::Missing { index: 3 }));
    assert_eq!(extract("a,b", 0, 10), Err(ParamError::Missing { index: 0 }));
    assert_eq!(extract_owned("", 2), Err(ParamError::Missing { index: 2 }));
}

#[test]
fn any_syntax_error_hides_all_parameters() {
    for list in ["a,\"b", "a,[b", "a]", "a,[[b]]"] {
        for i in 1..=3 {
            assert_eq!(
                extract_owned(list, i),
                Err(ParamError::Missing { index: i }),
                "{list:?}[{i}]"
            );
        }
    }
}

// ── Escapes ─────────────────────────────────────────────────────────────────

#[test]
fn escape_decoded_at_top_level() {
    assert_eq!(value(r#""a\"b""#, 1), r#"a"b"#);
}

#[test]
fn escape_kept_inside_array_and_decoded_once_more() {
    let inner = value(r#"[ "a\"b" ]"#, 1);
    assert_eq!(inner, r#""a\"b""#);
    let again = value(&inner, 1);
    assert_eq!(again, r#"a"b"#);
}

// ── Split ───────────────────────────────────────────────────────────────────

#[test]
fn split_matches_per_index_extraction() {
    for list in WELL_FORMED {
        let params = split(list).unwrap();
        assert_eq!(params.len(), count(list).unwrap(), "{list:?}");
        for (i, p) in params.iter().enumerate() {
            assert_eq!(Ok(p.clone()), extract_owned(list, i + 1), "{list:?}[{}]", i + 1);
        }
    }
}

#[test]
fn split_serializes_with_type_names() {
    let params = split(r#"a,[b],"#).unwrap();
    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"value": "a", "type": "string"},
            {"value": "b", "type": "array"},
            {"value": "", "type": "undefined"},
        ])
    );
}

// ── Remove ──────────────────────────────────────────────────────────────────

#[test]
fn remove_middle_parameter() {
    assert_eq!(removed("a,b,c", 2), "a,c");
}

#[test]
fn remove_first_parameter_before_array() {
    assert_eq!(removed("a,[b,c],d", 1), "[b,c],d");
}

#[test]
fn remove_counts_array_commas_as_separators() {
    // Index 3 is "c]" here, not "d": removal does not track arrays.
    assert_eq!(removed("a,[b,c],d", 3), "a,[b,d");
    assert_eq!(removed("a,[b,c],d", 4), "a,[b,c]");
}

#[test]
fn remove_out_of_range_is_a_no_op() {
    assert_eq!(removed("a,b", 5), "a,b");
    assert_eq!(removed("a,b", 0), "a,b");
}

// ── Whole keys ──────────────────────────────────────────────────────────────

#[test]
fn key_queries_read_the_bracketed_list() {
    let key = r#"net.if.in["eth0, lo",bytes]"#;
    assert_eq!(key_count(key), Ok(2));
    assert_eq!(key_param(key, 1).unwrap().value, "eth0, lo");
    assert_eq!(key_param(key, 2).unwrap().value, "bytes");
    assert_eq!(key_count("agent.ping"), Err(ParamError::Missing { index: 1 }));
}

// ── Quoting ─────────────────────────────────────────────────────────────────

#[test]
fn quoted_values_extract_back_to_the_original() {
    for raw in ["plain", "a,b", "x]", r#"say "hi""#, " lead", "[x"] {
        let quoted = quote_param(raw, false).unwrap();
        assert_eq!(value(&quoted, 1), raw, "{quoted}");
        assert_eq!(unquote_param(&quoted), raw);
    }
}
