// compat_syntax.rs - Ruby syntax coverage, from pattern text to JavaScript.
//
//   js(pattern, expected)            -> convert, expect exact output, no warnings
//   w(pattern, expected, category)   -> convert, expect output and one warning
//   e(pattern, kind)                 -> expect a parse error of the given kind

use ferroni_js::prelude::*;

fn js(pattern: &str, expected: &str) {
    let result = convert_pattern(pattern)
        .unwrap_or_else(|e| panic!("conversion failed for {:?}: {}", pattern, e));
    assert_eq!(result.pattern, expected, "js: wrong output for {:?}", pattern);
    assert!(
        result.is_lossless(),
        "js: unexpected warnings for {:?}: {:?}",
        pattern,
        result.warnings
    );
}

fn w(pattern: &str, expected: &str, category: WarningCategory) {
    let result = convert_pattern(pattern)
        .unwrap_or_else(|e| panic!("conversion failed for {:?}: {}", pattern, e));
    assert_eq!(result.pattern, expected, "w: wrong output for {:?}", pattern);
    let categories: Vec<WarningCategory> = result.warnings.iter().map(|w| w.category).collect();
    assert_eq!(categories, vec![category], "w: wrong warnings for {:?}", pattern);
}

fn e(pattern: &str, kind: ParseErrorKind) {
    match convert_pattern(pattern) {
        Err(Error::Parse(err)) => assert_eq!(err.kind, kind, "e: wrong error for {:?}", pattern),
        other => panic!("e: expected parse error for {:?}, got {:?}", pattern, other),
    }
}

// === Literals and escapes ===

#[test]
fn plain_literals() {
    js("abc", "abc");
    js("a/b", r"a\/b");
    js(r"a\.b\+", r"a\.b\+");
    js("", "");
}

#[test]
fn invalid_interval_is_literal() {
    js("a{x", r"a\{x");
    js("a{,}", r"a\{,\}");
}

#[test]
fn control_escapes() {
    js(r"\t\n\r\f\v", r"\t\n\r\f\v");
    js(r"\cA\e\0", r"\x01\x1B\x00");
    js(r"\a", r"\x07");
}

#[test]
fn code_point_escapes() {
    js(r"\x41\x{42}C\u{44}", "ABCD");
    js(r"\101", "A");
    js(r"\x2a", r"\*");
}

// === Types and anchors ===

#[test]
fn char_types() {
    js(r"\d\D\w\W\s\S", r"\d\D\w\W\s\S");
    js(r"\h\H", "[A-Fa-f0-9][^A-Fa-f0-9]");
    js(".", ".");
    w(r"\X", r"(?:\r\n|[\s\S])", WarningCategory::ApproximatedType);
}

#[test]
fn anchors() {
    w(r"^a$", r"^a(?=\n|$)", WarningCategory::ApproximatedAnchor);
    js(r"\Aa\z", "^a$");
    js(r"a\Z", r"a(?=\n?$)");
    js(r"\ba\B", r"\ba\B");
    w(r"\Ga", "a", WarningCategory::UnsupportedAnchor);
}

#[test]
fn dot_in_multiline_mode() {
    let conv = Converter::builder().dot_matches_newline(true).build();
    assert_eq!(conv.convert_pattern(".").unwrap().pattern, r"(?:.|\n)");
    js("(?m).", r"(?:.|\n)");
    js("(?m:a).", r"(?:a).");
}

// === Quantifiers ===

#[test]
fn quantifiers() {
    js("a*b+c?", "a*b+c?");
    js("a*?b+?c??", "a*?b+?c??");
    js("a{2}b{2,}c{2,3}?", "a{2}b{2,}c{2,3}?");
    js("a{,3}", "a{0,3}");
    js("ab*", "ab*");
    js("(?:ab)+", "(?:ab)+");
    js("(ab)*", "(ab)*");
}

#[test]
fn interval_followed_by_plus_is_nested() {
    js("a{2}+", "(?:a{2})+");
}

// === Groups ===

#[test]
fn groups() {
    js("(a)(?:b)", "(a)(?:b)");
    js("(?=a)(?!b)", "(?=a)(?!b)");
    js("(?#comment)a", "a");
    js("(?>a)", r"(?=(a))\1(?:)");
}

#[test]
fn alternation() {
    js("a|b|c", "a|b|c");
    js("(a|bc)d", "(a|bc)d");
}

#[test]
fn lookbehind() {
    w("(?<=a)b", "(?:a)b", WarningCategory::LookbehindDowngraded);
    w("(?<!a)b", "b", WarningCategory::LookbehindDowngraded);
}

#[test]
fn case_insensitive_astral_literal() {
    js("(?i:\u{10428})", r"(?:(?:\uD801\uDC28|\uD801\uDC00))");
    js(
        "(?i:\u{10428}+)",
        r"(?:(?:(?:\uD801\uDC28|\uD801\uDC00))+)",
    );
}

#[test]
fn named_groups_demote_unnamed() {
    js(r"(?<x>a)(b)\k<x>", r"(a)(?:b)(?:\1)");
    js(r"(a)(?'y'b)\k<y>", r"(?:a)(b)(?:\1)");
}

#[test]
fn relative_backreference() {
    js(r"(a)(b)\k<-1>", r"(a)(b)(?:\2)");
}

#[test]
fn forward_backreference() {
    w(r"\1(a)", "(?:)(a)", WarningCategory::UnresolvedBackreference);
}

#[test]
fn unknown_constructs() {
    w(r"(a)\g<1>", "(a)(?:)", WarningCategory::UnknownNodeKind);
    w(r"a\Kb", "a(?:)b", WarningCategory::UnknownNodeKind);
    w("(a)(?(1)b|c)", "(a)(?:)", WarningCategory::UnknownGroupKind);
}

// === Options ===

#[test]
fn inline_options() {
    js("(?i:a)b", "(?:[aA])b");
    js("a(?i)b", "a[bB]");
    js("a(?i)b|c", "a(?:[bB]|[cC])");
    js("(?i)a(?-i)b", "[aA]b");
    js("(?x) a b # comment\n c", "abc");
    js("(?x: a b )c d", "(?:ab)c d");
}

#[test]
fn unsupported_option_letters() {
    w("(?a)b", "b", WarningCategory::UnsupportedGroupOption);
    w("(?u:b)", "(?:b)", WarningCategory::UnsupportedGroupOption);
}

#[test]
fn case_sensitive_scope_in_ignorecase_pattern() {
    let conv = Converter::builder().case_insensitive(true).build();
    let result = conv.convert_pattern("(?-i:a)b").unwrap();
    assert_eq!(result.pattern, "(?:a)b");
    assert_eq!(result.flags, "gi");
    assert_eq!(result.warnings[0].category, WarningCategory::CaseSensitiveScope);
}

#[test]
fn extended_mode_keeps_escaped_space() {
    let conv = Converter::builder().extended(true).build();
    assert_eq!(conv.convert_pattern(r"a\ b").unwrap().pattern, "a b");
    assert_eq!(conv.convert_pattern("[a b]").unwrap().pattern, "[a b]");
}

// === Properties and classes ===

#[test]
fn properties() {
    js(r"\p{XDigit}", "[0-9A-Fa-f]");
    js(r"\P{XDigit}", "[^0-9A-Fa-f]");
    js(r"\p{^XDigit}", "[^0-9A-Fa-f]");
    js(r"\p{Blank}", r"[\t \u00A0\u1680\u2000-\u200A\u202F\u205F\u3000]");
    js(r"\p{Zl}", r"[\u2028]");
    w(r"\p{In_Arrows}", "(?:)", WarningCategory::UnsupportedProperty);
}

#[test]
fn astral_property_members_are_clipped() {
    let result = convert_pattern(r"\p{Alpha}").unwrap();
    assert!(result.pattern.starts_with(r"[A-Za-z\u00AA"));
    assert!(result.pattern.ends_with(']'));
    let rendered: Vec<String> = result.warnings.iter().map(|w| w.to_string()).collect();
    assert_eq!(
        rendered,
        vec!["astral-plane-property: astral plane members of property 'Alpha' dropped"]
    );
}

#[test]
fn classes() {
    js("[abc]", "[abc]");
    js("[^a-z]", "[^a-z]");
    js(r"[\w-]", r"[\w\-]");
    js("[]a]", r"[\]a]");
    js(r"[\b]", r"[\b]");
    js(r"[\d\s]", r"[\d\s]");
    js(r"[\h]", "[A-Fa-f0-9]");
}

#[test]
fn class_extractions() {
    js("[[:xdigit:]]", "[0-9A-Fa-f]");
    js("[x[:xdigit:]]", "(?:[x]|[0-9A-Fa-f])");
    js(r"[\p{XDigit}\p{ASCII}]", r"(?:[0-9A-Fa-f]|[\x00-\x7F])");
    js("[[:^xdigit:]]", "[^0-9A-Fa-f]");
}

#[test]
fn class_degradations() {
    let result = convert_pattern("[a-z&&[^aeiou]]").unwrap();
    assert_eq!(result.pattern, "[a-z]");
    let categories: Vec<WarningCategory> = result.warnings.iter().map(|w| w.category).collect();
    assert_eq!(
        categories,
        vec![WarningCategory::SetIntersection, WarningCategory::NestedNegativeSet]
    );
    w(r"[^\H]", "", WarningCategory::UnsupportedNonHexInNegativeSet);
    w(r"[^a\p{Alpha}]", "[^a]", WarningCategory::PropertyInNegativeSet);
}

// === Parse errors ===

#[test]
fn group_errors() {
    e("(a", ParseErrorKind::EndPatternWithUnmatchedParenthesis);
    e("a)", ParseErrorKind::UnmatchedCloseParenthesis);
    e("(?", ParseErrorKind::EndPatternInGroup);
    e("(?#abc", ParseErrorKind::EndPatternInGroup);
    e("(?z)", ParseErrorKind::UndefinedGroupOption);
    e("(?<>a)", ParseErrorKind::EmptyGroupName);
    e("(?<a-b>x)", ParseErrorKind::InvalidGroupName("a-b".to_string()));
}

#[test]
fn backref_errors() {
    e(r"(a)\2", ParseErrorKind::InvalidBackref);
    e(r"(?<n>a)\1", ParseErrorKind::NumberedBackrefOrCallNotAllowed);
    e(r"(?<a>x)\k<b>", ParseErrorKind::UndefinedNameReference("b".to_string()));
    e(r"\k<-1>", ParseErrorKind::InvalidBackref);
}

#[test]
fn repeat_errors() {
    e("+a", ParseErrorKind::TargetOfRepeatOperatorNotSpecified);
    e("{2}", ParseErrorKind::TargetOfRepeatOperatorNotSpecified);
    e(r"\b+", ParseErrorKind::TargetOfRepeatOperatorInvalid);
    e("(?=a)*", ParseErrorKind::TargetOfRepeatOperatorInvalid);
    e("a{2,1}", ParseErrorKind::UpperSmallerThanLowerInRepeatRange);
    e("a{1,200000}", ParseErrorKind::TooBigNumberForRepeatRange);
}

#[test]
fn class_errors() {
    e("[a", ParseErrorKind::PrematureEndOfCharClass);
    e("[]", ParseErrorKind::PrematureEndOfCharClass);
    e("[b-a]", ParseErrorKind::EmptyRangeInCharClass);
    e("[[:foo:]]", ParseErrorKind::InvalidPosixBracketType);
}

#[test]
fn escape_errors() {
    e("a\\", ParseErrorKind::EndPatternAtEscape);
    e(r"\c", ParseErrorKind::EndPatternAtControl);
    e(r"\p{Alpha", ParseErrorKind::EndPatternAtLeftBrace);
    e(r"\u12", ParseErrorKind::InvalidCodePointValue);
    e(r"\x{FFFFFFF}", ParseErrorKind::InvalidCodePointValue);
}

#[test]
fn error_messages_follow_oniguruma() {
    let err = parse("[a").unwrap_err();
    assert_eq!(err.to_string(), "premature end of char-class (at offset 0)");
    assert_eq!(err.code(), -103);
    let err = convert_pattern("(?<a>x)\\k<zz>").unwrap_err();
    assert_eq!(
        err.to_string(),
        "syntax error: undefined name <zz> reference (at offset 7)"
    );
}

#[test]
fn parse_depth_limit() {
    let pattern = format!("{}a{}", "(".repeat(40), ")".repeat(40));
    let conv = Converter::builder().depth_limit(16).build();
    match conv.convert_pattern(&pattern) {
        Err(Error::Parse(err)) => assert_eq!(err.kind, ParseErrorKind::ParseDepthLimitOver),
        other => panic!("expected depth error, got {:?}", other),
    }
    assert!(convert_pattern(&pattern).is_ok());
}
