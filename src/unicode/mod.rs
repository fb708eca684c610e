// unicode/mod.rs - Character property resolution.
//
// Maps `\p{...}` and POSIX bracket names to class-range text the target
// dialect can embed between brackets. Names are normalized the way
// Oniguruma's property lookup does it, then resolved against the Unicode
// tables of regex-syntax. A JavaScript class without the `u` flag holds
// UTF-16 code units, so members above U+FFFF are clipped.

mod property_data;

use std::fmt::Write;

use regex_syntax::hir::{Class, HirKind};
use regex_syntax::Parser;

use crate::convert::literal::push_set_char;
use property_data::POSIX_CLASSES;

const MAX_PROPERTY_NAME_LEN: usize = 64;
const MAX_BMP: u32 = 0xFFFF;

/// A resolved property rendered for a JavaScript class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRanges {
    /// Range text usable between `[` and `]`. Empty when the property has
    /// no member in the BMP.
    pub ranges: String,
    /// Members above U+FFFF were dropped.
    pub clipped: bool,
}

impl PropertyRanges {
    /// The property as a standalone class, complemented when `negative`.
    pub fn class(&self, negative: bool) -> String {
        match (self.ranges.is_empty(), negative) {
            (true, false) => "(?!)".to_string(),
            (true, true) => "[\\s\\S]".to_string(),
            (false, false) => format!("[{}]", self.ranges),
            (false, true) => format!("[^{}]", self.ranges),
        }
    }
}

/// Normalize a property name: drop spaces, hyphens and underscores, and
/// lowercase the rest. Anything else outside ASCII alphanumerics never
/// matches.
fn normalize_property_name(name: &str) -> Option<String> {
    let mut key = String::with_capacity(name.len());
    for b in name.bytes() {
        if b == b' ' || b == b'-' || b == b'_' {
            continue;
        }
        if !b.is_ascii_alphanumeric() || key.len() >= MAX_PROPERTY_NAME_LEN {
            return None;
        }
        key.push(b.to_ascii_lowercase() as char);
    }
    (!key.is_empty()).then_some(key)
}

fn class_expression(key: &str) -> String {
    match POSIX_CLASSES.binary_search_by_key(&key, |&(name, _)| name) {
        Ok(idx) => POSIX_CLASSES[idx].1.to_string(),
        Err(_) => format!("\\p{{{key}}}"),
    }
}

/// Code point ranges of a class expression, or `None` when the Unicode
/// tables do not know it.
fn code_point_ranges(expr: &str) -> Option<Vec<(char, char)>> {
    let hir = Parser::new().parse(expr).ok()?;
    match hir.kind() {
        HirKind::Class(Class::Unicode(class)) => Some(
            class
                .ranges()
                .iter()
                .map(|r| (r.start(), r.end()))
                .collect(),
        ),
        HirKind::Class(Class::Bytes(class)) if class.ranges().is_empty() => Some(Vec::new()),
        // single-member classes come back as literals
        HirKind::Literal(lit) => {
            let text = std::str::from_utf8(&lit.0).ok()?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(vec![(c, c)]),
                _ => None,
            }
        }
        _ => None,
    }
}

fn push_class_char(out: &mut String, c: char) {
    if c.is_ascii() {
        push_set_char(out, c);
    } else {
        let _ = write!(out, "\\u{:04X}", c as u32);
    }
}

fn render(ranges: &[(char, char)]) -> PropertyRanges {
    let mut text = String::new();
    let mut clipped = false;
    for &(lo, hi) in ranges {
        if lo as u32 > MAX_BMP {
            clipped = true;
            continue;
        }
        let hi = if hi as u32 > MAX_BMP {
            clipped = true;
            '\u{FFFF}'
        } else {
            hi
        };
        push_class_char(&mut text, lo);
        if hi != lo {
            text.push('-');
            push_class_char(&mut text, hi);
        }
    }
    PropertyRanges {
        ranges: text,
        clipped,
    }
}

/// Resolve a property or POSIX bracket name, or `None` when no Unicode
/// property of that name exists.
pub fn resolve_property(name: &str) -> Option<PropertyRanges> {
    let key = normalize_property_name(name)?;
    let ranges = code_point_ranges(&class_expression(&key))?;
    Some(render(&ranges))
}
