// convert/literal.rs - Literal normalization for the target dialect.
//
// Literal nodes carry decoded characters. Before they are emitted they have
// to be re-escaped for JavaScript, with different rules inside and outside
// a character class. Astral characters cannot be written directly in a
// pattern without the `u` flag, so outside classes they become surrogate
// pairs.

use std::fmt::Write;

use super::casefold::swap_case;
use crate::context::Context;

/// Characters that are syntax outside a class. `/` is included so the
/// result can be embedded in a regex literal.
const SYNTAX_CHARS: &[char] = &[
    '^', '$', '\\', '.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '/',
];

/// Characters that are syntax inside a class.
const SET_SYNTAX_CHARS: &[char] = &['\\', ']', '[', '^', '-'];

/// Push the escape for a control or line-terminator character, returning
/// false for anything else.
fn push_control(out: &mut String, c: char, in_set: bool) -> bool {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\x0b' => out.push_str("\\v"),
        '\x0c' => out.push_str("\\f"),
        '\x08' if in_set => out.push_str("\\b"),
        '\u{2028}' | '\u{2029}' => {
            let _ = write!(out, "\\u{:04X}", c as u32);
        }
        c if c.is_ascii_control() => {
            let _ = write!(out, "\\x{:02X}", c as u32);
        }
        _ => return false,
    }
    true
}

fn push_utf16(out: &mut String, c: char) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        let _ = write!(out, "\\u{:04X}", unit);
    }
}

pub(crate) fn push_literal_char(out: &mut String, c: char) {
    if push_control(out, c, false) {
        return;
    }
    if SYNTAX_CHARS.contains(&c) {
        out.push('\\');
        out.push(c);
    } else if (c as u32) > 0xFFFF {
        push_utf16(out, c);
    } else {
        out.push(c);
    }
}

pub(crate) fn push_set_char(out: &mut String, c: char) {
    if push_control(out, c, true) {
        return;
    }
    if SET_SYNTAX_CHARS.contains(&c) {
        out.push('\\');
        out.push(c);
    } else if (c as u32) > 0xFFFF {
        push_utf16(out, c);
    } else {
        out.push(c);
    }
}

/// Escape literal text for use outside a character class.
pub fn normalize_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        push_literal_char(&mut out, c);
    }
    out
}

/// Escape literal text for use inside a character class.
pub fn normalize_set_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        push_set_char(&mut out, c);
    }
    out
}

/// Convert a literal node. Under a local case-insensitive scope every
/// character with a case counterpart becomes a two-member class, or an
/// alternation of surrogate pairs when either side is astral.
pub(crate) fn convert_literal(text: &str, ctx: &Context) -> String {
    if !ctx.local_case_insensitive() {
        return normalize_literal(text);
    }
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match swap_case(c) {
            Some(variant) if (c as u32) > 0xFFFF || (variant as u32) > 0xFFFF => {
                out.push_str("(?:");
                push_literal_char(&mut out, c);
                out.push('|');
                push_literal_char(&mut out, variant);
                out.push(')');
            }
            Some(variant) => {
                out.push('[');
                push_set_char(&mut out, c);
                push_set_char(&mut out, variant);
                out.push(']');
            }
            None => push_literal_char(&mut out, c),
        }
    }
    out
}

/// Whether a literal's emitted form is more than one atom, so that a
/// quantifier applied to it needs a group.
pub(crate) fn is_multi_atom(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => (c as u32) > 0xFFFF,
        _ => true,
    }
}
