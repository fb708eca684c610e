// convert/set.rs - Character class conversion.
//
// JavaScript classes without the `u` flag cannot nest, intersect, or hold
// property escapes. An outermost class is therefore flattened: members of
// positive nested classes are merged into it, and anything that can only be
// expressed as a standalone class (`\H`, resolved properties) is extracted
// into an alternative next to it.
//
// Both buffers live in the Context and belong to the outermost class being
// converted; they are empty before it starts and drained when it finishes.

use super::casefold::{fold_range, swap_case, RangeFold};
use super::leaf::{convert_type, warn_clipped, HEX_RANGES};
use super::literal::push_set_char;
use crate::context::Context;
use crate::error::ConvertError;
use crate::node::{CharType, Property, Set, SetMember};
use crate::unicode::resolve_property;
use crate::warning::WarningCategory;

/// Convert an outermost class.
pub(crate) fn convert_set(set: &Set, ctx: &mut Context) -> Result<String, ConvertError> {
    if set.nesting_level != 0 {
        return Err(ConvertError::MalformedTree(format!(
            "outermost character class has nesting level {}",
            set.nesting_level
        )));
    }
    if !ctx.set_buffers_empty() {
        return Err(ConvertError::MalformedTree(
            "character class buffers are not empty at class entry".to_string(),
        ));
    }

    ctx.negative_base_set = set.negative;
    let flattened = flatten(set, ctx);
    let (members, extractions) = ctx.take_set_buffers();
    ctx.negative_base_set = false;
    flattened?;

    Ok(compose(&members, &extractions, set.negative))
}

/// Assemble the buffered members and extractions.
fn compose(members: &[String], extractions: &[String], negative: bool) -> String {
    let class = if members.is_empty() {
        None
    } else {
        let caret = if negative { "^" } else { "" };
        Some(format!("[{caret}{}]", members.concat()))
    };

    match (class, extractions) {
        (None, []) => String::new(),
        (None, [single]) => single.clone(),
        (None, many) => format!("(?:{})", many.join("|")),
        (Some(class), []) => class,
        (Some(class), extra) => format!("(?:{class}|{})", extra.join("|")),
    }
}

fn flatten(set: &Set, ctx: &mut Context) -> Result<(), ConvertError> {
    ctx.enter()?;
    for member in &set.members {
        match member {
            SetMember::Set(nested) => flatten_nested(nested, ctx)?,
            SetMember::Char(c) => push_char(*c, ctx),
            SetMember::Range(lo, hi) => push_range(*lo, *hi, ctx),
            SetMember::Type(char_type) => push_type(*char_type, ctx),
            SetMember::Property(property) => push_property(property, ctx),
            SetMember::Intersection => {
                ctx.warn(WarningCategory::SetIntersection, "set intersection");
            }
        }
    }
    ctx.leave();
    Ok(())
}

fn flatten_nested(nested: &Set, ctx: &mut Context) -> Result<(), ConvertError> {
    if nested.nesting_level == 0 {
        return Err(ConvertError::MalformedTree(
            "nested character class has nesting level 0".to_string(),
        ));
    }
    if !nested.negative {
        return flatten(nested, ctx);
    }
    let message = if ctx.negative_base_set {
        "nested negative set data"
    } else {
        "nested negative set"
    };
    ctx.warn(WarningCategory::NestedNegativeSet, message);
    Ok(())
}

fn is_astral(c: char) -> bool {
    (c as u32) > 0xFFFF
}

fn push_char(c: char, ctx: &mut Context) {
    if is_astral(c) {
        ctx.warn(WarningCategory::AstralPlaneSetMember, "astral plane set member");
        return;
    }
    let mut member = String::new();
    push_set_char(&mut member, c);
    if ctx.local_case_insensitive() {
        if let Some(variant) = swap_case(c).filter(|&v| !is_astral(v)) {
            push_set_char(&mut member, variant);
        }
    }
    ctx.set_members.push(member);
}

fn range_text(lo: char, hi: char) -> String {
    let mut text = String::new();
    push_set_char(&mut text, lo);
    text.push('-');
    push_set_char(&mut text, hi);
    text
}

fn push_range(lo: char, hi: char, ctx: &mut Context) {
    if is_astral(lo) || is_astral(hi) {
        ctx.warn(WarningCategory::AstralPlaneSetMember, "astral plane set member");
        return;
    }
    let mut member = range_text(lo, hi);
    if ctx.local_case_insensitive() {
        match fold_range(lo, hi) {
            RangeFold::Unchanged => {}
            RangeFold::Range(vlo, vhi) => member.push_str(&range_text(vlo, vhi)),
            RangeFold::Partial => ctx.warn(
                WarningCategory::CaseInsensitiveRange,
                format!("no case-insensitive equivalent for range {}", range_text(lo, hi)),
            ),
        }
    }
    ctx.set_members.push(member);
}

fn push_type(char_type: CharType, ctx: &mut Context) {
    match char_type {
        CharType::Hex => ctx.set_members.push(HEX_RANGES.to_string()),
        CharType::NonHex if ctx.negative_base_set => ctx.warn(
            WarningCategory::UnsupportedNonHexInNegativeSet,
            "unsupported \\H in negative set",
        ),
        CharType::NonHex => ctx.set_extractions.push(format!("[^{HEX_RANGES}]")),
        CharType::Digit
        | CharType::NonDigit
        | CharType::Word
        | CharType::NonWord
        | CharType::Space
        | CharType::NonSpace => ctx.set_members.push(char_type.source().to_string()),
        CharType::Any | CharType::Linebreak | CharType::ExtendedGrapheme => {
            if ctx.negative_base_set {
                ctx.warn(
                    WarningCategory::ApproximatedType,
                    format!("{} dropped from negative set", char_type.source()),
                );
            } else {
                let extraction = convert_type(char_type, ctx);
                ctx.set_extractions.push(extraction);
            }
        }
    }
}

fn push_property(property: &Property, ctx: &mut Context) {
    let Some(resolved) = resolve_property(&property.name) else {
        ctx.warn(
            WarningCategory::UnsupportedProperty,
            format!("unsupported property '{}'", property.name),
        );
        return;
    };
    if ctx.negative_base_set {
        ctx.warn(
            WarningCategory::PropertyInNegativeSet,
            format!("property '{}' in negative set", property.name),
        );
        return;
    }
    warn_clipped(property, &resolved, ctx);
    ctx.set_extractions.push(resolved.class(property.is_negative()));
}
