// convert/leaf.rs - Converters for childless nodes other than literals.

use crate::context::Context;
use crate::node::{AnchorKind, Backref, CharType, Property};
use crate::unicode::{resolve_property, PropertyRanges};
use crate::warning::WarningCategory;

pub(crate) const HEX_RANGES: &str = "A-Fa-f0-9";

const LINEBREAK: &str = "(?:\\r\\n|[\\n\\v\\f\\r\\u0085\\u2028\\u2029])";
const GRAPHEME: &str = "(?:\\r\\n|[\\s\\S])";
const ANY_WITH_NEWLINE: &str = "(?:.|\\n)";
const END_LINE: &str = "(?=\\n|$)";

pub(crate) fn convert_type(char_type: CharType, ctx: &mut Context) -> String {
    match char_type {
        CharType::Any if ctx.multiline() => ANY_WITH_NEWLINE.to_string(),
        CharType::Any => ".".to_string(),
        CharType::Hex => format!("[{HEX_RANGES}]"),
        CharType::NonHex => format!("[^{HEX_RANGES}]"),
        CharType::Linebreak => LINEBREAK.to_string(),
        CharType::ExtendedGrapheme => {
            ctx.warn(
                WarningCategory::ApproximatedType,
                "\\X approximated as a single character or CRLF",
            );
            GRAPHEME.to_string()
        }
        CharType::Digit
        | CharType::NonDigit
        | CharType::Word
        | CharType::NonWord
        | CharType::Space
        | CharType::NonSpace => char_type.source().to_string(),
    }
}

pub(crate) fn convert_anchor(anchor: AnchorKind, ctx: &mut Context) -> String {
    match anchor {
        AnchorKind::BeginBuf => "^".to_string(),
        AnchorKind::EndBuf => "$".to_string(),
        AnchorKind::BeginLine => {
            ctx.warn(
                WarningCategory::ApproximatedAnchor,
                "^ approximated as start of input",
            );
            "^".to_string()
        }
        AnchorKind::EndLine => END_LINE.to_string(),
        AnchorKind::SemiEndBuf => "(?=\\n?$)".to_string(),
        AnchorKind::WordBoundary => "\\b".to_string(),
        AnchorKind::NonWordBoundary => "\\B".to_string(),
        AnchorKind::BeginPosition => {
            ctx.warn(WarningCategory::UnsupportedAnchor, "unsupported anchor \\G");
            String::new()
        }
    }
}

pub(crate) fn convert_backref(backref: &Backref, ctx: &mut Context) -> String {
    match ctx.resolve_backref(backref) {
        Some(index) => format!("(?:\\{index})"),
        None => {
            let reference = match backref {
                Backref::Number(n) => n.to_string(),
                Backref::Name(name) => format!("<{name}>"),
            };
            ctx.warn(
                WarningCategory::UnresolvedBackreference,
                format!("unresolved backreference {reference}"),
            );
            "(?:)".to_string()
        }
    }
}

/// A property outside any class becomes a class of its own.
pub(crate) fn convert_property(property: &Property, ctx: &mut Context) -> String {
    match resolve_property(&property.name) {
        Some(resolved) => {
            warn_clipped(property, &resolved, ctx);
            resolved.class(property.is_negative())
        }
        None => {
            ctx.warn(
                WarningCategory::UnsupportedProperty,
                format!("unsupported property '{}'", property.name),
            );
            "(?:)".to_string()
        }
    }
}

pub(crate) fn warn_clipped(property: &Property, resolved: &PropertyRanges, ctx: &mut Context) {
    if resolved.clipped {
        ctx.warn(
            WarningCategory::AstralPlaneProperty,
            format!("astral plane members of property '{}' dropped", property.name),
        );
    }
}
