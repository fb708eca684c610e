// convert/mod.rs - Tree walk producing the target pattern.
//
// Each node kind has a converter that returns a pattern fragment; composite
// nodes convert their children left to right with the same Context and
// combine the fragments. The walk never fails for constructs the target
// cannot express: those produce a degraded fragment plus a warning. Only
// depth overflow and malformed trees are errors.

mod casefold;
mod extent;
mod group;
mod leaf;
pub mod literal;
mod set;

use crate::context::Context;
use crate::error::ConvertError;
use crate::node::{GroupKind, Node, QuantMode, Quantifier};
use crate::warning::WarningCategory;

pub use literal::{normalize_literal, normalize_set_literal};

/// Convert one node and everything below it.
pub fn convert_node(node: &Node, ctx: &mut Context) -> Result<String, ConvertError> {
    ctx.enter()?;
    let out = match node {
        Node::Root(children) | Node::Sequence(children) => convert_sequence(children, ctx)?,
        Node::Alternation(branches) => {
            let mut parts = Vec::with_capacity(branches.len());
            for branch in branches {
                parts.push(convert_node(branch, ctx)?);
            }
            parts.join("|")
        }
        Node::Group(g) => group::convert_group(g, ctx)?,
        Node::Set(s) => set::convert_set(s, ctx)?,
        Node::Literal(text) => literal::convert_literal(text, ctx),
        Node::Type(t) => leaf::convert_type(*t, ctx),
        Node::Property(p) => leaf::convert_property(p, ctx),
        Node::Backref(b) => leaf::convert_backref(b, ctx),
        Node::Quantifier(q) => convert_quantifier(q, ctx)?,
        Node::Anchor(a) => leaf::convert_anchor(*a, ctx),
        Node::Unknown(description) => {
            ctx.warn(
                WarningCategory::UnknownNodeKind,
                format!("unknown node kind '{description}'"),
            );
            "(?:)".to_string()
        }
    };
    ctx.leave();
    Ok(out)
}

pub(crate) fn convert_sequence(children: &[Node], ctx: &mut Context) -> Result<String, ConvertError> {
    let mut out = String::new();
    for child in children {
        out.push_str(&convert_node(child, ctx)?);
    }
    Ok(out)
}

// === Quantifiers ===

/// Whether a quantified fragment must be grouped to stay one atom.
fn needs_group(body: &Node, fragment: &str) -> bool {
    if fragment.is_empty() {
        return true;
    }
    match body {
        Node::Literal(text) => literal::is_multi_atom(text),
        Node::Set(_) | Node::Type(_) | Node::Property(_) | Node::Backref(_) | Node::Unknown(_) => {
            false
        }
        Node::Group(g) => !matches!(
            g.kind,
            GroupKind::Capture
                | GroupKind::Named
                | GroupKind::Passive
                | GroupKind::Options(_)
                | GroupKind::Lookbehind
                | GroupKind::Unknown(_)
        ),
        Node::Root(_)
        | Node::Sequence(_)
        | Node::Alternation(_)
        | Node::Quantifier(_)
        | Node::Anchor(_) => true,
    }
}

/// The quantifier suffix as JavaScript accepts it.
fn js_token(q: &Quantifier) -> String {
    let mut token = match q.token.strip_prefix("{,") {
        Some(rest) => format!("{{0,{rest}"),
        None => q.token.clone(),
    };
    if q.mode == QuantMode::Possessive && token.len() > 1 && token.ends_with('+') {
        token.pop();
    }
    token
}

fn quantified(q: &Quantifier, token: &str, ctx: &mut Context) -> Result<String, ConvertError> {
    let body = convert_node(&q.body, ctx)?;
    if needs_group(&q.body, &body) {
        Ok(format!("(?:{body}){token}"))
    } else {
        Ok(format!("{body}{token}"))
    }
}

fn convert_quantifier(q: &Quantifier, ctx: &mut Context) -> Result<String, ConvertError> {
    let token = js_token(q);
    if q.mode != QuantMode::Possessive {
        return quantified(q, &token, ctx);
    }
    if ctx.atomic_depth > 0 {
        ctx.warn(
            WarningCategory::NestedAtomicGroup,
            format!("possessive quantifier {} inside atomic group", q.token),
        );
        return quantified(q, &token, ctx);
    }
    group::emulate_atomic(ctx, |ctx| quantified(q, &token, ctx))
}
