// convert/extent.rs - Static match-length analysis.
//
// Lengths are counted in UTF-16 code units, the unit `.` consumes in a
// JavaScript pattern without the `u` flag.

use crate::error::ConvertError;
use crate::node::{CharType, Group, GroupKind, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extent {
    Bounded { min: u32, max: u32 },
    Variable,
}

impl Extent {
    const EMPTY: Extent = Extent::Bounded { min: 0, max: 0 };

    fn fixed(len: u32) -> Extent {
        Extent::Bounded { min: len, max: len }
    }

    fn then(self, other: Extent) -> Extent {
        match (self, other) {
            (Extent::Bounded { min: a, max: b }, Extent::Bounded { min: c, max: d }) => {
                Extent::Bounded {
                    min: a.saturating_add(c),
                    max: b.saturating_add(d),
                }
            }
            _ => Extent::Variable,
        }
    }
}

/// Combined length bounds of `nodes` matched one after another, or
/// `Variable` when no static bound exists. Alternatives of differing
/// extent count as variable.
pub(crate) fn sequence_extent(nodes: &[Node], depth_limit: u32) -> Result<Extent, ConvertError> {
    sequence(nodes, 0, depth_limit)
}

fn sequence(nodes: &[Node], depth: u32, limit: u32) -> Result<Extent, ConvertError> {
    let mut total = Extent::EMPTY;
    for node in nodes {
        total = total.then(extent_at(node, depth, limit)?);
        if total == Extent::Variable {
            break;
        }
    }
    Ok(total)
}

fn group_extent(group: &Group, depth: u32, limit: u32) -> Result<Extent, ConvertError> {
    match group.kind {
        GroupKind::Comment
        | GroupKind::Lookahead
        | GroupKind::NegativeLookahead
        | GroupKind::Lookbehind
        | GroupKind::NegativeLookbehind => Ok(Extent::EMPTY),
        GroupKind::Absence | GroupKind::Unknown(_) => Ok(Extent::Variable),
        GroupKind::Capture
        | GroupKind::Passive
        | GroupKind::Named
        | GroupKind::Options(_)
        | GroupKind::OptionSwitch(_)
        | GroupKind::Atomic => sequence(&group.children, depth, limit),
    }
}

fn extent_at(node: &Node, depth: u32, limit: u32) -> Result<Extent, ConvertError> {
    let depth = depth + 1;
    if depth > limit {
        return Err(ConvertError::DepthLimitExceeded { limit });
    }

    let ext = match node {
        Node::Root(children) | Node::Sequence(children) => sequence(children, depth, limit)?,
        Node::Alternation(branches) => {
            let mut common = None;
            for branch in branches {
                let ext = extent_at(branch, depth, limit)?;
                match common {
                    None => common = Some(ext),
                    Some(prev) if prev == ext => {}
                    Some(_) => return Ok(Extent::Variable),
                }
            }
            common.unwrap_or(Extent::EMPTY)
        }
        Node::Group(group) => group_extent(group, depth, limit)?,
        Node::Literal(text) => Extent::fixed(text.encode_utf16().count() as u32),
        Node::Type(CharType::Linebreak) | Node::Type(CharType::ExtendedGrapheme) => {
            Extent::Bounded { min: 1, max: 2 }
        }
        Node::Type(_) | Node::Set(_) | Node::Property(_) => Extent::fixed(1),
        Node::Anchor(_) => Extent::EMPTY,
        Node::Quantifier(q) => match extent_at(&q.body, depth, limit)? {
            Extent::Bounded { min: 0, max: 0 } => Extent::EMPTY,
            Extent::Bounded { min, max } => match q.max {
                Some(upper) => Extent::Bounded {
                    min: min.saturating_mul(q.min),
                    max: max.saturating_mul(upper),
                },
                None => Extent::Variable,
            },
            Extent::Variable => Extent::Variable,
        },
        Node::Backref(_) | Node::Unknown(_) => Extent::Variable,
    };
    Ok(ext)
}
