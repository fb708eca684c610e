// convert/group.rs - Group conversion.
//
// Every group body runs in its own option scope, so an inline switch such
// as `(?i)` lasts until the end of the enclosing group. A switch produced
// by the parser carries the rest of that group as its children. Capture
// indices are allocated in emission order; the atomic emulation
// `(?=(X))\N` introduces a capture of its own, which shifts every later
// index.

use super::convert_sequence;
use super::extent::{sequence_extent, Extent};
use crate::context::Context;
use crate::error::ConvertError;
use crate::node::{Group, GroupKind, Node, OptionSwitch};
use crate::options::RegexOptions;
use crate::warning::WarningCategory;

/// Matches any single code unit, line terminators included.
const ANY_UNIT: &str = "(?:.|\\n)";

pub(crate) fn convert_group(group: &Group, ctx: &mut Context) -> Result<String, ConvertError> {
    let out = match &group.kind {
        GroupKind::Capture | GroupKind::Named => {
            ctx.register_capture(group.capture_index, group.name.as_deref());
            format!("({})", scoped_body(&group.children, ctx)?)
        }
        GroupKind::Passive => format!("(?:{})", scoped_body(&group.children, ctx)?),
        GroupKind::Comment => String::new(),
        GroupKind::Options(switch) => {
            check_switch(switch, ctx);
            ctx.push_scope();
            ctx.set_options(switch.apply(ctx.options()));
            let body = convert_sequence(&group.children, ctx);
            ctx.pop_scope();
            format!("(?:{})", body?)
        }
        GroupKind::OptionSwitch(switch) => {
            check_switch(switch, ctx);
            ctx.set_options(switch.apply(ctx.options()));
            let body = convert_sequence(&group.children, ctx)?;
            if group.children.iter().any(|n| matches!(n, Node::Alternation(_))) {
                format!("(?:{body})")
            } else {
                body
            }
        }
        GroupKind::Lookahead => format!("(?={})", scoped_body(&group.children, ctx)?),
        GroupKind::NegativeLookahead => format!("(?!{})", scoped_body(&group.children, ctx)?),
        GroupKind::Lookbehind => {
            ctx.warn(
                WarningCategory::LookbehindDowngraded,
                "lookbehind downgraded to a non-capturing group",
            );
            format!("(?:{})", scoped_body(&group.children, ctx)?)
        }
        GroupKind::NegativeLookbehind => {
            ctx.warn(
                WarningCategory::LookbehindDowngraded,
                "negative lookbehind dropped",
            );
            String::new()
        }
        GroupKind::Atomic => convert_atomic(&group.children, ctx)?,
        GroupKind::Absence => convert_absence(&group.children, ctx)?,
        GroupKind::Unknown(description) => {
            ctx.warn(
                WarningCategory::UnknownGroupKind,
                format!("unknown group kind '{description}'"),
            );
            "(?:)".to_string()
        }
    };
    Ok(out)
}

fn scoped_body(children: &[Node], ctx: &mut Context) -> Result<String, ConvertError> {
    ctx.push_scope();
    let body = convert_sequence(children, ctx);
    ctx.pop_scope();
    body
}

fn check_switch(switch: &OptionSwitch, ctx: &mut Context) {
    if !switch.unsupported.is_empty() {
        ctx.warn(
            WarningCategory::UnsupportedGroupOption,
            format!("unsupported group option(s) '{}'", switch.unsupported),
        );
    }
    if switch.off.contains(RegexOptions::IGNORECASE)
        && ctx.global_options().contains(RegexOptions::IGNORECASE)
    {
        ctx.warn(
            WarningCategory::CaseSensitiveScope,
            "case-sensitive scope in a case-insensitive pattern",
        );
    }
}

/// Emit an atomic emulation around an already converted body producer.
/// The capture index is taken before the body is converted so that it
/// precedes every capture inside it.
pub(crate) fn emulate_atomic<F>(ctx: &mut Context, body: F) -> Result<String, ConvertError>
where
    F: FnOnce(&mut Context) -> Result<String, ConvertError>,
{
    let index = ctx.next_capture();
    ctx.atomic_depth += 1;
    let inner = body(ctx);
    ctx.atomic_depth -= 1;
    Ok(format!("(?=({}))\\{index}(?:)", inner?))
}

fn convert_atomic(children: &[Node], ctx: &mut Context) -> Result<String, ConvertError> {
    if ctx.atomic_depth > 0 {
        ctx.warn(WarningCategory::NestedAtomicGroup, "nested atomic group");
        return Ok(format!("(?:{})", scoped_body(children, ctx)?));
    }
    emulate_atomic(ctx, |ctx| scoped_body(children, ctx))
}

/// `(?~X)` matches any string that does not contain X.
fn convert_absence(children: &[Node], ctx: &mut Context) -> Result<String, ConvertError> {
    let total = sequence_extent(children, ctx.remaining_depth())?;

    match total {
        Extent::Variable => {
            ctx.warn(
                WarningCategory::VariableLengthAbsence,
                "variable-length absence group content",
            );
            Ok(String::new())
        }
        // X matches the empty string, which every string contains
        Extent::Bounded { min: 0, .. } => Ok("(?!)".to_string()),
        Extent::Bounded { min, .. } => {
            let body = scoped_body(children, ctx)?;
            Ok(format!(
                "(?:{ANY_UNIT}{{0,{}}}|(?:(?!{body}){ANY_UNIT})*)",
                min - 1
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert_node;
    use crate::node::{Backref, QuantMode, Quantifier};
    use crate::options::Config;

    fn ctx() -> Context {
        Context::new(&Config::default())
    }

    fn run(node: Node) -> (String, Context) {
        let mut c = ctx();
        let out = convert_node(&node, &mut c).unwrap();
        (out, c)
    }

    fn group(kind: GroupKind, children: Vec<Node>) -> Node {
        Group::new(kind, children).into()
    }

    #[test]
    fn capture_and_named() {
        let node = Node::Sequence(vec![
            Group::capture(1, vec![Node::literal("a")]).into(),
            Group::named("n", 2, vec![Node::literal("b")]).into(),
        ]);
        let (out, c) = run(node);
        assert_eq!(out, "(a)(b)");
        assert_eq!(c.capture_count(), 2);
    }

    #[test]
    fn passive_comment_lookahead() {
        assert_eq!(run(group(GroupKind::Passive, vec![Node::literal("a")])).0, "(?:a)");
        assert_eq!(run(group(GroupKind::Comment, vec![])).0, "");
        assert_eq!(run(group(GroupKind::Lookahead, vec![Node::literal("a")])).0, "(?=a)");
        assert_eq!(
            run(group(GroupKind::NegativeLookahead, vec![Node::literal("a")])).0,
            "(?!a)"
        );
    }

    #[test]
    fn lookbehind_is_downgraded() {
        let (out, c) = run(group(GroupKind::Lookbehind, vec![Node::literal("a")]));
        assert_eq!(out, "(?:a)");
        assert_eq!(c.warnings()[0].category, WarningCategory::LookbehindDowngraded);

        let (out, c) = run(group(GroupKind::NegativeLookbehind, vec![Node::literal("a")]));
        assert_eq!(out, "");
        assert_eq!(c.warnings().len(), 1);
    }

    #[test]
    fn unknown_group() {
        let (out, c) = run(group(GroupKind::Unknown("conditional".into()), vec![]));
        assert_eq!(out, "(?:)");
        assert_eq!(c.warnings()[0].message, "unknown group kind 'conditional'");
    }

    #[test]
    fn atomic_emulation() {
        let alt = Node::Alternation(vec![Node::literal("33"), Node::literal("3")]);
        let node = Node::Sequence(vec![
            Node::literal("1"),
            group(GroupKind::Atomic, vec![alt]),
            Node::literal("37"),
        ]);
        let (out, c) = run(node);
        assert_eq!(out, "1(?=(33|3))\\1(?:)37");
        assert_eq!(c.capture_count(), 1);
    }

    #[test]
    fn atomic_shifts_later_captures() {
        let node = Node::Sequence(vec![
            group(
                GroupKind::Atomic,
                vec![Group::capture(1, vec![Node::literal("a")]).into()],
            ),
            Group::capture(2, vec![Node::literal("b")]).into(),
            Node::Backref(Backref::Number(1)),
            Node::Backref(Backref::Number(2)),
        ]);
        let (out, c) = run(node);
        assert_eq!(out, "(?=((a)))\\1(?:)(b)(?:\\2)(?:\\3)");
        assert_eq!(c.capture_count(), 3);
    }

    #[test]
    fn nested_atomic_group() {
        let inner = group(GroupKind::Atomic, vec![Node::literal("b")]);
        let (out, c) = run(group(GroupKind::Atomic, vec![Node::literal("a"), inner]));
        assert_eq!(out, "(?=(a(?:b)))\\1(?:)");
        assert_eq!(c.warnings()[0].category, WarningCategory::NestedAtomicGroup);
    }

    #[test]
    fn absence_fixed_length() {
        let (out, c) = run(group(GroupKind::Absence, vec![Node::literal("ab")]));
        assert_eq!(out, "(?:(?:.|\\n){0,1}|(?:(?!ab)(?:.|\\n))*)");
        assert!(c.warnings().is_empty());
    }

    #[test]
    fn absence_variable_length() {
        let plus = Quantifier::new(Node::literal("2"), 1, None, QuantMode::Greedy);
        let (out, c) = run(group(GroupKind::Absence, vec![plus.into()]));
        assert_eq!(out, "");
        assert_eq!(c.warnings()[0].category, WarningCategory::VariableLengthAbsence);
    }

    #[test]
    fn absence_of_empty() {
        assert_eq!(run(group(GroupKind::Absence, vec![])).0, "(?!)");
        let opt = Quantifier::new(Node::literal("a"), 0, Some(1), QuantMode::Greedy);
        assert_eq!(run(group(GroupKind::Absence, vec![opt.into()])).0, "(?!)");
    }

    #[test]
    fn options_group_scopes_case() {
        let switch = OptionSwitch {
            on: RegexOptions::IGNORECASE,
            ..OptionSwitch::default()
        };
        let node = Node::Sequence(vec![
            group(GroupKind::Options(switch), vec![Node::literal("a")]),
            Node::literal("b"),
        ]);
        assert_eq!(run(node).0, "(?:[aA])b");
    }

    #[test]
    fn switch_lasts_until_group_end() {
        let switch = OptionSwitch {
            on: RegexOptions::IGNORECASE,
            ..OptionSwitch::default()
        };
        let node = Node::Sequence(vec![
            group(
                GroupKind::Passive,
                vec![
                    Node::literal("a"),
                    group(GroupKind::OptionSwitch(switch), vec![]),
                    Node::literal("b"),
                ],
            ),
            Node::literal("c"),
        ]);
        assert_eq!(run(node).0, "(?:a[bB])c");
    }

    #[test]
    fn switch_body_with_alternatives_is_grouped() {
        let switch = OptionSwitch {
            on: RegexOptions::IGNORECASE,
            ..OptionSwitch::default()
        };
        let body = Node::Alternation(vec![
            Node::Sequence(vec![Node::literal("b")]),
            Node::Sequence(vec![Node::literal("c")]),
        ]);
        let node = Node::Sequence(vec![
            Node::literal("a"),
            group(GroupKind::OptionSwitch(switch.clone()), vec![body]),
        ]);
        assert_eq!(run(node).0, "a(?:[bB]|[cC])");

        let node = Node::Sequence(vec![
            Node::literal("a"),
            group(GroupKind::OptionSwitch(switch), vec![Node::literal("b")]),
        ]);
        assert_eq!(run(node).0, "a[bB]");
    }

    #[test]
    fn unsupported_option_letters() {
        let switch = OptionSwitch {
            unsupported: "ad".to_string(),
            ..OptionSwitch::default()
        };
        let (out, c) = run(group(GroupKind::OptionSwitch(switch), vec![]));
        assert_eq!(out, "");
        assert_eq!(c.warnings()[0].message, "unsupported group option(s) 'ad'");
    }

    #[test]
    fn case_sensitive_scope_in_ignorecase_pattern() {
        let mut c = Context::new(&Config {
            options: RegexOptions::IGNORECASE,
            ..Config::default()
        });
        let switch = OptionSwitch {
            off: RegexOptions::IGNORECASE,
            ..OptionSwitch::default()
        };
        let node = group(GroupKind::Options(switch), vec![Node::literal("a")]);
        assert_eq!(convert_node(&node, &mut c).unwrap(), "(?:a)");
        assert_eq!(c.warnings()[0].category, WarningCategory::CaseSensitiveScope);
    }
}
