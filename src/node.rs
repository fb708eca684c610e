// node.rs - Pattern tree node types.
//
// The tree is produced by the parser (or built by hand) and is read-only
// during conversion. Unlike Oniguruma's union-based Node, each kind carries
// only its own payload and there are no parent pointers: scope information
// the converters need is tracked in the conversion context instead.

use crate::options::RegexOptions;

// === Node ===

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Top of the tree; children are concatenated.
    Root(Vec<Node>),
    /// One branch of an alternation, or any other concatenation.
    Sequence(Vec<Node>),
    /// `a|b|c`; each branch is usually a [`Node::Sequence`].
    Alternation(Vec<Node>),
    Group(Group),
    Set(Set),
    /// Decoded literal characters (escapes already resolved).
    Literal(String),
    Type(CharType),
    Property(Property),
    Backref(Backref),
    Quantifier(Quantifier),
    Anchor(AnchorKind),
    /// A construct the converter has no translation for (`\K`, `\g<1>`, ...).
    Unknown(String),
}

impl Node {
    /// Short name of the node kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Root(_) => "root",
            Node::Sequence(_) => "sequence",
            Node::Alternation(_) => "alternation",
            Node::Group(_) => "group",
            Node::Set(_) => "set",
            Node::Literal(_) => "literal",
            Node::Type(_) => "type",
            Node::Property(_) => "property",
            Node::Backref(_) => "backref",
            Node::Quantifier(_) => "quantifier",
            Node::Anchor(_) => "anchor",
            Node::Unknown(_) => "unknown",
        }
    }

    pub fn literal(text: impl Into<String>) -> Node {
        Node::Literal(text.into())
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Node::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_quantifier(&self) -> Option<&Quantifier> {
        match self {
            Node::Quantifier(q) => Some(q),
            _ => None,
        }
    }
}

// === Group ===

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub kind: GroupKind,
    pub children: Vec<Node>,
    pub name: Option<String>,
    /// Source-dialect capture number for capturing and named groups.
    pub capture_index: Option<u32>,
}

impl Group {
    pub fn new(kind: GroupKind, children: Vec<Node>) -> Self {
        Group {
            kind,
            children,
            name: None,
            capture_index: None,
        }
    }

    pub fn capture(index: u32, children: Vec<Node>) -> Self {
        Group {
            kind: GroupKind::Capture,
            children,
            name: None,
            capture_index: Some(index),
        }
    }

    pub fn named(name: impl Into<String>, index: u32, children: Vec<Node>) -> Self {
        Group {
            kind: GroupKind::Named,
            children,
            name: Some(name.into()),
            capture_index: Some(index),
        }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.kind, GroupKind::Capture | GroupKind::Named)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Node {
        Node::Group(group)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKind {
    Capture,
    Passive,
    Named,
    Comment,
    /// `(?i-m:...)`: options scoped to the group body.
    Options(OptionSwitch),
    /// `(?i-m)`: options switched until the end of the enclosing group.
    OptionSwitch(OptionSwitch),
    Lookahead,
    NegativeLookahead,
    Lookbehind,
    NegativeLookbehind,
    Atomic,
    Absence,
    Unknown(String),
}

/// Option letters turned on and off by an inline option construct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSwitch {
    pub on: RegexOptions,
    pub off: RegexOptions,
    /// Letters with no JavaScript equivalent (`a`, `d`, `u`), in source order.
    pub unsupported: String,
}

impl OptionSwitch {
    pub fn apply(&self, options: RegexOptions) -> RegexOptions {
        (options | self.on) - self.off
    }
}

// === Set ===

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set {
    pub members: Vec<SetMember>,
    pub negative: bool,
    /// 0 for an outermost class, parent level + 1 for a nested one.
    pub nesting_level: u32,
}

impl Set {
    pub fn new(members: Vec<SetMember>, negative: bool, nesting_level: u32) -> Self {
        Set {
            members,
            negative,
            nesting_level,
        }
    }
}

impl From<Set> for Node {
    fn from(set: Set) -> Node {
        Node::Set(set)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetMember {
    Char(char),
    Range(char, char),
    Type(CharType),
    Property(Property),
    Set(Set),
    /// `&&` between two operands of the class.
    Intersection,
}

// === Leaves ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharType {
    /// `.`
    Any,
    Digit,
    NonDigit,
    Word,
    NonWord,
    Space,
    NonSpace,
    Hex,
    NonHex,
    /// `\R`
    Linebreak,
    /// `\X`
    ExtendedGrapheme,
}

impl CharType {
    /// Source spelling of the type.
    pub fn source(self) -> &'static str {
        match self {
            CharType::Any => ".",
            CharType::Digit => "\\d",
            CharType::NonDigit => "\\D",
            CharType::Word => "\\w",
            CharType::NonWord => "\\W",
            CharType::Space => "\\s",
            CharType::NonSpace => "\\S",
            CharType::Hex => "\\h",
            CharType::NonHex => "\\H",
            CharType::Linebreak => "\\R",
            CharType::ExtendedGrapheme => "\\X",
        }
    }
}

/// `\p{name}`, `\P{name}`, `\p{^name}`, `[:name:]` or `[:^name:]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    /// `\P` or `[:^`.
    pub negated: bool,
    /// Leading `^` inside the braces.
    pub caret: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, negated: bool) -> Self {
        Property {
            name: name.into(),
            negated,
            caret: false,
        }
    }

    /// Negation of the property itself, before any ambient set negation.
    pub fn is_negative(&self) -> bool {
        self.negated ^ self.caret
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backref {
    Number(u32),
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorKind {
    /// `^`
    BeginLine,
    /// `$`
    EndLine,
    /// `\A`
    BeginBuf,
    /// `\z`
    EndBuf,
    /// `\Z`
    SemiEndBuf,
    /// `\b`
    WordBoundary,
    /// `\B`
    NonWordBoundary,
    /// `\G`
    BeginPosition,
}

// === Quantifier ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantMode {
    Greedy,
    Reluctant,
    Possessive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantifier {
    pub body: Box<Node>,
    pub min: u32,
    /// `None` for unbounded repetition.
    pub max: Option<u32>,
    pub mode: QuantMode,
    /// Quantifier syntax as written, including any `?`/`+` suffix.
    pub token: String,
}

impl Quantifier {
    /// Build a quantifier whose token is the canonical spelling of `min..max`.
    pub fn new(body: Node, min: u32, max: Option<u32>, mode: QuantMode) -> Self {
        let mut token = match (min, max) {
            (0, None) => "*".to_string(),
            (1, None) => "+".to_string(),
            (0, Some(1)) => "?".to_string(),
            (n, None) => format!("{{{n},}}"),
            (n, Some(m)) if n == m => format!("{{{n}}}"),
            (n, Some(m)) => format!("{{{n},{m}}}"),
        };
        match mode {
            QuantMode::Greedy => {}
            QuantMode::Reluctant => token.push('?'),
            QuantMode::Possessive => token.push('+'),
        }
        Quantifier {
            body: Box::new(body),
            min,
            max,
            mode,
            token,
        }
    }
}

impl From<Quantifier> for Node {
    fn from(q: Quantifier) -> Node {
        Node::Quantifier(q)
    }
}
