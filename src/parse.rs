// parse.rs - Oniguruma/Ruby pattern parser.
//
// Recursive descent over the pattern text, shaped after Oniguruma's
// regparse.c: prs_alts -> prs_branch -> prs_exp, with prs_bag for groups,
// prs_options for inline options and prs_cc for character classes. Syntax
// follows ONIG_SYNTAX_RUBY: invalid intervals are literal, `{n,m}+` is not
// possessive, and when named groups exist plain groups stop capturing.

use memchr::memchr;

use crate::error::{ParseError, ParseErrorKind};
use crate::node::{
    AnchorKind, Backref, CharType, Group, GroupKind, Node, OptionSwitch, Property, QuantMode,
    Quantifier, Set, SetMember,
};
use crate::options::{RegexOptions, DEFAULT_DEPTH_LIMIT};

const ONIG_MAX_REPEAT_NUM: u32 = 100_000;
const MAX_CODE_POINT: u32 = 0x10_FFFF;

static POSIX_BRACKETS: &[&str] = &[
    "alnum", "alpha", "ascii", "blank", "cntrl", "digit", "graph", "lower", "print", "punct",
    "space", "upper", "word", "xdigit",
];

/// Parse a pattern with no global options.
pub fn parse(pattern: &str) -> Result<Node, ParseError> {
    parse_with_options(pattern, RegexOptions::empty())
}

/// Parse a pattern compiled with `options` (for instance `x`, which changes
/// how whitespace is read).
pub fn parse_with_options(pattern: &str, options: RegexOptions) -> Result<Node, ParseError> {
    parse_tree(pattern, options, DEFAULT_DEPTH_LIMIT)
}

pub(crate) fn parse_tree(
    pattern: &str,
    options: RegexOptions,
    depth_limit: u32,
) -> Result<Node, ParseError> {
    let mut env = ParseEnv::new(pattern, options, depth_limit);
    let children = env.prs_alts(false)?;
    env.finish(children)
}

/// One element read inside a character class.
enum CcAtom {
    Char(char),
    Member(SetMember),
}

struct ParseEnv<'a> {
    pattern: &'a str,
    p: usize,
    options: RegexOptions,
    depth: u32,
    depth_limit: u32,
    /// Whether the innermost alternatives being parsed end at `)`.
    in_group: bool,
    /// Capture groups opened so far, named ones included.
    num_mem: u32,
    group_names: Vec<String>,
    numbered_refs: Vec<(u32, usize)>,
    name_refs: Vec<(String, usize)>,
}

impl<'a> ParseEnv<'a> {
    fn new(pattern: &'a str, options: RegexOptions, depth_limit: u32) -> Self {
        ParseEnv {
            pattern,
            p: 0,
            options,
            depth: 0,
            depth_limit,
            in_group: false,
            num_mem: 0,
            group_names: Vec::new(),
            numbered_refs: Vec::new(),
            name_refs: Vec::new(),
        }
    }

    fn err(&self, kind: ParseErrorKind, offset: usize) -> ParseError {
        ParseError::new(kind, offset)
    }

    // === Cursor ===

    fn peek(&self) -> Option<char> {
        self.pattern[self.p..].chars().next()
    }

    fn peek_is(&self, c: char) -> bool {
        self.peek() == Some(c)
    }

    /// The character after the next one.
    fn peek_second(&self) -> Option<char> {
        let mut chars = self.pattern[self.p..].chars();
        chars.next();
        chars.next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.p += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek_is(c) {
            self.p += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.depth_limit {
            return Err(self.err(ParseErrorKind::ParseDepthLimitOver, self.p));
        }
        Ok(())
    }

    /// In extended mode, skip whitespace and `#` comments up to end of line.
    fn skip_extended(&mut self) {
        if !self.options.contains(RegexOptions::EXTEND) {
            return;
        }
        let bytes = self.pattern.as_bytes();
        while let Some(&b) = bytes.get(self.p) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c' => self.p += 1,
                b'#' => match memchr(b'\n', &bytes[self.p..]) {
                    Some(i) => self.p += i + 1,
                    None => self.p = bytes.len(),
                },
                _ => break,
            }
        }
    }

    // === Numbers ===

    /// Scan decimal digits. Values past the repeat limit saturate just
    /// above it so callers can report them.
    fn scan_number(&mut self) -> Option<u32> {
        let start = self.p;
        let mut num: u32 = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            num = num.saturating_mul(10).saturating_add(d).min(u32::MAX / 16);
            self.p += 1;
        }
        (self.p > start).then_some(num)
    }

    fn scan_radix(&mut self, radix: u32, minlen: usize, maxlen: usize) -> Result<u32, ParseError> {
        let start = self.p;
        let mut code: u32 = 0;
        let mut n = 0;
        while n < maxlen {
            let Some(d) = self.peek().and_then(|c| c.to_digit(radix)) else {
                break;
            };
            code = code * radix + d;
            if code > MAX_CODE_POINT {
                return Err(self.err(ParseErrorKind::InvalidCodePointValue, start));
            }
            self.p += 1;
            n += 1;
        }
        if n < minlen {
            return Err(self.err(ParseErrorKind::InvalidCodePointValue, start));
        }
        Ok(code)
    }

    fn code_to_char(&self, code: u32, offset: usize) -> Result<char, ParseError> {
        char::from_u32(code).ok_or_else(|| self.err(ParseErrorKind::InvalidCodePointValue, offset))
    }

    /// `{H...}` after `\x` or `\u`.
    fn scan_braced_hex(&mut self, start: usize) -> Result<char, ParseError> {
        let code = self.scan_radix(16, 1, 8)?;
        if !self.eat('}') {
            return Err(self.err(ParseErrorKind::InvalidCodePointValue, start));
        }
        self.code_to_char(code, start)
    }

    // === Alternatives and branches ===

    /// Parse alternatives up to `)` (left unconsumed) or the end of the
    /// pattern. Inline option switches end here.
    fn prs_alts(&mut self, in_group: bool) -> Result<Vec<Node>, ParseError> {
        self.enter()?;
        let saved_options = self.options;
        let outer_in_group = std::mem::replace(&mut self.in_group, in_group);

        let mut branches = vec![self.prs_branch()?];
        loop {
            match self.peek() {
                Some('|') => {
                    self.p += 1;
                    branches.push(self.prs_branch()?);
                }
                Some(')') if in_group => break,
                Some(')') => {
                    return Err(self.err(ParseErrorKind::UnmatchedCloseParenthesis, self.p));
                }
                None if in_group => {
                    return Err(self.err(
                        ParseErrorKind::EndPatternWithUnmatchedParenthesis,
                        self.p,
                    ));
                }
                _ => break,
            }
        }

        self.options = saved_options;
        self.in_group = outer_in_group;
        self.depth -= 1;
        if branches.len() == 1 {
            Ok(branches.swap_remove(0))
        } else {
            let alts = branches.into_iter().map(Node::Sequence).collect();
            Ok(vec![Node::Alternation(alts)])
        }
    }

    fn prs_branch(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut items: Vec<Node> = Vec::new();
        loop {
            self.skip_extended();
            match self.peek() {
                None | Some('|') | Some(')') => break,
                Some(_) => {}
            }
            let atom = self.prs_exp()?;
            let node = self.prs_quantifiers(atom)?;
            match node {
                Node::Literal(text) => match items.last_mut() {
                    Some(Node::Literal(prev)) => prev.push_str(&text),
                    _ => items.push(Node::Literal(text)),
                },
                node => items.push(node),
            }
        }
        Ok(items)
    }

    /// Parse one atom.
    fn prs_exp(&mut self) -> Result<Node, ParseError> {
        let start = self.p;
        let Some(c) = self.next_char() else {
            return Err(self.err(ParseErrorKind::EndPatternInGroup, start));
        };
        let node = match c {
            '(' => self.prs_bag(start)?,
            '[' => Node::Set(self.prs_cc(0, start)?),
            '.' => Node::Type(CharType::Any),
            '^' => Node::Anchor(AnchorKind::BeginLine),
            '$' => Node::Anchor(AnchorKind::EndLine),
            '\\' => self.prs_escape(start)?,
            '*' | '+' | '?' => {
                return Err(self.err(ParseErrorKind::TargetOfRepeatOperatorNotSpecified, start));
            }
            '{' => {
                self.p = start;
                if self.fetch_interval()?.is_some() {
                    return Err(
                        self.err(ParseErrorKind::TargetOfRepeatOperatorNotSpecified, start)
                    );
                }
                self.p = start + 1;
                Node::literal("{")
            }
            c => Node::Literal(c.to_string()),
        };
        Ok(node)
    }

    // === Quantifiers ===

    fn prs_quantifiers(&mut self, atom: Node) -> Result<Node, ParseError> {
        let mut node = atom;
        let mut wraps = 0;
        loop {
            self.skip_extended();
            let start = self.p;
            let Some((min, max, mode)) = self.fetch_quantifier()? else {
                break;
            };
            if is_invalid_quantifier_target(&node) {
                return Err(self.err(ParseErrorKind::TargetOfRepeatOperatorInvalid, start));
            }
            wraps += 1;
            if self.depth + wraps > self.depth_limit {
                return Err(self.err(ParseErrorKind::ParseDepthLimitOver, start));
            }
            node = Node::Quantifier(Quantifier {
                body: Box::new(node),
                min,
                max,
                mode,
                token: self.pattern[start..self.p].to_string(),
            });
        }
        Ok(node)
    }

    fn fetch_quantifier(&mut self) -> Result<Option<(u32, Option<u32>, QuantMode)>, ParseError> {
        let (min, max, possessive_ok) = match self.peek() {
            Some('*') => (0, None, true),
            Some('+') => (1, None, true),
            Some('?') => (0, Some(1), true),
            Some('{') => match self.fetch_interval()? {
                Some((min, max)) => (min, max, false),
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        if possessive_ok {
            self.p += 1;
        }
        let mode = if self.eat('?') {
            QuantMode::Reluctant
        } else if possessive_ok && self.eat('+') {
            QuantMode::Possessive
        } else {
            QuantMode::Greedy
        };
        Ok(Some((min, max, mode)))
    }

    /// Read `{n}`, `{n,}`, `{,m}` or `{n,m}` at the cursor. Anything else is
    /// not an interval: the cursor is left on `{` and `None` returned.
    fn fetch_interval(&mut self) -> Result<Option<(u32, Option<u32>)>, ParseError> {
        let start = self.p;
        if !self.eat('{') {
            return Ok(None);
        }
        let low = self.scan_number();
        let (min, max) = if self.eat(',') {
            let up = self.scan_number();
            if low.is_none() && up.is_none() {
                self.p = start;
                return Ok(None);
            }
            (low.unwrap_or(0), up)
        } else {
            match low {
                Some(n) => (n, Some(n)),
                None => {
                    self.p = start;
                    return Ok(None);
                }
            }
        };
        if !self.eat('}') {
            self.p = start;
            return Ok(None);
        }
        if min > ONIG_MAX_REPEAT_NUM || max.is_some_and(|m| m > ONIG_MAX_REPEAT_NUM) {
            return Err(self.err(ParseErrorKind::TooBigNumberForRepeatRange, start));
        }
        if max.is_some_and(|m| m < min) {
            return Err(self.err(ParseErrorKind::UpperSmallerThanLowerInRepeatRange, start));
        }
        Ok(Some((min, max)))
    }

    // === Escapes ===

    fn prs_escape(&mut self, start: usize) -> Result<Node, ParseError> {
        let Some(c) = self.next_char() else {
            return Err(self.err(ParseErrorKind::EndPatternAtEscape, start));
        };
        let node = match c {
            'A' => Node::Anchor(AnchorKind::BeginBuf),
            'z' => Node::Anchor(AnchorKind::EndBuf),
            'Z' => Node::Anchor(AnchorKind::SemiEndBuf),
            'b' => Node::Anchor(AnchorKind::WordBoundary),
            'B' => Node::Anchor(AnchorKind::NonWordBoundary),
            'G' => Node::Anchor(AnchorKind::BeginPosition),
            'R' => Node::Type(CharType::Linebreak),
            'X' => Node::Type(CharType::ExtendedGrapheme),
            'p' | 'P' if self.peek_is('{') => Node::Property(self.prs_char_property(c, start)?),
            'k' if matches!(self.peek(), Some('<') | Some('\'')) => self.prs_backref_name(start)?,
            'g' if matches!(self.peek(), Some('<') | Some('\'')) => {
                let name = self.fetch_name(start)?;
                Node::Unknown(format!("\\g<{name}>"))
            }
            'K' => Node::Unknown("\\K".to_string()),
            'y' | 'Y' => Node::Unknown(format!("\\{c}")),
            '1'..='9' => self.prs_numbered_backref(start)?,
            c => match char_type_escape(c) {
                Some(t) => Node::Type(t),
                None => Node::Literal(self.escaped_char(c, start)?.to_string()),
            },
        };
        Ok(node)
    }

    /// Value of an escape that denotes a single character.
    fn escaped_char(&mut self, c: char, start: usize) -> Result<char, ParseError> {
        let value = match c {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\x0c',
            'v' => '\x0b',
            'a' => '\x07',
            'e' => '\x1b',
            'c' => self.fetch_control(start)?,
            'C' => {
                if !self.eat('-') {
                    return Err(self.err(ParseErrorKind::EndPatternAtControl, start));
                }
                self.fetch_control(start)?
            }
            'x' => {
                if self.eat('{') {
                    self.scan_braced_hex(start)?
                } else {
                    let code = self.scan_radix(16, 1, 2)?;
                    self.code_to_char(code, start)?
                }
            }
            'u' => {
                if self.eat('{') {
                    self.scan_braced_hex(start)?
                } else {
                    let code = self.scan_radix(16, 4, 4)?;
                    self.code_to_char(code, start)?
                }
            }
            '0' => {
                let code = self.scan_radix(8, 0, 2)?;
                self.code_to_char(code, start)?
            }
            c => c,
        };
        Ok(value)
    }

    fn fetch_control(&mut self, start: usize) -> Result<char, ParseError> {
        let Some(c) = self.next_char() else {
            return Err(self.err(ParseErrorKind::EndPatternAtControl, start));
        };
        let code = if c == '?' { 0x7f } else { (c as u32) & 0x1f };
        self.code_to_char(code, start)
    }

    /// `\N`: a backreference when N is a single digit or names an open
    /// group, otherwise an octal escape or a plain digit.
    fn prs_numbered_backref(&mut self, start: usize) -> Result<Node, ParseError> {
        let digits = start + 1;
        self.p = digits;
        let n = self.scan_number().unwrap_or(0);
        if n <= 9 || n <= self.num_mem {
            self.numbered_refs.push((n, start));
            return Ok(Node::Backref(Backref::Number(n)));
        }
        self.p = digits;
        if self.peek().is_some_and(|c| c < '8') {
            let code = self.scan_radix(8, 1, 3)?;
            let c = self.code_to_char(code, start)?;
            return Ok(Node::Literal(c.to_string()));
        }
        let c = self.next_char().unwrap_or('8');
        Ok(Node::Literal(c.to_string()))
    }

    /// `\k<name>`, `\k'name'`, `\k<1>` or `\k<-1>`.
    fn prs_backref_name(&mut self, start: usize) -> Result<Node, ParseError> {
        let name = self.fetch_name(start)?;
        let numeric = name.strip_prefix(&['-', '+'][..]).unwrap_or(&name);
        if numeric.is_empty() || !numeric.bytes().all(|b| b.is_ascii_digit()) {
            if !is_valid_group_name(&name) {
                return Err(self.err(ParseErrorKind::InvalidGroupName(name), start));
            }
            self.name_refs.push((name.clone(), start));
            return Ok(Node::Backref(Backref::Name(name)));
        }

        let value: u32 = numeric
            .parse()
            .map_err(|_| self.err(ParseErrorKind::InvalidBackref, start))?;
        let n = if name.starts_with('-') {
            (self.num_mem + 1)
                .checked_sub(value)
                .filter(|&n| n > 0)
                .ok_or_else(|| self.err(ParseErrorKind::InvalidBackref, start))?
        } else if name.starts_with('+') {
            return Err(self.err(ParseErrorKind::InvalidBackref, start));
        } else {
            value
        };
        if n == 0 {
            return Err(self.err(ParseErrorKind::InvalidBackref, start));
        }
        self.numbered_refs.push((n, start));
        Ok(Node::Backref(Backref::Number(n)))
    }

    /// Read a name delimited by `<...>` or `'...'`; the cursor is on the
    /// opening delimiter.
    fn fetch_name(&mut self, start: usize) -> Result<String, ParseError> {
        let close = match self.next_char() {
            Some('<') => '>',
            Some('\'') => '\'',
            _ => return Err(self.err(ParseErrorKind::InvalidGroupName(String::new()), start)),
        };
        let name_start = self.p;
        loop {
            match self.next_char() {
                Some(c) if c == close => break,
                Some(')') | None => {
                    let name = self.pattern[name_start..self.p].to_string();
                    return Err(self.err(ParseErrorKind::InvalidGroupName(name), start));
                }
                Some(_) => {}
            }
        }
        let name = &self.pattern[name_start..self.p - close.len_utf8()];
        if name.is_empty() {
            return Err(self.err(ParseErrorKind::EmptyGroupName, start));
        }
        Ok(name.to_string())
    }

    /// `\p{Name}`, `\p{^Name}` or `\P{Name}`; the cursor is on `{`.
    fn prs_char_property(&mut self, c: char, start: usize) -> Result<Property, ParseError> {
        self.p += 1;
        let caret = self.eat('^');
        let name_start = self.p;
        let Some(len) = memchr(b'}', &self.pattern.as_bytes()[name_start..]) else {
            return Err(self.err(ParseErrorKind::EndPatternAtLeftBrace, start));
        };
        self.p = name_start + len + 1;
        Ok(Property {
            name: self.pattern[name_start..name_start + len].to_string(),
            negated: c == 'P',
            caret,
        })
    }

    // === Groups ===

    /// Body of a group up to and including its `)`.
    fn prs_group_body(&mut self) -> Result<Vec<Node>, ParseError> {
        let children = self.prs_alts(true)?;
        self.p += 1;
        Ok(children)
    }

    /// Parse a group; the cursor is just past `(`.
    fn prs_bag(&mut self, start: usize) -> Result<Node, ParseError> {
        if !self.eat('?') {
            self.num_mem += 1;
            let index = self.num_mem;
            let children = self.prs_group_body()?;
            return Ok(Group::capture(index, children).into());
        }

        let Some(c) = self.next_char() else {
            return Err(self.err(ParseErrorKind::EndPatternInGroup, start));
        };
        let kind = match c {
            ':' => GroupKind::Passive,
            '=' => GroupKind::Lookahead,
            '!' => GroupKind::NegativeLookahead,
            '>' => GroupKind::Atomic,
            '~' => {
                if self.eat('|') {
                    GroupKind::Unknown("absence operator".to_string())
                } else {
                    GroupKind::Absence
                }
            }
            '<' if self.peek_is('=') => {
                self.p += 1;
                GroupKind::Lookbehind
            }
            '<' if self.peek_is('!') => {
                self.p += 1;
                GroupKind::NegativeLookbehind
            }
            '<' | '\'' => {
                self.p -= 1;
                return self.prs_named_group(start);
            }
            '#' => {
                let Some(len) = memchr(b')', &self.pattern.as_bytes()[self.p..]) else {
                    return Err(self.err(ParseErrorKind::EndPatternInGroup, start));
                };
                self.p += len + 1;
                return Ok(Group::new(GroupKind::Comment, Vec::new()).into());
            }
            '(' => {
                let Some(len) = memchr(b')', &self.pattern.as_bytes()[self.p..]) else {
                    return Err(self.err(ParseErrorKind::EndPatternInGroup, start));
                };
                self.p += len + 1;
                GroupKind::Unknown("conditional".to_string())
            }
            'i' | 'm' | 'x' | 'a' | 'd' | 'u' | '-' => return self.prs_options(c, start),
            _ => return Err(self.err(ParseErrorKind::UndefinedGroupOption, start)),
        };
        let children = self.prs_group_body()?;
        Ok(Group::new(kind, children).into())
    }

    fn prs_named_group(&mut self, start: usize) -> Result<Node, ParseError> {
        let name = self.fetch_name(start)?;
        if !is_valid_group_name(&name) {
            return Err(self.err(ParseErrorKind::InvalidGroupName(name), start));
        }
        self.num_mem += 1;
        let index = self.num_mem;
        self.group_names.push(name.clone());
        let children = self.prs_group_body()?;
        Ok(Group::named(name, index, children).into())
    }

    /// `(?imx-imx)` or `(?imx-imx:...)`; `first` is the first option letter.
    /// An isolated switch takes the rest of the enclosing group, later
    /// alternatives included, as its body.
    fn prs_options(&mut self, first: char, start: usize) -> Result<Node, ParseError> {
        let mut switch = OptionSwitch::default();
        let mut off = false;
        let mut c = first;
        loop {
            match c {
                '-' if !off => off = true,
                ')' => {
                    let saved = self.options;
                    self.options = switch.apply(saved);
                    let children = self.prs_alts(self.in_group);
                    self.options = saved;
                    return Ok(Group::new(GroupKind::OptionSwitch(switch), children?).into());
                }
                ':' => {
                    let saved = self.options;
                    self.options = switch.apply(saved);
                    let children = self.prs_group_body();
                    self.options = saved;
                    return Ok(Group::new(GroupKind::Options(switch), children?).into());
                }
                'a' | 'd' | 'u' if !off => switch.unsupported.push(c),
                c => match RegexOptions::from_letter(c) {
                    Some(flag) if off => switch.off |= flag,
                    Some(flag) => switch.on |= flag,
                    None => return Err(self.err(ParseErrorKind::UndefinedGroupOption, start)),
                },
            }
            c = match self.next_char() {
                Some(c) => c,
                None => return Err(self.err(ParseErrorKind::EndPatternInGroup, start)),
            };
        }
    }

    // === Character classes ===

    /// Parse a class; the cursor is just past `[`.
    fn prs_cc(&mut self, nesting_level: u32, start: usize) -> Result<Set, ParseError> {
        self.enter()?;
        let negative = self.eat('^');
        let mut members = Vec::new();
        let mut first = true;
        loop {
            match self.peek() {
                None => return Err(self.err(ParseErrorKind::PrematureEndOfCharClass, start)),
                Some(']') if !first => {
                    self.p += 1;
                    break;
                }
                Some(_) => {}
            }
            first = false;
            match self.fetch_cc_atom(nesting_level, start)? {
                CcAtom::Char(lo) => self.prs_cc_range(lo, &mut members, nesting_level, start)?,
                CcAtom::Member(member) => members.push(member),
            }
        }
        self.depth -= 1;
        Ok(Set::new(members, negative, nesting_level))
    }

    /// Finish a member starting with the character `lo`, which may be the
    /// low end of a range. A `-` before `]` is literal.
    fn prs_cc_range(
        &mut self,
        lo: char,
        members: &mut Vec<SetMember>,
        nesting_level: u32,
        start: usize,
    ) -> Result<(), ParseError> {
        if !self.peek_is('-') || matches!(self.peek_second(), Some(']') | None) {
            members.push(SetMember::Char(lo));
            return Ok(());
        }
        let dash = self.p;
        self.p += 1;
        match self.fetch_cc_atom(nesting_level, start)? {
            CcAtom::Char(hi) if hi < lo => {
                Err(self.err(ParseErrorKind::EmptyRangeInCharClass, dash))
            }
            CcAtom::Char(hi) => {
                members.push(SetMember::Range(lo, hi));
                Ok(())
            }
            CcAtom::Member(member) => {
                members.push(SetMember::Char(lo));
                members.push(SetMember::Char('-'));
                members.push(member);
                Ok(())
            }
        }
    }

    fn fetch_cc_atom(&mut self, nesting_level: u32, start: usize) -> Result<CcAtom, ParseError> {
        let at = self.p;
        let Some(c) = self.next_char() else {
            return Err(self.err(ParseErrorKind::PrematureEndOfCharClass, start));
        };
        let atom = match c {
            '[' => match self.prs_posix_bracket(at)? {
                Some(property) => CcAtom::Member(SetMember::Property(property)),
                None => CcAtom::Member(SetMember::Set(self.prs_cc(nesting_level + 1, at)?)),
            },
            '&' if self.peek_is('&') => {
                self.p += 1;
                CcAtom::Member(SetMember::Intersection)
            }
            '\\' => {
                let Some(e) = self.next_char() else {
                    return Err(self.err(ParseErrorKind::EndPatternAtEscape, at));
                };
                match e {
                    'b' => CcAtom::Char('\x08'),
                    'p' | 'P' if self.peek_is('{') => {
                        CcAtom::Member(SetMember::Property(self.prs_char_property(e, at)?))
                    }
                    e => match char_type_escape(e) {
                        Some(t) => CcAtom::Member(SetMember::Type(t)),
                        None => CcAtom::Char(self.escaped_char(e, at)?),
                    },
                }
            }
            c => CcAtom::Char(c),
        };
        Ok(atom)
    }

    /// `[:name:]` or `[:^name:]`; the cursor is just past `[`. Returns
    /// `None`, with the cursor unchanged, when the text is not shaped like a
    /// bracket expression.
    fn prs_posix_bracket(&mut self, at: usize) -> Result<Option<Property>, ParseError> {
        let rest = &self.pattern[self.p..];
        let Some(body) = rest.strip_prefix(':') else {
            return Ok(None);
        };
        let (negated, body) = match body.strip_prefix('^') {
            Some(body) => (true, body),
            None => (false, body),
        };
        let name_len = body.bytes().take_while(u8::is_ascii_alphabetic).count();
        if !body[name_len..].starts_with(":]") {
            return Ok(None);
        }
        let name = &body[..name_len];
        if !POSIX_BRACKETS.contains(&name) {
            return Err(self.err(ParseErrorKind::InvalidPosixBracketType, at));
        }
        self.p += 1 + usize::from(negated) + name_len + 2;
        Ok(Some(Property::new(name, negated)))
    }

    // === Post-parse checks ===

    fn finish(self, mut children: Vec<Node>) -> Result<Node, ParseError> {
        for &(n, offset) in &self.numbered_refs {
            if n > self.num_mem {
                return Err(self.err(ParseErrorKind::InvalidBackref, offset));
            }
        }
        for (name, offset) in &self.name_refs {
            if !self.group_names.contains(name) {
                return Err(self.err(ParseErrorKind::UndefinedNameReference(name.clone()), *offset));
            }
        }
        if !self.group_names.is_empty() {
            if let Some(&(_, offset)) = self.numbered_refs.first() {
                return Err(self.err(ParseErrorKind::NumberedBackrefOrCallNotAllowed, offset));
            }
            tracing::trace!(
                named = self.group_names.len(),
                groups = self.num_mem,
                "named groups present, renumbering captures"
            );
            let mut counter = 0;
            for child in &mut children {
                renumber_named_only(child, &mut counter);
            }
        }
        Ok(Node::Root(children))
    }
}

fn char_type_escape(c: char) -> Option<CharType> {
    let t = match c {
        'd' => CharType::Digit,
        'D' => CharType::NonDigit,
        'w' => CharType::Word,
        'W' => CharType::NonWord,
        's' => CharType::Space,
        'S' => CharType::NonSpace,
        'h' => CharType::Hex,
        'H' => CharType::NonHex,
        _ => return None,
    };
    Some(t)
}

fn is_valid_group_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_invalid_quantifier_target(node: &Node) -> bool {
    match node {
        Node::Anchor(_) => true,
        Node::Group(g) => matches!(
            g.kind,
            GroupKind::Lookahead
                | GroupKind::NegativeLookahead
                | GroupKind::Lookbehind
                | GroupKind::NegativeLookbehind
                | GroupKind::OptionSwitch(_)
                | GroupKind::Comment
        ),
        _ => false,
    }
}

/// With named groups present, plain groups stop capturing and named groups
/// are numbered from 1 in order of appearance.
fn renumber_named_only(node: &mut Node, counter: &mut u32) {
    match node {
        Node::Root(children) | Node::Sequence(children) | Node::Alternation(children) => {
            for child in children {
                renumber_named_only(child, counter);
            }
        }
        Node::Group(g) => {
            match g.kind {
                GroupKind::Capture => {
                    g.kind = GroupKind::Passive;
                    g.capture_index = None;
                }
                GroupKind::Named => {
                    *counter += 1;
                    g.capture_index = Some(*counter);
                }
                _ => {}
            }
            for child in &mut g.children {
                renumber_named_only(child, counter);
            }
        }
        Node::Quantifier(q) => renumber_named_only(&mut q.body, counter),
        Node::Set(_)
        | Node::Literal(_)
        | Node::Type(_)
        | Node::Property(_)
        | Node::Backref(_)
        | Node::Anchor(_)
        | Node::Unknown(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn children(pattern: &str) -> Vec<Node> {
        match parse(pattern) {
            Ok(Node::Root(children)) => children,
            other => panic!("unexpected parse of {pattern:?}: {other:?}"),
        }
    }

    fn kind(pattern: &str) -> ParseErrorKind {
        match parse(pattern) {
            Err(e) => e.kind,
            Ok(tree) => panic!("expected error for {pattern:?}, got {tree:?}"),
        }
    }

    #[test]
    fn literals_merge() {
        assert_eq!(children("abc"), vec![Node::literal("abc")]);
    }

    #[test]
    fn quantifier_takes_last_char() {
        let c = children("abc+");
        assert_eq!(c.len(), 2);
        assert_eq!(c[0], Node::literal("ab"));
        let q = c[1].as_quantifier().unwrap();
        assert_eq!(*q.body, Node::literal("c"));
        assert_eq!((q.min, q.max, q.mode), (1, None, QuantMode::Greedy));
    }

    #[test]
    fn quantifier_modes() {
        let q = |p: &str| children(p)[0].as_quantifier().unwrap().clone();
        assert_eq!(q("a*?").mode, QuantMode::Reluctant);
        assert_eq!(q("a++").mode, QuantMode::Possessive);
        assert_eq!(q("a?+").token, "?+");
        // intervals are never possessive in Ruby syntax
        let nested = q("a{2}+");
        assert_eq!(nested.mode, QuantMode::Greedy);
        assert_eq!(nested.token, "+");
        assert_eq!(nested.body.as_quantifier().unwrap().token, "{2}");
    }

    #[test]
    fn intervals() {
        let q = |p: &str| {
            let q = children(p)[0].as_quantifier().unwrap().clone();
            (q.min, q.max, q.token)
        };
        assert_eq!(q("a{3}"), (3, Some(3), "{3}".to_string()));
        assert_eq!(q("a{2,}"), (2, None, "{2,}".to_string()));
        assert_eq!(q("a{,4}"), (0, Some(4), "{,4}".to_string()));
        assert_eq!(q("a{1,2}?"), (1, Some(2), "{1,2}?".to_string()));
    }

    #[test]
    fn invalid_interval_is_literal() {
        assert_eq!(children("a{x}"), vec![Node::literal("a{x}")]);
        assert_eq!(children("a{,}"), vec![Node::literal("a{,}")]);
        assert_eq!(children("{"), vec![Node::literal("{")]);
    }

    #[test]
    fn alternation() {
        let c = children("ab|c");
        assert_eq!(
            c,
            vec![Node::Alternation(vec![
                Node::Sequence(vec![Node::literal("ab")]),
                Node::Sequence(vec![Node::literal("c")]),
            ])]
        );
    }

    #[test]
    fn groups() {
        let c = children("(a)(?:b)(?=c)(?<!d)(?>e)(?~f)");
        let kinds: Vec<GroupKind> = c.iter().map(|n| n.as_group().unwrap().kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                GroupKind::Capture,
                GroupKind::Passive,
                GroupKind::Lookahead,
                GroupKind::NegativeLookbehind,
                GroupKind::Atomic,
                GroupKind::Absence,
            ]
        );
        assert_eq!(c[0].as_group().unwrap().capture_index, Some(1));
    }

    #[test]
    fn comment_group() {
        let c = children("a(?#note)b");
        assert_eq!(c[1].as_group().unwrap().kind, GroupKind::Comment);
        assert_eq!(c[2], Node::literal("b"));
    }

    #[test]
    fn option_groups() {
        let c = children("(?i-m:a)(?mx)");
        match &c[0].as_group().unwrap().kind {
            GroupKind::Options(s) => {
                assert_eq!(s.on, RegexOptions::IGNORECASE);
                assert_eq!(s.off, RegexOptions::MULTILINE);
            }
            other => panic!("unexpected kind {other:?}"),
        }
        match &c[1].as_group().unwrap().kind {
            GroupKind::OptionSwitch(s) => {
                assert_eq!(s.on, RegexOptions::MULTILINE | RegexOptions::EXTEND)
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn isolated_switch_takes_rest_of_group() {
        let c = children("a(?i)b|c");
        assert_eq!(c.len(), 2);
        let switch = c[1].as_group().unwrap();
        assert!(matches!(switch.kind, GroupKind::OptionSwitch(_)));
        assert_eq!(
            switch.children,
            vec![Node::Alternation(vec![
                Node::Sequence(vec![Node::literal("b")]),
                Node::Sequence(vec![Node::literal("c")]),
            ])]
        );

        let c = children("(?:x(?i)y|z)w");
        let outer = c[0].as_group().unwrap();
        assert_eq!(outer.kind, GroupKind::Passive);
        assert_eq!(outer.children.len(), 2);
        assert_eq!(c[1], Node::literal("w"));
    }

    #[test]
    fn unsupported_option_letters() {
        let c = children("(?au)");
        match &c[0].as_group().unwrap().kind {
            GroupKind::OptionSwitch(s) => assert_eq!(s.unsupported, "au"),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn extended_mode() {
        let c = children("(?x) a b # comment\n c");
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].as_group().unwrap().children, vec![Node::literal("abc")]);
        let scoped = children("(?x: a )b c");
        assert_eq!(scoped[1], Node::literal("b c"));
    }

    #[test]
    fn escapes() {
        assert_eq!(children("\\t\\x41\\u00e9\\x{1F600}"), vec![Node::literal("\tA\u{e9}\u{1F600}")]);
        assert_eq!(children("\\cA\\e\\0"), vec![Node::literal("\x01\x1b\0")]);
        assert_eq!(children("\\."), vec![Node::literal(".")]);
        assert_eq!(children("\\R"), vec![Node::Type(CharType::Linebreak)]);
        assert_eq!(children("\\Z"), vec![Node::Anchor(AnchorKind::SemiEndBuf)]);
        assert_eq!(children("\\K"), vec![Node::Unknown("\\K".to_string())]);
    }

    #[test]
    fn properties() {
        let c = children("\\p{Alpha}\\P{Digit}\\p{^Greek}");
        assert_eq!(c[0], Node::Property(Property::new("Alpha", false)));
        assert_eq!(c[1], Node::Property(Property::new("Digit", true)));
        assert_eq!(
            c[2],
            Node::Property(Property {
                name: "Greek".to_string(),
                negated: false,
                caret: true,
            })
        );
    }

    #[test]
    fn backrefs() {
        let c = children("(a)\\1\\k<1>\\k<-1>");
        assert_eq!(c[1], Node::Backref(Backref::Number(1)));
        assert_eq!(c[2], Node::Backref(Backref::Number(1)));
        assert_eq!(c[3], Node::Backref(Backref::Number(1)));
        let named = children("(?<y>a)\\k<y>");
        assert_eq!(named[1], Node::Backref(Backref::Name("y".to_string())));
    }

    #[test]
    fn large_escape_number_is_octal() {
        assert_eq!(children("\\101"), vec![Node::literal("A")]);
    }

    #[test]
    fn named_groups_disable_plain_captures() {
        let c = children("(a)(?<x>b)(c)(?<y>d)");
        let g: Vec<&Group> = c.iter().map(|n| n.as_group().unwrap()).collect();
        assert_eq!(g[0].kind, GroupKind::Passive);
        assert_eq!(g[0].capture_index, None);
        assert_eq!(g[1].capture_index, Some(1));
        assert_eq!(g[2].kind, GroupKind::Passive);
        assert_eq!(g[3].capture_index, Some(2));
    }

    #[test]
    fn sets() {
        let c = children("[^a-z\\d[:alpha:]]");
        let s = c[0].as_set().unwrap();
        assert!(s.negative);
        assert_eq!(
            s.members,
            vec![
                SetMember::Range('a', 'z'),
                SetMember::Type(CharType::Digit),
                SetMember::Property(Property::new("alpha", false)),
            ]
        );
    }

    #[test]
    fn nested_sets_and_intersection() {
        let c = children("[a-z&&[^aeiou]]");
        let s = c[0].as_set().unwrap();
        assert_eq!(s.members[1], SetMember::Intersection);
        match &s.members[2] {
            SetMember::Set(inner) => {
                assert!(inner.negative);
                assert_eq!(inner.nesting_level, 1);
            }
            other => panic!("unexpected member {other:?}"),
        }
    }

    #[test]
    fn set_edge_literals() {
        let s = children("[]a-]")[0].as_set().unwrap().clone();
        assert_eq!(
            s.members,
            vec![SetMember::Char(']'), SetMember::Char('a'), SetMember::Char('-')]
        );
        let s = children("[-a\\b]")[0].as_set().unwrap().clone();
        assert_eq!(
            s.members,
            vec![SetMember::Char('-'), SetMember::Char('a'), SetMember::Char('\x08')]
        );
        let s = children("[:^digit:]x]")[0].as_set().unwrap().clone();
        assert_eq!(s.members[0], SetMember::Char(':'));
    }

    #[test]
    fn negated_posix_bracket() {
        let s = children("[[:^space:]]")[0].as_set().unwrap().clone();
        assert_eq!(s.members, vec![SetMember::Property(Property::new("space", true))]);
    }

    #[test]
    fn errors() {
        assert_eq!(kind("(a"), ParseErrorKind::EndPatternWithUnmatchedParenthesis);
        assert_eq!(kind("a)"), ParseErrorKind::UnmatchedCloseParenthesis);
        assert_eq!(kind("[ab"), ParseErrorKind::PrematureEndOfCharClass);
        assert_eq!(kind("*a"), ParseErrorKind::TargetOfRepeatOperatorNotSpecified);
        assert_eq!(kind("^*"), ParseErrorKind::TargetOfRepeatOperatorInvalid);
        assert_eq!(kind("a{3,2}"), ParseErrorKind::UpperSmallerThanLowerInRepeatRange);
        assert_eq!(kind("a{100001}"), ParseErrorKind::TooBigNumberForRepeatRange);
        assert_eq!(kind("[z-a]"), ParseErrorKind::EmptyRangeInCharClass);
        assert_eq!(kind("[[:alfa:]]"), ParseErrorKind::InvalidPosixBracketType);
        assert_eq!(kind("(?q)"), ParseErrorKind::UndefinedGroupOption);
        assert_eq!(kind("a\\"), ParseErrorKind::EndPatternAtEscape);
        assert_eq!(kind("\\2(a)"), ParseErrorKind::InvalidBackref);
        assert_eq!(kind("(?<n>a)\\1"), ParseErrorKind::NumberedBackrefOrCallNotAllowed);
        assert_eq!(kind("(?<>a)"), ParseErrorKind::EmptyGroupName);
        assert_eq!(kind("(?<1a>x)"), ParseErrorKind::InvalidGroupName("1a".to_string()));
        assert_eq!(kind("\\k<nope>"), ParseErrorKind::UndefinedNameReference("nope".to_string()));
        assert_eq!(kind("\\x{110000}"), ParseErrorKind::InvalidCodePointValue);
    }

    #[test]
    fn error_offsets() {
        let err = parse("ab[cd").unwrap_err();
        assert_eq!(err.offset, 2);
        let err = parse("abc)").unwrap_err();
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn depth_limit() {
        let pattern = format!("{}a{}", "(".repeat(50), ")".repeat(50));
        let err = parse_tree(&pattern, RegexOptions::empty(), 20).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ParseDepthLimitOver);
        assert!(parse_tree(&pattern, RegexOptions::empty(), 100).is_ok());
    }
}
