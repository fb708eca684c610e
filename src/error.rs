// error.rs - Error types for parsing and conversion.
//
// Parse errors keep Oniguruma's error codes and message strings so that
// callers comparing against Ruby's own diagnostics see familiar text.
// Conversion errors are reserved for structural violations; everything the
// target dialect merely cannot express is reported as a warning instead.

use thiserror::Error;

/// What went wrong while parsing source-dialect pattern text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("parse depth limit over")]
    ParseDepthLimitOver,
    #[error("end pattern at left brace")]
    EndPatternAtLeftBrace,
    #[error("premature end of char-class")]
    PrematureEndOfCharClass,
    #[error("end pattern at escape")]
    EndPatternAtEscape,
    #[error("end pattern at control")]
    EndPatternAtControl,
    #[error("target of repeat operator is not specified")]
    TargetOfRepeatOperatorNotSpecified,
    #[error("target of repeat operator is invalid")]
    TargetOfRepeatOperatorInvalid,
    #[error("unmatched close parenthesis")]
    UnmatchedCloseParenthesis,
    #[error("end pattern with unmatched parenthesis")]
    EndPatternWithUnmatchedParenthesis,
    #[error("end pattern in group")]
    EndPatternInGroup,
    #[error("undefined group option")]
    UndefinedGroupOption,
    #[error("invalid POSIX bracket type")]
    InvalidPosixBracketType,
    #[error("too big number for repeat range")]
    TooBigNumberForRepeatRange,
    #[error("upper is smaller than lower in repeat range")]
    UpperSmallerThanLowerInRepeatRange,
    #[error("empty range in char class")]
    EmptyRangeInCharClass,
    #[error("invalid backref number/name")]
    InvalidBackref,
    #[error("numbered backref/call is not allowed. (use name)")]
    NumberedBackrefOrCallNotAllowed,
    #[error("group name is empty")]
    EmptyGroupName,
    #[error("invalid group name <{0}>")]
    InvalidGroupName(String),
    #[error("undefined name <{0}> reference")]
    UndefinedNameReference(String),
    #[error("invalid code point value")]
    InvalidCodePointValue,
}

impl ParseErrorKind {
    /// The matching Oniguruma `ONIGERR_*` code.
    pub fn code(&self) -> i32 {
        match self {
            ParseErrorKind::ParseDepthLimitOver => -16,
            ParseErrorKind::EndPatternAtLeftBrace => -100,
            ParseErrorKind::PrematureEndOfCharClass => -103,
            ParseErrorKind::EndPatternAtEscape => -104,
            ParseErrorKind::EndPatternAtControl => -106,
            ParseErrorKind::TargetOfRepeatOperatorNotSpecified => -113,
            ParseErrorKind::TargetOfRepeatOperatorInvalid => -114,
            ParseErrorKind::UnmatchedCloseParenthesis => -116,
            ParseErrorKind::EndPatternWithUnmatchedParenthesis => -117,
            ParseErrorKind::EndPatternInGroup => -118,
            ParseErrorKind::UndefinedGroupOption => -119,
            ParseErrorKind::InvalidPosixBracketType => -121,
            ParseErrorKind::TooBigNumberForRepeatRange => -201,
            ParseErrorKind::UpperSmallerThanLowerInRepeatRange => -202,
            ParseErrorKind::EmptyRangeInCharClass => -203,
            ParseErrorKind::InvalidBackref => -208,
            ParseErrorKind::NumberedBackrefOrCallNotAllowed => -209,
            ParseErrorKind::EmptyGroupName => -214,
            ParseErrorKind::InvalidGroupName(_) => -215,
            ParseErrorKind::UndefinedNameReference(_) => -217,
            ParseErrorKind::InvalidCodePointValue => -400,
        }
    }
}

/// A parse failure and the byte offset in the pattern where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (at offset {offset})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        ParseError { kind, offset }
    }

    /// Returns the original Oniguruma error code.
    pub fn code(&self) -> i32 {
        self.kind.code()
    }
}

/// Fatal conversion failure. A result carrying this error has no usable
/// pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The tree is nested deeper than the configured limit.
    #[error("conversion depth limit of {limit} exceeded")]
    DepthLimitExceeded { limit: u32 },
    /// The tree violates the node contract.
    #[error("malformed pattern tree: {0}")]
    MalformedTree(String),
}

/// Any failure of [`crate::convert_pattern`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

pub type Result<T> = std::result::Result<T, Error>;
