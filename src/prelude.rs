// prelude.rs - Convenient re-exports for the conversion API.
//
//! # Prelude
//!
//! ```
//! use ferroni_js::prelude::*;
//!
//! let result = Converter::builder().global(false).build().convert_pattern(r"a++").unwrap();
//! assert_eq!(result.to_string(), r"/(?=(a+))\1(?:)/");
//! ```

pub use crate::api::{convert, convert_pattern, ConversionResult, Converter, ConverterBuilder};
pub use crate::error::{ConvertError, Error, ParseError, ParseErrorKind};
pub use crate::node::{
    AnchorKind, Backref, CharType, Group, GroupKind, Node, Property, QuantMode, Quantifier, Set,
    SetMember,
};
pub use crate::options::{Config, RegexOptions};
pub use crate::parse::{parse, parse_with_options};
pub use crate::warning::{Warning, WarningCategory};
