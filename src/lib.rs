//! # Ferroni-JS
//!
//! Translate [Oniguruma](https://github.com/kkos/oniguruma) / Ruby regular
//! expressions into JavaScript patterns.
//!
//! The input is a parsed pattern tree ([`node::Node`]), or pattern text that
//! is parsed first. The output is a JavaScript pattern body, its flags, and a
//! list of warnings for every construct that JavaScript cannot express
//! exactly and had to be approximated or dropped.
//!
//! ## Quick Start
//!
//! ```rust
//! use ferroni_js::prelude::*;
//!
//! let result = convert_pattern(r"\A(?>\d+)\z").unwrap();
//! assert_eq!(result.pattern, r"^(?=(\d+))\1(?:)$");
//! assert_eq!(result.to_string(), r"/^(?=(\d+))\1(?:)$/g");
//! ```
//!
//! Constructs without a JavaScript counterpart degrade with a warning
//! instead of failing:
//!
//! ```rust
//! use ferroni_js::prelude::*;
//!
//! let result = convert_pattern(r"(?<!x)y").unwrap();
//! assert_eq!(result.pattern, "y");
//! assert_eq!(result.warnings[0].category, WarningCategory::LookbehindDowngraded);
//! ```
//!
//! Trees can be built directly as well:
//!
//! ```rust
//! use ferroni_js::prelude::*;
//!
//! let tree = Node::Root(vec![Group::new(GroupKind::Absence, vec![Node::literal("ab")]).into()]);
//! let result = convert(&tree).unwrap();
//! assert_eq!(result.pattern, r"(?:(?:.|\n){0,1}|(?:(?!ab)(?:.|\n))*)");
//! ```
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`parse`] | Pattern parser (Ruby syntax) |
//! | [`node`] | Pattern tree |
//! | [`convert`] | Tree walk: dispatcher, set and group converters |
//! | [`context`] | Per-call conversion state |
//! | [`unicode`] | Property name resolution |
//! | [`api`] | `Converter`, `ConverterBuilder`, `ConversionResult` |
//! | [`warning`] | Recoverable degradations |
//! | [`error`] | Fatal errors |

pub mod api;
pub mod context;
pub mod convert;
pub mod error;
pub mod node;
pub mod options;
pub mod parse;
pub mod prelude;
pub mod unicode;
pub mod warning;

pub use api::{convert, convert_pattern, ConversionResult, Converter, ConverterBuilder};
pub use error::{ConvertError, Error, ParseError, ParseErrorKind};
pub use node::Node;
pub use options::{Config, RegexOptions};
pub use warning::{Warning, WarningCategory};
