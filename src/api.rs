// api.rs - Public conversion API.
//
// Wraps the tree walk (Context + convert_node) and the parser with
// Rust-native types: Converter, ConverterBuilder, ConversionResult.

use std::fmt;

use crate::context::Context;
use crate::convert::convert_node;
use crate::error::{self, ConvertError};
use crate::node::Node;
use crate::options::{Config, RegexOptions};
use crate::parse::parse_tree;
use crate::warning::Warning;

/// A configured converter. Each call builds its own [`Context`], so one
/// converter can be shared freely between threads.
///
/// # Examples
///
/// ```
/// use ferroni_js::api::Converter;
///
/// let conv = Converter::new();
/// let result = conv.convert_pattern(r"(?>a+)b").unwrap();
/// assert_eq!(result.pattern, r"(?=(a+))\1(?:)b");
/// assert_eq!(result.flags, "g");
/// assert!(result.is_lossless());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: Config,
}

impl Converter {
    /// A converter with the default configuration: global, no options.
    pub fn new() -> Self {
        Converter::default()
    }

    pub fn with_config(config: Config) -> Self {
        Converter { config }
    }

    /// Create a [`ConverterBuilder`] for fine-grained control.
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert a parsed tree.
    pub fn convert(&self, node: &Node) -> Result<ConversionResult, ConvertError> {
        let mut ctx = Context::new(&self.config);
        let pattern = convert_node(node, &mut ctx)?;
        let warnings = ctx.into_warnings();
        tracing::debug!(
            root = node.kind_name(),
            pattern_len = pattern.len(),
            warnings = warnings.len(),
            "converted pattern tree"
        );
        Ok(ConversionResult {
            pattern,
            flags: self.config.js_flags(),
            warnings,
        })
    }

    /// Parse `pattern` with the configured options, then convert it.
    pub fn convert_pattern(&self, pattern: &str) -> error::Result<ConversionResult> {
        let tree = parse_tree(pattern, self.config.options, self.config.depth_limit)?;
        Ok(self.convert(&tree)?)
    }
}

// === ConverterBuilder ===

/// Builder for a [`Converter`].
///
/// # Examples
///
/// ```
/// use ferroni_js::api::Converter;
///
/// let conv = Converter::builder()
///     .case_insensitive(true)
///     .global(false)
///     .build();
/// let result = conv.convert_pattern("abc").unwrap();
/// assert_eq!(result.to_string(), "/abc/i");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConverterBuilder {
    config: Config,
}

impl ConverterBuilder {
    pub fn new() -> Self {
        ConverterBuilder::default()
    }

    /// Enable or disable the `g` flag on the result (default: enabled).
    pub fn global(mut self, yes: bool) -> Self {
        self.config.global = yes;
        self
    }

    /// Enable or disable case-insensitive matching (`i`).
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.config.options.set(RegexOptions::IGNORECASE, yes);
        self
    }

    /// Enable or disable Ruby's multiline mode (`.` matches `\n`).
    pub fn dot_matches_newline(mut self, yes: bool) -> Self {
        self.config.options.set(RegexOptions::MULTILINE, yes);
        self
    }

    /// Enable or disable extended mode (whitespace and `#` comments ignored).
    pub fn extended(mut self, yes: bool) -> Self {
        self.config.options.set(RegexOptions::EXTEND, yes);
        self
    }

    /// Maximum nesting depth for parsing and conversion.
    pub fn depth_limit(mut self, limit: u32) -> Self {
        self.config.depth_limit = limit;
        self
    }

    /// Replace the source options wholesale.
    pub fn options(mut self, options: RegexOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn build(self) -> Converter {
        Converter::with_config(self.config)
    }
}

// === ConversionResult ===

/// A converted pattern, its flags and every degradation recorded on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// Pattern body, without delimiters.
    pub pattern: String,
    /// JavaScript flags, such as `"gi"`.
    pub flags: String,
    /// Warnings in the order they were recorded.
    pub warnings: Vec<Warning>,
}

impl ConversionResult {
    /// True when nothing had to be approximated or dropped.
    pub fn is_lossless(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Renders a JavaScript regex literal.
impl fmt::Display for ConversionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.flags)
    }
}

/// Convert a tree with the default configuration.
pub fn convert(node: &Node) -> Result<ConversionResult, ConvertError> {
    Converter::new().convert(node)
}

/// Parse and convert pattern text with the default configuration.
pub fn convert_pattern(pattern: &str) -> error::Result<ConversionResult> {
    Converter::new().convert_pattern(pattern)
}
