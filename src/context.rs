// context.rs - Mutable state for one conversion walk.
//
// A Context is created by a top-level conversion call, threaded by `&mut`
// through every converter, and consumed when the walk finishes. It is never
// shared between calls.

use std::collections::HashMap;

use smallvec::{smallvec, SmallVec};

use crate::error::ConvertError;
use crate::node::Backref;
use crate::options::{Config, RegexOptions};
use crate::warning::{Warning, WarningCategory};

#[derive(Debug)]
pub struct Context {
    /// Capturing groups emitted so far, emulation groups included.
    pub(crate) capture_count: u32,
    capture_map: HashMap<u32, u32>,
    named_captures: HashMap<String, u32>,

    /// Plain class members of the outermost set being converted.
    pub(crate) set_members: Vec<String>,
    /// Standalone alternatives split out of the outermost set.
    pub(crate) set_extractions: Vec<String>,
    /// Whether the outermost set being converted is negative.
    pub(crate) negative_base_set: bool,

    option_scopes: SmallVec<[RegexOptions; 8]>,
    global_options: RegexOptions,
    pub(crate) atomic_depth: u32,

    depth: u32,
    depth_limit: u32,
    warnings: Vec<Warning>,
}

impl Context {
    pub fn new(config: &Config) -> Self {
        Context {
            capture_count: 0,
            capture_map: HashMap::new(),
            named_captures: HashMap::new(),
            set_members: Vec::new(),
            set_extractions: Vec::new(),
            negative_base_set: false,
            option_scopes: smallvec![config.options],
            global_options: config.options,
            atomic_depth: 0,
            depth: 0,
            depth_limit: config.depth_limit,
            warnings: Vec::new(),
        }
    }

    // === Recursion depth ===

    pub(crate) fn enter(&mut self) -> Result<(), ConvertError> {
        self.depth += 1;
        if self.depth > self.depth_limit {
            return Err(ConvertError::DepthLimitExceeded {
                limit: self.depth_limit,
            });
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Levels left before the depth limit is reached.
    pub(crate) fn remaining_depth(&self) -> u32 {
        self.depth_limit.saturating_sub(self.depth)
    }

    // === Warnings ===

    pub(crate) fn warn(&mut self, category: WarningCategory, message: impl Into<String>) {
        let warning = Warning::new(category, message);
        tracing::trace!(category = warning.category.as_str(), message = %warning.message, "conversion warning");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    // === Option scopes ===

    /// Options in effect at the current position.
    pub fn options(&self) -> RegexOptions {
        self.option_scopes
            .last()
            .copied()
            .unwrap_or(self.global_options)
    }

    pub fn global_options(&self) -> RegexOptions {
        self.global_options
    }

    pub fn case_insensitive(&self) -> bool {
        self.options().contains(RegexOptions::IGNORECASE)
    }

    /// Case-insensitive here but not globally, so the `i` flag does not
    /// cover it and literals need explicit case variants.
    pub fn local_case_insensitive(&self) -> bool {
        self.case_insensitive() && !self.global_options.contains(RegexOptions::IGNORECASE)
    }

    pub fn multiline(&self) -> bool {
        self.options().contains(RegexOptions::MULTILINE)
    }

    /// Open a scope inheriting the current options.
    pub(crate) fn push_scope(&mut self) {
        let current = self.options();
        self.option_scopes.push(current);
    }

    pub(crate) fn pop_scope(&mut self) {
        if self.option_scopes.len() > 1 {
            self.option_scopes.pop();
        }
    }

    /// Replace the options of the innermost scope.
    pub(crate) fn set_options(&mut self, options: RegexOptions) {
        if let Some(top) = self.option_scopes.last_mut() {
            *top = options;
        }
    }

    // === Captures ===

    pub fn capture_count(&self) -> u32 {
        self.capture_count
    }

    /// Allocate the next emitted capture index.
    pub(crate) fn next_capture(&mut self) -> u32 {
        self.capture_count += 1;
        self.capture_count
    }

    /// Allocate an index for a source capture group and remember the mapping
    /// for backreferences.
    pub(crate) fn register_capture(&mut self, original: Option<u32>, name: Option<&str>) -> u32 {
        let emitted = self.next_capture();
        if let Some(original) = original {
            self.capture_map.insert(original, emitted);
        }
        if let Some(name) = name {
            self.named_captures.insert(name.to_string(), emitted);
        }
        emitted
    }

    /// Emitted index for a backreference, if its group was already emitted.
    pub(crate) fn resolve_backref(&self, backref: &Backref) -> Option<u32> {
        match backref {
            Backref::Number(n) => self.capture_map.get(n).copied(),
            Backref::Name(name) => self.named_captures.get(name).copied(),
        }
    }

    // === Set buffers ===

    pub(crate) fn set_buffers_empty(&self) -> bool {
        self.set_members.is_empty() && self.set_extractions.is_empty()
    }

    /// Drain both set buffers.
    pub(crate) fn take_set_buffers(&mut self) -> (Vec<String>, Vec<String>) {
        (
            std::mem::take(&mut self.set_members),
            std::mem::take(&mut self.set_extractions),
        )
    }
}
