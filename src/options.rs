// options.rs - Source-dialect option flags and conversion configuration.
//
// Bit order follows Oniguruma's ONIG_OPTION_IGNORECASE / EXTEND / MULTILINE
// so flag values line up with what a Ruby `Regexp#options` call reports.

use bitflags::bitflags;

/// Default bound for parser and converter recursion depth.
pub const DEFAULT_DEPTH_LIMIT: u32 = 1024;

bitflags! {
    /// Options of the source pattern, either global or set by `(?imx)`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RegexOptions: u32 {
        /// `i`: case-insensitive matching.
        const IGNORECASE = 1;
        /// `x`: whitespace and `#` comments are ignored in the pattern.
        const EXTEND = 1 << 1;
        /// `m`: `.` matches newline (Ruby's multiline).
        const MULTILINE = 1 << 2;
    }
}

impl RegexOptions {
    /// Map an inline option letter to its flag. `a`, `d` and `u` are
    /// accepted by Ruby but only change character-set semantics, so they
    /// have no flag here.
    pub fn from_letter(c: char) -> Option<RegexOptions> {
        match c {
            'i' => Some(RegexOptions::IGNORECASE),
            'x' => Some(RegexOptions::EXTEND),
            'm' => Some(RegexOptions::MULTILINE),
            _ => None,
        }
    }
}

/// Settings for one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Append the `g` flag to the produced flag set.
    pub global: bool,
    /// Options the source pattern was compiled with.
    pub options: RegexOptions,
    /// Maximum tree depth before conversion fails.
    pub depth_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            global: true,
            options: RegexOptions::empty(),
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }
}

impl Config {
    /// The JavaScript flag string for this configuration.
    pub fn js_flags(&self) -> String {
        let mut flags = String::with_capacity(2);
        if self.global {
            flags.push('g');
        }
        if self.options.contains(RegexOptions::IGNORECASE) {
            flags.push('i');
        }
        flags
    }
}
