// warning.rs - Non-fatal conversion diagnostics.

use std::fmt;

/// Kind of degradation a warning reports. The string form returned by
/// [`WarningCategory::as_str`] is stable and safe to match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum WarningCategory {
    UnsupportedProperty,
    NestedNegativeSet,
    SetIntersection,
    AstralPlaneSetMember,
    AstralPlaneProperty,
    UnsupportedNonHexInNegativeSet,
    PropertyInNegativeSet,
    VariableLengthAbsence,
    NestedAtomicGroup,
    UnsupportedGroupOption,
    LookbehindDowngraded,
    UnknownNodeKind,
    UnknownGroupKind,
    CaseInsensitiveRange,
    CaseSensitiveScope,
    UnsupportedAnchor,
    ApproximatedAnchor,
    UnresolvedBackreference,
    ApproximatedType,
}

impl WarningCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            WarningCategory::UnsupportedProperty => "unsupported-property",
            WarningCategory::NestedNegativeSet => "nested-negative-set",
            WarningCategory::SetIntersection => "set-intersection",
            WarningCategory::AstralPlaneSetMember => "astral-plane-set-member",
            WarningCategory::AstralPlaneProperty => "astral-plane-property",
            WarningCategory::UnsupportedNonHexInNegativeSet => {
                "unsupported-non-hex-in-negative-set"
            }
            WarningCategory::PropertyInNegativeSet => "property-in-negative-set",
            WarningCategory::VariableLengthAbsence => "variable-length-absence",
            WarningCategory::NestedAtomicGroup => "nested-atomic-group",
            WarningCategory::UnsupportedGroupOption => "unsupported-group-option",
            WarningCategory::LookbehindDowngraded => "lookbehind-downgraded",
            WarningCategory::UnknownNodeKind => "unknown-node-kind",
            WarningCategory::UnknownGroupKind => "unknown-group-kind",
            WarningCategory::CaseInsensitiveRange => "case-insensitive-range",
            WarningCategory::CaseSensitiveScope => "case-sensitive-scope",
            WarningCategory::UnsupportedAnchor => "unsupported-anchor",
            WarningCategory::ApproximatedAnchor => "approximated-anchor",
            WarningCategory::UnresolvedBackreference => "unresolved-backreference",
            WarningCategory::ApproximatedType => "approximated-type",
        }
    }
}

impl fmt::Display for WarningCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A construct that was converted lossily or dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Warning {
    pub category: WarningCategory,
    pub message: String,
}

impl Warning {
    pub fn new(category: WarningCategory, message: impl Into<String>) -> Self {
        Warning {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}
