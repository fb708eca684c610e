// convert/casefold.rs - Case variants for locally case-insensitive scopes.
//
// A JavaScript pattern has a single global `i` flag. When only part of the
// source pattern ignores case, literals and class members in that part are
// widened with their simple case variants instead.

/// Upper bound on the size of a range folded member by member.
const MAX_FOLD_RANGE: u32 = 0x1_0000;

/// The single-character case counterpart of `c`, if it has one.
pub(crate) fn swap_case(c: char) -> Option<char> {
    let mapped = if c.is_lowercase() {
        single(c.to_uppercase())
    } else if c.is_uppercase() {
        single(c.to_lowercase())
    } else {
        None
    };
    mapped.filter(|&other| other != c)
}

/// The only character of a case mapping, if it maps to exactly one.
fn single(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    match (mapped.next(), mapped.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RangeFold {
    /// No member of the range has a case variant.
    Unchanged,
    /// Every member maps onto the given contiguous range.
    Range(char, char),
    /// Some members have variants but they do not form one range.
    Partial,
}

/// Case variants of the range `lo-hi`.
pub(crate) fn fold_range(lo: char, hi: char) -> RangeFold {
    let (lo_u, hi_u) = (lo as u32, hi as u32);
    if hi_u < lo_u || hi_u - lo_u >= MAX_FOLD_RANGE {
        return RangeFold::Partial;
    }

    let mut first = None;
    let mut with_variant = 0u32;
    let mut contiguous = true;
    for (offset, code) in (lo_u..=hi_u).enumerate() {
        let Some(c) = char::from_u32(code) else {
            contiguous = false;
            continue;
        };
        match swap_case(c) {
            Some(v) => {
                with_variant += 1;
                let base = *first.get_or_insert(v as u32);
                if v as u32 != base + offset as u32 {
                    contiguous = false;
                }
            }
            None => contiguous = false,
        }
    }

    if with_variant == 0 {
        return RangeFold::Unchanged;
    }
    match first.and_then(char::from_u32) {
        Some(start) if contiguous => match char::from_u32(start as u32 + (hi_u - lo_u)) {
            Some(end) => RangeFold::Range(start, end),
            None => RangeFold::Partial,
        },
        _ => RangeFold::Partial,
    }
}
