// unicode/property_data.rs - POSIX brackets without a Unicode property name.
//
// Oniguruma defines these classes in terms of Unicode properties. Keys are
// normalized names and must stay sorted for binary search. Values are class
// expressions handed to the Unicode class parser.

pub(crate) static POSIX_CLASSES: &[(&str, &str)] = &[
    ("alnum", r"[\p{Alphabetic}\p{Nd}]"),
    ("blank", r"[\p{Zs}\t]"),
    ("graph", r"[^\p{White_Space}\p{Cc}\p{Cn}]"),
    ("newline", r"\n"),
    ("print", r"[[^\p{White_Space}\p{Cc}\p{Cn}]\p{Zs}]"),
    ("punct", r"[\p{P}$+<=>^`|~]"),
    ("word", r"\w"),
    ("xdigit", r"[0-9A-Fa-f]"),
];
