//! Category classifiers: map each tool's native taxonomy onto `Category`.
//!
//! - Lint tool: severity tag, `style` is STYLE and anything else ERROR.
//! - Compiler: warning flag looked up in a fixed table. Flags missing from
//!   the table are reported through `tracing::warn!` so the table can grow.
//! - Analyzer: the last issue kind, `QUALITY` or `SECURITY`.

use crate::models::Category;

/// Compiler warning flags and their category. Flags are stored without the
/// leading `-W`.
const GCC_FLAGS: &[(&str, Category)] = &[
    ("unused-parameter", Category::Style),
    ("unused-variable", Category::Style),
    ("unused-but-set-variable", Category::Style),
    ("unused-but-set-parameter", Category::Style),
    ("unused-function", Category::Style),
    ("unused-label", Category::Style),
    ("unused-value", Category::Style),
    ("unused-const-variable", Category::Style),
    ("shadow", Category::Style),
    ("sign-compare", Category::Style),
    ("pointer-arith", Category::Style),
    ("missing-field-initializers", Category::Style),
    ("missing-prototypes", Category::Style),
    ("missing-declarations", Category::Style),
    ("strict-prototypes", Category::Style),
    ("old-style-declaration", Category::Style),
    ("old-style-definition", Category::Style),
    ("declaration-after-statement", Category::Style),
    ("cast-qual", Category::Style),
    ("type-limits", Category::Style),
    ("empty-body", Category::Style),
    ("parentheses", Category::Style),
    ("implicit-fallthrough", Category::Style),
    ("float-equal", Category::Error),
    ("uninitialized", Category::Error),
    ("maybe-uninitialized", Category::Error),
    ("implicit-function-declaration", Category::Error),
    ("incompatible-pointer-types", Category::Error),
    ("int-conversion", Category::Error),
    ("return-type", Category::Error),
    ("array-bounds", Category::Error),
    ("format", Category::Error),
    ("format-security", Category::Error),
    ("format-overflow", Category::Error),
    ("format-truncation", Category::Error),
    ("stringop-truncation", Category::Error),
    ("stringop-overflow", Category::Error),
    ("null-dereference", Category::Error),
    ("cast-align", Category::Error),
    ("discarded-qualifiers", Category::Error),
    ("address-of-packed-member", Category::Error),
];

/// Lint-tool severity tag (`style`, `error`, `warning`, ...).
pub fn cppcheck_category(severity: &str) -> Category {
    if severity == "style" {
        Category::Style
    } else {
        Category::Error
    }
}

/// Compiler warning flag as printed in brackets, e.g. `-Wunused-parameter`.
///
/// `None` (no flag on the diagnostic) is UNKNOWN silently; an unrecognized
/// flag is UNKNOWN and logged.
pub fn gcc_category(flag: Option<&str>) -> Category {
    let Some(raw) = flag else {
        return Category::Unknown;
    };
    let name = normalize_gcc_flag(raw);
    match GCC_FLAGS.iter().find(|(f, _)| *f == name) {
        Some((_, cat)) => *cat,
        None => {
            tracing::warn!(flag = raw, "unrecognized compiler warning flag; classified as UNKNOWN");
            Category::Unknown
        }
    }
}

/// Strip `-W`/`-Werror=` prefixes and a trailing `=level`.
fn normalize_gcc_flag(raw: &str) -> &str {
    let s = raw.trim();
    let s = s
        .strip_prefix("-Werror=")
        .or_else(|| s.strip_prefix("-W"))
        .unwrap_or(s);
    match s.split_once('=') {
        Some((name, _)) => name,
        None => s,
    }
}

/// Analyzer issue kind, the last entry of `issueKinds`.
pub fn coverity_category(kind: Option<&str>) -> Category {
    match kind {
        Some("QUALITY") => Category::Style,
        Some("SECURITY") => Category::Security,
        _ => Category::Unknown,
    }
}
