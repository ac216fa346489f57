//! Reserved-character escaping.
//!
//! A backslash before any character folds that character into the
//! surrounding word with no operator meaning. Tokens keep their escape
//! sequences verbatim; one level is removed here when the literal text is
//! needed.

/// Removes one level of backslash escaping from `raw`.
///
/// A trailing lone backslash is kept as-is; the lexer rejects that input
/// before it can reach here.
pub(crate) fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }

    out
}

/// Iterates over the characters of `raw` with an escaped flag for each.
fn chars_with_escapes(raw: &str) -> impl Iterator<Item = (char, bool)> + '_ {
    let mut chars = raw.chars();
    std::iter::from_fn(move || {
        let ch = chars.next()?;
        if ch == '\\' {
            match chars.next() {
                Some(escaped) => Some((escaped, true)),
                None => Some(('\\', false)),
            }
        } else {
            Some((ch, false))
        }
    })
}

/// Whether `raw` contains a `*` or `?` that still carries wildcard meaning.
pub(crate) fn has_unescaped_wildcard(raw: &str) -> bool {
    chars_with_escapes(raw).any(|(ch, escaped)| !escaped && (ch == '*' || ch == '?'))
}

/// Whether the only unescaped wildcard in `raw` is a single trailing `*`.
///
/// Such patterns match exactly like a wildcard but can be represented as a
/// plain prefix.
pub(crate) fn is_prefix_pattern(raw: &str) -> bool {
    let mut wildcards = 0usize;
    let mut last_is_star = false;

    for (ch, escaped) in chars_with_escapes(raw) {
        if !escaped && (ch == '*' || ch == '?') {
            wildcards += 1;
            last_is_star = ch == '*';
        } else {
            last_is_star = false;
        }
    }

    wildcards == 1 && last_is_star
}
