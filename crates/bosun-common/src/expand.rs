//! Variable token expansion
//!
//! Single-token `$NAME` replacement, not a templating language. Expansion is
//! a single pass: substituted values are never re-expanded, which prevents
//! expansion loops.

/// Replace each `$NAME` token in `s` with `lookup(NAME)`.
///
/// An identifier is a run of ASCII alphanumerics and underscores. A `$` not
/// followed by an identifier is kept as-is. The caller decides what an
/// unresolved name expands to; the workflow engine wires `lookup` to return
/// the literal `$NAME` for unknown variables.
pub fn expand(s: &str, lookup: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let start = i + 1;
        let mut end = start;
        while let Some(&(j, next)) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        if end > start {
            out.push_str(&lookup(&s[start..end]));
        } else {
            out.push('$');
        }
    }

    out
}

/// Render a JSON value as the string stored in the environment.
///
/// Strings are stored as-is (no quoting); scalars use their JSON rendering;
/// null becomes the empty string; containers fall back to compact JSON.
pub fn strval(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
