//! Per-run variable environment
//!
//! The environment lives for the duration of a single workflow run and is
//! never shared between runs. It is deliberately not thread-safe: a run
//! executes its steps strictly sequentially, so step N's writes are visible
//! to step N+1 by construction.

use crate::expand::expand;
use std::collections::HashMap;

/// Mutable string-keyed variable store scoped to one workflow run
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Set a variable, overwriting any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Number of variables currently set
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Visit every variable in unspecified order
    pub fn for_each(&self, mut f: impl FnMut(&str, &str)) {
        for (k, v) in &self.vars {
            f(k, v);
        }
    }

    /// Expand `$NAME` tokens in `s` against this environment.
    ///
    /// Unresolved tokens are emitted verbatim (`$NAME`), letting chained
    /// variable references across steps resolve progressively instead of
    /// erroring on forward references.
    pub fn expand(&self, s: &str) -> String {
        expand(s, |name| {
            self.get(name)
                .map(str::to_string)
                .unwrap_or_else(|| format!("${name}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut env = Environment::new();
        assert!(env.get("X").is_none());
        assert!(env.is_empty());

        env.set("X", "v");
        assert_eq!(env.get("X"), Some("v"));
        assert_eq!(env.len(), 1);

        env.set("X", "w");
        assert_eq!(env.get("X"), Some("w"));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_expand_forward_reference_tolerance() {
        let mut env = Environment::new();

        // Before X is set the token passes through verbatim.
        assert_eq!(env.expand("$X"), "$X");

        env.set("X", "v");
        assert_eq!(env.expand("$X"), "v");
    }

    #[test]
    fn test_expand_mixed() {
        let mut env = Environment::new();
        env.set("host", "db.internal");
        env.set("port", "5432");

        assert_eq!(
            env.expand("postgres://$host:$port/app"),
            "postgres://db.internal:5432/app"
        );
    }

    #[test]
    fn test_for_each() {
        let mut env = Environment::new();
        env.set("a", "1");
        env.set("b", "2");

        let mut seen = Vec::new();
        env.for_each(|k, v| seen.push(format!("{k}={v}")));
        seen.sort();
        assert_eq!(seen, vec!["a=1", "b=2"]);
    }
}
