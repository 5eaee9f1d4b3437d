// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Placeholder interpolation for question text

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

// Regex pattern for {variable_name} - this is a constant valid pattern
#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("constant regex pattern is valid")
});

/// Replace `{name}` placeholders with values from `vars`.
///
/// Unknown placeholders are left as-is so a typo shows up verbatim in the
/// meeting chat instead of silently vanishing.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    VAR_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            vars.get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_known_placeholders() {
        let out = interpolate("Hi {candidate_name}!", &vars(&[("candidate_name", "Ada")]));
        assert_eq!(out, "Hi Ada!");
    }

    #[test]
    fn leaves_unknown_placeholders() {
        let out = interpolate("Role: {role}", &vars(&[]));
        assert_eq!(out, "Role: {role}");
    }

    #[test]
    fn ignores_non_identifier_braces() {
        let out = interpolate("{ not a var } {1x}", &vars(&[("x", "y")]));
        assert_eq!(out, "{ not a var } {1x}");
    }
}
