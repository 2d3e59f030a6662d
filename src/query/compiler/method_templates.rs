use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use crate::query::ast::MethodKind;

/// SQL templates per method. `{0}` is the receiver (or the joined argument
/// list for `Concat`), `{1}`.. the arguments.
static METHOD_TEMPLATES: Lazy<HashMap<MethodKind, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (MethodKind::Equals, "{0} = {1}"),
        (MethodKind::ToLower, "LOWER({0})"),
        (MethodKind::ToUpper, "UPPER({0})"),
        (MethodKind::Reverse, "REVERSE({0})"),
        (MethodKind::Length, "LENGTH({0})"),
        (MethodKind::Concat, "CONCAT({0})"),
        (MethodKind::Substring, "SUBSTRING({0} FROM {1}+1)"),
        (MethodKind::Replace, "REPLACE({0}, {1}, {2})"),
        (MethodKind::Trim, "TRIM(both {1} from {0})"),
        (MethodKind::TrimStart, "TRIM(leading {1} from {0})"),
        (MethodKind::TrimEnd, "TRIM(trailing {1} from {0})"),
        (MethodKind::Contains, "{0} LIKE '%' || {1} || '%'"),
        (MethodKind::StartsWith, "{0} LIKE {1} || '%'"),
        (MethodKind::EndsWith, "{0} LIKE '%' || {1}"),
    ])
});

const SUBSTRING_FOR: &str = "SUBSTRING({0} FROM {1}+1 FOR {2})";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\d+)\}").unwrap());

pub struct MethodTemplates;

impl MethodTemplates {
    /// Template for `kind` called with `argument_count` arguments.
    pub fn template_for(kind: MethodKind, argument_count: usize) -> &'static str {
        match kind {
            MethodKind::Substring if argument_count > 1 => SUBSTRING_FOR,
            _ => METHOD_TEMPLATES.get(&kind).copied().unwrap_or("{0}"),
        }
    }

    /// Number of positional slots the template expects.
    pub fn placeholder_count(template: &str) -> usize {
        PLACEHOLDER
            .captures_iter(template)
            .filter_map(|c| c[1].parse::<usize>().ok())
            .map(|i| i + 1)
            .max()
            .unwrap_or(0)
    }

    /// Substitute `fragments` positionally. Slots without a fragment (omitted
    /// optional arguments) become empty.
    pub fn render(template: &str, fragments: &[String]) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| fragments.get(i))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn every_method_has_a_template() {
        for kind in [MethodKind::Equals, MethodKind::Concat, MethodKind::TrimEnd, MethodKind::EndsWith] {
            assert!(METHOD_TEMPLATES.contains_key(&kind));
        }
        assert_eq!(METHOD_TEMPLATES.len(), 14);
    }

    #[test]
    fn substring_switches_template_on_length_argument() {
        assert_eq!(MethodTemplates::template_for(MethodKind::Substring, 1), "SUBSTRING({0} FROM {1}+1)");
        assert_eq!(MethodTemplates::template_for(MethodKind::Substring, 2), SUBSTRING_FOR);
    }

    #[test]
    fn counts_placeholders() {
        assert_eq!(MethodTemplates::placeholder_count("REPLACE({0}, {1}, {2})"), 3);
        assert_eq!(MethodTemplates::placeholder_count("TRIM(both {1} from {0})"), 2);
        assert_eq!(MethodTemplates::placeholder_count("LOWER({0})"), 1);
    }

    #[test]
    fn renders_and_pads_missing_arguments() {
        assert_eq!(
            MethodTemplates::render("{0} LIKE '%' || {1} || '%'", &frags(&["\"t\".\"name\"", "@p0"])),
            "\"t\".\"name\" LIKE '%' || @p0 || '%'"
        );
        assert_eq!(MethodTemplates::render("TRIM(both {1} from {0})", &frags(&["x"])), "TRIM(both  from x)");
    }
}
