/// `"name"`, with embedded double quotes doubled.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `'key'` for a JSON path step, with embedded single quotes doubled.
pub fn quote_path_key(key: &str) -> String {
    format!("'{}'", key.replace('\'', "''"))
}

/// `"table"."column"`
pub fn qualified_column(table: &str, column: &str) -> String {
    format!("{}.{}", quote_identifier(table), quote_identifier(column))
}

/// `->'a'->'b'->>'last'` over `steps`; empty when there are no steps.
pub fn json_traversal(steps: &[String]) -> String {
    let Some((last, inner)) = steps.split_last() else {
        return String::new();
    };
    let mut out = String::new();
    for step in inner {
        out.push_str("->");
        out.push_str(&quote_path_key(step));
    }
    out.push_str("->>");
    out.push_str(&quote_path_key(last));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_escape_double_quotes() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(qualified_column("t", "c"), "\"t\".\"c\"");
    }

    #[test]
    fn path_keys_escape_single_quotes() {
        assert_eq!(quote_path_key("o'brien"), "'o''brien'");
    }

    #[test]
    fn traversal_ends_with_text_extraction() {
        let steps = vec!["address".to_string(), "city".to_string()];
        assert_eq!(json_traversal(&steps), "->'address'->>'city'");
        assert_eq!(json_traversal(&steps[1..]), "->>'city'");
        assert_eq!(json_traversal(&[]), "");
    }
}
