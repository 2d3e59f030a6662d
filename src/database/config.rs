use serde::{Deserialize, Serialize};

/// How generated parameters are named and referenced in SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParameterStyle {
    /// `@p0`, `@p1`... bound by name
    #[default]
    Named,
    /// `$1`, `$2`... bound by position
    Positional,
}

/// Compiler configuration shared by every pass that uses it.
///
/// - `parameter_style` selects named (`@p0`) or positional (`$1`) placeholders.
/// - `parameter_prefix` is the name prefix for named parameters.
/// - `strict_member_resolution` turns unresolved member paths into errors
///   instead of falling back to the raw member name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub parameter_style: ParameterStyle,
    pub parameter_prefix: String,
    pub strict_member_resolution: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            parameter_style: ParameterStyle::Named,
            parameter_prefix: "p".to_string(),
            strict_member_resolution: false,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Named parameters using `prefix`.
    pub fn named(prefix: &str) -> Self {
        Self {
            parameter_style: ParameterStyle::Named,
            parameter_prefix: prefix.to_string(),
            ..Default::default()
        }
    }

    pub fn positional() -> Self {
        Self {
            parameter_style: ParameterStyle::Positional,
            ..Default::default()
        }
    }

    pub fn strict(mut self) -> Self {
        self.strict_member_resolution = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: CompilerConfig = serde_json::from_value(json!({ "parameter_style": "Positional" })).unwrap();
        assert_eq!(config.parameter_style, ParameterStyle::Positional);
        assert_eq!(config.parameter_prefix, "p");
        assert!(!config.strict_member_resolution);
    }

    #[test]
    fn convenience_constructors() {
        assert_eq!(CompilerConfig::named("arg").parameter_prefix, "arg");
        assert_eq!(CompilerConfig::positional().parameter_style, ParameterStyle::Positional);
        assert!(CompilerConfig::new().strict().strict_member_resolution);
    }
}
