use indexmap::IndexMap;
use std::fmt;

use crate::{database::PgType, query::ast::Literal};

/// A value bound to one parameter token of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBinding {
    pub name: String,
    pub value: Literal,
    /// Type to bind the value as instead of the value's native type
    pub type_override: Option<PgType>,
}

impl ParameterBinding {
    pub fn new(name: &str, value: Literal) -> Self {
        Self { name: name.to_string(), value, type_override: None }
    }

    pub fn with_override(mut self, pg_type: Option<PgType>) -> Self {
        self.type_override = pg_type;
        self
    }

    /// Type the executor should bind the value as.
    pub fn pg_type(&self) -> Option<PgType> {
        self.type_override.or_else(|| self.value.native_pg_type())
    }
}

/// SQL text together with the bindings for every parameter token in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgSqlCommand {
    pub command: String,
    pub parameters: IndexMap<String, ParameterBinding>,
}

impl PgSqlCommand {
    pub fn new(command: &str) -> Self {
        Self { command: command.to_string(), parameters: IndexMap::new() }
    }

    pub fn append_command(&mut self, text: &str) -> &mut Self {
        self.command.push_str(text);
        self
    }

    pub fn add_parameter(&mut self, binding: ParameterBinding) -> &mut Self {
        self.parameters.insert(binding.name.clone(), binding);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterBinding> {
        self.parameters.get(name)
    }
}

impl fmt::Display for PgSqlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_native_type() {
        let plain = ParameterBinding::new("p0", Literal::from(3));
        assert_eq!(plain.pg_type(), Some(PgType::BigInt));

        let text = ParameterBinding::new("p1", Literal::from(3)).with_override(Some(PgType::Text));
        assert_eq!(text.pg_type(), Some(PgType::Text));
        assert_eq!(ParameterBinding::new("p2", Literal::Null).pg_type(), None);
    }

    #[test]
    fn command_keeps_parameter_order() {
        let mut cmd = PgSqlCommand::new("\"a\" = @x");
        cmd.append_command(" AND \"b\" = @y")
            .add_parameter(ParameterBinding::new("x", Literal::from("one")))
            .add_parameter(ParameterBinding::new("y", Literal::from("two")));

        assert_eq!(cmd.to_string(), "\"a\" = @x AND \"b\" = @y");
        assert_eq!(cmd.parameters.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(cmd.parameter("y").map(|b| &b.value), Some(&Literal::from("two")));
    }
}
