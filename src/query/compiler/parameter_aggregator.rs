use indexmap::IndexMap;
use tracing::trace;

use crate::{
    database::{CompilerConfig, ParameterStyle, PgType, ValueShape},
    query::{
        ast::Literal,
        filters::{ParameterBinding, PgSqlCommand},
    },
};

/// What the visitor knows about the column a constant is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParameterContext {
    pub shape: ValueShape,
    /// The column was reached through a JSON path and yields text.
    pub json_terminus: bool,
}

/// Collects the parameter bindings of one compilation pass and hands out
/// names that are never reused within it.
#[derive(Debug, Clone)]
pub struct ParameterAggregator {
    style: ParameterStyle,
    prefix: String,
    counter: usize,
    parameters: IndexMap<String, ParameterBinding>,
}

impl ParameterAggregator {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            style: config.parameter_style,
            prefix: config.parameter_prefix.clone(),
            counter: 0,
            parameters: IndexMap::new(),
        }
    }

    /// Register `value` and return its parameter name. Values compared
    /// against a JSON path terminus are bound as `text`.
    pub fn add_parameter(&mut self, value: Literal, context: Option<&ParameterContext>) -> String {
        let type_override = context.filter(|c| c.json_terminus).map(|_| PgType::Text);
        self.add_typed_parameter(value, type_override)
    }

    pub fn add_typed_parameter(&mut self, value: Literal, type_override: Option<PgType>) -> String {
        let name = self.next_name();
        trace!(parameter = %name, value = %value, type_override = ?type_override, "registered parameter");
        self.parameters.insert(name.clone(), ParameterBinding::new(&name, value).with_override(type_override));
        name
    }

    /// Merge the bindings of a command rendered elsewhere and return its text
    /// with the tokens valid for this pass. Named bindings keep their names;
    /// positional style renumbers them after the ones already registered.
    pub fn absorb(&mut self, command: PgSqlCommand) -> String {
        let PgSqlCommand { mut command, parameters } = command;
        for (name, binding) in parameters {
            match self.style {
                ParameterStyle::Named => {
                    trace!(parameter = %name, "absorbed parameter");
                    self.parameters.insert(name, binding);
                }
                ParameterStyle::Positional => {
                    let new_name = self.add_typed_parameter(binding.value, binding.type_override);
                    command = command.replace(&format!("@{}", name), &self.token(&new_name));
                }
            }
        }
        command
    }

    /// The placeholder `name` is written as in SQL text.
    pub fn token(&self, name: &str) -> String {
        match self.style {
            ParameterStyle::Named => format!("@{}", name),
            ParameterStyle::Positional => format!("${}", name),
        }
    }

    pub fn parameters(&self) -> &IndexMap<String, ParameterBinding> {
        &self.parameters
    }

    pub fn into_parameters(self) -> IndexMap<String, ParameterBinding> {
        self.parameters
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    fn next_name(&mut self) -> String {
        let name = match self.style {
            ParameterStyle::Named => format!("{}{}", self.prefix, self.counter),
            ParameterStyle::Positional => (self.parameters.len() + 1).to_string(),
        };
        self.counter += 1;
        name
    }
}
