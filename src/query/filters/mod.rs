pub mod sql_command;
pub use sql_command::*;

pub mod json_path;
pub use json_path::*;

pub mod filter_expression;
pub use filter_expression::*;

pub mod limit_clause;
pub use limit_clause::*;
