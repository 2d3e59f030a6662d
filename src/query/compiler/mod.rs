pub mod compile_error;
pub use compile_error::*;

pub mod sql_quote;
pub use sql_quote::*;

pub mod visit_state;
pub use visit_state::*;

pub mod parameter_aggregator;
pub use parameter_aggregator::*;

pub mod method_templates;
pub use method_templates::*;

pub mod query_parts;
pub use query_parts::*;

pub mod expression_visitor;
pub use expression_visitor::*;

pub mod query_model_compiler;
pub use query_model_compiler::*;
