pub mod value_type;
pub use value_type::*;

pub mod literal;
pub use literal::*;

pub mod operators;
pub use operators::*;

pub mod method_call;
pub use method_call::*;

pub mod source;
pub use source::*;

pub mod expression;
pub use expression::*;

pub mod query_model;
pub use query_model::*;
