pub mod ast;
pub use ast::*;

pub mod filters;
pub use filters::*;

pub mod compiler;
pub use compiler::*;
