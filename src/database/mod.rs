pub mod config;
pub use config::*;

pub mod schema;
pub use schema::*;
