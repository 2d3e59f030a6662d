pub mod value_shape;
pub use value_shape::*;

pub mod pg_type;
pub use pg_type::*;

pub mod column;
pub use column::*;

pub mod ordered_columns_list;
pub use ordered_columns_list::*;

pub mod table_definition;
pub use table_definition::*;

/// Answers the column lookups the compiler needs while resolving member
/// paths. Implementations must not change while a compilation reading them
/// is in flight.
pub trait MetadataProvider {
    fn table_name(&self) -> &str;

    fn schema_name(&self) -> Option<&str> {
        None
    }

    /// Columns in their declared order.
    fn columns(&self) -> &[Column];

    fn column_by_db_name(&self, db_name: &str) -> Option<&Column> {
        self.columns().iter().find(|c| c.db_name == db_name)
    }

    /// Lookup used for expression members: matches the member name first and
    /// falls back to the database name.
    fn column_by_member(&self, member: &str) -> Option<&Column> {
        self.columns()
            .iter()
            .find(|c| c.member_name.as_deref() == Some(member))
            .or_else(|| self.column_by_db_name(member))
    }
}
