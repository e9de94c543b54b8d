// Table definition: columns and the base query they are read from

pub mod collection;
pub mod column;
pub mod query;

// Re-export commonly used items
pub use collection::ColumnCollection;
pub use column::{Column, DisplayKey, Formatter, identity_formatter};
pub use query::{QueryModel, SelectColumn};
