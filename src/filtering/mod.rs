//! # Search, Ordering & Pagination
//!
//! Translates the request into the SQL clauses appended to the base query:
//!
//! - **[`search`]**: the WHERE clause. Global search text is split into words; every
//!   word must match (`LIKE '%word%'`) at least one searchable column. Per-column
//!   search values must all match their column.
//! - **[`sort`]**: the ORDER BY clause from `order[k][column]` / `order[k][dir]`,
//!   dropping directives that are invalid or point at unorderable columns.
//! - **[`pagination`]**: the LIMIT/OFFSET clause, skipped for `length=-1` and for
//!   requests without a draw token.
//!
//! ## Example
//!
//! ```text
//! GET /users?draw=1&start=0&length=2&search[value]=jo&order[0][column]=1&order[0][dir]=asc
//!
//! SELECT * FROM (SELECT id, name, email FROM users) dt_base
//!  WHERE (id LIKE '%jo%' OR name LIKE '%jo%' OR email LIKE '%jo%')
//!  ORDER BY name asc
//!  LIMIT 2 OFFSET 0
//! ```
//!
//! Every literal taken from the request is quoted by
//! [`DatabaseInterface::escape`](crate::database::DatabaseInterface::escape).

pub mod pagination;
pub mod search;
pub mod sort;

// Re-export commonly used items
pub use pagination::{build_limit_clause, resolve_page};
pub use search::{
    build_global_condition, build_individual_condition, build_where_clause, search_words,
};
pub use sort::{SortDirection, build_order_clause, resolve_orders};
