pub mod config;
pub mod core;
pub mod database;
pub mod datatables;
pub mod errors;
pub mod filtering;
mod lenient;
pub mod models;
mod request;
pub mod routes;

pub use config::DataTablesConfig;
pub use crate::core::{
    Column, ColumnCollection, DisplayKey, Formatter, QueryModel, SelectColumn, identity_formatter,
};
pub use database::DatabaseInterface;
pub use datatables::DataTables;
pub use errors::{ApiError, DataTablesError};
pub use filtering::SortDirection;
pub use models::{
    ColumnParams, DataTablesResponse, FormattedRow, OrderParams, RequestParams, Row, RowEntry,
    SearchParams,
};
