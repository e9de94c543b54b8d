//! # The DataTables Pipeline
//!
//! One [`DataTables`] value serves one request. Define the table with a base
//! query, optionally add, edit or hide columns, then call
//! [`generate`](DataTables::generate):
//!
//! ```rust,ignore
//! use datatables::{DataTables, RequestParams};
//! use serde_json::json;
//!
//! let mut table = DataTables::new(&db, params);
//! table
//!     .query("SELECT id, name, email FROM users")?
//!     .edit("email", |row, name| json!(row[name].as_str().map(str::to_lowercase)))?
//!     .add("profile", |row, _| json!(format!("/users/{}", row["id"])))?
//!     .hide(["id"])?;
//! let response = table.generate().await?;
//! ```
//!
//! `generate` runs strictly in sequence: bind the request's column attributes,
//! count all rows, build the WHERE clause, count filtered rows, build ORDER BY
//! and LIMIT, run the final query, then format each row. Any database failure
//! aborts the invocation; nothing is retried.

use sea_orm::DbErr;
use serde_json::Value;
use std::sync::Arc;

use crate::config::DataTablesConfig;
use crate::core::{ColumnCollection, QueryModel};
use crate::database::DatabaseInterface;
use crate::errors::DataTablesError;
use crate::filtering::{
    build_global_condition, build_individual_condition, build_limit_clause, build_order_clause,
    build_where_clause,
};
use crate::models::{DataTablesResponse, RequestParams, Row};

pub struct DataTables<D> {
    db: D,
    request: RequestParams,
    config: DataTablesConfig,
    query: Option<QueryModel>,
    columns: ColumnCollection,
}

impl<D: DatabaseInterface> DataTables<D> {
    #[must_use]
    pub fn new(db: D, request: RequestParams) -> Self {
        Self {
            db,
            request,
            config: DataTablesConfig::default(),
            query: None,
            columns: ColumnCollection::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DataTablesConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the base query. Its select list defines the columns, in order.
    ///
    /// Calling this again starts the definition over.
    ///
    /// # Errors
    ///
    /// `UnsupportedSelect` if the column names cannot be read from the query, and
    /// `DuplicateColumnName` if two select items share an output name.
    pub fn query(&mut self, base: impl Into<String>) -> Result<&mut Self, DataTablesError> {
        let query = QueryModel::new(base);
        let columns = ColumnCollection::from_select(query.select_columns()?)?;
        tracing::debug!(columns = ?columns.names(), "Defined DataTables base query");
        self.query = Some(query);
        self.columns = columns;
        Ok(self)
    }

    fn ensure_query(&self) -> Result<(), DataTablesError> {
        self.query
            .as_ref()
            .map(|_| ())
            .ok_or(DataTablesError::QueryNotDefined)
    }

    /// Append an output-only column whose value `formatter` derives from the row.
    ///
    /// # Errors
    ///
    /// `QueryNotDefined` before [`query`](Self::query); `DuplicateColumnName` if the
    /// name is taken.
    pub fn add<F>(&mut self, name: impl Into<String>, formatter: F) -> Result<&mut Self, DataTablesError>
    where
        F: Fn(&Row, &str) -> Value + Send + Sync + 'static,
    {
        self.ensure_query()?;
        self.columns.add(name, Arc::new(formatter))?;
        Ok(self)
    }

    /// Replace how an existing column's value is produced.
    ///
    /// # Errors
    ///
    /// `QueryNotDefined` before [`query`](Self::query); `ColumnNotFound` for an
    /// unknown name.
    pub fn edit<F>(&mut self, name: &str, formatter: F) -> Result<&mut Self, DataTablesError>
    where
        F: Fn(&Row, &str) -> Value + Send + Sync + 'static,
    {
        self.ensure_query()?;
        self.columns.edit(name, Arc::new(formatter))?;
        Ok(self)
    }

    /// Leave columns out of the output rows. They still count for column indices
    /// and still take part in search and ordering.
    ///
    /// # Errors
    ///
    /// `QueryNotDefined` before [`query`](Self::query); `ColumnNotFound` for an
    /// unknown name (no column is hidden in that case).
    pub fn hide<I, S>(&mut self, names: I) -> Result<&mut Self, DataTablesError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_query()?;
        self.columns.hide(names)?;
        Ok(self)
    }

    /// All column names in definition order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.names()
    }

    #[must_use]
    pub const fn columns(&self) -> &ColumnCollection {
        &self.columns
    }

    /// The SQL of the last [`generate`](Self::generate) run.
    #[must_use]
    pub fn query_sql(&self) -> Option<&str> {
        self.query.as_ref().map(QueryModel::full)
    }

    /// Run the pipeline and assemble the response envelope.
    ///
    /// # Errors
    ///
    /// `QueryNotDefined` before [`query`](Self::query); `Database` for any failure
    /// of the database collaborator.
    pub async fn generate(&mut self) -> Result<DataTablesResponse, DataTablesError> {
        let query = self.query.as_mut().ok_or(DataTablesError::QueryNotDefined)?;

        self.columns.attach(&self.request.columns);

        let records_total = self
            .db
            .count(query.source())
            .await
            .map_err(|err| database_failure(err, query.source()))?;

        let global = build_global_condition(
            self.request.search_value(),
            &self.columns,
            &self.db,
            self.config.max_search_length,
        );
        let individual = build_individual_condition(&self.columns, &self.db);
        let where_clause = build_where_clause(global, individual);
        tracing::debug!(where_clause = %where_clause, "Built DataTables filter");

        let filtered_sql = query.filtered(&where_clause);
        let records_filtered = self
            .db
            .count(&filtered_sql)
            .await
            .map_err(|err| database_failure(err, &filtered_sql))?;

        let order_clause = build_order_clause(
            &self.request.order,
            &self.columns,
            query.has_default_order(),
            self.config.default_order_direction,
            &self.db,
        );
        let limit_clause = build_limit_clause(&self.request, self.config.default_length);

        query.assemble(&where_clause, &order_clause, &limit_clause);
        tracing::debug!(sql = %query.full(), "Executing DataTables query");

        let rows = self
            .db
            .query(query.full())
            .await
            .map_err(|err| database_failure(err, query.full()))?;

        let data = rows.iter().map(|row| self.columns.format_row(row)).collect();

        Ok(DataTablesResponse {
            draw: self.request.draw.unwrap_or(0),
            records_total,
            records_filtered,
            data,
        })
    }

    /// [`generate`](Self::generate), serialized to the JSON document the client expects.
    ///
    /// # Errors
    ///
    /// As for `generate`, plus `Serialization` if a formatter produced a value
    /// JSON cannot represent.
    pub async fn generate_json(&mut self) -> Result<String, DataTablesError> {
        let response = self.generate().await?;
        Ok(serde_json::to_string(&response)?)
    }
}

fn database_failure(err: DbErr, sql: &str) -> DataTablesError {
    tracing::error!(error = %err, sql = %sql, "DataTables database call failed");
    DataTablesError::Database(err)
}
