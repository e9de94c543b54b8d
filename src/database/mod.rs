//! The database collaborator.
//!
//! The pipeline only needs three capabilities from a store: count the rows of a
//! SQL fragment, run a SQL fragment and hand back rows, and turn a scalar into a
//! quoted literal. [`DatabaseInterface`] captures exactly that, and is implemented
//! for Sea-ORM's [`DatabaseConnection`].
//!
//! On Postgres, searched columns are cast to `text` so `LIKE` also works on
//! numeric columns. Unquoted names in the base query are folded to lower case by
//! Postgres; the default formatter falls back to a case-insensitive field lookup
//! for that reason, but custom formatters see the keys the backend reports.

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, FromQueryResult, JsonValue,
    Statement,
};

use crate::core::Column;
use crate::models::Row;

/// Alias of the derived table used for counting.
const COUNT_ALIAS: &str = "dt_count";

#[async_trait]
pub trait DatabaseInterface: Send + Sync {
    /// Number of rows the SQL fragment yields.
    async fn count(&self, sql: &str) -> Result<u64, DbErr>;

    /// Execute the SQL fragment and materialize its rows.
    async fn query(&self, sql: &str) -> Result<Vec<Row>, DbErr>;

    /// A dialect-safe, already quoted literal for `value`.
    fn escape(&self, value: &str) -> String;

    /// `name` as a quoted identifier of this dialect.
    fn quote_identifier(&self, name: &str) -> String {
        quote_identifier_with(name, '"')
    }

    /// How a column is referenced in generated WHERE and ORDER BY clauses.
    ///
    /// Names the base query quoted stay quoted, as does anything that is not a
    /// plain identifier (aliases with spaces, unaliased expressions). Other names
    /// are written bare so the backend folds them the way it folded the base query.
    fn column_reference(&self, column: &Column) -> String {
        if column.quoted || !is_plain_identifier(&column.name) {
            self.quote_identifier(&column.name)
        } else {
            column.name.clone()
        }
    }

    /// Left-hand side of a `LIKE` test on `column_sql`.
    fn like_operand(&self, column_sql: String) -> String {
        column_sql
    }
}

/// `SELECT COUNT(*)` over an arbitrary fragment.
#[must_use]
pub fn count_sql(sql: &str) -> String {
    format!("SELECT COUNT(*) AS rowcount FROM ({sql}) {COUNT_ALIAS}")
}

/// Quote `value` as a string literal for `backend`.
///
/// Single quotes are doubled everywhere; `MySQL` also treats backslash as an
/// escape character inside literals, so it is doubled there too.
#[must_use]
pub fn quote_literal(backend: DatabaseBackend, value: &str) -> String {
    let escaped = match backend {
        DatabaseBackend::MySql => value.replace('\\', "\\\\").replace('\'', "''"),
        _ => value.replace('\'', "''"),
    };
    format!("'{escaped}'")
}

/// `[A-Za-z_][A-Za-z0-9_]*`
#[must_use]
pub fn is_plain_identifier(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Wrap `name` in `quote`, doubling any embedded quote character.
#[must_use]
pub fn quote_identifier_with(name: &str, quote: char) -> String {
    let doubled: String = [quote, quote].iter().collect();
    format!("{quote}{}{quote}", name.replace(quote, &doubled))
}

#[async_trait]
impl DatabaseInterface for DatabaseConnection {
    async fn count(&self, sql: &str) -> Result<u64, DbErr> {
        let backend = self.get_database_backend();
        let statement = Statement::from_string(backend, count_sql(sql));
        let row = self
            .query_one(statement)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("count query returned no row".to_string()))?;
        let count: i64 = row.try_get("", "rowcount")?;
        u64::try_from(count).map_err(|_| DbErr::Type(format!("negative row count {count}")))
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>, DbErr> {
        let backend = self.get_database_backend();
        let statement = Statement::from_string(backend, sql.to_owned());
        let rows = JsonValue::find_by_statement(statement).all(self).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match row {
                JsonValue::Object(map) => Some(map),
                _ => None,
            })
            .collect())
    }

    fn escape(&self, value: &str) -> String {
        quote_literal(self.get_database_backend(), value)
    }

    fn quote_identifier(&self, name: &str) -> String {
        match self.get_database_backend() {
            DatabaseBackend::MySql => quote_identifier_with(name, '`'),
            _ => quote_identifier_with(name, '"'),
        }
    }

    fn like_operand(&self, column_sql: String) -> String {
        postgres_text_cast(self.get_database_backend(), column_sql)
    }
}

/// Postgres has no implicit cast to text for `LIKE`.
fn postgres_text_cast(backend: DatabaseBackend, column_sql: String) -> String {
    match backend {
        DatabaseBackend::Postgres => format!("{column_sql}::text"),
        _ => column_sql,
    }
}

#[async_trait]
impl<T: DatabaseInterface + ?Sized> DatabaseInterface for &T {
    async fn count(&self, sql: &str) -> Result<u64, DbErr> {
        (**self).count(sql).await
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>, DbErr> {
        (**self).query(sql).await
    }

    fn escape(&self, value: &str) -> String {
        (**self).escape(value)
    }

    fn quote_identifier(&self, name: &str) -> String {
        (**self).quote_identifier(name)
    }

    fn column_reference(&self, column: &Column) -> String {
        (**self).column_reference(column)
    }

    fn like_operand(&self, column_sql: String) -> String {
        (**self).like_operand(column_sql)
    }
}

#[cfg(test)]
pub(crate) mod mock;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_sql() {
        assert_eq!(
            count_sql("SELECT id FROM t"),
            "SELECT COUNT(*) AS rowcount FROM (SELECT id FROM t) dt_count"
        );
    }

    #[test]
    fn test_quote_literal_doubles_quotes() {
        assert_eq!(quote_literal(DatabaseBackend::Sqlite, "o'neil"), "'o''neil'");
        assert_eq!(
            quote_literal(DatabaseBackend::Postgres, "'; DROP TABLE users; --"),
            "'''; DROP TABLE users; --'"
        );
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier_with("group", '"'), "\"group\"");
        assert_eq!(quote_identifier_with("price * qty", '"'), "\"price * qty\"");
        assert_eq!(quote_identifier_with("2nd", '`'), "`2nd`");
        assert_eq!(quote_identifier_with("a`b", '`'), "`a``b`");
    }

    #[test]
    fn test_plain_identifier() {
        assert!(is_plain_identifier("name"));
        assert!(is_plain_identifier("_id2"));
        assert!(!is_plain_identifier("2nd"));
        assert!(!is_plain_identifier("price * qty"));
        assert!(!is_plain_identifier(""));
    }

    #[test]
    fn test_column_reference_keeps_base_quoting() {
        let db = mock::MockDatabase::default();
        assert_eq!(db.column_reference(&Column::new("name")), "name");
        assert_eq!(db.column_reference(&Column::new("price * qty")), "\"price * qty\"");
        let quoted = Column {
            quoted: true,
            ..Column::new("group")
        };
        assert_eq!(db.column_reference(&quoted), "\"group\"");
    }

    #[test]
    fn test_postgres_casts_like_operand() {
        assert_eq!(
            postgres_text_cast(DatabaseBackend::Postgres, "id".to_string()),
            "id::text"
        );
        assert_eq!(postgres_text_cast(DatabaseBackend::Sqlite, "id".to_string()), "id");
        assert_eq!(postgres_text_cast(DatabaseBackend::MySql, "id".to_string()), "id");
    }

    #[test]
    fn test_quote_literal_mysql_backslash() {
        assert_eq!(quote_literal(DatabaseBackend::MySql, r"a\'b"), r"'a\\''b'");
        assert_eq!(quote_literal(DatabaseBackend::Sqlite, r"a\b"), r"'a\b'");
    }
}
