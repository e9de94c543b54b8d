//! Recording in-memory database for unit tests.

use async_trait::async_trait;
use sea_orm::DbErr;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{DatabaseInterface, quote_literal};
use crate::models::Row;

/// Answers counts in the order they were queued, returns canned rows, and
/// remembers every statement it was asked to run.
#[derive(Default)]
pub(crate) struct MockDatabase {
    counts: Mutex<VecDeque<u64>>,
    rows: Vec<Row>,
    fail_on_query: bool,
    fail_on_count: bool,
    statements: Mutex<Vec<String>>,
}

impl MockDatabase {
    pub(crate) fn new(total: u64, filtered: u64, rows: Vec<Row>) -> Self {
        Self {
            counts: Mutex::new(VecDeque::from([total, filtered])),
            rows,
            ..Self::default()
        }
    }

    pub(crate) fn failing_query() -> Self {
        Self {
            fail_on_query: true,
            ..Self::new(1, 1, Vec::new())
        }
    }

    pub(crate) fn failing_count() -> Self {
        Self {
            fail_on_count: true,
            ..Self::default()
        }
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    fn record(&self, sql: &str) {
        self.statements.lock().unwrap().push(sql.to_string());
    }
}

#[async_trait]
impl DatabaseInterface for MockDatabase {
    async fn count(&self, sql: &str) -> Result<u64, DbErr> {
        self.record(sql);
        if self.fail_on_count {
            return Err(DbErr::Custom("count failed".to_string()));
        }
        Ok(self.counts.lock().unwrap().pop_front().unwrap_or(0))
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>, DbErr> {
        self.record(sql);
        if self.fail_on_query {
            return Err(DbErr::Custom("query failed".to_string()));
        }
        Ok(self.rows.clone())
    }

    fn escape(&self, value: &str) -> String {
        quote_literal(sea_orm::DatabaseBackend::Sqlite, value)
    }
}
