use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::models::{ColumnParams, Row};

/// Per-column output transformation, called as `formatter(row, column_name)`.
pub type Formatter = Arc<dyn Fn(&Row, &str) -> Value + Send + Sync>;

/// Where a column's value lands in a formatted output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayKey {
    /// Appended positionally (the client renders rows as arrays).
    Index,
    /// Stored under the column name (the client renders rows as objects).
    #[default]
    Name,
}

impl DisplayKey {
    /// Classify the client's `columns[i][data]` attribute.
    #[must_use]
    pub fn from_data_attr(data: Option<&str>) -> Self {
        match data {
            Some(data) if is_numeric(data) => Self::Index,
            _ => Self::Name,
        }
    }
}

fn is_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Reads `row[name]`, or `null` when the row has no such field.
///
/// Falls back to a case-insensitive key match, since some backends fold the case
/// of unquoted names in the rows they return.
#[must_use]
pub fn identity_formatter() -> Formatter {
    Arc::new(|row: &Row, name: &str| {
        row.get(name)
            .or_else(|| {
                row.iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .cloned()
            .unwrap_or(Value::Null)
    })
}

/// One output column of the table.
#[derive(Clone)]
pub struct Column {
    pub name: String,
    /// The base query quotes this name, so generated SQL quotes it too.
    pub quoted: bool,
    pub display_key: DisplayKey,
    pub searchable: bool,
    pub orderable: bool,
    pub visible: bool,
    pub(crate) formatter: Formatter,
    pub(crate) search_value: Option<String>,
}

impl Column {
    /// A column selected by the base query.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoted: false,
            display_key: DisplayKey::default(),
            searchable: true,
            orderable: true,
            visible: true,
            formatter: identity_formatter(),
            search_value: None,
        }
    }

    /// An output-only column whose value is synthesized by `formatter`.
    ///
    /// It does not exist in the database rows, so it takes no part in search or order.
    #[must_use]
    pub fn derived(name: impl Into<String>, formatter: Formatter) -> Self {
        Self {
            searchable: false,
            orderable: false,
            formatter,
            ..Self::new(name)
        }
    }

    pub fn set_formatter(&mut self, formatter: Formatter) {
        self.formatter = formatter;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    #[must_use]
    pub fn format(&self, row: &Row) -> Value {
        (self.formatter)(row, &self.name)
    }

    /// Per-column search text for the current request, if any.
    #[must_use]
    pub fn search_value(&self) -> Option<&str> {
        self.search_value.as_deref()
    }

    #[must_use]
    pub fn has_search_value(&self) -> bool {
        self.search_value.as_deref().is_some_and(|v| !v.is_empty())
    }

    /// Bind the request's attributes for this column.
    ///
    /// The client may narrow searchability/orderability but never widen it.
    pub(crate) fn attach(&mut self, params: &ColumnParams) {
        self.display_key = DisplayKey::from_data_attr(params.data.as_deref());
        self.searchable &= params.searchable;
        self.orderable &= params.orderable;
        self.search_value = params
            .search
            .value
            .as_ref()
            .filter(|value| !value.is_empty())
            .cloned();
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("quoted", &self.quoted)
            .field("display_key", &self.display_key)
            .field("searchable", &self.searchable)
            .field("orderable", &self.orderable)
            .field("visible", &self.visible)
            .field("search_value", &self.search_value)
            .finish_non_exhaustive()
    }
}
