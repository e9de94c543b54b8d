use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap, ser::SerializeSeq};
use serde_json::Value;
use serde_with::{DefaultOnError, serde_as};
use utoipa::ToSchema;

use crate::lenient;

/// One database row, addressable by column name.
pub type Row = serde_json::Map<String, Value>;

/// `search` block of a request, both global and per column.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchParams {
    #[serde(deserialize_with = "lenient::option_string")]
    pub value: Option<String>,
}

/// One `columns[i]` entry as sent by the client.
#[serde_as]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColumnParams {
    /// Data source of the column on the client: a numeric position or a property name.
    #[serde(deserialize_with = "lenient::option_string")]
    pub data: Option<String>,
    #[serde(deserialize_with = "lenient::option_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub searchable: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub orderable: bool,
    #[serde_as(as = "DefaultOnError")]
    pub search: SearchParams,
}

impl Default for ColumnParams {
    fn default() -> Self {
        Self {
            data: None,
            name: None,
            searchable: true,
            orderable: true,
            search: SearchParams::default(),
        }
    }
}

/// One `order[k]` entry: a column index and a direction.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OrderParams {
    /// `None` when the client sent something that is not an integer.
    #[serde(deserialize_with = "lenient::option_index")]
    pub column: Option<i64>,
    #[serde(deserialize_with = "lenient::string")]
    pub dir: String,
}

/// The request fields the pipeline reads.
///
/// Deserializes from a JSON body directly, or from the widget's bracket-notation
/// query string through [`RequestParams::from_pairs`]. Numeric fields never fail:
/// values that are not numbers coerce to `0`, and nested blocks of the wrong
/// shape fall back to their defaults.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RequestParams {
    /// Request sequence token; its absence disables pagination.
    #[serde(deserialize_with = "lenient::option_int")]
    pub draw: Option<i64>,
    #[serde(deserialize_with = "lenient::int")]
    pub start: i64,
    /// Page size; `-1` requests every row. `None` falls back to the configured default.
    #[serde(deserialize_with = "lenient::option_int")]
    pub length: Option<i64>,
    #[serde_as(as = "DefaultOnError")]
    pub search: SearchParams,
    #[serde_as(as = "DefaultOnError")]
    pub columns: Vec<ColumnParams>,
    #[serde_as(as = "DefaultOnError")]
    pub order: Vec<OrderParams>,
}

impl RequestParams {
    /// Global search text, if any was sent.
    #[must_use]
    pub fn search_value(&self) -> Option<&str> {
        self.search.value.as_deref()
    }
}

/// One value in a formatted row, tagged with how it is keyed.
#[derive(Debug, Clone, PartialEq)]
pub enum RowEntry {
    Positional(Value),
    Named(String, Value),
}

/// An output row mixing positional and named values.
///
/// Serializes as a JSON array when every entry is positional. As soon as one entry
/// is named the row becomes a JSON object, and positional entries take the keys
/// `"0"`, `"1"`, ... in the order they were appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormattedRow {
    entries: Vec<RowEntry>,
}

impl FormattedRow {
    pub fn push(&mut self, value: Value) {
        self.entries.push(RowEntry::Positional(value));
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(RowEntry::Named(_, existing)) = self
            .entries
            .iter_mut()
            .find(|entry| matches!(entry, RowEntry::Named(n, _) if *n == name))
        {
            *existing = value;
        } else {
            self.entries.push(RowEntry::Named(name, value));
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[RowEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the row serializes as an array.
    #[must_use]
    pub fn is_positional(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| matches!(entry, RowEntry::Positional(_)))
    }

    /// Value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find_map(|entry| match entry {
            RowEntry::Named(n, value) if n == name => Some(value),
            _ => None,
        })
    }

    /// The `index`-th positional value.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                RowEntry::Positional(value) => Some(value),
                RowEntry::Named(..) => None,
            })
            .nth(index)
    }
}

impl Serialize for FormattedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_positional() {
            let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
            for entry in &self.entries {
                if let RowEntry::Positional(value) = entry {
                    seq.serialize_element(value)?;
                }
            }
            return seq.end();
        }

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        let mut position = 0usize;
        for entry in &self.entries {
            match entry {
                RowEntry::Positional(value) => {
                    map.serialize_entry(&position.to_string(), value)?;
                    position += 1;
                }
                RowEntry::Named(name, value) => map.serialize_entry(name, value)?,
            }
        }
        map.end()
    }
}

/// The response envelope expected by the client-side table widget.
///
/// Key names and integer types are a compatibility contract:
/// `{"draw", "recordsTotal", "recordsFiltered", "data"}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataTablesResponse {
    /// Echo of the request's draw token (0 when absent).
    pub draw: i64,
    /// Row count of the unfiltered base query.
    pub records_total: u64,
    /// Row count after search filters.
    pub records_filtered: u64,
    /// The requested page of formatted rows.
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<FormattedRow>,
}
