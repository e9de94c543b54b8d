use serde::Deserialize;

use crate::filtering::sort::SortDirection;

/// Page size used when the request does not carry `length`.
pub const DEFAULT_PAGE_LENGTH: i64 = 10;

/// Global search text beyond this many characters is ignored.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 10_000;

/// Tunables for one [`DataTables`](crate::DataTables) pipeline.
///
/// Deserializable so it can sit inside an application's own settings file:
///
/// ```json
/// { "default_length": 25, "max_search_length": 256 }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataTablesConfig {
    /// Page size used when the request omits `length`.
    pub default_length: i64,
    /// Global search input is truncated to this many characters.
    pub max_search_length: usize,
    /// Direction of the fallback order on the first column.
    pub default_order_direction: SortDirection,
}

impl Default for DataTablesConfig {
    fn default() -> Self {
        Self {
            default_length: DEFAULT_PAGE_LENGTH,
            max_search_length: MAX_SEARCH_QUERY_LENGTH,
            default_order_direction: SortDirection::Asc,
        }
    }
}
