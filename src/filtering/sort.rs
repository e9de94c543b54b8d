use serde::{Deserialize, Serialize};

use crate::core::{Column, ColumnCollection};
use crate::database::DatabaseInterface;
use crate::models::OrderParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive `asc` / `desc`; anything else is rejected.
    #[must_use]
    pub fn parse(direction: &str) -> Option<Self> {
        if direction.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if direction.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Keep the request's order directives that name an orderable column with a valid
/// direction, in request order. Everything else is dropped silently.
#[must_use]
pub fn resolve_orders<'a>(
    orders: &[OrderParams],
    columns: &'a ColumnCollection,
) -> Vec<(&'a Column, SortDirection)> {
    orders
        .iter()
        .filter_map(|order| {
            let Some(direction) = SortDirection::parse(&order.dir) else {
                tracing::debug!(dir = %order.dir, "Dropping order directive with invalid direction");
                return None;
            };
            let column = match order.column.map(|index| columns.get_by_index(index)) {
                Some(Ok(column)) => column,
                Some(Err(err)) => {
                    tracing::debug!(error = %err, "Dropping order directive");
                    return None;
                }
                None => {
                    tracing::debug!("Dropping order directive without a column index");
                    return None;
                }
            };
            if !column.orderable {
                tracing::debug!(column = %column.name, "Dropping order on unorderable column");
                return None;
            }
            Some((column, direction))
        })
        .collect()
}

/// ` ORDER BY a asc, b desc` from the request's directives.
///
/// With no usable directive, the base query's own ordering is respected when it
/// has one; otherwise rows are ordered by the first defined column.
#[must_use]
pub fn build_order_clause<D: DatabaseInterface + ?Sized>(
    orders: &[OrderParams],
    columns: &ColumnCollection,
    has_default_order: bool,
    fallback_direction: SortDirection,
    db: &D,
) -> String {
    let resolved = resolve_orders(orders, columns);

    let terms: Vec<String> = if resolved.is_empty() {
        if has_default_order {
            return String::new();
        }
        let Ok(first) = columns.get_by_index(0) else {
            return String::new();
        };
        vec![format!(
            "{} {}",
            db.column_reference(first),
            fallback_direction.as_sql()
        )]
    } else {
        resolved
            .into_iter()
            .map(|(column, direction)| {
                format!("{} {}", db.column_reference(column), direction.as_sql())
            })
            .collect()
    };

    format!(" ORDER BY {}", terms.join(", "))
}
