use crate::core::column::{Column, DisplayKey, Formatter};
use crate::core::query::SelectColumn;
use crate::errors::DataTablesError;
use crate::models::{ColumnParams, FormattedRow, Row};

/// Ordered registry of the table's columns.
///
/// Definition order is the base query's select-list order followed by columns
/// added with [`ColumnCollection::add`]. Positional lookups always use that order,
/// hidden columns included, because request column indices refer to it.
#[derive(Debug, Clone, Default)]
pub struct ColumnCollection {
    columns: Vec<Column>,
}

impl ColumnCollection {
    /// Build a collection from column names, rejecting duplicates.
    ///
    /// # Errors
    ///
    /// `DuplicateColumnName` if a name appears twice.
    pub fn from_names<I, S>(names: I) -> Result<Self, DataTablesError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collection = Self::default();
        for name in names {
            collection.push(Column::new(name))?;
        }
        Ok(collection)
    }

    /// Build a collection from a parsed select list, keeping each name's quoting.
    ///
    /// # Errors
    ///
    /// `DuplicateColumnName` if a name appears twice.
    pub fn from_select(select: Vec<SelectColumn>) -> Result<Self, DataTablesError> {
        let mut collection = Self::default();
        for SelectColumn { name, quoted } in select {
            collection.push(Column {
                quoted,
                ..Column::new(name)
            })?;
        }
        Ok(collection)
    }

    fn push(&mut self, column: Column) -> Result<(), DataTablesError> {
        if self.position(&column.name).is_some() {
            return Err(DataTablesError::DuplicateColumnName(column.name));
        }
        self.columns.push(column);
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    /// Register an output-only column computed by `formatter`.
    ///
    /// # Errors
    ///
    /// `DuplicateColumnName` if a column with this name already exists.
    pub fn add(&mut self, name: impl Into<String>, formatter: Formatter) -> Result<(), DataTablesError> {
        self.push(Column::derived(name, formatter))
    }

    /// Replace the formatter of an existing column, leaving its other metadata alone.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` if no column has this name.
    pub fn edit(&mut self, name: &str, formatter: Formatter) -> Result<(), DataTablesError> {
        self.get_mut(name)?.set_formatter(formatter);
        Ok(())
    }

    /// Hide every named column from the output rows.
    ///
    /// All names are resolved before any column is changed, so an unknown name
    /// leaves the collection untouched.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` for the first name that is not defined.
    pub fn hide<I, S>(&mut self, names: I) -> Result<(), DataTablesError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let positions = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                self.position(name)
                    .ok_or_else(|| DataTablesError::ColumnNotFound(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for position in positions {
            self.columns[position].hide();
        }
        Ok(())
    }

    /// # Errors
    ///
    /// `ColumnNotFound` if no column has this name.
    pub fn get(&self, name: &str) -> Result<&Column, DataTablesError> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .ok_or_else(|| DataTablesError::ColumnNotFound(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Column, DataTablesError> {
        self.columns
            .iter_mut()
            .find(|column| column.name == name)
            .ok_or_else(|| DataTablesError::ColumnNotFound(name.to_string()))
    }

    /// Positional lookup in definition order, hidden columns included.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if `index` is negative or not below the column count.
    pub fn get_by_index(&self, index: i64) -> Result<&Column, DataTablesError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.columns.get(i))
            .ok_or(DataTablesError::IndexOutOfRange {
                index,
                len: self.columns.len(),
            })
    }

    /// Columns taking part in the global search.
    pub fn searchable(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.searchable)
    }

    /// Searchable columns that carry a per-column search value for this request.
    pub fn searchable_with_value(&self) -> impl Iterator<Item = &Column> {
        self.searchable().filter(|column| column.has_search_value())
    }

    /// Columns that make up an output row, in definition order.
    pub fn visible(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.visible)
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Format one database row: every visible column, in definition order, keyed
    /// positionally or by name according to its display key.
    #[must_use]
    pub fn format_row(&self, row: &Row) -> FormattedRow {
        let mut formatted = FormattedRow::default();
        for column in self.visible() {
            let value = column.format(row);
            match column.display_key {
                DisplayKey::Index => formatted.push(value),
                DisplayKey::Name => formatted.insert(column.name.clone(), value),
            }
        }
        formatted
    }

    /// Bind the request's per-column attributes, matched by position.
    ///
    /// Columns the request does not describe keep their defaults.
    pub(crate) fn attach(&mut self, params: &[ColumnParams]) {
        for (column, column_params) in self.columns.iter_mut().zip(params) {
            column.attach(column_params);
        }
    }
}
