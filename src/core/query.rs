use crate::errors::DataTablesError;

/// Alias of the derived table that wraps the caller's base query.
pub const BASE_ALIAS: &str = "dt_base";

/// One output column of the base query's select list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectColumn {
    pub name: String,
    /// The name was written as a quoted identifier, so generated SQL must quote it too.
    pub quoted: bool,
}

impl SelectColumn {
    fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoted: false,
        }
    }

    /// From an identifier token, stripping and remembering its quotes.
    fn identifier(token: &str) -> Self {
        let token = token.trim();
        let name = unquote(token);
        if name.len() == token.len() {
            return Self::bare(name);
        }
        let name = match token.chars().next() {
            Some(quote @ ('"' | '`')) => name.replace(&format!("{quote}{quote}"), &quote.to_string()),
            _ => name.to_string(),
        };
        Self { name, quoted: true }
    }
}

/// The caller's base query and the SQL assembled from it for one invocation.
///
/// Filters, ordering and limits reference the output column names of the base
/// query, so they are applied to `SELECT * FROM (<base>) dt_base` rather than
/// spliced into the caller's text.
#[derive(Debug, Clone)]
pub struct QueryModel {
    base: String,
    source: String,
    full: String,
    has_default_order: bool,
}

impl QueryModel {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        let base = base.trim().trim_end_matches(';').trim_end().to_string();
        let source = format!("SELECT * FROM ({base}) {BASE_ALIAS}");
        let has_default_order = contains_order_by(&base);

        Self {
            full: source.clone(),
            base,
            source,
            has_default_order,
        }
    }

    /// The caller-supplied SQL, as given (minus a trailing `;`).
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The unfiltered row source that clauses are appended to.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The SQL of the last execution.
    #[must_use]
    pub fn full(&self) -> &str {
        &self.full
    }

    /// Whether the base query already orders its rows.
    #[must_use]
    pub const fn has_default_order(&self) -> bool {
        self.has_default_order
    }

    /// Row source restricted by a (possibly empty) WHERE fragment.
    #[must_use]
    pub fn filtered(&self, where_clause: &str) -> String {
        format!("{}{where_clause}", self.source)
    }

    pub(crate) fn assemble(&mut self, where_clause: &str, order_clause: &str, limit_clause: &str) {
        self.full = format!("{}{where_clause}{order_clause}{limit_clause}", self.source);
    }

    /// Output column names of the base query's select list, in order.
    ///
    /// # Errors
    ///
    /// As for [`select_columns`](Self::select_columns).
    pub fn column_names(&self) -> Result<Vec<String>, DataTablesError> {
        Ok(self
            .select_columns()?
            .into_iter()
            .map(|column| column.name)
            .collect())
    }

    /// Output columns of the base query's select list, in order.
    ///
    /// # Errors
    ///
    /// `UnsupportedSelect` when the query is not a `SELECT`, selects `*`, or has an
    /// empty select item.
    pub fn select_columns(&self) -> Result<Vec<SelectColumn>, DataTablesError> {
        let sql = self.base.as_str();
        if keyword_at(sql, 0, "select").is_none() {
            return Err(DataTablesError::UnsupportedSelect(
                "base query must start with SELECT".to_string(),
            ));
        }

        let after_select = &sql["select".len()..];
        let list_end = find_keyword(after_select, "from").unwrap_or(after_select.len());
        let mut list = after_select[..list_end].trim();
        for modifier in ["distinct", "all"] {
            if let Some(end) = keyword_at(list, 0, modifier) {
                list = list[end..].trim_start();
                break;
            }
        }

        split_top_level(list, ',')
            .into_iter()
            .map(select_item)
            .collect()
    }
}

/// Textual `ORDER BY` check, any case and any whitespace between the words.
fn contains_order_by(sql: &str) -> bool {
    let lowered = sql.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    words.windows(2).any(|pair| pair[0] == "order" && pair[1] == "by")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// If `keyword` (ASCII, case-insensitive) starts at byte `at` as a whole word,
/// returns the byte index just past it.
fn keyword_at(sql: &str, at: usize, keyword: &str) -> Option<usize> {
    let end = at + keyword.len();
    let candidate = sql.get(at..end)?;
    if !candidate.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let before_ok = sql[..at].chars().next_back().is_none_or(|c| !is_word_char(c));
    let after_ok = sql[end..].chars().next().is_none_or(|c| !is_word_char(c));
    (before_ok && after_ok).then_some(end)
}

/// Walks `sql` calling `visit(byte_index, char)` for every character that sits
/// outside quotes and parentheses. Returning `true` stops the walk.
fn walk_top_level(sql: &str, mut visit: impl FnMut(usize, char) -> bool) {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in sql.char_indices() {
        if let Some(open) = quote {
            if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '[' => quote = Some(']'),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => {
                if visit(i, c) {
                    return;
                }
            }
            _ => {}
        }
    }
}

/// Byte index of the first top-level occurrence of `keyword`.
fn find_keyword(sql: &str, keyword: &str) -> Option<usize> {
    let mut found = None;
    walk_top_level(sql, |i, _| {
        if keyword_at(sql, i, keyword).is_some() {
            found = Some(i);
            return true;
        }
        false
    });
    found
}

/// Byte index of the last top-level occurrence of `keyword`.
fn rfind_keyword(sql: &str, keyword: &str) -> Option<usize> {
    let mut found = None;
    walk_top_level(sql, |i, _| {
        if keyword_at(sql, i, keyword).is_some() {
            found = Some(i);
        }
        false
    });
    found
}

fn split_top_level(sql: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    walk_top_level(sql, |i, c| {
        if c == separator {
            parts.push(&sql[start..i]);
            start = i + c.len_utf8();
        }
        false
    });
    parts.push(&sql[start..]);
    parts
}

fn split_top_level_whitespace(sql: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    walk_top_level(sql, |i, c| {
        if c.is_whitespace() {
            tokens.push(&sql[start..i]);
            start = i + c.len_utf8();
        }
        false
    });
    tokens.push(&sql[start..]);
    tokens.retain(|token| !token.is_empty());
    tokens
}

fn unquote(identifier: &str) -> &str {
    let identifier = identifier.trim();
    for (open, close) in [('"', '"'), ('`', '`'), ('[', ']')] {
        if identifier.len() >= 2 && identifier.starts_with(open) && identifier.ends_with(close) {
            return &identifier[1..identifier.len() - 1];
        }
    }
    identifier
}

fn is_identifier(token: &str) -> bool {
    let bare = unquote(token);
    if bare.len() != token.len() {
        return !bare.is_empty();
    }
    !token.is_empty()
        && !token.starts_with(|c: char| c.is_ascii_digit())
        && token.chars().all(is_word_char)
}

fn is_identifier_chain(expression: &str) -> bool {
    split_top_level(expression, '.').into_iter().all(is_identifier)
}

const NON_ALIAS_KEYWORDS: &[&str] = &["end", "null", "true", "false"];

fn select_item(item: &str) -> Result<SelectColumn, DataTablesError> {
    let item = item.trim();
    if item.is_empty() {
        return Err(DataTablesError::UnsupportedSelect(
            "empty select item".to_string(),
        ));
    }
    if item == "*" || item.ends_with(".*") {
        return Err(DataTablesError::UnsupportedSelect(format!(
            "cannot derive column names from `{item}`"
        )));
    }

    if let Some(at) = rfind_keyword(item, "as") {
        let alias = item[at + 2..].trim();
        if is_identifier(alias) {
            return Ok(SelectColumn::identifier(alias));
        }
    }

    let tokens = split_top_level_whitespace(item);
    if let [.., previous, last] = tokens.as_slice() {
        let ends_with_operator = previous.ends_with(|c: char| "+-*/%|=<>!&^~".contains(c));
        let is_keyword = NON_ALIAS_KEYWORDS
            .iter()
            .any(|keyword| last.eq_ignore_ascii_case(keyword));
        if is_identifier(last) && !ends_with_operator && !is_keyword {
            return Ok(SelectColumn::identifier(last));
        }
    }

    if is_identifier_chain(item) {
        let segments = split_top_level(item, '.');
        let last = segments.last().copied().unwrap_or(item);
        return Ok(SelectColumn::identifier(last));
    }

    Ok(SelectColumn::bare(item))
}
