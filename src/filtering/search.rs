use crate::core::ColumnCollection;
use crate::database::DatabaseInterface;

/// Split free text into search words.
///
/// Runs of non-word characters (anything but Unicode letters, digits and `_`)
/// act as a single separator; empty words are dropped.
#[must_use]
pub fn search_words(input: &str) -> Vec<&str> {
    input
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .collect()
}

/// Escape character declared with `ESCAPE` on every global search `LIKE`.
const LIKE_ESCAPE: &str = "\\";

/// Make `%`, `_` and the escape character itself match literally.
fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Cut `input` to at most `max_chars` characters.
fn truncate_chars(input: &str, max_chars: usize) -> &str {
    input
        .char_indices()
        .nth(max_chars)
        .map_or(input, |(end, _)| &input[..end])
}

/// Global search clause: every word must match at least one searchable column.
///
/// `(a LIKE '%w1%' ESCAPE '\' OR b LIKE '%w1%' ESCAPE '\') AND (...)`
///
/// Words are matched literally: LIKE wildcards inside them are escaped.
///
/// Returns `None` when there is no search text, no words in it, or no searchable
/// column to look in.
#[must_use]
pub fn build_global_condition<D: DatabaseInterface + ?Sized>(
    search: Option<&str>,
    columns: &ColumnCollection,
    db: &D,
    max_search_length: usize,
) -> Option<String> {
    let search = truncate_chars(search?, max_search_length);
    let words = search_words(search);
    if words.is_empty() {
        return None;
    }

    let operands: Vec<String> = columns
        .searchable()
        .map(|column| db.like_operand(db.column_reference(column)))
        .collect();
    if operands.is_empty() {
        return None;
    }

    let escape = db.escape(LIKE_ESCAPE);
    let groups: Vec<String> = words
        .iter()
        .map(|word| {
            let pattern = db.escape(&format!("%{}%", escape_like_wildcards(word)));
            let look: Vec<String> = operands
                .iter()
                .map(|operand| format!("{operand} LIKE {pattern} ESCAPE {escape}"))
                .collect();
            format!("({})", look.join(" OR "))
        })
        .collect();

    Some(groups.join(" AND "))
}

/// Per-column search clause: each searchable column with a value must match it.
///
/// The value is used as the LIKE pattern as sent, so clients control wildcards.
#[must_use]
pub fn build_individual_condition<D: DatabaseInterface + ?Sized>(
    columns: &ColumnCollection,
    db: &D,
) -> Option<String> {
    let look: Vec<String> = columns
        .searchable_with_value()
        .filter_map(|column| {
            let value = column.search_value()?;
            Some(format!(
                "{} LIKE {}",
                db.like_operand(db.column_reference(column)),
                db.escape(value)
            ))
        })
        .collect();

    if look.is_empty() {
        return None;
    }
    Some(format!("({})", look.join(" AND ")))
}

/// ` WHERE <global> AND <individual>`, or an empty string when neither applies.
#[must_use]
pub fn build_where_clause(global: Option<String>, individual: Option<String>) -> String {
    let parts: Vec<String> = [global, individual].into_iter().flatten().collect();
    if parts.is_empty() {
        return String::new();
    }
    format!(" WHERE {}", parts.join(" AND "))
}
