use crate::models::RequestParams;

/// `length` value asking for every row.
pub const UNLIMITED: i64 = -1;

/// Resolve `(limit, offset)` for the request, or `None` when the whole filtered
/// set is wanted (`length == -1`, or a missing or zero draw token).
///
/// A missing or zero `length` means `default_length`. Negative offsets clamp to 0,
/// as do negative lengths other than `-1`.
#[must_use]
pub fn resolve_page(params: &RequestParams, default_length: i64) -> Option<(i64, i64)> {
    let length = params
        .length
        .filter(|&length| length != 0)
        .unwrap_or(default_length);
    if length == UNLIMITED || params.draw.is_none_or(|draw| draw == 0) {
        return None;
    }
    Some((length.max(0), params.start.max(0)))
}

/// ` LIMIT <length> OFFSET <start>`, or an empty string when not paginating.
#[must_use]
pub fn build_limit_clause(params: &RequestParams, default_length: i64) -> String {
    resolve_page(params, default_length)
        .map(|(limit, offset)| format!(" LIMIT {limit} OFFSET {offset}"))
        .unwrap_or_default()
}
