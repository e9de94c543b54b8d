//! Decoding of the widget's flat bracket-notation parameters.
//!
//! The client sends nested structures as form keys such as
//! `columns[0][search][value]=jo` or `order[0][dir]=asc`. These are folded into a
//! JSON tree (objects keyed only by integers become arrays) and then deserialized
//! into [`RequestParams`] like any JSON body.

use serde_json::{Map, Value};

use crate::models::RequestParams;

/// List positions above this are dropped, so a hostile index cannot allocate
/// an enormous vector.
const MAX_LIST_INDEX: usize = 1_000;

impl RequestParams {
    /// Build request parameters from decoded query-string or form pairs.
    ///
    /// ```
    /// use datatables::RequestParams;
    ///
    /// let params = RequestParams::from_pairs([
    ///     ("draw", "2"),
    ///     ("columns[1][search][value]", "jo"),
    ///     ("order[0][column]", "1"),
    ///     ("order[0][dir]", "asc"),
    /// ])
    /// .unwrap();
    /// assert_eq!(params.draw, Some(2));
    /// assert_eq!(params.columns[1].search.value.as_deref(), Some("jo"));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` only if the folded tree cannot be read as a
    /// request at all. Malformed fields coerce or fall back to their defaults.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, serde_json::Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut root = Map::new();
        for (key, value) in pairs {
            let segments = key_segments(key.as_ref());
            insert_path(&mut root, &segments, value.into());
        }
        serde_json::from_value(numeric_objects_to_arrays(Value::Object(root)))
    }
}

/// `a[b][c]` -> `["a", "b", "c"]`. Text after an unclosed bracket is ignored.
fn key_segments(key: &str) -> Vec<&str> {
    let Some(open) = key.find('[') else {
        return vec![key];
    };

    let mut segments = vec![&key[..open]];
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else { break };
        segments.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    segments
}

fn insert_path(target: &mut Map<String, Value>, segments: &[&str], value: String) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        target.insert((*first).to_string(), Value::String(value));
        return;
    }

    let entry = target
        .entry((*first).to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(child) = entry {
        insert_path(child, rest, value);
    }
}

fn numeric_objects_to_arrays(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };

    let is_list = !map.is_empty() && map.keys().all(|key| key.parse::<usize>().is_ok());
    if !is_list {
        return Value::Object(
            map.into_iter()
                .map(|(key, child)| (key, numeric_objects_to_arrays(child)))
                .collect(),
        );
    }

    let mut indexed: Vec<(usize, Value)> = map
        .into_iter()
        .filter_map(|(key, child)| {
            let index = key.parse::<usize>().ok()?;
            (index <= MAX_LIST_INDEX).then(|| (index, numeric_objects_to_arrays(child)))
        })
        .collect();
    indexed.sort_by_key(|(index, _)| *index);

    let len = indexed.last().map_or(0, |(index, _)| index + 1);
    let mut list = vec![Value::Object(Map::new()); len];
    for (index, child) in indexed {
        list[index] = child;
    }
    Value::Array(list)
}
