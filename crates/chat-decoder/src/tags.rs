//! IRC message tag decoding.

use std::collections::HashMap;

/// Decode a `key=value;key=value` tag blob into a map.
///
/// The input is the substring between the leading `@` and the first space
/// of a tagged line. A segment without `=` keeps its key with an empty
/// value; duplicate keys keep the last occurrence. Tag names are not
/// validated, so unknown keys pass through untouched.
pub fn decode_tags(raw: &str) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    for segment in raw.split(';') {
        if segment.is_empty() {
            continue;
        }
        match segment.split_once('=') {
            Some((key, value)) => tags.insert(key.to_string(), value.to_string()),
            None => tags.insert(segment.to_string(), String::new()),
        };
    }
    tags
}
