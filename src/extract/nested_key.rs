use serde_json::Value;

/// Find every value bound to `key` anywhere in `value`.
///
/// Results come in pre-order: a matching property is recorded before its own
/// subtree is searched. Arrays are searched element by element.
pub fn find_nested_key<'a>(value: &'a Value, key: &str) -> Vec<&'a Value> {
    let mut found = Vec::new();
    search(value, key, &mut found);
    found
}

fn search<'a>(current: &'a Value, key: &str, found: &mut Vec<&'a Value>) {
    match current {
        Value::Array(items) => {
            for item in items {
                search(item, key, found);
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                if k == key {
                    found.push(v);
                }
                search(v, key, found);
            }
        }
        _ => {}
    }
}
