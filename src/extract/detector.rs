use crate::extract::is_truthy;
use serde_json::Value;
use std::collections::HashSet;

const ID_FIELDS: &[&str] = &["id", "pk", "code"];
const TIMESTAMP_FIELDS: &[&str] = &["taken_at", "timestamp", "created_at"];

/// Whether `value` looks like a post: an object with an id-like field and some content signal
pub fn is_post(value: &Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };

    let has_id = ID_FIELDS.iter().any(|key| map.get(*key).is_some_and(is_truthy));
    if !has_id {
        return false;
    }

    let has_text = map.get("text").and_then(Value::as_str).is_some_and(|s| !s.is_empty());
    let has_caption = map.get("caption").and_then(Value::as_object).is_some_and(|c| c.contains_key("text"));
    let has_timestamp = TIMESTAMP_FIELDS.iter().any(|key| map.get(*key).is_some_and(|v| !v.is_null()));

    has_text || has_caption || has_timestamp
}

/// Collect every post-like sub-object of `value`, in walk order.
///
/// When a node wraps a post under `post`, the wrapped value is recorded instead of
/// the node and is not visited again as an ordinary child.
pub fn find_post_like_objects(value: &Value) -> Vec<&Value> {
    let mut walker = Walker { visited: HashSet::new(), found: Vec::new() };
    walker.walk(value);
    walker.found
}

struct Walker<'a> {
    /// Node addresses already seen during this walk
    visited: HashSet<*const Value>,
    found: Vec<&'a Value>,
}

impl<'a> Walker<'a> {
    fn walk(&mut self, node: &'a Value) {
        if !self.visited.insert(node as *const Value) {
            return;
        }

        match node {
            Value::Object(map) => {
                match map.get("post").filter(|p| is_post(p)) {
                    Some(post) => {
                        self.visited.insert(post as *const Value);
                        self.found.push(post);
                    }
                    None if is_post(node) => self.found.push(node),
                    None => {}
                }

                for child in map.values() {
                    self.walk(child);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.walk(item);
                }
            }
            _ => {}
        }
    }
}
