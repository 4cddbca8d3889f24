//! Change summaries for update entries

use serde::Serialize;
use serde_json::Value;

/// Fields that change on every write and carry no information
const IGNORED_FIELDS: [&str; 1] = ["updated_at"];

/// Describe top-level field changes between two states of a record,
/// e.g. `total_limit: 30000 -> 45000`. `None` when nothing changed.
pub fn summarize_changes<T: Serialize>(before: &T, after: &T) -> Option<String> {
    let before = serde_json::to_value(before).ok()?;
    let after = serde_json::to_value(after).ok()?;

    let (Value::Object(before), Value::Object(after)) = (&before, &after) else {
        return (before != after).then(|| format!("{} -> {}", render(&before), render(&after)));
    };

    let mut changes = Vec::new();
    for (key, old) in before {
        if IGNORED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        match after.get(key) {
            Some(new) if new != old => {
                changes.push(format!("{}: {} -> {}", key, render(old), render(new)))
            }
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (removed)", key, render(old))),
        }
    }
    for (key, new) in after {
        if !before.contains_key(key) {
            changes.push(format!("{}: (added) -> {}", key, render(new)));
        }
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_field_only() {
        let before = json!({"name": "Food", "budget_limit": 30000});
        let after = json!({"name": "Food", "budget_limit": 45000});

        let summary = summarize_changes(&before, &after).unwrap();
        assert_eq!(summary, "budget_limit: 30000 -> 45000");
    }

    #[test]
    fn test_updated_at_is_ignored() {
        let before = json!({"name": "Food", "updated_at": "2024-03-01T00:00:00Z"});
        let after = json!({"name": "Food", "updated_at": "2024-03-02T00:00:00Z"});
        assert_eq!(summarize_changes(&before, &after), None);
    }

    #[test]
    fn test_arrays_are_counted() {
        let before = json!({"categories": [1, 2]});
        let after = json!({"categories": [1, 2, 3]});
        let summary = summarize_changes(&before, &after).unwrap();
        assert_eq!(summary, "categories: [2 items] -> [3 items]");
    }

    #[test]
    fn test_added_and_removed_fields() {
        let before = json!({"notes": "x"});
        let after = json!({"icon": "cart"});
        let summary = summarize_changes(&before, &after).unwrap();
        assert!(summary.contains("notes: \"x\" -> (removed)"));
        assert!(summary.contains("icon: (added) -> \"cart\""));
    }
}
