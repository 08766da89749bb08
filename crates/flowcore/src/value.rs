//! Helpers for the JSON values that flow between nodes.

use serde_json::{Map, Value};

/// Walk a dotted path (`"user.address.city"`, `"items.0.id"`) through a value.
///
/// Returns `None` as soon as a segment does not resolve.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Loose truthiness used when an expression yields a non-boolean result.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a value for inclusion in text. Strings are inserted raw,
/// null renders as the empty string, everything else as compact JSON.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replace every `{{ path }}` placeholder in `template` with the value found
/// at `path` inside `data`. Unresolved paths become empty strings and an
/// unterminated `{{` is left untouched.
pub fn interpolate(template: &str, data: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);
        let path = rest[start + 2..start + 2 + len].trim();
        if let Some(found) = lookup_path(data, path) {
            out.push_str(&display(found));
        }
        rest = &rest[start + 2 + len + 2..];
    }

    out.push_str(rest);
    out
}

/// Shallow merge `overlay` on top of `base`. A non-object base contributes no keys.
pub fn shallow_merge(base: &Value, overlay: &Map<String, Value>) -> Value {
    let mut merged = match base {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_walks_objects_and_arrays() {
        let data = json!({"user": {"tags": ["a", "b"], "name": "ada"}});
        assert_eq!(lookup_path(&data, "user.name"), Some(&json!("ada")));
        assert_eq!(lookup_path(&data, "user.tags.1"), Some(&json!("b")));
        assert_eq!(lookup_path(&data, "user.missing"), None);
        assert_eq!(lookup_path(&data, "user.name.first"), None);
    }

    #[test]
    fn interpolate_fills_placeholders() {
        let data = json!({"data": {"city": "Oslo", "temp": 4}});
        assert_eq!(
            interpolate("Weather in {{ data.city }}: {{data.temp}}C{{nope}}", &data),
            "Weather in Oslo: 4C"
        );
        assert_eq!(interpolate("open {{ brace", &data), "open {{ brace");
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
        assert!(is_truthy(&json!(2.5)));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn merge_overrides_and_ignores_non_objects() {
        let overlay = json!({"b": 3, "c": 4});
        let overlay = overlay.as_object().unwrap();
        assert_eq!(
            shallow_merge(&json!({"a": 1, "b": 2}), overlay),
            json!({"a": 1, "b": 3, "c": 4})
        );
        assert_eq!(shallow_merge(&Value::Null, overlay), json!({"b": 3, "c": 4}));
    }
}
