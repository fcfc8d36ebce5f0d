//! `{dotted.path}` template rendering
//!
//! A placeholder is `{` + key + `}` where the key is either all digits or
//! starts with an ASCII letter, `_` or `$` and continues with word characters,
//! `-`, `$` and `.` separators. Keys are resolved against a JSON value; a key
//! that does not resolve leaves the placeholder text untouched, or is replaced
//! by the configured substitute. Rendering never fails.

use serde_json::Value;

/// Render `template` against `data`
///
/// # Examples
///
/// ```
/// use transport_logger::core::template::render;
/// use serde_json::json;
///
/// assert_eq!(render("Hello {world} !", &json!({"world": "World"}), None), "Hello World !");
/// assert_eq!(
///     render("Hello {world.planet} !", &json!({"planet": "World"}), None),
///     "Hello {world.planet} !"
/// );
/// ```
pub fn render(template: &str, data: &Value, placeholder: Option<&str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let key_len = after.find(|c: char| !is_key_char(c)).unwrap_or(after.len());
        let key = &after[..key_len];

        if after[key_len..].starts_with('}') && is_valid_key(key) {
            match lookup(data, key) {
                Some(value) => out.push_str(&stringify(value)),
                None => match placeholder {
                    Some(substitute) => out.push_str(substitute),
                    None => out.push_str(&rest[open..open + key_len + 2]),
                },
            }
            rest = &after[key_len + 1..];
        } else {
            out.push('{');
            rest = after;
        }
    }

    out.push_str(rest);
    out
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '$' | '.')
}

fn is_valid_key(key: &str) -> bool {
    match key.chars().next() {
        None => false,
        Some(first) if first.is_ascii_digit() => key.chars().all(|c| c.is_ascii_digit()),
        Some(first) => first.is_ascii_alphabetic() || first == '_' || first == '$',
    }
}

fn lookup<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in key.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_substitution() {
        assert_eq!(
            render("Hello {world} !", &json!({"world": "World"}), None),
            "Hello World !"
        );
    }

    #[test]
    fn test_missing_key_left_verbatim() {
        assert_eq!(render("Hello {world} !", &json!({}), None), "Hello {world} !");
        assert_eq!(
            render("Hello {world.planet} !", &json!({"planet": "World"}), None),
            "Hello {world.planet} !"
        );
    }

    #[test]
    fn test_nested_paths() {
        let data = json!({"a": {"huge": {"hello": "Hello"}, "big": {"world": "World"}}});
        assert_eq!(
            render("{a.huge.hello} {a.big.world} !", &data, None),
            "Hello World !"
        );
    }

    #[test]
    fn test_configured_placeholder() {
        assert_eq!(render("[{missing}]", &json!({}), Some("-")), "[-]");
    }

    #[test]
    fn test_numeric_keys_index_arrays() {
        let data = json!({"items": ["zero", "one"]});
        assert_eq!(render("{items.1}", &data, None), "one");
        assert_eq!(render("{0}", &json!(["first"]), None), "first");
    }

    #[test]
    fn test_non_string_values() {
        let data = json!({"n": 3, "b": false, "z": null, "o": {"k": 1}});
        assert_eq!(render("{n} {b} {z} {o}", &data, None), r#"3 false null {"k":1}"#);
    }

    #[test]
    fn test_invalid_keys_are_not_placeholders() {
        let data = json!({"a": "x"});
        assert_eq!(render("{ a }", &data, Some("?")), "{ a }");
        assert_eq!(render("{1a}", &data, Some("?")), "{1a}");
        assert_eq!(render("{}", &data, Some("?")), "{}");
        assert_eq!(render("{{a}}", &data, None), "{x}");
        assert_eq!(render("unclosed {a", &data, None), "unclosed {a");
    }

    #[test]
    fn test_tabs_and_unicode_survive() {
        let data = json!({"level": {"name": "info"}});
        assert_eq!(render("é\t<{level.name}>", &data, None), "é\t<info>");
    }
}
