use serde_json::{Map, Value};

/// Flatten a JSON value into `dotted.path -> representative value`.
///
/// Objects recurse per key in document order. Arrays describe their shape
/// through the first element only, under `path[]`; an empty array is kept as
/// the value of `path[]`. Anything else lands at `prefix` itself.
pub fn flatten(value: &Value, prefix: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    flatten_into(value, prefix, &mut fields);
    fields
}

fn flatten_into(value: &Value, prefix: &str, out: &mut Map<String, Value>) {
    match value {
        Value::Object(obj) => {
            for (key, child) in obj {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(child, &path, out);
            }
        }
        Value::Array(items) => {
            let path = format!("{}[]", prefix);
            match items.first() {
                Some(first) => flatten_into(first, &path, out),
                None => {
                    out.insert(path, Value::Array(Vec::new()));
                }
            }
        }
        scalar => {
            out.insert(prefix.to_string(), scalar.clone());
        }
    }
}

/// Type label shown in the report. Booleans are checked before numbers.
/// Numbers keep their source text, so integers wider than 64 bits still
/// read as integers.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.to_string().contains(['.', 'e', 'E']) => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Null => "null",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(fields: &Map<String, Value>) -> Vec<&str> {
        fields.keys().map(String::as_str).collect()
    }

    #[test]
    fn nested_object_array_and_empty_array() {
        let fields = flatten(&json!({"a": {"b": 1}, "c": [1, 2, 3], "d": []}), "");
        assert_eq!(paths(&fields), vec!["a.b", "c[]", "d[]"]);
        assert_eq!(fields["a.b"], json!(1));
        assert_eq!(type_name(&fields["a.b"]), "integer");
        assert_eq!(fields["c[]"], json!(1));
        assert_eq!(type_name(&fields["c[]"]), "integer");
        assert_eq!(fields["d[]"], json!([]));
        assert_eq!(type_name(&fields["d[]"]), "array");
    }

    #[test]
    fn bare_scalar_lands_at_prefix() {
        let fields = flatten(&json!("ok"), "");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[""], json!("ok"));
        assert_eq!(type_name(&fields[""]), "string");

        let fields = flatten(&json!(true), "status");
        assert_eq!(fields["status"], json!(true));
    }

    #[test]
    fn array_of_objects_uses_first_element() {
        let fields = flatten(
            &json!({"items": [{"id": 1, "tags": ["x"]}, {"id": 2, "extra": true}]}),
            "",
        );
        assert_eq!(paths(&fields), vec!["items[].id", "items[].tags[]"]);
        assert_eq!(fields["items[].tags[]"], json!("x"));
    }

    #[test]
    fn top_level_array() {
        let fields = flatten(&json!([{"id": 7}]), "");
        assert_eq!(paths(&fields), vec!["[].id"]);
    }

    #[test]
    fn nested_arrays() {
        let fields = flatten(&json!({"grid": [[1.5, 2.0]]}), "");
        assert_eq!(paths(&fields), vec!["grid[][]"]);
        assert_eq!(type_name(&fields["grid[][]"]), "float");
    }

    #[test]
    fn empty_object_has_no_fields() {
        assert!(flatten(&json!({}), "").is_empty());
        assert!(flatten(&json!({"meta": {}}), "").is_empty());
    }

    #[test]
    fn preserves_document_order() {
        let value: Value =
            serde_json::from_str(r#"{"z": 1, "a": 2, "m": {"y": 3, "b": 4}}"#).unwrap();
        assert_eq!(paths(&flatten(&value, "")), vec!["z", "a", "m.y", "m.b"]);
    }

    #[test]
    fn repeated_path_keeps_last_value() {
        let value: Value = serde_json::from_str(r#"{"a": {"b": 1}, "a.b": "later"}"#).unwrap();
        let fields = flatten(&value, "");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["a.b"], json!("later"));
    }

    #[test]
    fn type_names() {
        assert_eq!(type_name(&json!(false)), "boolean");
        assert_eq!(type_name(&json!(-3)), "integer");
        assert_eq!(type_name(&json!(u64::MAX)), "integer");
        assert_eq!(type_name(&json!(0.25)), "float");
        assert_eq!(type_name(&json!("s")), "string");
        assert_eq!(type_name(&json!([])), "array");
        assert_eq!(type_name(&json!({})), "object");
        assert_eq!(type_name(&Value::Null), "null");
    }

    #[test]
    fn wide_and_exponent_numbers() {
        let value: Value =
            serde_json::from_str(r#"{"id": 123456789012345678901234, "big": 1e5, "neg": -7}"#)
                .unwrap();
        let fields = flatten(&value, "");
        assert_eq!(type_name(&fields["id"]), "integer");
        assert_eq!(fields["id"].to_string(), "123456789012345678901234");
        assert_eq!(type_name(&fields["big"]), "float");
        assert_eq!(type_name(&fields["neg"]), "integer");
    }

    #[test]
    fn deterministic() {
        let value = json!({"a": [{"b": null}], "c": {"d": [], "e": 1.0}});
        assert_eq!(flatten(&value, ""), flatten(&value, ""));
    }
}
