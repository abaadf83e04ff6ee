use super::Record;
use serde_json::Value;

const FIELD_SEPARATOR: &str = ";";
const ROW_SEPARATOR: &str = "\r\n";

/// Semicolon-delimited export where every cell holds the JSON encoding of its value.
///
/// Strings therefore appear wrapped in their own quotes. Null values and keys missing
/// from a record both become `""`. Rows are CRLF separated with no trailing separator.
pub fn json_to_csv(records: &[Record]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };
    let columns: Vec<&String> = first.keys().collect();

    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(
        columns
            .iter()
            .map(|name| name.as_str())
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR),
    );
    for record in records {
        let cells: Vec<String> = columns
            .iter()
            .map(|name| encode_cell(record.get(name.as_str())))
            .collect();
        rows.push(cells.join(FIELD_SEPARATOR));
    }
    rows.join(ROW_SEPARATOR)
}

fn encode_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "\"\"".to_string(),
        Some(value) => blank_nulls(value).to_string(),
    }
}

// Nulls at any depth encode as empty strings.
fn blank_nulls(value: &Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::Array(items) => Value::Array(items.iter().map(blank_nulls).collect()),
        Value::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), blank_nulls(item)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_nulls_are_blanked() {
        let value = json!({"a": null, "b": [1, null]});
        assert_eq!(encode_cell(Some(&value)), r#"{"a":"","b":[1,""]}"#);
        assert_eq!(encode_cell(Some(&Value::Null)), "\"\"");
        assert_eq!(encode_cell(None), "\"\"");
    }
}
