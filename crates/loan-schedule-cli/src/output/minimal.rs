use serde_json::Value;

/// Key figure of each command, in priority order.
const PRIORITY_KEYS: [&str; 5] = [
    "regular_payment",
    "outstanding",
    "net_position",
    "closing_balance",
    "end_balance",
];

/// Print just the headline number from the output.
///
/// Falls back to the first scalar field when none of the known keys is
/// present.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                return format_minimal(val);
            }
        }

        if let Some((key, val)) = map.iter().find(|(_, v)| !v.is_object() && !v.is_array()) {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result_obj)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefers_priority_key() {
        let v = json!({"result": {"periods": 12, "regular_payment": "1032.80"}});
        assert_eq!(minimal_line(&v), "1032.80");
    }

    #[test]
    fn test_falls_back_to_first_scalar() {
        let v = json!({"result": {"lines": [], "periods": 4}});
        assert_eq!(minimal_line(&v), "periods: 4");
    }
}
