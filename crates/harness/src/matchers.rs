//! Argument matchers for call-history assertions.

use serde_json::Value;

/// Deep equality where numbers compare by value, so `10.0` equals `10`.
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| json_eq(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| json_eq(value, other)))
        }
        _ => a == b,
    }
}

/// Whether `actual` contains everything in `expected`.
///
/// When `expected` is an object, each of its keys must be present in the
/// (object) `actual` with a deeply equal value; extra keys in `actual` are
/// ignored. Any other `expected` must equal `actual`. Equality is
/// [`json_eq`].
pub fn object_containing(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(actual), Value::Object(expected)) => expected.iter().all(|(key, value)| {
            actual
                .get(key)
                .is_some_and(|actual| json_eq(actual, value))
        }),
        _ => json_eq(actual, expected),
    }
}

/// Exact deep equality, or [`object_containing`] when `exact` is false.
pub fn matches(actual: &Value, expected: &Value, exact: bool) -> bool {
    if exact {
        json_eq(actual, expected)
    } else {
        object_containing(actual, expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::parse_arguments;
    use serde_json::json;

    #[test]
    fn subset_of_keys_matches() {
        let actual = json!({"database": "my", "collection": "users", "limit": 10});
        assert!(object_containing(&actual, &json!({"collection": "users"})));
        assert!(object_containing(&actual, &json!({})));
    }

    #[test]
    fn nested_values_compare_deeply() {
        let actual = json!({"filter": {"author": "J.R.R Tolkien", "year": 1954}});
        assert!(!object_containing(&actual, &json!({"filter": {"author": "J.R.R Tolkien"}})));
        assert!(object_containing(
            &actual,
            &json!({"filter": {"author": "J.R.R Tolkien", "year": 1954}})
        ));
    }

    #[test]
    fn missing_or_different_key_fails() {
        let actual = json!({"database": "my"});
        assert!(!object_containing(&actual, &json!({"collection": "users"})));
        assert!(!object_containing(&actual, &json!({"database": "other"})));
    }

    #[test]
    fn non_objects_require_equality() {
        assert!(object_containing(&json!([1, 2]), &json!([1, 2])));
        assert!(!object_containing(&json!("x"), &json!({"a": 1})));
    }

    #[test]
    fn exact_rejects_extra_keys() {
        let actual = json!({"database": "sample_mflix", "extra": true});
        let expected = json!({"database": "sample_mflix"});
        assert!(matches(&actual, &expected, false));
        assert!(!matches(&actual, &expected, true));
    }

    #[test]
    fn float_and_integer_forms_of_a_number_match() {
        let actual = parse_arguments(r#"{"collection":"books","limit":10.0}"#);
        assert!(object_containing(&actual, &json!({"limit": 10})));
        assert!(matches(&actual, &json!({"collection": "books", "limit": 10}), true));
        assert!(!object_containing(&actual, &json!({"limit": 11})));
    }

    #[test]
    fn numbers_compare_by_value_when_nested() {
        let actual = json!({
            "filter": {"year": {"$gt": 1954.0}},
            "sort": [{"year": -1.0}],
            "projection": {"title": 1}
        });
        assert!(object_containing(
            &actual,
            &json!({"filter": {"year": {"$gt": 1954}}, "sort": [{"year": -1}]})
        ));
        assert!(!object_containing(&actual, &json!({"sort": [{"year": 1}]})));
        assert!(!object_containing(&actual, &json!({"sort": [{"year": -1}, {"title": 1}]})));
    }

    #[test]
    fn json_eq_still_distinguishes_types() {
        assert!(json_eq(&json!(1), &json!(1.0)));
        assert!(!json_eq(&json!(1), &json!("1")));
        assert!(!json_eq(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(json_eq(&json!(u64::MAX), &json!(u64::MAX)));
    }
}
