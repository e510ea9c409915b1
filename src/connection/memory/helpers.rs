use std::cmp::Ordering;

use chrono::DateTime;
use ordered_float::OrderedFloat;
use regex::Regex;
use serde_json::Value;

use crate::request::{NullsOrder, SortDirection};

pub struct Helpers;

impl Helpers {
    /// SQL comparison of two non-null values; `None` when the types don't compare.
    ///
    /// Strings that both parse as RFC 3339 timestamps compare chronologically.
    pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                let x = OrderedFloat(x.as_f64()?);
                let y = OrderedFloat(y.as_f64()?);
                Some(x.cmp(&y))
            }
            (Value::String(x), Value::String(y)) => {
                match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                    (Ok(x), Ok(y)) => Some(x.cmp(&y)),
                    _ => Some(x.cmp(y)),
                }
            }
            (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
            _ => None,
        }
    }

    /// Sort comparator with explicit NULL placement.
    ///
    /// `nulls` is applied as-is regardless of `direction`.
    pub fn cmp_for_sort(a: &Value, b: &Value, direction: SortDirection, nulls: NullsOrder) -> Ordering {
        let nulls_first = nulls == NullsOrder::First;
        match (a.is_null(), b.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return if nulls_first { Ordering::Less } else { Ordering::Greater },
            (false, true) => return if nulls_first { Ordering::Greater } else { Ordering::Less },
            (false, false) => {}
        }

        let ord = Self::compare(a, b).unwrap_or_else(|| Self::type_rank(a).cmp(&Self::type_rank(b)));
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }

    fn type_rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    /// Anchored regex for a `LIKE` pattern: `%` is any run, `_` one character.
    pub fn like_regex(pattern: &str, case_insensitive: bool) -> Option<Regex> {
        let mut source = String::from(if case_insensitive { "(?si)^" } else { "(?s)^" });
        let mut buffer = [0u8; 4];
        for ch in pattern.chars() {
            match ch {
                '%' => source.push_str(".*"),
                '_' => source.push('.'),
                c => source.push_str(&regex::escape(c.encode_utf8(&mut buffer))),
            }
        }
        source.push('$');
        Regex::new(&source).ok()
    }

    pub fn eval_like(value: &str, pattern: &str, case_insensitive: bool) -> bool {
        Self::like_regex(pattern, case_insensitive)
            .map(|re| re.is_match(value))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering::*;

    use serde_json::{json, Value};

    use super::Helpers;
    use crate::request::{NullsOrder, SortDirection};

    #[test]
    fn numbers_compare_across_int_and_float() {
        assert_eq!(Helpers::compare(&json!(2), &json!(2.0)), Some(Equal));
        assert_eq!(Helpers::compare(&json!(1.5), &json!(2)), Some(Less));
    }

    #[test]
    fn timestamps_compare_chronologically() {
        let a = json!("2024-01-01T10:00:00+02:00");
        let b = json!("2024-01-01T09:00:00Z");
        assert_eq!(Helpers::compare(&a, &b), Some(Less));
        assert_eq!(Helpers::compare(&json!("b"), &json!("a")), Some(Greater));
    }

    #[test]
    fn mixed_types_do_not_compare() {
        assert_eq!(Helpers::compare(&json!("1"), &json!(1)), None);
    }

    #[test]
    fn sort_places_nulls_as_requested() {
        let n = Value::Null;
        let z = json!(0);
        assert_eq!(Helpers::cmp_for_sort(&n, &z, SortDirection::Asc, NullsOrder::Last), Greater);
        assert_eq!(Helpers::cmp_for_sort(&n, &z, SortDirection::Desc, NullsOrder::First), Less);
        assert_eq!(Helpers::cmp_for_sort(&n, &n, SortDirection::Asc, NullsOrder::Last), Equal);
    }

    #[test]
    fn sort_direction_reverses_values() {
        let a = json!("Alice");
        let b = json!("Bob");
        assert_eq!(Helpers::cmp_for_sort(&a, &b, SortDirection::Asc, NullsOrder::Last), Less);
        assert_eq!(Helpers::cmp_for_sort(&a, &b, SortDirection::Desc, NullsOrder::First), Greater);
    }

    #[test]
    fn like_wildcards_and_escaping() {
        assert!(Helpers::eval_like("phone case", "%phone%", false));
        assert!(Helpers::eval_like("a.c", "a_c", false));
        assert!(!Helpers::eval_like("abc", "a.c", false));
        assert!(Helpers::eval_like("50% off", "50% off", false));
        assert!(!Helpers::eval_like("Phone", "phone", false));
        assert!(Helpers::eval_like("Phone", "phone", true));
        assert!(Helpers::eval_like("", "%", true));
    }
}
