use std::{collections::HashMap, fmt::Display};

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::QueryError;

/// Longest accepted `LIKE` pattern, in characters.
pub const MAX_PATTERN_LENGTH: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Like,
    ILike,
    NotLike,
    NotILike,
    Is,
    IsNot,
}

// keys are lowercased and stripped of the leading `$`
static OPERATORS: Lazy<HashMap<&'static str, OperatorKind>> = Lazy::new(|| {
    HashMap::from([
        ("eq", OperatorKind::Eq),
        ("neq", OperatorKind::Neq),
        ("ne", OperatorKind::Neq),
        ("noteq", OperatorKind::Neq),
        ("gt", OperatorKind::Gt),
        ("gte", OperatorKind::Gte),
        ("lt", OperatorKind::Lt),
        ("lte", OperatorKind::Lte),
        ("in", OperatorKind::In),
        ("notin", OperatorKind::NotIn),
        ("nin", OperatorKind::NotIn),
        ("like", OperatorKind::Like),
        ("ilike", OperatorKind::ILike),
        ("notlike", OperatorKind::NotLike),
        ("nlike", OperatorKind::NotLike),
        ("notilike", OperatorKind::NotILike),
        ("nilike", OperatorKind::NotILike),
        ("is", OperatorKind::Is),
        ("isnot", OperatorKind::IsNot),
    ])
});

/// Keys that combine nested where objects instead of comparing a column.
pub const LOGICAL_KEYS: [&str; 3] = ["$and", "$or", "$not"];

impl OperatorKind {
    pub fn from_key(key: &str) -> Option<Self> {
        let name = key.strip_prefix('$')?;
        OPERATORS.get(name.to_ascii_lowercase().as_str()).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            OperatorKind::Eq => "$eq",
            OperatorKind::Neq => "$neq",
            OperatorKind::Gt => "$gt",
            OperatorKind::Gte => "$gte",
            OperatorKind::Lt => "$lt",
            OperatorKind::Lte => "$lte",
            OperatorKind::In => "$in",
            OperatorKind::NotIn => "$notIn",
            OperatorKind::Like => "$like",
            OperatorKind::ILike => "$iLike",
            OperatorKind::NotLike => "$notLike",
            OperatorKind::NotILike => "$notILike",
            OperatorKind::Is => "$is",
            OperatorKind::IsNot => "$isNot",
        }
    }

    pub fn is_logical_key(key: &str) -> bool {
        LOGICAL_KEYS.contains(&key)
    }

    /// A non-empty object whose keys are all `$`-prefixed comparison keys.
    ///
    /// Objects carrying `$and`/`$or`/`$not` are nested where objects instead.
    pub fn is_operator_object(value: &Value) -> bool {
        match value {
            Value::Object(map) => {
                !map.is_empty()
                    && map.keys().all(|k| k.starts_with('$'))
                    && !map.keys().any(|k| Self::is_logical_key(k))
            }
            _ => false,
        }
    }

    /// Whether a `null` operand still yields a predicate.
    pub fn accepts_null(&self) -> bool {
        matches!(self, OperatorKind::Is | OperatorKind::IsNot)
    }

    /// Check the operand shape for this operator.
    pub fn validate(&self, field: &str, value: &Value) -> Result<(), QueryError> {
        match self {
            OperatorKind::Eq | OperatorKind::Neq | OperatorKind::Gt
            | OperatorKind::Gte | OperatorKind::Lt | OperatorKind::Lte => {
                if !Self::is_scalar(value) {
                    return QueryError::invalid_filter(field, "Expected scalar value").err();
                }
            }
            OperatorKind::In | OperatorKind::NotIn => {
                let Value::Array(items) = value else {
                    return QueryError::invalid_filter(field, "Expected array value").err();
                };
                if !items.iter().all(Self::is_scalar) {
                    return QueryError::invalid_filter(field, "Expected array of scalar values").err();
                }
            }
            OperatorKind::Like | OperatorKind::ILike | OperatorKind::NotLike | OperatorKind::NotILike => {
                let Value::String(pattern) = value else {
                    return QueryError::invalid_filter(field, "Expected string value").err();
                };
                if pattern.chars().count() > MAX_PATTERN_LENGTH {
                    return QueryError::invalid_filter(field, "Pattern is too long").err();
                }
            }
            OperatorKind::Is | OperatorKind::IsNot => {
                if !matches!(value, Value::Null | Value::Bool(_)) {
                    return QueryError::invalid_filter(field, "Only null or boolean is supported").err();
                }
            }
        }
        Ok(())
    }

    fn is_scalar(value: &Value) -> bool {
        !matches!(value, Value::Array(_) | Value::Object(_))
    }
}

impl Display for OperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::OperatorKind;
    use crate::QueryError;

    #[test]
    fn from_key_accepts_canonical_names() {
        assert_eq!(OperatorKind::from_key("$eq"), Some(OperatorKind::Eq));
        assert_eq!(OperatorKind::from_key("$notIn"), Some(OperatorKind::NotIn));
        assert_eq!(OperatorKind::from_key("$iLike"), Some(OperatorKind::ILike));
        assert_eq!(OperatorKind::from_key("$notILike"), Some(OperatorKind::NotILike));
        assert_eq!(OperatorKind::from_key("$isNot"), Some(OperatorKind::IsNot));
    }

    #[test]
    fn from_key_accepts_aliases_case_insensitively() {
        assert_eq!(OperatorKind::from_key("$ne"), Some(OperatorKind::Neq));
        assert_eq!(OperatorKind::from_key("$NIN"), Some(OperatorKind::NotIn));
        assert_eq!(OperatorKind::from_key("$ilike"), Some(OperatorKind::ILike));
        assert_eq!(OperatorKind::from_key("$nilike"), Some(OperatorKind::NotILike));
    }

    #[test]
    fn from_key_rejects_unknown_and_unprefixed() {
        assert_eq!(OperatorKind::from_key("$between"), None);
        assert_eq!(OperatorKind::from_key("eq"), None);
    }

    #[test]
    fn operator_object_detection() {
        assert!(OperatorKind::is_operator_object(&json!({"$gte": 25, "$lte": 35})));
        assert!(!OperatorKind::is_operator_object(&json!({})));
        assert!(!OperatorKind::is_operator_object(&json!({"value": "x"})));
        assert!(!OperatorKind::is_operator_object(&json!({"$or": [{"value": "x"}]})));
        assert!(!OperatorKind::is_operator_object(&json!("Alice")));
    }

    #[test]
    fn validate_in_requires_array() {
        let err = OperatorKind::In.validate("age", &json!(3)).unwrap_err();
        assert_eq!(err, QueryError::invalid_filter("age", "Expected array value"));
        assert!(OperatorKind::NotIn.validate("age", &json!([])).is_ok());
    }

    #[test]
    fn validate_like_requires_short_string() {
        assert!(OperatorKind::Like.validate("name", &json!("%a%")).is_ok());
        assert!(OperatorKind::ILike.validate("name", &json!(1)).is_err());
        let long = "x".repeat(1001);
        let err = OperatorKind::NotLike.validate("name", &json!(long)).unwrap_err();
        assert_eq!(err, QueryError::invalid_filter("name", "Pattern is too long"));
    }

    #[test]
    fn validate_is_accepts_null_and_booleans_only() {
        assert!(OperatorKind::Is.validate("age", &json!(null)).is_ok());
        assert!(OperatorKind::IsNot.validate("age", &json!(true)).is_ok());
        assert!(OperatorKind::Is.validate("age", &json!("null")).is_err());
    }

    #[test]
    fn validate_comparison_rejects_structures() {
        assert!(OperatorKind::Eq.validate("tags", &json!(["a"])).is_err());
        assert!(OperatorKind::Gt.validate("meta", &json!({"a": 1})).is_err());
        assert!(OperatorKind::Lte.validate("age", &json!(35)).is_ok());
    }
}
