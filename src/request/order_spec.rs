use serde::{Deserialize, Serialize};

use crate::QueryError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if text.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NullsOrder {
    #[serde(alias = "FIRST")]
    First,
    #[serde(alias = "LAST")]
    Last,
}

impl NullsOrder {
    /// PostgreSQL placement: NULLs sort as larger than any value.
    pub fn default_for(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => NullsOrder::Last,
            SortDirection::Desc => NullsOrder::First,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            NullsOrder::First => "NULLS FIRST",
            NullsOrder::Last => "NULLS LAST",
        }
    }
}

/// One entry of a request's `order` array: `"field:direction"` or an object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OrderInput {
    Token(String),
    Item {
        field: String,
        #[serde(default)]
        direction: SortDirection,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        nulls: Option<NullsOrder>,
    },
}

impl From<&str> for OrderInput {
    fn from(value: &str) -> Self {
        OrderInput::Token(value.to_string())
    }
}

impl From<String> for OrderInput {
    fn from(value: String) -> Self {
        OrderInput::Token(value)
    }
}

/// Parsed sort key. `token` is the caller's original text, used in errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: String,
    pub direction: SortDirection,
    pub nulls: NullsOrder,
    pub token: String,
}

impl OrderSpec {
    /// Parse `"field"`, `"field:asc"` or `"field:desc"`.
    ///
    /// Anything else fails with `UnknownField` naming the whole token.
    pub fn parse(token: &str) -> Result<Self, QueryError> {
        let unknown = || QueryError::UnknownField(token.to_string());

        let (field, direction) = match token.rsplit_once(':') {
            Some((field, direction)) => (field, SortDirection::parse(direction).ok_or_else(unknown)?),
            None => (token, SortDirection::Asc),
        };

        if field.is_empty() {
            return unknown().err();
        }

        Ok(Self {
            field: field.to_string(),
            direction,
            nulls: NullsOrder::default_for(direction),
            token: token.to_string(),
        })
    }

    pub fn from_input(input: &OrderInput) -> Result<Self, QueryError> {
        match input {
            OrderInput::Token(token) => Self::parse(token),
            OrderInput::Item { field, direction, nulls } => {
                if field.is_empty() {
                    return QueryError::UnknownField(field.clone()).err();
                }
                Ok(Self {
                    field: field.clone(),
                    direction: *direction,
                    nulls: nulls.unwrap_or_else(|| NullsOrder::default_for(*direction)),
                    token: field.clone(),
                })
            }
        }
    }

    /// Dotted path segments (`translation.value` -> `["translation", "value"]`).
    pub fn path(&self) -> Vec<&str> {
        self.field.split('.').collect()
    }
}
